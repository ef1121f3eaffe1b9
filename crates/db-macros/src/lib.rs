mod internals;

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields};

use internals::codegen::{
    generate_fetch_helpers, generate_row_struct, generate_sqlx_crud_impl,
    generate_sqlx_filter_query_impl, generate_sqlx_schema_impl,
};
use internals::parse::{get_fields_data, parse_name_value_attrs};

/// Derives `SqlxSchema`, `SqlxCrud` and `SqlxFilterQuery` for a struct with an
/// `id: Uuid` primary key.
///
/// Struct attributes:
/// - `#[table_name = "..."]` (required)
/// - `#[unique_together = "col_a, col_b"]` (repeatable)
///
/// Field attributes:
/// - `#[foreign_key(referenced_table = "..", related_rust_type = "..", on_delete = "cascade")]`
/// - `#[unique]`, `#[indexed]`
/// - `#[sql_default = "..."]`, `#[sql_check = "..."]`
#[proc_macro_derive(
    SqlxObject,
    attributes(table_name, unique_together, foreign_key, unique, indexed, sql_default, sql_check)
)]
pub fn sqlx_object_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    match expand(ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(ast: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &ast.ident;
    let row_struct_name = format_ident!("{}RowSqlx", struct_name);

    let table_name = parse_name_value_attrs(&ast.attrs, "table_name")?
        .pop()
        .ok_or_else(|| syn::Error::new_spanned(&ast.ident, "missing #[table_name = \"...\"]"))?;

    let unique_together: Vec<Vec<String>> = parse_name_value_attrs(&ast.attrs, "unique_together")?
        .into_iter()
        .map(|group| {
            group
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()
        })
        .collect();

    let named_fields = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &ast.ident,
                    "SqlxObject only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &ast.ident,
                "SqlxObject can only be derived for structs",
            ))
        }
    };

    let fields_data = get_fields_data(named_fields)?;
    for group in &unique_together {
        for column in group {
            if !fields_data.iter().any(|f| &f.name == column) {
                return Err(syn::Error::new_spanned(
                    &ast.ident,
                    format!("unique_together names unknown column `{}`", column),
                ));
            }
        }
    }

    let row_struct = generate_row_struct(&row_struct_name, &fields_data);
    let schema_impl = generate_sqlx_schema_impl(
        struct_name,
        &row_struct_name,
        &table_name,
        &fields_data,
        &unique_together,
    );
    let crud_impl = generate_sqlx_crud_impl(struct_name, &table_name, &fields_data);
    let filter_impl = generate_sqlx_filter_query_impl(struct_name, &row_struct_name);
    let fetch_helpers = generate_fetch_helpers(&fields_data);

    Ok(quote! {
        #row_struct
        #schema_impl
        #crud_impl
        #filter_impl

        impl #struct_name {
            #fetch_helpers
        }
    })
}
