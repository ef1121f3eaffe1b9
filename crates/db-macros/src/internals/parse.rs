use quote::format_ident;
use syn::{Attribute, Field, Lit, Meta, NestedMeta};

use super::types::{
    get_option_inner_type, is_option_type, map_rust_type_to_sql, FieldData, ForeignKeyInfo,
    OnDelete,
};

fn name_value_str(attr: &Attribute, name: &str) -> syn::Result<Option<String>> {
    if !attr.path.is_ident(name) {
        return Ok(None);
    }
    match attr.parse_meta()? {
        Meta::NameValue(mnv) => match mnv.lit {
            Lit::Str(lit_str) => Ok(Some(lit_str.value())),
            other => Err(syn::Error::new_spanned(
                other,
                format!("`{}` expects a string literal", name),
            )),
        },
        other => Err(syn::Error::new_spanned(
            other,
            format!("`{}` must look like #[{} = \"...\"]", name, name),
        )),
    }
}

/// Collects every `#[name = "..."]` on an item, in declaration order.
pub fn parse_name_value_attrs(attrs: &[Attribute], name: &str) -> syn::Result<Vec<String>> {
    let mut values = Vec::new();
    for attr in attrs {
        if let Some(value) = name_value_str(attr, name)? {
            values.push(value);
        }
    }
    Ok(values)
}

pub fn parse_foreign_key_attr(field: &Field) -> syn::Result<Option<ForeignKeyInfo>> {
    for attr in field.attrs.iter() {
        if !attr.path.is_ident("foreign_key") {
            continue;
        }
        let meta_list = match attr.parse_meta()? {
            Meta::List(meta_list) => meta_list,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "foreign_key must look like #[foreign_key(referenced_table = \"..\", related_rust_type = \"..\")]",
                ))
            }
        };

        let mut referenced_table = None;
        let mut related_rust_type = None;
        let mut on_delete = OnDelete::Restrict;

        for nested in meta_list.nested.iter() {
            let mnv = match nested {
                NestedMeta::Meta(Meta::NameValue(mnv)) => mnv,
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "foreign_key options must be name-value pairs",
                    ))
                }
            };
            let value = match &mnv.lit {
                Lit::Str(lit_str) => lit_str.value(),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "foreign_key option values must be string literals",
                    ))
                }
            };

            if mnv.path.is_ident("referenced_table") {
                referenced_table = Some(value);
            } else if mnv.path.is_ident("related_rust_type") {
                related_rust_type = Some(value);
            } else if mnv.path.is_ident("on_delete") {
                on_delete = OnDelete::parse(&value).ok_or_else(|| {
                    syn::Error::new_spanned(
                        &mnv.lit,
                        "on_delete must be one of \"cascade\", \"set_null\", \"restrict\"",
                    )
                })?;
            } else {
                return Err(syn::Error::new_spanned(
                    &mnv.path,
                    "unknown foreign_key option",
                ));
            }
        }

        return match (referenced_table, related_rust_type) {
            (Some(referenced_table), Some(rust_type)) => Ok(Some(ForeignKeyInfo {
                referenced_table,
                related_rust_type: format_ident!("{}", rust_type),
                on_delete,
            })),
            _ => Err(syn::Error::new_spanned(
                attr,
                "foreign_key requires both referenced_table and related_rust_type",
            )),
        };
    }
    Ok(None)
}

pub fn has_flag_attr(field: &Field, name: &str) -> bool {
    field.attrs.iter().any(|attr| attr.path.is_ident(name))
}

/// Gathers all relevant data from the struct's fields.
pub fn get_fields_data(
    fields: &syn::punctuated::Punctuated<syn::Field, syn::Token![,]>,
) -> syn::Result<Vec<FieldData>> {
    let mut out = Vec::with_capacity(fields.len());

    for field in fields.iter() {
        let field_ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "SqlxObject fields must be named"))?;
        let field_ty = &field.ty;
        let is_option = is_option_type(field_ty);
        let is_pk = field_ident == "id";

        let type_for_analysis = get_option_inner_type(field_ty).unwrap_or_else(|| field_ty.clone());
        let sql_type = map_rust_type_to_sql(&type_for_analysis)
            .map_err(|msg| syn::Error::new_spanned(field_ty, msg))?;

        let foreign_key = parse_foreign_key_attr(field)?;
        if let Some(fk) = &foreign_key {
            if fk.on_delete == OnDelete::SetNull && !is_option {
                return Err(syn::Error::new_spanned(
                    field,
                    "on_delete = \"set_null\" requires an Option<_> field",
                ));
            }
        }

        out.push(FieldData {
            name: field_ident.to_string(),
            ty: field_ty.clone(),
            is_option,
            is_pk,
            sql_type,
            foreign_key,
            unique: has_flag_attr(field, "unique"),
            indexed: has_flag_attr(field, "indexed"),
            sql_default: parse_name_value_attrs(&field.attrs, "sql_default")?.pop(),
            sql_check: parse_name_value_attrs(&field.attrs, "sql_check")?.pop(),
        });
    }

    if !out.iter().any(|f| f.is_pk) {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "SqlxObject requires an `id` field",
        ));
    }

    Ok(out)
}
