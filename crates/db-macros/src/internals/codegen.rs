use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, LitStr};

use super::types::FieldData;

const TIMESTAMP_DEFAULT: &str = "NOT NULL DEFAULT floor(extract(epoch from now()))";

fn quoted_columns(fields: &[FieldData]) -> String {
    fields
        .iter()
        .map(|f| format!("\"{}\"", f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn settable_fields(fields: &[FieldData]) -> Vec<&FieldData> {
    fields.iter().filter(|f| !f.is_store_managed()).collect()
}

pub fn generate_create_table_sql(
    table_name: &str,
    fields_data: &[FieldData],
    unique_together: &[Vec<String>],
) -> (String, Vec<String>) {
    let mut column_defs: Vec<String> = Vec::new();
    let mut constraint_defs: Vec<String> = Vec::new();
    let mut index_sqls: Vec<String> = Vec::new();

    for field in fields_data {
        let mut parts = vec![format!("\"{}\"", field.name)];

        if field.is_pk {
            parts.push(field.sql_type.clone());
            parts.push("PRIMARY KEY DEFAULT gen_random_uuid()".to_string());
        } else if field.name == "created_at" || field.name == "updated_at" {
            parts.push("BIGINT".to_string());
            parts.push(TIMESTAMP_DEFAULT.to_string());
        } else {
            parts.push(field.sql_type.clone());
            if !field.is_option {
                parts.push("NOT NULL".to_string());
            }
            if let Some(default) = &field.sql_default {
                parts.push(format!("DEFAULT {}", default));
            }
            if let Some(check) = &field.sql_check {
                parts.push(format!("CHECK ({})", check));
            }
        }

        if field.unique {
            parts.push("UNIQUE".to_string());
        }

        if field.indexed {
            index_sqls.push(format!(
                "CREATE INDEX IF NOT EXISTS \"idx_{table}_{col}\" ON \"{table}\"(\"{col}\")",
                table = table_name,
                col = field.name
            ));
        }

        column_defs.push(parts.join(" "));

        if let Some(fk) = &field.foreign_key {
            constraint_defs.push(format!(
                "FOREIGN KEY (\"{}\") REFERENCES \"{}\"(\"id\") ON DELETE {} ON UPDATE CASCADE",
                field.name,
                fk.referenced_table,
                fk.on_delete.as_sql()
            ));
        }
    }

    for group in unique_together {
        let cols = group
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");
        constraint_defs.push(format!("UNIQUE ({})", cols));
    }

    column_defs.extend(constraint_defs);
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
        table_name,
        column_defs.join(", ")
    );
    (sql, index_sqls)
}

pub fn generate_insert_sql(table_name: &str, fields_data: &[FieldData]) -> String {
    let insert_cols: Vec<String> = settable_fields(fields_data)
        .iter()
        .map(|f| format!("\"{}\"", f.name))
        .collect();
    let placeholders = (1..=insert_cols.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");

    if insert_cols.is_empty() {
        return format!(
            "INSERT INTO \"{}\" DEFAULT VALUES RETURNING {}",
            table_name,
            quoted_columns(fields_data)
        );
    }

    format!(
        "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING {}",
        table_name,
        insert_cols.join(", "),
        placeholders,
        quoted_columns(fields_data)
    )
}

/// Returns the update statement and whether it degenerated into a plain select.
pub fn generate_update_sql(table_name: &str, fields_data: &[FieldData]) -> (String, bool) {
    let set_clauses: Vec<String> = settable_fields(fields_data)
        .iter()
        .enumerate()
        .map(|(i, f)| format!("\"{}\" = ${}", f.name, i + 1))
        .collect();

    let all_columns = quoted_columns(fields_data);
    if set_clauses.is_empty() {
        return (
            format!("SELECT {} FROM \"{}\" WHERE \"id\" = $1", all_columns, table_name),
            true,
        );
    }

    let pk_placeholder = set_clauses.len() + 1;
    (
        format!(
            "UPDATE \"{}\" SET {} WHERE \"id\" = ${} RETURNING {}",
            table_name,
            set_clauses.join(", "),
            pk_placeholder,
            all_columns
        ),
        false,
    )
}

pub fn generate_trigger_sql(table_name: &str, fields_data: &[FieldData]) -> String {
    if !fields_data.iter().any(|f| f.name == "updated_at") {
        return String::new();
    }
    format!(
        "DROP TRIGGER IF EXISTS {trigger} ON \"{table}\"; CREATE TRIGGER {trigger} BEFORE UPDATE ON \"{table}\" FOR EACH ROW EXECUTE PROCEDURE set_updated_at_unix_timestamp();",
        trigger = format!("set_updated_at_{}", table_name),
        table = table_name
    )
}

pub fn generate_row_struct(row_struct_name: &Ident, fields_data: &[FieldData]) -> TokenStream {
    let defs = fields_data.iter().map(|field| {
        let ident = format_ident!("{}", field.name);
        let ty = &field.ty;
        quote! { pub #ident: #ty }
    });

    quote! {
        #[derive(::sqlx::FromRow, Debug, Clone)]
        #[automatically_derived]
        pub struct #row_struct_name {
            #(#defs),*
        }
    }
}

pub fn generate_sqlx_schema_impl(
    struct_name: &Ident,
    row_struct_name: &Ident,
    table_name: &str,
    fields_data: &[FieldData],
    unique_together: &[Vec<String>],
) -> TokenStream {
    let column_lits: Vec<LitStr> = fields_data
        .iter()
        .map(|f| LitStr::new(&f.name, proc_macro2::Span::call_site()))
        .collect();

    let from_row_assignments = fields_data.iter().map(|field| {
        let ident = format_ident!("{}", field.name);
        quote! { #ident: row.#ident }
    });

    let (create_table_sql, index_sqls) =
        generate_create_table_sql(table_name, fields_data, unique_together);
    let index_lits: Vec<LitStr> = index_sqls
        .iter()
        .map(|s| LitStr::new(s, proc_macro2::Span::call_site()))
        .collect();
    let drop_table_sql = format!("DROP TABLE IF EXISTS \"{}\" CASCADE", table_name);
    let insert_sql = generate_insert_sql(table_name, fields_data);
    let trigger_sql = generate_trigger_sql(table_name, fields_data);

    quote! {
        #[automatically_derived]
        impl ::tabletop_database::SqlxSchema for #struct_name {
            type Id = ::sqlx::types::Uuid;
            type Row = #row_struct_name;

            const TABLE_NAME: &'static str = #table_name;
            const ID_COLUMN_NAME: &'static str = "id";
            const COLUMNS: &'static [&'static str] = &[#( #column_lits ),*];
            const INDEXES_SQL: &'static [&'static str] = &[#( #index_lits ),*];

            fn get_id_value(&self) -> Self::Id { self.id }

            fn from_row(row: Self::Row) -> Self {
                Self {
                    #(#from_row_assignments),*
                }
            }

            fn insert_sql() -> String { #insert_sql.to_string() }
            fn create_table_sql() -> String { #create_table_sql.to_string() }
            fn drop_table_sql() -> String { #drop_table_sql.to_string() }
            fn trigger_sql() -> String { #trigger_sql.to_string() }
        }
    }
}

pub fn generate_sqlx_crud_impl(
    struct_name: &Ident,
    table_name: &str,
    fields_data: &[FieldData],
) -> TokenStream {
    let bindings: Vec<TokenStream> = settable_fields(fields_data)
        .iter()
        .map(|field| {
            let ident = format_ident!("{}", field.name);
            quote! { .bind(self.#ident.clone()) }
        })
        .collect();
    let (update_sql, _) = generate_update_sql(table_name, fields_data);
    let delete_sql = format!("DELETE FROM \"{}\" WHERE \"id\" = $1", table_name);

    quote! {
        #[automatically_derived]
        #[::async_trait::async_trait]
        impl ::tabletop_database::SqlxCrud for #struct_name {
            fn bind_insert<'q>(
                &self,
                query: ::sqlx::query::QueryAs<'q, ::sqlx::Postgres, <Self as ::tabletop_database::SqlxSchema>::Row, ::sqlx::postgres::PgArguments>
            ) -> ::sqlx::query::QueryAs<'q, ::sqlx::Postgres, <Self as ::tabletop_database::SqlxSchema>::Row, ::sqlx::postgres::PgArguments> {
                query #(#bindings)*
            }

            fn bind_update<'q>(
                &self,
                query: ::sqlx::query::QueryAs<'q, ::sqlx::Postgres, <Self as ::tabletop_database::SqlxSchema>::Row, ::sqlx::postgres::PgArguments>
            ) -> ::sqlx::query::QueryAs<'q, ::sqlx::Postgres, <Self as ::tabletop_database::SqlxSchema>::Row, ::sqlx::postgres::PgArguments> {
                query #(#bindings)* .bind(self.id)
            }

            async fn create<'e, E>(self, executor: E) -> Result<Self, ::sqlx::Error>
            where
                E: ::sqlx::Executor<'e, Database = ::sqlx::Postgres> + Send,
                Self: Send
            {
                let sql = <Self as ::tabletop_database::SqlxSchema>::insert_sql();
                self.bind_insert(::sqlx::query_as::<_, <Self as ::tabletop_database::SqlxSchema>::Row>(&sql))
                    .fetch_one(executor)
                    .await
                    .map(<Self as ::tabletop_database::SqlxSchema>::from_row)
            }

            async fn update<'e, E>(self, executor: E) -> Result<Self, ::sqlx::Error>
            where
                E: ::sqlx::Executor<'e, Database = ::sqlx::Postgres> + Send,
                Self: Send
            {
                let sql = #update_sql;
                self.bind_update(::sqlx::query_as::<_, <Self as ::tabletop_database::SqlxSchema>::Row>(sql))
                    .fetch_one(executor)
                    .await
                    .map(<Self as ::tabletop_database::SqlxSchema>::from_row)
            }

            async fn delete<'e, E>(self, executor: E) -> Result<u64, ::sqlx::Error>
            where
                E: ::sqlx::Executor<'e, Database = ::sqlx::Postgres> + Send,
                Self: Send
            {
                ::sqlx::query(#delete_sql)
                    .bind(self.id)
                    .execute(executor)
                    .await
                    .map(|done| done.rows_affected())
            }
        }
    }
}

pub fn generate_sqlx_filter_query_impl(struct_name: &Ident, row_struct_name: &Ident) -> TokenStream {
    quote! {
        #[automatically_derived]
        #[::async_trait::async_trait]
        impl ::tabletop_database::SqlxFilterQuery for #struct_name {
            async fn find_by_criteria<'exe, E>(
                criteria: ::tabletop_database::QueryCriteria,
                executor: E,
            ) -> Result<Vec<Self>, ::sqlx::Error>
            where
                E: ::sqlx::Executor<'exe, Database = ::sqlx::Postgres> + Send,
                Self: Send,
            {
                let (sql, arguments) = criteria.build_select(
                    <Self as ::tabletop_database::SqlxSchema>::TABLE_NAME,
                    <Self as ::tabletop_database::SqlxSchema>::COLUMNS,
                )?;

                ::sqlx::query_as_with::<_, #row_struct_name, _>(&sql, arguments)
                    .fetch_all(executor)
                    .await
                    .map(|rows| rows.into_iter().map(<Self as ::tabletop_database::SqlxSchema>::from_row).collect())
            }

            async fn count_by_criteria<'exe, E>(
                criteria: ::tabletop_database::QueryCriteria,
                executor: E,
            ) -> Result<i64, ::sqlx::Error>
            where
                E: ::sqlx::Executor<'exe, Database = ::sqlx::Postgres> + Send,
                Self: Send,
            {
                let (sql, arguments) = criteria.build_count(<Self as ::tabletop_database::SqlxSchema>::TABLE_NAME)?;
                ::sqlx::query_scalar_with::<_, i64, _>(&sql, arguments)
                    .fetch_one(executor)
                    .await
            }

            async fn delete_by_criteria<'exe, E>(
                criteria: ::tabletop_database::QueryCriteria,
                executor: E,
            ) -> Result<u64, ::sqlx::Error>
            where
                E: ::sqlx::Executor<'exe, Database = ::sqlx::Postgres> + Send,
                Self: Send,
            {
                let (sql, arguments) = criteria.build_delete(<Self as ::tabletop_database::SqlxSchema>::TABLE_NAME)?;
                ::sqlx::query_with(&sql, arguments)
                    .execute(executor)
                    .await
                    .map(|done| done.rows_affected())
            }
        }
    }
}

/// `fetch_<relation>` helpers for every foreign key, e.g. `system_id` → `fetch_system`.
pub fn generate_fetch_helpers(fields_data: &[FieldData]) -> TokenStream {
    let methods = fields_data.iter().filter_map(|field| {
        let fk = field.foreign_key.as_ref()?;
        let field_ident = format_ident!("{}", field.name);
        let relation = field.name.strip_suffix("_id").unwrap_or(&field.name);
        let method = format_ident!("fetch_{}", relation);
        let related_type = &fk.related_rust_type;

        let lookup = quote! {
            let criteria = ::tabletop_database::QueryCriteria::by_id(id);
            <#related_type as ::tabletop_database::SqlxFilterQuery>::find_one_by_criteria(criteria, executor).await
        };

        let body = if field.is_option {
            quote! {
                match self.#field_ident {
                    Some(id) => { #lookup }
                    None => Ok(None),
                }
            }
        } else {
            quote! {
                let id = self.#field_ident;
                #lookup
            }
        };

        Some(quote! {
            pub async fn #method<'exe, E>(
                &self,
                executor: E
            ) -> Result<Option<#related_type>, ::sqlx::Error>
            where
                E: ::sqlx::Executor<'exe, Database = ::sqlx::Postgres> + Send,
            {
                #body
            }
        })
    });

    quote! { #(#methods)* }
}
