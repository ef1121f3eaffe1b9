use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type};

/// What the database does to a referencing row when the referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    SetNull,
    Restrict,
}

impl OnDelete {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().replace(' ', "_").as_str() {
            "cascade" => Some(OnDelete::Cascade),
            "set_null" => Some(OnDelete::SetNull),
            "restrict" => Some(OnDelete::Restrict),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::SetNull => "SET NULL",
            OnDelete::Restrict => "RESTRICT",
        }
    }
}

#[derive(Debug)]
pub struct ForeignKeyInfo {
    pub referenced_table: String,
    pub related_rust_type: syn::Ident,
    pub on_delete: OnDelete,
}

pub struct FieldData {
    pub name: String,
    pub ty: syn::Type,
    pub is_option: bool,
    pub is_pk: bool,
    pub sql_type: String,
    pub foreign_key: Option<ForeignKeyInfo>,
    pub unique: bool,
    pub indexed: bool,
    pub sql_default: Option<String>,
    pub sql_check: Option<String>,
}

impl FieldData {
    /// Timestamps are stamped by the database and never bound from the struct.
    pub fn is_store_managed(&self) -> bool {
        self.is_pk || self.name == "created_at" || self.name == "updated_at"
    }
}

impl std::fmt::Debug for FieldData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldData")
            .field("name", &self.name)
            .field("ty", &self.ty.to_token_stream().to_string())
            .field("is_option", &self.is_option)
            .field("is_pk", &self.is_pk)
            .field("sql_type", &self.sql_type)
            .field("foreign_key", &self.foreign_key)
            .field("unique", &self.unique)
            .field("indexed", &self.indexed)
            .field("sql_default", &self.sql_default)
            .field("sql_check", &self.sql_check)
            .finish()
    }
}

pub fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(last_segment) = type_path.path.segments.last() {
            if last_segment.ident == "Option" {
                return true;
            }
        }
    }
    false
}

pub fn get_option_inner_type(ty: &Type) -> Option<Type> {
    if let Type::Path(type_path) = ty {
        if let Some(last_segment) = type_path.path.segments.last() {
            if last_segment.ident == "Option" {
                if let PathArguments::AngleBracketed(angle_args) = &last_segment.arguments {
                    if angle_args.args.len() == 1 {
                        if let GenericArgument::Type(inner_ty) = &angle_args.args[0] {
                            return Some(inner_ty.clone());
                        }
                    }
                }
            }
        }
    }
    None
}

pub fn get_fully_qualified_type_string(ty: &Type) -> String {
    quote::quote!(#ty).to_string().replace(' ', "")
}

fn is_json_type_string(type_str: &str) -> bool {
    type_str.starts_with("Json<")
        || type_str.starts_with("::sqlx::types::Json<")
        || type_str.starts_with("sqlx::types::Json<")
}

/// Maps a (non-`Option`) Rust field type to its PostgreSQL column type.
pub fn map_rust_type_to_sql(ty: &Type) -> Result<String, String> {
    let type_str = get_fully_qualified_type_string(ty);

    let sql = match type_str.as_str() {
        "String" | "std::string::String" => "TEXT",
        "i16" => "SMALLINT",
        "i32" => "INTEGER",
        "i64" => "BIGINT",
        "f32" => "REAL",
        "f64" => "DOUBLE PRECISION",
        "bool" => "BOOLEAN",
        "Vec<u8>" => "BYTEA",
        "Uuid" | "::sqlx::types::Uuid" | "sqlx::types::Uuid" | "uuid::Uuid" => "UUID",
        "BigDecimal"
        | "::sqlx::types::BigDecimal"
        | "sqlx::types::BigDecimal"
        | "bigdecimal::BigDecimal" => "NUMERIC(10, 2)",
        "DateTime<Utc>" | "::chrono::DateTime<::chrono::Utc>" | "chrono::DateTime<chrono::Utc>" => "TIMESTAMPTZ",
        s if is_json_type_string(s) => "JSONB",
        "Vec<String>" | "Vec<std::string::String>" => "TEXT[]",
        "Vec<Uuid>" | "Vec<sqlx::types::Uuid>" | "Vec<::sqlx::types::Uuid>" => "UUID[]",
        _ => {
            return Err(format!(
                "unsupported field type for SqlxObject: `{}`; use a scalar, Uuid, BigDecimal, Json<T> or an Option of one of those",
                type_str
            ))
        }
    };
    Ok(sql.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn option_detection_handles_paths() {
        let plain: Type = parse_quote!(String);
        let opt: Type = parse_quote!(Option<Uuid>);
        let qualified: Type = parse_quote!(std::option::Option<i32>);

        assert!(!is_option_type(&plain));
        assert!(is_option_type(&opt));
        assert!(is_option_type(&qualified));
        assert_eq!(
            get_fully_qualified_type_string(&get_option_inner_type(&opt).unwrap()),
            "Uuid"
        );
    }

    #[test]
    fn maps_domain_types_to_postgres() {
        let cases: Vec<(Type, &str)> = vec![
            (parse_quote!(String), "TEXT"),
            (parse_quote!(i32), "INTEGER"),
            (parse_quote!(i64), "BIGINT"),
            (parse_quote!(Uuid), "UUID"),
            (parse_quote!(BigDecimal), "NUMERIC(10, 2)"),
            (parse_quote!(Json<serde_json::Value>), "JSONB"),
            (parse_quote!(sqlx::types::Json<Vec<String>>), "JSONB"),
        ];
        for (ty, expected) in cases {
            assert_eq!(map_rust_type_to_sql(&ty).unwrap(), expected);
        }
    }

    #[test]
    fn rejects_unknown_types() {
        let ty: Type = parse_quote!(HashMap<String, String>);
        assert!(map_rust_type_to_sql(&ty).is_err());
    }

    #[test]
    fn parses_on_delete_actions() {
        assert_eq!(OnDelete::parse("cascade"), Some(OnDelete::Cascade));
        assert_eq!(OnDelete::parse("SET NULL"), Some(OnDelete::SetNull));
        assert_eq!(OnDelete::parse("set_null"), Some(OnDelete::SetNull));
        assert_eq!(OnDelete::parse("nothing"), None);
        assert_eq!(OnDelete::SetNull.as_sql(), "SET NULL");
    }
}
