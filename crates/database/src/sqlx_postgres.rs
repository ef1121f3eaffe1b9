use sqlx::{postgres::PgArguments, Arguments, Error as SqlxError, Executor, FromRow, Postgres};
use sqlx::types::Uuid;

/// Trait to define the schema of a database object for PostgreSQL.
pub trait SqlxSchema: Send + Sync + Unpin + Clone + std::fmt::Debug {
    /// The type of the primary key for this database object.
    type Id: Send + Sync + for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Clone;

    /// The intermediate type that implements FromRow, used for fetching from the database.
    type Row: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin;

    const TABLE_NAME: &'static str;
    const ID_COLUMN_NAME: &'static str;
    const COLUMNS: &'static [&'static str];
    const INDEXES_SQL: &'static [&'static str];

    fn table_name() -> &'static str { Self::TABLE_NAME }
    fn columns() -> &'static [&'static str] { Self::COLUMNS }

    fn get_id_value(&self) -> Self::Id;

    fn from_row(row: Self::Row) -> Self;

    fn create_table_sql() -> String;
    fn drop_table_sql() -> String;
    fn insert_sql() -> String;
    fn trigger_sql() -> String;
}

/// Trait for CRUD (Create, Read, Update, Delete) operations for PostgreSQL.
#[async_trait::async_trait]
pub trait SqlxCrud: SqlxSchema + SqlxFilterQuery + Sized {
    /// Binds the struct fields to an insert query.
    fn bind_insert<'q>(&self, query: sqlx::query::QueryAs<'q, Postgres, Self::Row, PgArguments>)
        -> sqlx::query::QueryAs<'q, Postgres, Self::Row, PgArguments>;

    /// Binds the struct fields, then the primary key, to an update-by-id query.
    fn bind_update<'q>(&self, query: sqlx::query::QueryAs<'q, Postgres, Self::Row, PgArguments>)
        -> sqlx::query::QueryAs<'q, Postgres, Self::Row, PgArguments>;

    /// Inserts the record. The store generates `id`, `created_at` and `updated_at`;
    /// the returned value carries them.
    async fn create<'e, E>(self, executor: E) -> Result<Self, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send;

    /// Writes every settable column of the record identified by its primary key.
    /// Fails with `RowNotFound` when no such row exists.
    async fn update<'e, E>(self, executor: E) -> Result<Self, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send;

    /// Deletes the record by primary key and returns the number of rows removed.
    async fn delete<'e, E>(self, executor: E) -> Result<u64, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send;
}

/// Specifies the direction for ordering query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// A boxed value that can be appended to a `PgArguments` list.
pub trait AsSqlxArg: Send + Sync {
    fn add_to_args(&self, args: &mut PgArguments) -> Result<(), SqlxError>;
}

impl<T> AsSqlxArg for T
where
    T: for<'a> sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
{
    fn add_to_args(&self, args: &mut PgArguments) -> Result<(), SqlxError> {
        args.add(self.clone()).map_err(SqlxError::Encode)
    }
}

/// A single `"column" <operator> [$n]` condition.
pub struct FilterCondition {
    pub column: &'static str,
    pub operator: &'static str,
    /// `None` for operators without a right-hand side such as `IS NULL`.
    pub value: Option<Box<dyn AsSqlxArg>>,
}

/// Builder for the WHERE / ORDER BY / LIMIT / OFFSET / FOR UPDATE tail of a
/// generated query. Conditions are joined with AND.
#[derive(Default)]
pub struct QueryCriteria {
    pub conditions: Vec<FilterCondition>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order_by: Vec<(&'static str, OrderDirection)>,
    pub for_update: bool,
}

impl QueryCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for `"id" = $1`.
    pub fn by_id(id: Uuid) -> Self {
        Self::new().add_valued_filter("id", "=", id)
    }

    /// Adds a filter condition that may or may not have a value.
    pub fn add_filter<V>(mut self, column: &'static str, operator: &'static str, value: Option<V>) -> Self
    where
        V: for<'a> ::sqlx::Encode<'a, Postgres> + ::sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
    {
        self.conditions.push(FilterCondition {
            column,
            operator,
            value: value.map(|v| Box::new(v) as Box<dyn AsSqlxArg>),
        });
        self
    }

    pub fn add_valued_filter<V>(self, column: &'static str, operator: &'static str, value: V) -> Self
    where
        V: for<'a> ::sqlx::Encode<'a, Postgres> + ::sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
    {
        self.add_filter(column, operator, Some(value))
    }

    /// Adds `"column" = value` only when `value` is present.
    pub fn add_optional_eq<V>(self, column: &'static str, value: Option<V>) -> Self
    where
        V: for<'a> ::sqlx::Encode<'a, Postgres> + ::sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
    {
        match value {
            Some(v) => self.add_valued_filter(column, "=", v),
            None => self,
        }
    }

    pub fn limit(mut self, limit_val: i64) -> Self {
        self.limit = Some(limit_val);
        self
    }

    pub fn offset(mut self, offset_val: i64) -> Self {
        self.offset = Some(offset_val);
        self
    }

    pub fn order_by(mut self, column: &'static str, direction: OrderDirection) -> Self {
        self.order_by.push((column, direction));
        self
    }

    /// Locks the selected rows until the surrounding transaction ends.
    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }

    fn push_where(&self, sql: &mut String, args: &mut PgArguments) -> Result<(), SqlxError> {
        if self.conditions.is_empty() {
            return Ok(());
        }

        let mut clauses = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            match &condition.value {
                Some(value) => {
                    value.add_to_args(args)?;
                    clauses.push(format!(
                        "\"{}\" {} ${}",
                        condition.column,
                        condition.operator,
                        args.len()
                    ));
                }
                None => clauses.push(format!("\"{}\" {}", condition.column, condition.operator)),
            }
        }
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
        Ok(())
    }

    pub fn build_select(
        &self,
        table_name: &str,
        columns: &[&str],
    ) -> Result<(String, PgArguments), SqlxError> {
        let mut args = PgArguments::default();
        let column_list = columns
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {} FROM \"{}\"", column_list, table_name);

        self.push_where(&mut sql, &mut args)?;

        if !self.order_by.is_empty() {
            let order = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("\"{}\" {}", column, direction.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }

        if let Some(limit) = self.limit {
            args.add(limit).map_err(SqlxError::Encode)?;
            sql.push_str(&format!(" LIMIT ${}", args.len()));
        }
        if let Some(offset) = self.offset {
            args.add(offset).map_err(SqlxError::Encode)?;
            sql.push_str(&format!(" OFFSET ${}", args.len()));
        }
        if self.for_update {
            sql.push_str(" FOR UPDATE");
        }

        Ok((sql, args))
    }

    pub fn build_count(&self, table_name: &str) -> Result<(String, PgArguments), SqlxError> {
        let mut args = PgArguments::default();
        let mut sql = format!("SELECT COUNT(*) FROM \"{}\"", table_name);
        self.push_where(&mut sql, &mut args)?;
        Ok((sql, args))
    }

    /// Refuses to build an unfiltered delete.
    pub fn build_delete(&self, table_name: &str) -> Result<(String, PgArguments), SqlxError> {
        if self.conditions.is_empty() {
            return Err(SqlxError::Protocol(format!(
                "refusing to delete from \"{}\" without conditions",
                table_name
            )));
        }
        let mut args = PgArguments::default();
        let mut sql = format!("DELETE FROM \"{}\"", table_name);
        self.push_where(&mut sql, &mut args)?;
        Ok((sql, args))
    }
}

/// Trait for finding records based on dynamic filter criteria.
#[async_trait::async_trait]
pub trait SqlxFilterQuery: SqlxSchema + Sized {
    async fn find_by_criteria<'e, E>(
        criteria: QueryCriteria,
        executor: E,
    ) -> Result<Vec<Self>, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send;

    /// Returns the first match, adding LIMIT 1 unless the criteria already limit.
    async fn find_one_by_criteria<'e, E>(
        mut criteria: QueryCriteria,
        executor: E,
    ) -> Result<Option<Self>, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send
    {
        if criteria.limit.is_none() {
            criteria = criteria.limit(1);
        };
        let mut results = Self::find_by_criteria(criteria, executor).await?;
        Ok(results.pop())
    }

    async fn count_by_criteria<'e, E>(
        criteria: QueryCriteria,
        executor: E,
    ) -> Result<i64, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send;

    async fn delete_by_criteria<'e, E>(
        criteria: QueryCriteria,
        executor: E,
    ) -> Result<u64, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[&str] = &["id", "name", "system_id"];

    #[test]
    fn select_without_conditions() {
        let (sql, args) = QueryCriteria::new().build_select("parties", COLUMNS).unwrap();
        assert_eq!(sql, "SELECT \"id\", \"name\", \"system_id\" FROM \"parties\"");
        assert_eq!(args.len(), 0);
    }

    #[test]
    fn select_numbers_placeholders_in_order() {
        let criteria = QueryCriteria::new()
            .add_valued_filter("system_id", "=", Uuid::new_v4())
            .add_filter::<Uuid>("party_id", "IS NULL", None)
            .add_valued_filter("name", "ILIKE", "%dragon%".to_string())
            .order_by("created_at", OrderDirection::Desc)
            .limit(10)
            .offset(20);

        let (sql, args) = criteria.build_select("item_templates", COLUMNS).unwrap();
        assert_eq!(
            sql,
            "SELECT \"id\", \"name\", \"system_id\" FROM \"item_templates\" \
             WHERE \"system_id\" = $1 AND \"party_id\" IS NULL AND \"name\" ILIKE $2 \
             ORDER BY \"created_at\" DESC LIMIT $3 OFFSET $4"
        );
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn by_id_for_update_locks_row() {
        let (sql, args) = QueryCriteria::by_id(Uuid::new_v4())
            .for_update()
            .build_select("inventory_items", &["id", "quantity"])
            .unwrap();
        assert_eq!(
            sql,
            "SELECT \"id\", \"quantity\" FROM \"inventory_items\" WHERE \"id\" = $1 FOR UPDATE"
        );
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn optional_eq_skips_missing_values() {
        let criteria = QueryCriteria::new()
            .add_optional_eq::<Uuid>("system_id", None)
            .add_optional_eq("user_id", Some("user-1".to_string()));
        let (sql, _) = criteria.build_count("player_characters").unwrap();
        assert_eq!(sql, "SELECT COUNT(*) FROM \"player_characters\" WHERE \"user_id\" = $1");
    }

    #[test]
    fn delete_requires_conditions() {
        assert!(QueryCriteria::new().build_delete("systems").is_err());

        let (sql, args) = QueryCriteria::by_id(Uuid::new_v4()).build_delete("systems").unwrap();
        assert_eq!(sql, "DELETE FROM \"systems\" WHERE \"id\" = $1");
        assert_eq!(args.len(), 1);
    }
}
