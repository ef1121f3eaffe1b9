use std::marker::PhantomData;

use sqlx::types::Uuid;
use sqlx::PgConnection;
use tabletop_database::{OrderDirection, QueryCriteria, SqlxCrud, SqlxFilterQuery, SqlxSchema};

use crate::entities::{ChangeLog, Inventory, InventoryItem, ItemTemplate, Party, PlayerCharacter, System};
use crate::error::{Result, TabletopError};

/// Human-readable entity name used in `NotFound` errors.
pub trait EntityName {
    const ENTITY: &'static str;
}

macro_rules! entity_names {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(impl EntityName for $ty { const ENTITY: &'static str = $name; })*
    };
}

entity_names! {
    System => "System",
    Party => "Party",
    ItemTemplate => "ItemTemplate",
    PlayerCharacter => "PlayerCharacter",
    Inventory => "Inventory",
    InventoryItem => "InventoryItem",
    ChangeLog => "ChangeLog",
}

/// CRUD over any `SqlxObject` entity.
///
/// Every call takes the caller's connection, so a service can run several
/// calls inside one transaction by passing `&mut *tx`.
pub struct Repository<T>(PhantomData<T>);

impl<T> Repository<T>
where
    T: SqlxCrud + SqlxFilterQuery + SqlxSchema<Id = Uuid> + EntityName + Send + Sync + 'static,
{
    pub async fn create(conn: &mut PgConnection, entity: T) -> Result<T> {
        Ok(entity.create(&mut *conn).await?)
    }

    pub async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<T>> {
        Ok(T::find_one_by_criteria(QueryCriteria::by_id(id), &mut *conn).await?)
    }

    pub async fn get(conn: &mut PgConnection, id: Uuid) -> Result<T> {
        Self::find(conn, id)
            .await?
            .ok_or_else(|| TabletopError::not_found(T::ENTITY, id))
    }

    /// Locks the row, applies `apply` and writes the result back.
    pub async fn update<F>(conn: &mut PgConnection, id: Uuid, apply: F) -> Result<T>
    where
        F: FnOnce(&mut T) + Send,
    {
        let mut entity = Self::get_for_update(conn, id).await?;
        apply(&mut entity);
        Self::save(conn, entity).await
    }

    /// Writes back an entity previously read with `get_for_update`.
    pub async fn save(conn: &mut PgConnection, entity: T) -> Result<T> {
        let id = entity.get_id_value();
        entity.update(&mut *conn).await.map_err(|e| match e {
            sqlx::Error::RowNotFound => TabletopError::not_found(T::ENTITY, id),
            other => other.into(),
        })
    }

    /// Fetches the row with `FOR UPDATE`; the lock lasts until the transaction ends.
    pub async fn get_for_update(conn: &mut PgConnection, id: Uuid) -> Result<T> {
        T::find_one_by_criteria(QueryCriteria::by_id(id).for_update(), &mut *conn)
            .await?
            .ok_or_else(|| TabletopError::not_found(T::ENTITY, id))
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<()> {
        let removed = T::delete_by_criteria(QueryCriteria::by_id(id), &mut *conn).await?;
        if removed == 0 {
            return Err(TabletopError::not_found(T::ENTITY, id));
        }
        Ok(())
    }

    pub async fn list(conn: &mut PgConnection, criteria: QueryCriteria) -> Result<Vec<T>> {
        Ok(T::find_by_criteria(criteria, &mut *conn).await?)
    }

    pub async fn find_one(conn: &mut PgConnection, criteria: QueryCriteria) -> Result<Option<T>> {
        Ok(T::find_one_by_criteria(criteria, &mut *conn).await?)
    }

    pub async fn count(conn: &mut PgConnection, criteria: QueryCriteria) -> Result<i64> {
        Ok(T::count_by_criteria(criteria, &mut *conn).await?)
    }
}

/// Escapes LIKE metacharacters so a fragment matches literally.
pub fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl Repository<System> {
    /// Exact, case-sensitive name lookup.
    pub async fn find_by_name(conn: &mut PgConnection, name: &str) -> Result<Option<System>> {
        let criteria = QueryCriteria::new().add_valued_filter("name", "=", name.to_string());
        Self::find_one(conn, criteria).await
    }

    /// Case-insensitive substring search, ordered by name.
    pub async fn search_by_name(conn: &mut PgConnection, fragment: &str) -> Result<Vec<System>> {
        let criteria = QueryCriteria::new()
            .add_valued_filter("name", "ILIKE", like_pattern(fragment))
            .order_by("name", OrderDirection::Asc);
        Self::list(conn, criteria).await
    }
}

impl Repository<Inventory> {
    pub async fn find_by_character(
        conn: &mut PgConnection,
        player_character_id: Uuid,
    ) -> Result<Option<Inventory>> {
        let criteria = QueryCriteria::new()
            .add_valued_filter("player_character_id", "=", player_character_id);
        Self::find_one(conn, criteria).await
    }
}

impl Repository<InventoryItem> {
    /// Inserts the (inventory, template) stack or adds `quantity` to the
    /// existing one in a single statement.
    pub async fn upsert_quantity(
        conn: &mut PgConnection,
        inventory_id: Uuid,
        item_template_id: Uuid,
        quantity: i32,
    ) -> Result<InventoryItem> {
        let columns = InventoryItem::COLUMNS
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO \"{table}\" (\"inventory_id\", \"item_template_id\", \"quantity\") VALUES ($1, $2, $3) \
             ON CONFLICT (\"inventory_id\", \"item_template_id\") \
             DO UPDATE SET \"quantity\" = \"{table}\".\"quantity\" + EXCLUDED.\"quantity\" \
             RETURNING {columns}",
            table = InventoryItem::TABLE_NAME,
            columns = columns
        );

        let row = sqlx::query_as::<_, <InventoryItem as SqlxSchema>::Row>(&sql)
            .bind(inventory_id)
            .bind(item_template_id)
            .bind(quantity)
            .fetch_one(&mut *conn)
            .await?;
        Ok(InventoryItem::from_row(row))
    }

    pub async fn list_for_inventory(conn: &mut PgConnection, inventory_id: Uuid) -> Result<Vec<InventoryItem>> {
        let criteria = QueryCriteria::new()
            .add_valued_filter("inventory_id", "=", inventory_id)
            .order_by("created_at", OrderDirection::Asc);
        Self::list(conn, criteria).await
    }

    /// First stack whose template is scoped to a party its holder is not in,
    /// narrowed to one character and/or one template.
    pub async fn find_out_of_party(
        conn: &mut PgConnection,
        player_character_id: Option<Uuid>,
        item_template_id: Option<Uuid>,
    ) -> Result<Option<Uuid>> {
        let sql = format!(
            "SELECT ii.\"id\" FROM \"{items}\" ii \
             JOIN \"{inventories}\" inv ON inv.\"id\" = ii.\"inventory_id\" \
             JOIN \"{characters}\" pc ON pc.\"id\" = inv.\"player_character_id\" \
             JOIN \"{templates}\" t ON t.\"id\" = ii.\"item_template_id\" \
             WHERE t.\"party_id\" IS NOT NULL \
             AND t.\"party_id\" IS DISTINCT FROM pc.\"party_id\" \
             AND ($1::uuid IS NULL OR pc.\"id\" = $1) \
             AND ($2::uuid IS NULL OR t.\"id\" = $2) \
             LIMIT 1",
            items = InventoryItem::TABLE_NAME,
            inventories = Inventory::TABLE_NAME,
            characters = PlayerCharacter::TABLE_NAME,
            templates = ItemTemplate::TABLE_NAME,
        );

        let id = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(player_character_id)
            .bind(item_template_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(id)
    }
}
