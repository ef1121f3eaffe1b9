//! Request and response shapes exchanged with HTTP clients.
//!
//! Requests never carry ids or timestamps; responses always do.

use serde::{Deserialize, Serialize};
use sqlx::types::{BigDecimal, Uuid};

use crate::error::{Result, TabletopError};

fn require_name(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TabletopError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn optional_name(field: &'static str, value: &Option<String>) -> Result<()> {
    match value {
        Some(v) => require_name(field, v),
        None => Ok(()),
    }
}

/// Patch fields for nullable columns: a missing key is `None`, an explicit
/// `null` is `Some(None)`.
mod nullable {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

// --- System ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl SystemCreate {
    pub fn validate(&self) -> Result<()> {
        require_name("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SystemUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable::deserialize", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl SystemUpdate {
    pub fn validate(&self) -> Result<()> {
        optional_name("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemQuery {
    /// Case-insensitive name fragment.
    pub name: Option<String>,
}

// --- Party ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartyCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub system_id: Uuid,
}

impl PartyCreate {
    pub fn validate(&self) -> Result<()> {
        require_name("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PartyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable::deserialize", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl PartyUpdate {
    pub fn validate(&self) -> Result<()> {
        optional_name("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartyResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub system_id: Uuid,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartyQuery {
    pub system_id: Option<Uuid>,
}

// --- ItemTemplate ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemTemplateCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub weight: Option<BigDecimal>,
    #[serde(default)]
    pub value: Option<BigDecimal>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub tags: Option<serde_json::Value>,
    pub system_id: Uuid,
    #[serde(default)]
    pub party_id: Option<Uuid>,
}

impl ItemTemplateCreate {
    pub fn validate(&self) -> Result<()> {
        require_name("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemTemplateUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable::deserialize", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable::deserialize", skip_serializing_if = "Option::is_none")]
    pub weight: Option<Option<BigDecimal>>,
    #[serde(default, deserialize_with = "nullable::deserialize", skip_serializing_if = "Option::is_none")]
    pub value: Option<Option<BigDecimal>>,
    #[serde(default, deserialize_with = "nullable::deserialize", skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Option<String>>,
    #[serde(default, rename = "type", deserialize_with = "nullable::deserialize", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable::deserialize", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "nullable::deserialize", skip_serializing_if = "Option::is_none")]
    pub party_id: Option<Option<Uuid>>,
}

impl ItemTemplateUpdate {
    pub fn validate(&self) -> Result<()> {
        optional_name("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemTemplateResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub weight: Option<BigDecimal>,
    pub value: Option<BigDecimal>,
    pub rarity: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub tags: Option<serde_json::Value>,
    pub system_id: Uuid,
    pub party_id: Option<Uuid>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemTemplateQuery {
    pub system_id: Option<Uuid>,
    pub party_id: Option<Uuid>,
}

// --- PlayerCharacter ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerCharacterCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub system_id: Uuid,
    #[serde(default)]
    pub party_id: Option<Uuid>,
}

impl PlayerCharacterCreate {
    pub fn validate(&self) -> Result<()> {
        require_name("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerCharacterUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable::deserialize", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable::deserialize", skip_serializing_if = "Option::is_none")]
    pub party_id: Option<Option<Uuid>>,
}

impl PlayerCharacterUpdate {
    pub fn validate(&self) -> Result<()> {
        optional_name("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerCharacterResponse {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub system_id: Uuid,
    pub party_id: Option<Uuid>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A freshly created character together with its empty inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatedPlayerCharacter {
    #[serde(flatten)]
    pub character: PlayerCharacterResponse,
    pub inventory: InventoryResponse,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerCharacterQuery {
    pub user_id: Option<String>,
    pub system_id: Option<Uuid>,
    pub party_id: Option<Uuid>,
}

// --- Inventory ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItemResponse {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub item_template_id: Uuid,
    pub quantity: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryResponse {
    pub id: Uuid,
    pub player_character_id: Uuid,
    #[serde(default)]
    pub items: Vec<InventoryItemResponse>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddItemRequest {
    pub item_template_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

impl AddItemRequest {
    pub fn validate(&self) -> Result<()> {
        if self.quantity <= 0 {
            return Err(TabletopError::validation("quantity must be positive"));
        }
        Ok(())
    }
}

/// Either a relative change or an absolute quantity for an inventory item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum QuantityChange {
    Delta { delta: i32 },
    Set { quantity: i32 },
}

/// Result of an inventory mutation: the surviving item (absent once removed)
/// and the audit row written for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItemChange {
    pub action: String,
    pub item: Option<InventoryItemResponse>,
    pub change_log: ChangeLogResponse,
}

// --- ChangeLog ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeLogResponse {
    pub id: Uuid,
    pub user_id: String,
    pub action: String,
    pub description: Option<String>,
    pub player_character_id: Option<Uuid>,
    pub inventory_id: Option<Uuid>,
    pub inventory_item_id: Option<Uuid>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeLogQuery {
    pub user_id: Option<String>,
    pub player_character_id: Option<Uuid>,
    pub inventory_id: Option<Uuid>,
    pub inventory_item_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_template_uses_type_on_the_wire() {
        let req: ItemTemplateCreate = serde_json::from_value(json!({
            "name": "Longsword",
            "type": "weapon",
            "weight": "3.00",
            "system_id": Uuid::nil(),
        }))
        .unwrap();
        assert_eq!(req.item_type.as_deref(), Some("weapon"));
        assert!(req.party_id.is_none());
        assert!(req.tags.is_none());
    }

    #[test]
    fn quantity_change_accepts_delta_or_absolute() {
        let delta: QuantityChange = serde_json::from_value(json!({ "delta": -2 })).unwrap();
        assert_eq!(delta, QuantityChange::Delta { delta: -2 });

        let set: QuantityChange = serde_json::from_value(json!({ "quantity": 5 })).unwrap();
        assert_eq!(set, QuantityChange::Set { quantity: 5 });

        assert!(serde_json::from_value::<QuantityChange>(json!({ "amount": 5 })).is_err());
    }

    #[test]
    fn add_item_defaults_to_one() {
        let req: AddItemRequest =
            serde_json::from_value(json!({ "item_template_id": Uuid::nil() })).unwrap();
        assert_eq!(req.quantity, 1);
        assert!(req.validate().is_ok());

        let zero = AddItemRequest { quantity: 0, ..req };
        assert!(matches!(zero.validate(), Err(TabletopError::Validation(_))));
    }

    #[test]
    fn blank_names_are_rejected() {
        let req = SystemCreate { name: "   ".into(), description: None };
        assert!(matches!(req.validate(), Err(TabletopError::Validation(_))));

        let update = PartyUpdate { name: Some(String::new()), description: None };
        assert!(update.validate().is_err());
        assert!(PartyUpdate::default().validate().is_ok());
    }

    #[test]
    fn update_distinguishes_null_from_missing() {
        let cleared: PlayerCharacterUpdate =
            serde_json::from_value(json!({ "party_id": null, "description": null })).unwrap();
        assert_eq!(cleared.party_id, Some(None));
        assert_eq!(cleared.description, Some(None));
        assert_eq!(cleared.name, None);

        let untouched: PlayerCharacterUpdate = serde_json::from_value(json!({ "name": "Tav" })).unwrap();
        assert_eq!(untouched.party_id, None);
        assert_eq!(untouched.description, None);

        let party = Uuid::new_v4();
        let moved: ItemTemplateUpdate =
            serde_json::from_value(json!({ "party_id": party, "type": null })).unwrap();
        assert_eq!(moved.party_id, Some(Some(party)));
        assert_eq!(moved.item_type, Some(None));
        assert_eq!(moved.weight, None);
    }
}
