use sqlx::types::Json;

use crate::entities::{ChangeLog, Inventory, InventoryItem, ItemTemplate, Party, PlayerCharacter, System};
use crate::wire::*;

pub fn system_from_request(req: SystemCreate) -> System {
    System::new(req.name, req.description)
}

pub fn apply_system_update(system: &mut System, patch: SystemUpdate) {
    if let Some(name) = patch.name {
        system.name = name;
    }
    if let Some(description) = patch.description {
        system.description = description;
    }
}

pub fn system_to_response(system: System) -> SystemResponse {
    SystemResponse {
        id: system.id,
        name: system.name,
        description: system.description,
        created_at: system.created_at,
        updated_at: system.updated_at,
    }
}

pub fn party_from_request(req: PartyCreate) -> Party {
    Party::new(req.system_id, req.name, req.description)
}

pub fn apply_party_update(party: &mut Party, patch: PartyUpdate) {
    if let Some(name) = patch.name {
        party.name = name;
    }
    if let Some(description) = patch.description {
        party.description = description;
    }
}

pub fn party_to_response(party: Party) -> PartyResponse {
    PartyResponse {
        id: party.id,
        name: party.name,
        description: party.description,
        system_id: party.system_id,
        created_at: party.created_at,
        updated_at: party.updated_at,
    }
}

pub fn item_template_from_request(req: ItemTemplateCreate) -> ItemTemplate {
    ItemTemplate {
        name: req.name,
        description: req.description,
        weight: req.weight,
        value: req.value,
        rarity: req.rarity,
        item_type: req.item_type,
        tags: req.tags.map(Json),
        system_id: req.system_id,
        party_id: req.party_id,
        ..Default::default()
    }
}

pub fn apply_item_template_update(template: &mut ItemTemplate, patch: ItemTemplateUpdate) {
    if let Some(name) = patch.name {
        template.name = name;
    }
    if let Some(description) = patch.description {
        template.description = description;
    }
    if let Some(weight) = patch.weight {
        template.weight = weight;
    }
    if let Some(value) = patch.value {
        template.value = value;
    }
    if let Some(rarity) = patch.rarity {
        template.rarity = rarity;
    }
    if let Some(item_type) = patch.item_type {
        template.item_type = item_type;
    }
    if let Some(tags) = patch.tags {
        template.tags = tags.map(Json);
    }
    if let Some(party_id) = patch.party_id {
        template.party_id = party_id;
    }
}

pub fn item_template_to_response(template: ItemTemplate) -> ItemTemplateResponse {
    ItemTemplateResponse {
        id: template.id,
        name: template.name,
        description: template.description,
        weight: template.weight,
        value: template.value,
        rarity: template.rarity,
        item_type: template.item_type,
        tags: template.tags.map(|Json(tags)| tags),
        system_id: template.system_id,
        party_id: template.party_id,
        created_at: template.created_at,
        updated_at: template.updated_at,
    }
}

/// The owner comes from the authenticated caller, never from the payload.
pub fn player_character_from_request(user_id: &str, req: PlayerCharacterCreate) -> PlayerCharacter {
    PlayerCharacter {
        user_id: user_id.to_string(),
        name: req.name,
        description: req.description,
        system_id: req.system_id,
        party_id: req.party_id,
        ..Default::default()
    }
}

pub fn apply_player_character_update(character: &mut PlayerCharacter, patch: PlayerCharacterUpdate) {
    if let Some(name) = patch.name {
        character.name = name;
    }
    if let Some(description) = patch.description {
        character.description = description;
    }
    if let Some(party_id) = patch.party_id {
        character.party_id = party_id;
    }
}

pub fn player_character_to_response(character: PlayerCharacter) -> PlayerCharacterResponse {
    PlayerCharacterResponse {
        id: character.id,
        user_id: character.user_id,
        name: character.name,
        description: character.description,
        system_id: character.system_id,
        party_id: character.party_id,
        created_at: character.created_at,
        updated_at: character.updated_at,
    }
}

pub fn inventory_item_to_response(item: InventoryItem) -> InventoryItemResponse {
    InventoryItemResponse {
        id: item.id,
        inventory_id: item.inventory_id,
        item_template_id: item.item_template_id,
        quantity: item.quantity,
        created_at: item.created_at,
        updated_at: item.updated_at,
    }
}

pub fn inventory_to_response(inventory: Inventory, items: Vec<InventoryItem>) -> InventoryResponse {
    InventoryResponse {
        id: inventory.id,
        player_character_id: inventory.player_character_id,
        items: items.into_iter().map(inventory_item_to_response).collect(),
        created_at: inventory.created_at,
        updated_at: inventory.updated_at,
    }
}

pub fn change_log_to_response(log: ChangeLog) -> ChangeLogResponse {
    ChangeLogResponse {
        id: log.id,
        user_id: log.user_id,
        action: log.action,
        description: log.description,
        player_character_id: log.player_character_id,
        inventory_id: log.inventory_id,
        inventory_item_id: log.inventory_item_id,
        created_at: log.created_at,
        updated_at: log.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::types::{BigDecimal, Uuid};
    use std::str::FromStr;

    /// Simulates the store assigning server-side fields.
    fn persist<T>(mut entity: T, set: impl FnOnce(&mut T, Uuid, i64)) -> T {
        set(&mut entity, Uuid::new_v4(), 1_700_000_000);
        entity
    }

    #[test]
    fn system_round_trip_keeps_caller_fields() {
        let req = SystemCreate {
            name: "D&D 5e".into(),
            description: Some("Fifth edition".into()),
        };
        let entity = system_from_request(req.clone());
        assert!(entity.id.is_nil());
        assert_eq!(entity.created_at, 0);

        let saved = persist(entity, |s, id, ts| {
            s.id = id;
            s.created_at = ts;
            s.updated_at = ts;
        });
        let resp = system_to_response(saved.clone());
        assert_eq!(resp.name, req.name);
        assert_eq!(resp.description, req.description);
        assert_eq!(resp.id, saved.id);
        assert!(!resp.id.is_nil());
        assert_eq!(resp.created_at, 1_700_000_000);
    }

    #[test]
    fn item_template_round_trip_keeps_every_business_field() {
        let system_id = Uuid::new_v4();
        let party_id = Uuid::new_v4();
        let req = ItemTemplateCreate {
            name: "Bag of Holding".into(),
            description: Some("Bigger inside".into()),
            weight: Some(BigDecimal::from_str("15.00").unwrap()),
            value: Some(BigDecimal::from_str("4000.50").unwrap()),
            rarity: Some("uncommon".into()),
            item_type: Some("wondrous".into()),
            tags: Some(json!({ "attunement": false, "slots": ["belt"] })),
            system_id,
            party_id: Some(party_id),
        };

        let saved = persist(item_template_from_request(req.clone()), |t, id, ts| {
            t.id = id;
            t.created_at = ts;
            t.updated_at = ts;
        });
        let resp = item_template_to_response(saved);

        assert_eq!(resp.name, req.name);
        assert_eq!(resp.description, req.description);
        assert_eq!(resp.weight, req.weight);
        assert_eq!(resp.value, req.value);
        assert_eq!(resp.rarity, req.rarity);
        assert_eq!(resp.item_type, req.item_type);
        assert_eq!(resp.tags, req.tags);
        assert_eq!(resp.system_id, system_id);
        assert_eq!(resp.party_id, Some(party_id));

        let wire = serde_json::to_value(&resp).unwrap();
        assert_eq!(wire["type"], "wondrous");
        assert!(wire.get("item_type").is_none());
        assert!(wire.get("id").is_some());
        assert!(wire.get("created_at").is_some());
    }

    #[test]
    fn player_character_owner_comes_from_caller() {
        let req = PlayerCharacterCreate {
            name: "Tav".into(),
            description: None,
            system_id: Uuid::new_v4(),
            party_id: None,
        };
        let pc = player_character_from_request("user-123", req.clone());
        assert_eq!(pc.user_id, "user-123");

        let resp = player_character_to_response(pc);
        assert_eq!(resp.user_id, "user-123");
        assert_eq!(resp.name, req.name);
        assert_eq!(resp.system_id, req.system_id);
        assert_eq!(resp.party_id, None);
    }

    #[test]
    fn partial_updates_leave_missing_fields_alone() {
        let mut template = ItemTemplate {
            name: "Rope".into(),
            rarity: Some("common".into()),
            tags: Some(Json(json!(["utility"]))),
            ..Default::default()
        };
        apply_item_template_update(
            &mut template,
            ItemTemplateUpdate {
                name: Some("Silk Rope".into()),
                ..Default::default()
            },
        );
        assert_eq!(template.name, "Silk Rope");
        assert_eq!(template.rarity.as_deref(), Some("common"));
        assert_eq!(template.tags, Some(Json(json!(["utility"]))));

        let mut system = System::new("Pathfinder", None);
        apply_system_update(
            &mut system,
            SystemUpdate {
                name: None,
                description: Some(Some("2e".into())),
            },
        );
        assert_eq!(system.name, "Pathfinder");
        assert_eq!(system.description.as_deref(), Some("2e"));
    }

    #[test]
    fn explicit_null_clears_nullable_fields() {
        let party_id = Uuid::new_v4();
        let mut character = PlayerCharacter {
            name: "Tav".into(),
            description: Some("Bard".into()),
            party_id: Some(party_id),
            ..Default::default()
        };
        apply_player_character_update(&mut character, PlayerCharacterUpdate::default());
        assert_eq!(character.party_id, Some(party_id));
        assert_eq!(character.description.as_deref(), Some("Bard"));

        apply_player_character_update(
            &mut character,
            PlayerCharacterUpdate {
                party_id: Some(None),
                description: Some(None),
                ..Default::default()
            },
        );
        assert_eq!(character.party_id, None);
        assert_eq!(character.description, None);
        assert_eq!(character.name, "Tav");

        let mut template = ItemTemplate {
            name: "Rope".into(),
            weight: Some(BigDecimal::from_str("10.00").unwrap()),
            tags: Some(Json(json!(["utility"]))),
            party_id: Some(party_id),
            ..Default::default()
        };
        apply_item_template_update(
            &mut template,
            ItemTemplateUpdate {
                party_id: Some(None),
                tags: Some(None),
                ..Default::default()
            },
        );
        assert_eq!(template.party_id, None);
        assert_eq!(template.tags, None);
        assert!(template.weight.is_some());
    }

    #[test]
    fn inventory_response_embeds_items() {
        let inventory = Inventory {
            id: Uuid::new_v4(),
            player_character_id: Uuid::new_v4(),
            ..Default::default()
        };
        let item = InventoryItem {
            id: Uuid::new_v4(),
            inventory_id: inventory.id,
            item_template_id: Uuid::new_v4(),
            quantity: 3,
            ..Default::default()
        };
        let resp = inventory_to_response(inventory.clone(), vec![item.clone()]);
        assert_eq!(resp.player_character_id, inventory.player_character_id);
        assert_eq!(resp.items.len(), 1);
        assert_eq!(resp.items[0].quantity, 3);
        assert_eq!(resp.items[0].id, item.id);
    }
}
