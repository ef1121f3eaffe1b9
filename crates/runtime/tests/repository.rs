mod common;

use sqlx::types::Uuid;
use tabletop_database::QueryCriteria;
use tabletop_runtime::{
    AuditRecorder, ChangeAction, ChangeEntry, ChangeLog, Inventory, InventoryItem, ItemTemplate, Party,
    PlayerCharacter, Repository, System, TabletopError,
};

use common::unique;

async fn seed_character(
    conn: &mut sqlx::PgConnection,
    system_id: Uuid,
    party_id: Option<Uuid>,
) -> anyhow::Result<(PlayerCharacter, Inventory)> {
    let character = Repository::<PlayerCharacter>::create(
        conn,
        PlayerCharacter {
            user_id: "user-repo".into(),
            name: "Shadowheart".into(),
            system_id,
            party_id,
            ..Default::default()
        },
    )
    .await?;
    let inventory = Repository::<Inventory>::create(conn, Inventory::for_character(character.id)).await?;
    Ok((character, inventory))
}

#[tokio::test]
async fn test_system_crud_round_trip() -> anyhow::Result<()> {
    let pool = require_db!();
    let mut tx = pool.begin().await?;

    let name = unique("Crud System");
    let created = Repository::<System>::create(&mut tx, System::new(name.clone(), Some("first".into()))).await?;
    assert!(!created.id.is_nil(), "id should be generated by the store");
    assert!(created.created_at > 0);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = Repository::<System>::get(&mut tx, created.id).await?;
    assert_eq!(fetched, created);

    let updated = Repository::<System>::update(&mut tx, created.id, |s| s.description = Some("second".into())).await?;
    assert_eq!(updated.description.as_deref(), Some("second"));
    assert_eq!(updated.name, name);
    assert_eq!(updated.created_at, created.created_at);

    Repository::<System>::delete(&mut tx, created.id).await?;
    assert!(Repository::<System>::find(&mut tx, created.id).await?.is_none());
    assert!(matches!(
        Repository::<System>::get(&mut tx, created.id).await,
        Err(TabletopError::NotFound { entity: "System", .. })
    ));
    assert!(Repository::<System>::delete(&mut tx, created.id).await.unwrap_err().is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_update_missing_row_is_not_found() -> anyhow::Result<()> {
    let pool = require_db!();
    let mut tx = pool.begin().await?;

    let result = Repository::<Party>::update(&mut tx, Uuid::new_v4(), |p| p.name = "ghost".into()).await;
    assert!(result.unwrap_err().is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_system_name_uniqueness_is_case_sensitive() -> anyhow::Result<()> {
    let pool = require_db!();
    let mut tx = pool.begin().await?;

    let base = unique("Dungeon World");
    Repository::<System>::create(&mut tx, System::new(base.clone(), None)).await?;
    Repository::<System>::create(&mut tx, System::new(base.to_lowercase(), None)).await?;

    let exact = Repository::<System>::find_by_name(&mut tx, &base).await?;
    assert_eq!(exact.map(|s| s.name), Some(base.clone()));

    let found = Repository::<System>::search_by_name(&mut tx, &base.to_uppercase()).await?;
    assert_eq!(found.len(), 2, "ILIKE search should match both spellings");

    // Leaves the transaction aborted, so it runs last.
    let duplicate = Repository::<System>::create(&mut tx, System::new(base, None)).await;
    assert!(matches!(duplicate, Err(TabletopError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn test_dangling_reference_is_invalid_reference() -> anyhow::Result<()> {
    let pool = require_db!();
    let mut tx = pool.begin().await?;

    let result = Repository::<Party>::create(&mut tx, Party::new(Uuid::new_v4(), "Orphans", None)).await;
    assert!(matches!(result, Err(TabletopError::InvalidReference(_))));
    Ok(())
}

#[tokio::test]
async fn test_fetch_helpers_follow_foreign_keys() -> anyhow::Result<()> {
    let pool = require_db!();
    let mut tx = pool.begin().await?;

    let system = Repository::<System>::create(&mut tx, System::new(unique("Fetch"), None)).await?;
    let party = Repository::<Party>::create(&mut tx, Party::new(system.id, "Company", None)).await?;
    let (character, inventory) = seed_character(&mut tx, system.id, Some(party.id)).await?;

    assert_eq!(party.fetch_system(&mut *tx).await?, Some(system.clone()));
    assert_eq!(character.fetch_party(&mut *tx).await?.map(|p| p.id), Some(party.id));
    assert_eq!(inventory.fetch_player_character(&mut *tx).await?.map(|c| c.id), Some(character.id));

    let solo = PlayerCharacter { party_id: None, ..character };
    assert!(solo.fetch_party(&mut *tx).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_one_inventory_per_character() -> anyhow::Result<()> {
    let pool = require_db!();
    let mut tx = pool.begin().await?;

    let system = Repository::<System>::create(&mut tx, System::new(unique("OneToOne"), None)).await?;
    let (character, inventory) = seed_character(&mut tx, system.id, None).await?;

    let owned = Repository::<Inventory>::find_by_character(&mut tx, character.id).await?;
    assert_eq!(owned.map(|i| i.id), Some(inventory.id));

    let second = Repository::<Inventory>::create(&mut tx, Inventory::for_character(character.id)).await;
    assert!(matches!(second, Err(TabletopError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn test_upsert_stacks_quantity_and_check_rejects_negative() -> anyhow::Result<()> {
    let pool = require_db!();
    let mut tx = pool.begin().await?;

    let system = Repository::<System>::create(&mut tx, System::new(unique("Stacks"), None)).await?;
    let (_, inventory) = seed_character(&mut tx, system.id, None).await?;
    let torch = Repository::<ItemTemplate>::create(
        &mut tx,
        ItemTemplate {
            name: "Torch".into(),
            system_id: system.id,
            ..Default::default()
        },
    )
    .await?;

    let first = Repository::<InventoryItem>::upsert_quantity(&mut tx, inventory.id, torch.id, 3).await?;
    let second = Repository::<InventoryItem>::upsert_quantity(&mut tx, inventory.id, torch.id, 2).await?;
    assert_eq!(first.id, second.id, "same (inventory, template) pair must reuse the row");
    assert_eq!(second.quantity, 5);

    let rows = Repository::<InventoryItem>::count(
        &mut tx,
        QueryCriteria::new().add_valued_filter("inventory_id", "=", inventory.id),
    )
    .await?;
    assert_eq!(rows, 1);

    let negative = Repository::<InventoryItem>::update(&mut tx, first.id, |i| i.quantity = -1).await;
    assert!(matches!(negative, Err(TabletopError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn test_audit_rejects_missing_actor() -> anyhow::Result<()> {
    let pool = require_db!();
    let mut tx = pool.begin().await?;

    let result = AuditRecorder::record(&mut tx, ChangeEntry::new("", ChangeAction::AddItem)).await;
    assert!(matches!(result, Err(TabletopError::Validation(_))));

    let log = AuditRecorder::record(&mut tx, ChangeEntry::new("user-audit", "NOTE")).await?;
    assert_eq!(log.action, "NOTE");
    assert!(log.description.is_none());
    Ok(())
}

#[tokio::test]
async fn test_system_delete_cascades_through_the_graph() -> anyhow::Result<()> {
    let pool = require_db!();
    let mut tx = pool.begin().await?;

    let system = Repository::<System>::create(&mut tx, System::new(unique("Cascade"), None)).await?;
    let party = Repository::<Party>::create(&mut tx, Party::new(system.id, "Fellowship", None)).await?;
    let template = Repository::<ItemTemplate>::create(
        &mut tx,
        ItemTemplate {
            name: "Lembas".into(),
            system_id: system.id,
            party_id: Some(party.id),
            ..Default::default()
        },
    )
    .await?;
    let (character, inventory) = seed_character(&mut tx, system.id, Some(party.id)).await?;
    let item = Repository::<InventoryItem>::upsert_quantity(&mut tx, inventory.id, template.id, 4).await?;
    let log = AuditRecorder::record(
        &mut tx,
        ChangeEntry::new("user-repo", ChangeAction::AddItem)
            .character(character.id)
            .inventory(inventory.id)
            .item(item.id),
    )
    .await?;

    Repository::<System>::delete(&mut tx, system.id).await?;

    assert!(Repository::<Party>::find(&mut tx, party.id).await?.is_none());
    assert!(Repository::<ItemTemplate>::find(&mut tx, template.id).await?.is_none());
    assert!(Repository::<PlayerCharacter>::find(&mut tx, character.id).await?.is_none());
    assert!(Repository::<Inventory>::find(&mut tx, inventory.id).await?.is_none());
    assert!(Repository::<InventoryItem>::find(&mut tx, item.id).await?.is_none());
    assert!(Repository::<ChangeLog>::find(&mut tx, log.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_change_log_keeps_row_when_inventory_goes() -> anyhow::Result<()> {
    let pool = require_db!();
    let mut tx = pool.begin().await?;

    let system = Repository::<System>::create(&mut tx, System::new(unique("SetNull"), None)).await?;
    let (character, inventory) = seed_character(&mut tx, system.id, None).await?;
    let log = AuditRecorder::record(
        &mut tx,
        ChangeEntry::new("user-repo", ChangeAction::RemoveItem)
            .character(character.id)
            .inventory(inventory.id),
    )
    .await?;

    Repository::<Inventory>::delete(&mut tx, inventory.id).await?;

    let kept = Repository::<ChangeLog>::get(&mut tx, log.id).await?;
    assert_eq!(kept.inventory_id, None);
    assert_eq!(kept.player_character_id, Some(character.id));
    Ok(())
}
