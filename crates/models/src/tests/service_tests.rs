use super::{db_tests_enabled, setup_test_db, unique};
use crate::service;
use anyhow::Result;

#[tokio::test]
async fn test_service_crud() -> Result<()> {
    if !db_tests_enabled() {
        return Ok(());
    }
    let db = setup_test_db().await?;

    let name = unique("svc");
    let created = service::create(&db, None, &name, "Web development").await?;
    assert_eq!(created.name, name);
    assert!(created.external_id.is_none());

    let found = service::find(&db, created.id).await?.expect("created row");
    assert_eq!(found.description, "Web development");

    assert!(service::update(&db, created.id, "Renamed", "New description").await?);
    let found = service::find(&db, created.id).await?.expect("updated row");
    assert_eq!(found.name, "Renamed");

    // PostgreSQL counts matched rows, so rewriting identical content still reports a hit.
    assert!(service::update(&db, created.id, "Renamed", "New description").await?);

    let all = service::list(&db).await?;
    assert!(all.iter().any(|s| s.id == created.id));
    assert!(all.windows(2).all(|w| w[0].id > w[1].id), "newest first");

    assert!(service::delete(&db, created.id).await?);
    assert!(!service::delete(&db, created.id).await?);
    assert!(service::find(&db, created.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_update_missing_row_reports_no_match() -> Result<()> {
    if !db_tests_enabled() {
        return Ok(());
    }
    let db = setup_test_db().await?;
    assert!(!service::update(&db, i32::MAX, "x", "y").await?);
    Ok(())
}

#[tokio::test]
async fn test_find_by_external_id_and_uniqueness() -> Result<()> {
    if !db_tests_enabled() {
        return Ok(());
    }
    let db = setup_test_db().await?;

    let ext = unique("ext");
    let created = service::create(&db, Some(&ext), "Consulting", "desc").await?;
    let found = service::find_by_external_id(&db, &ext).await?.expect("by external id");
    assert_eq!(found.id, created.id);

    // The unique index rejects a second row with the same external id.
    assert!(service::create(&db, Some(&ext), "Dup", "desc").await.is_err());

    service::delete(&db, created.id).await?;
    Ok(())
}
