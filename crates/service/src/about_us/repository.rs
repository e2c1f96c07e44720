use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::errors::ServiceError;

#[async_trait]
pub trait AboutUsRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<models::about_us::Model>, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<models::about_us::Model>, ServiceError>;
    async fn list_by_type(&self, kind: &str) -> Result<Vec<models::about_us::Model>, ServiceError>;
    /// Oldest row carrying exactly `title`.
    async fn get_by_title(&self, title: &str) -> Result<Option<models::about_us::Model>, ServiceError>;
    async fn create(&self, title: &str, description: &str, kind: &str) -> Result<i32, ServiceError>;
    async fn update(&self, id: i32, title: &str, description: &str, kind: &str) -> Result<bool, ServiceError>;
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmAboutUsRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl AboutUsRepository for SeaOrmAboutUsRepository {
    async fn list(&self) -> Result<Vec<models::about_us::Model>, ServiceError> {
        Ok(models::about_us::list(&self.db).await?)
    }

    async fn get(&self, id: i32) -> Result<Option<models::about_us::Model>, ServiceError> {
        Ok(models::about_us::find(&self.db, id).await?)
    }

    async fn list_by_type(&self, kind: &str) -> Result<Vec<models::about_us::Model>, ServiceError> {
        Ok(models::about_us::find_by_kind(&self.db, kind).await?)
    }

    async fn get_by_title(&self, title: &str) -> Result<Option<models::about_us::Model>, ServiceError> {
        Ok(models::about_us::find_by_title(&self.db, title).await?)
    }

    async fn create(&self, title: &str, description: &str, kind: &str) -> Result<i32, ServiceError> {
        Ok(models::about_us::create(&self.db, title, description, kind).await?.id)
    }

    async fn update(&self, id: i32, title: &str, description: &str, kind: &str) -> Result<bool, ServiceError> {
        Ok(models::about_us::update(&self.db, id, title, description, kind).await?)
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(models::about_us::delete(&self.db, id).await?)
    }
}

pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};

    use async_trait::async_trait;

    use super::AboutUsRepository;
    use crate::errors::ServiceError;

    #[derive(Default)]
    pub struct MockAboutUsRepository {
        rows: Mutex<Vec<models::about_us::Model>>,
        writes: AtomicUsize,
    }

    impl MockAboutUsRepository {
        pub fn new() -> Self { Self::default() }

        pub fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }

        pub fn rows(&self) -> Vec<models::about_us::Model> {
            self.rows.lock().map(|r| r.clone()).unwrap_or_default()
        }

        fn rows_guard(&self) -> Result<MutexGuard<'_, Vec<models::about_us::Model>>, ServiceError> {
            self.rows.lock().map_err(|_| ServiceError::Db("mock lock poisoned".into()))
        }
    }

    #[async_trait]
    impl AboutUsRepository for MockAboutUsRepository {
        async fn list(&self) -> Result<Vec<models::about_us::Model>, ServiceError> {
            let mut rows = self.rows_guard()?.clone();
            rows.sort_by_key(|r| r.id);
            Ok(rows)
        }

        async fn get(&self, id: i32) -> Result<Option<models::about_us::Model>, ServiceError> {
            Ok(self.rows_guard()?.iter().find(|r| r.id == id).cloned())
        }

        async fn list_by_type(&self, kind: &str) -> Result<Vec<models::about_us::Model>, ServiceError> {
            let mut rows: Vec<_> = self.rows_guard()?.iter().filter(|r| r.kind == kind).cloned().collect();
            rows.sort_by_key(|r| r.id);
            Ok(rows)
        }

        async fn get_by_title(&self, title: &str) -> Result<Option<models::about_us::Model>, ServiceError> {
            Ok(self
                .rows_guard()?
                .iter()
                .filter(|r| r.title == title)
                .min_by_key(|r| r.id)
                .cloned())
        }

        async fn create(&self, title: &str, description: &str, kind: &str) -> Result<i32, ServiceError> {
            let mut rows = self.rows_guard()?;
            let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            let ts: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
            rows.push(models::about_us::Model {
                id,
                title: title.to_string(),
                description: description.to_string(),
                kind: kind.to_string(),
                created_at: ts,
                updated_at: ts,
            });
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(id)
        }

        async fn update(&self, id: i32, title: &str, description: &str, kind: &str) -> Result<bool, ServiceError> {
            let mut rows = self.rows_guard()?;
            let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
                return Ok(false);
            };
            row.title = title.to_string();
            row.description = description.to_string();
            row.kind = kind.to_string();
            row.updated_at = chrono::Utc::now().into();
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            let mut rows = self.rows_guard()?;
            let before = rows.len();
            rows.retain(|r| r.id != id);
            let removed = rows.len() < before;
            if removed {
                self.writes.fetch_add(1, Ordering::SeqCst);
            }
            Ok(removed)
        }
    }
}
