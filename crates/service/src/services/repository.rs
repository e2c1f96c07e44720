use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::errors::ServiceError;

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<models::service::Model>, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<models::service::Model>, ServiceError>;
    async fn get_by_external_id(&self, external_id: &str) -> Result<Option<models::service::Model>, ServiceError>;
    /// Insert and return the generated id.
    async fn create(&self, external_id: Option<&str>, name: &str, description: &str) -> Result<i32, ServiceError>;
    /// `false` when no row matched `id`.
    async fn update(&self, id: i32, name: &str, description: &str) -> Result<bool, ServiceError>;
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmServiceRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl ServiceRepository for SeaOrmServiceRepository {
    async fn list(&self) -> Result<Vec<models::service::Model>, ServiceError> {
        Ok(models::service::list(&self.db).await?)
    }

    async fn get(&self, id: i32) -> Result<Option<models::service::Model>, ServiceError> {
        Ok(models::service::find(&self.db, id).await?)
    }

    async fn get_by_external_id(&self, external_id: &str) -> Result<Option<models::service::Model>, ServiceError> {
        Ok(models::service::find_by_external_id(&self.db, external_id).await?)
    }

    async fn create(&self, external_id: Option<&str>, name: &str, description: &str) -> Result<i32, ServiceError> {
        Ok(models::service::create(&self.db, external_id, name, description).await?.id)
    }

    async fn update(&self, id: i32, name: &str, description: &str) -> Result<bool, ServiceError> {
        Ok(models::service::update(&self.db, id, name, description).await?)
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(models::service::delete(&self.db, id).await?)
    }
}

pub mod mock {
    //! In-memory repository for unit and HTTP tests.
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use sea_orm::prelude::DateTimeWithTimeZone;

    use super::ServiceRepository;
    use crate::errors::ServiceError;

    #[derive(Default)]
    pub struct MockServiceRepository {
        rows: Mutex<Vec<models::service::Model>>,
        failing_names: Mutex<HashSet<String>>,
        writes: AtomicUsize,
    }

    impl MockServiceRepository {
        pub fn new() -> Self { Self::default() }

        /// Make every write carrying `name` fail with a database error.
        pub fn fail_on(&self, name: &str) {
            if let Ok(mut names) = self.failing_names.lock() {
                names.insert(name.to_string());
            }
        }

        /// Number of successful inserts, updates and deletes.
        pub fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }

        pub fn rows(&self) -> Vec<models::service::Model> {
            self.rows.lock().map(|r| r.clone()).unwrap_or_default()
        }

        fn rows_guard(&self) -> Result<std::sync::MutexGuard<'_, Vec<models::service::Model>>, ServiceError> {
            self.rows.lock().map_err(|_| ServiceError::Db("mock lock poisoned".into()))
        }

        fn check_failure(&self, name: &str) -> Result<(), ServiceError> {
            let failing = self
                .failing_names
                .lock()
                .map(|names| names.contains(name))
                .unwrap_or(false);
            if failing {
                return Err(ServiceError::Db(format!("simulated failure for {}", name)));
            }
            Ok(())
        }
    }

    fn now() -> DateTimeWithTimeZone { chrono::Utc::now().into() }

    #[async_trait]
    impl ServiceRepository for MockServiceRepository {
        async fn list(&self) -> Result<Vec<models::service::Model>, ServiceError> {
            let mut rows = self.rows_guard()?.clone();
            rows.sort_by(|a, b| b.id.cmp(&a.id));
            Ok(rows)
        }

        async fn get(&self, id: i32) -> Result<Option<models::service::Model>, ServiceError> {
            Ok(self.rows_guard()?.iter().find(|r| r.id == id).cloned())
        }

        async fn get_by_external_id(&self, external_id: &str) -> Result<Option<models::service::Model>, ServiceError> {
            Ok(self
                .rows_guard()?
                .iter()
                .find(|r| r.external_id.as_deref() == Some(external_id))
                .cloned())
        }

        async fn create(&self, external_id: Option<&str>, name: &str, description: &str) -> Result<i32, ServiceError> {
            self.check_failure(name)?;
            let mut rows = self.rows_guard()?;
            if let Some(ext) = external_id {
                if rows.iter().any(|r| r.external_id.as_deref() == Some(ext)) {
                    return Err(ServiceError::Db(format!("duplicate external_id {}", ext)));
                }
            }
            let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            let ts = now();
            rows.push(models::service::Model {
                id,
                external_id: external_id.map(str::to_string),
                name: name.to_string(),
                description: description.to_string(),
                created_at: ts,
                updated_at: ts,
            });
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(id)
        }

        async fn update(&self, id: i32, name: &str, description: &str) -> Result<bool, ServiceError> {
            self.check_failure(name)?;
            let mut rows = self.rows_guard()?;
            match rows.iter_mut().find(|r| r.id == id) {
                Some(row) => {
                    row.name = name.to_string();
                    row.description = description.to_string();
                    row.updated_at = now();
                    self.writes.fetch_add(1, Ordering::SeqCst);
                    Ok(true)
                }
                None => Ok(false),
            }
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
