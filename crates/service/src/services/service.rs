use std::sync::Arc;

use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::services::repository::ServiceRepository;

/// Application service for the `services` resource.
/// Thin layer between HTTP controllers and the repository.
pub struct ServiceService<R: ServiceRepository> {
    repo: Arc<R>,
}

impl<R: ServiceRepository> ServiceService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    pub async fn list(&self) -> Result<Vec<models::service::Model>, ServiceError> { self.repo.list().await }

    pub async fn get(&self, id: i32) -> Result<Option<models::service::Model>, ServiceError> { self.repo.get(id).await }

    #[instrument(skip(self, description))]
    pub async fn create(&self, name: &str, description: &str) -> Result<i32, ServiceError> {
        let id = self.repo.create(None, name, description).await?;
        info!(service_id = id, "service_created");
        Ok(id)
    }

    pub async fn update(&self, id: i32, name: &str, description: &str) -> Result<bool, ServiceError> {
        self.repo.update(id, name, description).await
    }

    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> { self.repo.delete(id).await }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::repository::mock::MockServiceRepository;

    #[tokio::test]
    async fn create_then_list_newest_first() {
        let svc = ServiceService::new(Arc::new(MockServiceRepository::new()));
        let a = svc.create("Consultoría", "Asesoría TI").await.unwrap();
        let b = svc.create("Desarrollo", "Software a medida").await.unwrap();
        let ids: Vec<i32> = svc.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repo = Arc::new(MockServiceRepository::new());
        let svc = ServiceService::new(repo.clone());
        assert!(!svc.update(999, "x", "y").await.unwrap());
        assert!(!svc.delete(999).await.unwrap());
        assert_eq!(repo.writes(), 0);

        let id = svc.create("A", "B").await.unwrap();
        assert!(svc.update(id, "A2", "B2").await.unwrap());
        assert_eq!(svc.get(id).await.unwrap().unwrap().name, "A2");
        assert!(svc.delete(id).await.unwrap());
        assert!(svc.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn api_created_services_have_no_external_id() {
        let svc = ServiceService::new(Arc::new(MockServiceRepository::new()));
        let id = svc.create("A", "B").await.unwrap();
        assert!(svc.get(id).await.unwrap().unwrap().external_id.is_none());
    }
}
