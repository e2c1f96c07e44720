use std::sync::Arc;

use models::about_us::AboutUsKind;
use tracing::{info, instrument};

use crate::about_us::repository::AboutUsRepository;
use crate::errors::ServiceError;

pub struct AboutUsService<R: AboutUsRepository> {
    repo: Arc<R>,
}

impl<R: AboutUsRepository> AboutUsService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    pub async fn list(&self) -> Result<Vec<models::about_us::Model>, ServiceError> { self.repo.list().await }

    pub async fn get(&self, id: i32) -> Result<Option<models::about_us::Model>, ServiceError> { self.repo.get(id).await }

    pub async fn list_by_type(&self, kind: &AboutUsKind) -> Result<Vec<models::about_us::Model>, ServiceError> {
        self.repo.list_by_type(kind.as_str()).await
    }

    #[instrument(skip(self, description), fields(kind = %kind))]
    pub async fn create(&self, title: &str, description: &str, kind: &AboutUsKind) -> Result<i32, ServiceError> {
        let id = self.repo.create(title, description, kind.as_str()).await?;
        info!(about_us_id = id, "about_us_created");
        Ok(id)
    }

    pub async fn update(&self, id: i32, title: &str, description: &str, kind: &AboutUsKind) -> Result<bool, ServiceError> {
        self.repo.update(id, title, description, kind.as_str()).await
    }

    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> { self.repo.delete(id).await }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::about_us::repository::mock::MockAboutUsRepository;

    #[tokio::test]
    async fn list_by_type_filters_exact_label() {
        let svc = AboutUsService::new(Arc::new(MockAboutUsRepository::new()));
        svc.create("Misión", "m", &AboutUsKind::Mission).await.unwrap();
        svc.create("Visión", "v", &AboutUsKind::Vision).await.unwrap();
        svc.create("Historia", "h", &AboutUsKind::General).await.unwrap();

        let vision = svc.list_by_type(&AboutUsKind::Vision).await.unwrap();
        assert_eq!(vision.len(), 1);
        assert_eq!(vision[0].title, "Visión");
        assert!(svc.list_by_type(&AboutUsKind::from("valores")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn free_form_labels_are_stored_verbatim() {
        let repo = Arc::new(MockAboutUsRepository::new());
        let svc = AboutUsService::new(repo.clone());
        let kind = AboutUsKind::from("valores");
        assert_eq!(kind, AboutUsKind::Other("valores".into()));
        svc.create("Valores", "Respeto", &kind).await.unwrap();
        assert_eq!(repo.rows()[0].kind, "valores");
        assert_eq!(svc.list_by_type(&kind).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_is_oldest_first() {
        let svc = AboutUsService::new(Arc::new(MockAboutUsRepository::new()));
        let a = svc.create("A", "a", &AboutUsKind::General).await.unwrap();
        let b = svc.create("B", "b", &AboutUsKind::General).await.unwrap();
        let ids: Vec<i32> = svc.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[tokio::test]
    async fn update_missing_row_is_false() {
        let repo = Arc::new(MockAboutUsRepository::new());
        let svc = AboutUsService::new(repo.clone());
        assert!(!svc.update(42, "t", "d", &AboutUsKind::General).await.unwrap());
        assert_eq!(repo.writes(), 0);
    }
}
