use std::sync::Arc;

use axum::body::Bytes;
use axum::response::Response;
use models::about_us::AboutUsKind;
use serde::Deserialize;
use service::about_us::{AboutUsRepository, AboutUsService};
use tracing::info;

use super::{created, id_param, message, ok, parse_body};
use crate::errors::ApiError;
use crate::router::RouteParams;

const FIELDS_REQUIRED: &str = "Title, description and type are required";
const NOT_FOUND: &str = "Item not found";

#[derive(Debug, Deserialize)]
pub struct AboutUsInput {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

struct Fields {
    title: String,
    description: String,
    kind: AboutUsKind,
}

pub struct AboutUsController<R: AboutUsRepository> {
    service: Arc<AboutUsService<R>>,
}

impl<R: AboutUsRepository> AboutUsController<R> {
    pub fn new(service: Arc<AboutUsService<R>>) -> Self { Self { service } }

    pub async fn index(&self) -> Result<Response, ApiError> {
        Ok(ok(self.service.list().await?))
    }

    pub async fn show(&self, params: RouteParams) -> Result<Response, ApiError> {
        let found = match id_param(&params)? {
            Some(id) => self.service.get(id).await?,
            None => None,
        };
        found.map(ok).ok_or_else(|| ApiError::not_found(NOT_FOUND))
    }

    /// Integer captures are rendered back as text.
    pub async fn by_type(&self, params: RouteParams) -> Result<Response, ApiError> {
        let label = params.get("type").map(ToString::to_string).unwrap_or_default();
        let kind = AboutUsKind::from(label.as_str());
        Ok(ok(self.service.list_by_type(&kind).await?))
    }

    pub async fn store(&self, body: Bytes) -> Result<Response, ApiError> {
        let f = required_fields(&body)?;
        let id = self.service.create(&f.title, &f.description, &f.kind).await?;
        Ok(created(id, "Item created successfully"))
    }

    pub async fn update(&self, params: RouteParams, body: Bytes) -> Result<Response, ApiError> {
        let id = id_param(&params)?;
        let f = required_fields(&body)?;
        let updated = match id {
            Some(id) => self.service.update(id, &f.title, &f.description, &f.kind).await?,
            None => false,
        };
        if !updated {
            return Err(ApiError::not_found("Item not found or no changes made"));
        }
        info!(about_us_id = ?id, "about_us_updated");
        Ok(message("Item updated successfully"))
    }

    pub async fn destroy(&self, params: RouteParams) -> Result<Response, ApiError> {
        let deleted = match id_param(&params)? {
            Some(id) => self.service.delete(id).await?,
            None => false,
        };
        if !deleted {
            return Err(ApiError::not_found(NOT_FOUND));
        }
        info!(about_us_id = ?params.get("id"), "about_us_deleted");
        Ok(message("Item deleted successfully"))
    }
}

fn required_fields(body: &[u8]) -> Result<Fields, ApiError> {
    match parse_body::<AboutUsInput>(body) {
        Some(AboutUsInput { title: Some(title), description: Some(description), kind: Some(kind) }) => {
            Ok(Fields { title, description, kind: AboutUsKind::from(kind.as_str()) })
        }
        _ => Err(ApiError::bad_request(FIELDS_REQUIRED)),
    }
}
