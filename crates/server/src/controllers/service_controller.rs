use std::sync::Arc;

use axum::body::Bytes;
use axum::response::Response;
use serde::Deserialize;
use service::services::{ServiceRepository, ServiceService};
use tracing::info;

use super::{created, id_param, message, ok, parse_body};
use crate::errors::ApiError;
use crate::router::RouteParams;

const FIELDS_REQUIRED: &str = "Name and description are required";
const NOT_FOUND: &str = "Service not found";

#[derive(Debug, Deserialize)]
pub struct ServiceInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub struct ServiceController<R: ServiceRepository> {
    service: Arc<ServiceService<R>>,
}

impl<R: ServiceRepository> ServiceController<R> {
    pub fn new(service: Arc<ServiceService<R>>) -> Self { Self { service } }

    pub async fn index(&self) -> Result<Response, ApiError> {
        let services = self.service.list().await?;
        Ok(ok(services))
    }

    pub async fn show(&self, params: RouteParams) -> Result<Response, ApiError> {
        let found = match id_param(&params)? {
            Some(id) => self.service.get(id).await?,
            None => None,
        };
        found.map(ok).ok_or_else(|| ApiError::not_found(NOT_FOUND))
    }

    pub async fn store(&self, body: Bytes) -> Result<Response, ApiError> {
        let (name, description) = required_fields(&body)?;
        let id = self.service.create(&name, &description).await?;
        Ok(created(id, "Service created successfully"))
    }

    pub async fn update(&self, params: RouteParams, body: Bytes) -> Result<Response, ApiError> {
        let id = id_param(&params)?;
        let (name, description) = required_fields(&body)?;
        let updated = match id {
            Some(id) => self.service.update(id, &name, &description).await?,
            None => false,
        };
        if !updated {
            return Err(ApiError::not_found("Service not found or no changes made"));
        }
        info!(service_id = ?id, "service_updated");
        Ok(message("Service updated successfully"))
    }

    pub async fn destroy(&self, params: RouteParams) -> Result<Response, ApiError> {
        let deleted = match id_param(&params)? {
            Some(id) => self.service.delete(id).await?,
            None => false,
        };
        if !deleted {
            return Err(ApiError::not_found(NOT_FOUND));
        }
        info!(service_id = ?params.get("id"), "service_deleted");
        Ok(message("Service deleted successfully"))
    }
}

fn required_fields(body: &[u8]) -> Result<(String, String), ApiError> {
    match parse_body::<ServiceInput>(body) {
        Some(ServiceInput { name: Some(name), description: Some(description) }) => Ok((name, description)),
        _ => Err(ApiError::bad_request(FIELDS_REQUIRED)),
    }
}
