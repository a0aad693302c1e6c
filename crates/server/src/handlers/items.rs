use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use common::types::Envelope;
use service::items::{Item, ItemPatch, ItemStore, NewItem};
use tracing::info;

use crate::errors::ApiError;
use crate::handler::{ApiRequest, ApiResponse, RequestHandler};

/// Item endpoints; every reply is wrapped in an [`Envelope`].
pub struct ItemsHandler {
    store: Arc<ItemStore>,
}

impl ItemsHandler {
    pub fn new(store: Arc<ItemStore>) -> Self { Self { store } }

    fn route(&self, req: &ApiRequest) -> Result<ApiResponse, ApiError> {
        match req.segments().as_slice() {
            [] => match req.method {
                Method::GET => Ok(list_items(&self.store)),
                Method::POST => create_item(&self.store, req),
                _ => Err(ApiError::method_not_allowed()),
            },
            [id] => match req.method {
                Method::GET => get_item(&self.store, parse_item_id(id)?),
                Method::PUT => update_item(&self.store, parse_item_id(id)?, req),
                Method::DELETE => delete_item(&self.store, parse_item_id(id)?),
                _ => Err(ApiError::method_not_allowed()),
            },
            _ => Err(ApiError::not_found("no such route")),
        }
    }
}

#[async_trait]
impl RequestHandler for ItemsHandler {
    fn resource(&self) -> &'static str { "items" }

    async fn handle(&self, req: ApiRequest) -> ApiResponse {
        self.route(&req).unwrap_or_else(ApiError::into_envelope)
    }
}

fn parse_item_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>().map_err(|_| ApiError::bad_request("invalid id"))
}

#[utoipa::path(
    get, path = "/api/v1/items", tag = "items",
    responses((status = 200, description = "All items with their count", body = crate::openapi::ItemListDoc))
)]
pub fn list_items(store: &ItemStore) -> ApiResponse {
    let items = store.get_all();
    let count = items.len();
    ApiResponse::json(StatusCode::OK, &Envelope::data(items).with_count(count))
}

#[utoipa::path(
    post, path = "/api/v1/items", tag = "items",
    request_body = crate::openapi::NewItemDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error")
    )
)]
pub fn create_item(store: &ItemStore, req: &ApiRequest) -> Result<ApiResponse, ApiError> {
    let input: NewItem = req.json()?;
    let item = store.create(input)?;
    info!(item_id = item.id, "item_created");
    Ok(ApiResponse::json(
        StatusCode::CREATED,
        &Envelope::data(item).with_message("item created"),
    ))
}

#[utoipa::path(
    get, path = "/api/v1/items/{id}", tag = "items",
    params(("id" = u64, Path, description = "Item ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ItemDoc),
        (status = 400, description = "Invalid ID"),
        (status = 404, description = "Not Found")
    )
)]
pub fn get_item(store: &ItemStore, id: u64) -> Result<ApiResponse, ApiError> {
    let item: Item = store.get_by_id(&id)?;
    Ok(ApiResponse::json(StatusCode::OK, &Envelope::data(item)))
}

#[utoipa::path(
    put, path = "/api/v1/items/{id}", tag = "items",
    params(("id" = u64, Path, description = "Item ID")),
    request_body = crate::openapi::ItemPatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub fn update_item(store: &ItemStore, id: u64, req: &ApiRequest) -> Result<ApiResponse, ApiError> {
    let patch: ItemPatch = req.json()?;
    let item = store.update(&id, patch)?;
    info!(item_id = item.id, "item_updated");
    Ok(ApiResponse::json(
        StatusCode::OK,
        &Envelope::data(item).with_message("item updated"),
    ))
}

#[utoipa::path(
    delete, path = "/api/v1/items/{id}", tag = "items",
    params(("id" = u64, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Invalid ID"),
        (status = 404, description = "Not Found")
    )
)]
pub fn delete_item(store: &ItemStore, id: u64) -> Result<ApiResponse, ApiError> {
    store.delete(&id)?;
    info!(item_id = id, "item_deleted");
    Ok(ApiResponse::json(StatusCode::OK, &Envelope::<()>::message("item deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn handler() -> ItemsHandler {
        ItemsHandler::new(Arc::new(ItemStore::new()))
    }

    fn body(resp: &ApiResponse) -> &Value {
        resp.body.as_ref().expect("response body")
    }

    #[tokio::test]
    async fn item_lifecycle_through_handler() {
        let h = handler();

        let created = h
            .handle(ApiRequest::new(Method::POST, "").with_json(&json!({"name": "Widget", "price": 100})))
            .await;
        assert_eq!(created.status, StatusCode::CREATED);
        assert_eq!(body(&created)["message"], "item created");
        assert_eq!(body(&created)["data"]["id"], 1);
        assert_eq!(body(&created)["data"]["description"], "");

        let listed = h.handle(ApiRequest::new(Method::GET, "")).await;
        assert_eq!(listed.status, StatusCode::OK);
        assert_eq!(body(&listed)["count"], 1);
        assert_eq!(body(&listed)["data"][0]["name"], "Widget");

        let updated = h
            .handle(ApiRequest::new(Method::PUT, "1").with_json(&json!({"price": 150})))
            .await;
        assert_eq!(updated.status, StatusCode::OK);
        assert_eq!(body(&updated)["data"]["price"], 150);
        assert_eq!(body(&updated)["data"]["name"], "Widget");

        let deleted = h.handle(ApiRequest::new(Method::DELETE, "1")).await;
        assert_eq!(deleted.status, StatusCode::OK);
        assert_eq!(body(&deleted), &json!({"message": "item deleted"}));

        let missing = h.handle(ApiRequest::new(Method::GET, "1")).await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(body(&missing), &json!({"error": "item not found"}));
    }

    #[tokio::test]
    async fn bad_requests_are_rejected() {
        let h = handler();

        let bad_id = h.handle(ApiRequest::new(Method::GET, "abc")).await;
        assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
        assert_eq!(body(&bad_id)["error"], "invalid id");

        let negative = h
            .handle(ApiRequest::new(Method::POST, "").with_json(&json!({"name": "Widget", "price": -5})))
            .await;
        assert_eq!(negative.status, StatusCode::BAD_REQUEST);

        let no_name = h
            .handle(ApiRequest::new(Method::POST, "").with_json(&json!({"name": "", "price": 1})))
            .await;
        assert_eq!(no_name.status, StatusCode::BAD_REQUEST);

        let malformed = h.handle(ApiRequest::new(Method::POST, "").with_body("{")).await;
        assert_eq!(malformed.status, StatusCode::BAD_REQUEST);

        let wrong_method = h.handle(ApiRequest::new(Method::PATCH, "")).await;
        assert_eq!(wrong_method.status, StatusCode::METHOD_NOT_ALLOWED);

        let wrong_method_bad_id = h.handle(ApiRequest::new(Method::PATCH, "abc")).await;
        assert_eq!(wrong_method_bad_id.status, StatusCode::METHOD_NOT_ALLOWED);

        let deep = h.handle(ApiRequest::new(Method::GET, "1/extra")).await;
        assert_eq!(deep.status, StatusCode::NOT_FOUND);

        let update_missing = h
            .handle(ApiRequest::new(Method::PUT, "99").with_json(&json!({"name": "x"})))
            .await;
        assert_eq!(update_missing.status, StatusCode::NOT_FOUND);
    }
}
