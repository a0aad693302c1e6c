use axum::extract::Path;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceResponse {
    pub id: String,
    pub name: String,
}

/// Demo lookup; the path id is not consulted and a fresh id is returned.
#[utoipa::path(
    get, path = "/api/v1/devices/{id}", tag = "devices",
    params(("id" = String, Path, description = "Device ID")),
    responses((status = 200, description = "OK", body = crate::openapi::DeviceDoc))
)]
pub async fn get_device(Path(_id): Path<String>) -> Json<DeviceResponse> {
    Json(DeviceResponse { id: Uuid::new_v4().to_string(), name: "Test Device".to_string() })
}
