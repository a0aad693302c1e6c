//! Framework-independent request handling.
//!
//! A resource handler sees a method, the path relative to where it is
//! mounted, the decoded query and the raw body, and answers with a status
//! and an optional JSON body. HTTP frameworks plug in through adapters
//! (see [`crate::adapter`]); tests drive handlers directly.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::ApiError;

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the mount point, without leading or trailing slashes.
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Bytes,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            method,
            path: path.trim_matches('/').to_string(),
            query: HashMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_json(self, value: &Value) -> Self {
        let body = value.to_string();
        self.with_body(body)
    }

    /// Non-empty path segments.
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Decode the body as JSON; an empty or malformed body is a 400.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        if self.body.is_empty() {
            return Err(ApiError::bad_request("request body is required"));
        }
        serde_json::from_slice(&self.body).map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(v) => Self { status, body: Some(v) },
            Err(e) => {
                tracing::error!(error = %e, "response serialization failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: Some(serde_json::json!({"error": "internal server error"})),
                }
            }
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self { status, body: None }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}

#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Label used for metrics and logs.
    fn resource(&self) -> &'static str;

    async fn handle(&self, req: ApiRequest) -> ApiResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_normalized_into_segments() {
        let req = ApiRequest::new(Method::GET, "/42/");
        assert_eq!(req.path, "42");
        assert_eq!(req.segments(), vec!["42"]);
        assert!(ApiRequest::new(Method::GET, "").segments().is_empty());
    }

    #[test]
    fn json_body_errors_are_bad_requests() {
        let empty = ApiRequest::new(Method::POST, "");
        assert_eq!(empty.json::<Value>().unwrap_err().status, StatusCode::BAD_REQUEST);
        let garbage = ApiRequest::new(Method::POST, "").with_body("{not json");
        assert_eq!(garbage.json::<Value>().unwrap_err().status, StatusCode::BAD_REQUEST);
        let ok = ApiRequest::new(Method::POST, "").with_json(&serde_json::json!({"a": 1}));
        assert_eq!(ok.json::<Value>().unwrap()["a"], 1);
    }
}
