//! axum adapter for [`RequestHandler`].

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Query;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tracing::debug;

use crate::errors::ApiError;
use crate::handler::{ApiRequest, RequestHandler};
use crate::observability;

/// Route `prefix`, `prefix/` and everything below it to `handler`.
pub fn mount<S>(router: Router<S>, prefix: &str, handler: Arc<dyn RequestHandler>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let prefix = prefix.trim_end_matches('/').to_string();
    let route = {
        let prefix = prefix.clone();
        any(move |method: Method, uri: Uri, body: Bytes| {
            let handler = Arc::clone(&handler);
            let prefix = prefix.clone();
            async move { dispatch(handler.as_ref(), &prefix, method, uri, body).await }
        })
    };
    router
        .route(&prefix, route.clone())
        .route(&format!("{prefix}/"), route.clone())
        .route(&format!("{prefix}/*rest"), route)
}

async fn dispatch(handler: &dyn RequestHandler, prefix: &str, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri.path().strip_prefix(prefix).unwrap_or_default().to_string();
    let query = match Query::<HashMap<String, String>>::try_from_uri(&uri) {
        Ok(Query(q)) => q,
        Err(e) => {
            let err = ApiError::bad_request(format!("invalid query string: {e}"));
            observability::record_request(handler.resource(), err.status);
            return err.into_response();
        }
    };
    let mut req = ApiRequest::new(method, path).with_body(body);
    req.query = query;

    debug!(resource = handler.resource(), method = %req.method, path = %req.path, "dispatch");
    let resp = handler.handle(req).await;
    observability::record_request(handler.resource(), resp.status);
    resp.into_response()
}
