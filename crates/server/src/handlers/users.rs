use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service::pagination::Pagination;
use service::users::domain::User;
use service::users::UserService;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::handler::{ApiRequest, ApiResponse, RequestHandler};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
}

/// Wire representation of a user; timestamps serialize as RFC 3339.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self { id: u.id, email: u.email, name: u.name, created_at: u.created_at, updated_at: u.updated_at }
    }
}

fn users_response(status: StatusCode, users: Vec<User>) -> ApiResponse {
    let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    ApiResponse::json(status, &body)
}

/// User endpoints; replies are bare DTOs and errors are `{"error": ...}`.
pub struct UsersHandler {
    svc: Arc<UserService>,
}

impl UsersHandler {
    pub fn new(svc: Arc<UserService>) -> Self { Self { svc } }

    async fn route(&self, req: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let svc = self.svc.as_ref();
        match req.segments().as_slice() {
            [] => match req.method {
                Method::GET => list_users(svc, req).await,
                Method::POST => create_user(svc, req).await,
                _ => Err(ApiError::method_not_allowed()),
            },
            ["batch"] => match req.method {
                Method::POST => create_users(svc, req).await,
                _ => Err(ApiError::method_not_allowed()),
            },
            [id] => match req.method {
                Method::GET => get_user(svc, id).await,
                Method::PUT => update_user(svc, id, req).await,
                Method::DELETE => delete_user(svc, id).await,
                _ => Err(ApiError::method_not_allowed()),
            },
            _ => Err(ApiError::not_found("no such route")),
        }
    }
}

#[async_trait]
impl RequestHandler for UsersHandler {
    fn resource(&self) -> &'static str { "users" }

    async fn handle(&self, req: ApiRequest) -> ApiResponse {
        self.route(&req).await.unwrap_or_else(ApiError::into_plain)
    }
}

fn parse_paging(req: &ApiRequest) -> Result<Option<Pagination>, ApiError> {
    fn num(req: &ApiRequest, key: &str, default: u32) -> Result<u32, ApiError> {
        match req.query_param(key) {
            Some(raw) => raw.trim().parse().map_err(|_| ApiError::bad_request(format!("invalid {key}"))),
            None => Ok(default),
        }
    }
    if req.query_param("page").is_none() && req.query_param("per_page").is_none() {
        return Ok(None);
    }
    let defaults = Pagination::default();
    Ok(Some(Pagination {
        page: num(req, "page", defaults.page)?,
        per_page: num(req, "per_page", defaults.per_page)?,
    }))
}

#[utoipa::path(
    get, path = "/api/v1/users", tag = "users",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("per_page" = Option<u32>, Query, description = "Page size (1..=100)"),
        ("q" = Option<String>, Query, description = "Case-insensitive match on name or email")
    ),
    responses(
        (status = 200, description = "Users in creation order", body = [crate::openapi::UserDoc]),
        (status = 400, description = "Invalid paging parameters")
    )
)]
pub async fn list_users(svc: &UserService, req: &ApiRequest) -> Result<ApiResponse, ApiError> {
    let paging = parse_paging(req)?;
    let keyword = req.query_param("q").unwrap_or_default().trim();
    let users = match (keyword.is_empty(), paging) {
        (true, None) => svc.list_users().await?,
        (true, Some(p)) => svc.list_users_paginated(p).await?.0,
        (false, paging) => {
            let found = svc.search_users(keyword).await?;
            match paging {
                Some(p) => {
                    let (offset, limit) = p.window();
                    found.into_iter().skip(offset).take(limit).collect()
                }
                None => found,
            }
        }
    };
    Ok(users_response(StatusCode::OK, users))
}

#[utoipa::path(
    post, path = "/api/v1/users", tag = "users",
    request_body = crate::openapi::CreateUserDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::UserDoc),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_user(svc: &UserService, req: &ApiRequest) -> Result<ApiResponse, ApiError> {
    let input: CreateUserRequest = req.json()?;
    let user = svc.create_user(&input.email, &input.name).await?;
    Ok(ApiResponse::json(StatusCode::CREATED, &UserResponse::from(user)))
}

#[utoipa::path(
    post, path = "/api/v1/users/batch", tag = "users",
    request_body = [crate::openapi::CreateUserDoc],
    responses(
        (status = 201, description = "All users created", body = [crate::openapi::UserDoc]),
        (status = 400, description = "Validation Error; nothing created"),
        (status = 409, description = "Duplicate email; nothing created")
    )
)]
pub async fn create_users(svc: &UserService, req: &ApiRequest) -> Result<ApiResponse, ApiError> {
    let inputs: Vec<CreateUserRequest> = req.json()?;
    let users = svc
        .create_users(inputs.into_iter().map(|u| (u.email, u.name)).collect())
        .await?;
    Ok(users_response(StatusCode::CREATED, users))
}

#[utoipa::path(
    get, path = "/api/v1/users/{id}", tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::UserDoc),
        (status = 400, description = "Invalid ID"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user(svc: &UserService, id: &str) -> Result<ApiResponse, ApiError> {
    let user = svc.get_user(id).await?;
    Ok(ApiResponse::json(StatusCode::OK, &UserResponse::from(user)))
}

#[utoipa::path(
    put, path = "/api/v1/users/{id}", tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = crate::openapi::UpdateUserDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::UserDoc),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_user(svc: &UserService, id: &str, req: &ApiRequest) -> Result<ApiResponse, ApiError> {
    let input: UpdateUserRequest = req.json()?;
    let user = svc.update_user(id, &input.name).await?;
    Ok(ApiResponse::json(StatusCode::OK, &UserResponse::from(user)))
}

#[utoipa::path(
    delete, path = "/api/v1/users/{id}", tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Invalid ID"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(svc: &UserService, id: &str) -> Result<ApiResponse, ApiError> {
    svc.delete_user(id).await?;
    Ok(ApiResponse::empty(StatusCode::NO_CONTENT))
}
