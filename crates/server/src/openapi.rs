use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ItemDoc {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: i64,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct ItemListDoc {
    pub data: Vec<ItemDoc>,
    pub count: usize,
}

#[derive(ToSchema)]
pub struct NewItemDoc {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
}

#[derive(ToSchema)]
pub struct ItemPatchDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
}

#[derive(ToSchema)]
pub struct UserDoc {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct CreateUserDoc { pub email: String, pub name: String }

#[derive(ToSchema)]
pub struct UpdateUserDoc { pub name: String }

#[derive(ToSchema)]
pub struct DeviceDoc { pub id: String, pub name: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::handlers::items::list_items,
        crate::handlers::items::create_item,
        crate::handlers::items::get_item,
        crate::handlers::items::update_item,
        crate::handlers::items::delete_item,
        crate::handlers::users::list_users,
        crate::handlers::users::create_user,
        crate::handlers::users::create_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::devices::get_device,
    ),
    components(
        schemas(
            HealthResponse,
            ItemDoc,
            ItemListDoc,
            NewItemDoc,
            ItemPatchDoc,
            UserDoc,
            CreateUserDoc,
            UpdateUserDoc,
            DeviceDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "items"),
        (name = "users"),
        (name = "devices")
    )
)]
pub struct ApiDoc;
