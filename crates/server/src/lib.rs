pub mod adapter;
pub mod errors;
pub mod handler;
pub mod handlers;
pub mod observability;
pub mod openapi;
pub mod routes;
pub mod startup;

pub use handler::{ApiRequest, ApiResponse, RequestHandler};
pub use routes::{build_router, AppState};
pub use startup::run;
