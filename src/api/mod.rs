//! Screen Sync API Module
//! HTTP trigger and status surface for the scrape-and-publish run

pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use guard::{RunGuard, RunPermit};
pub use handlers::AppState;
pub use routes::create_router;
pub use types::*;
