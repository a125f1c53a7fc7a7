pub mod dto;
pub mod filters;
pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::read_routes())
}
