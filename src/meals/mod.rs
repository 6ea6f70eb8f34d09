mod dto;
pub mod handlers;
mod log;
mod record;

pub use log::{MealLog, Summary, ValidationError};
pub use record::{Category, MealRecord};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
