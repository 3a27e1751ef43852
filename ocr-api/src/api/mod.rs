mod extractors;
pub mod handlers;
mod routes;
mod state;

pub use extractors::{AppJson, AppQuery};
pub use routes::create_router;
pub use state::AppState;
