//! ProdMatch server — HTTP surface over the matcher and catalog upload.

pub mod error;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
