mod auth;
mod error_handler;

pub use auth::identify;
pub use error_handler::log_errors;
