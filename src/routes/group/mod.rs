mod handler;
mod model;

pub use handler::{add_user, check_membership, remove_user};
pub use model::CheckResponse;
