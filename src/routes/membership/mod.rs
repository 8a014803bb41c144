mod handler;
mod model;

pub use handler::{create_membership, delete_membership, end_membership};
pub use model::MembershipInfo;
