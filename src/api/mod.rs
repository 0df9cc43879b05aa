pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
pub mod types;

pub use auth::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER, AuthenticatedActor};
pub use error::ApiError;
pub use router::create_router;
pub use types::*;
