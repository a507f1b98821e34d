//! User context domain module.

mod model;
mod repository;

pub use model::{DEFAULT_USER_NAME, UserContext};
pub use repository::UserContextRepository;
