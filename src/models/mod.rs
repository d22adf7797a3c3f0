pub mod auth;
pub mod portal;
pub mod user;

pub use auth::*;
pub use portal::*;
pub use user::*;
