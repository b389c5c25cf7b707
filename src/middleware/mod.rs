pub mod auth;
pub mod extract;

pub use auth::*;
pub use extract::*;
