pub mod generation;
pub mod history;
pub mod points;
pub mod redemption;
pub mod user;

pub use generation::*;
pub use history::*;
pub use points::*;
pub use redemption::*;
pub use user::*;
