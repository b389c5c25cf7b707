pub mod jwt;
pub mod password;
pub mod redemption_code;

pub use jwt::*;
pub use password::*;
pub use redemption_code::*;
