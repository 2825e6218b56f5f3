pub mod extract;
pub mod password;
pub mod token;

pub use extract::AuthUser;
pub use token::AuthClaims;
