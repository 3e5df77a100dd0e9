/// Credential handling for the account flow
pub mod password;
pub mod token;

pub use password::PasswordHasher;
pub use token::{Claims, TokenIssuer};
