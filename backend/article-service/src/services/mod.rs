/// Business logic layer
pub mod accounts;
pub mod articles;

pub use accounts::AccountService;
pub use articles::ArticleService;
