pub mod extractor;
pub mod jwt;
pub mod password;

pub use extractor::AuthUser;
