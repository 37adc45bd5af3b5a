pub mod claims;
pub mod config;
pub mod errors;
pub mod manager;

pub use claims::Claims;
pub use claims::TokenKind;
pub use config::TokenConfig;
pub use errors::TokenError;
pub use manager::Rotation;
pub use manager::TokenManager;
pub use manager::TokenPair;
