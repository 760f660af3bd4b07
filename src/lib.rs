pub mod args;
pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod profile;
pub mod provision;
pub mod record;
pub mod schema;
pub mod theme;
pub mod validate;

// Re-export the common types at the crate root for convenience
pub use error::SetupError;
pub use record::ProvisionRecord;
