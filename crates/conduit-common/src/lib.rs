pub mod error;
pub mod identifier;

// Re-export commonly used items
pub use error::{ConduitError, Result};
pub use identifier::clean_identifier;
