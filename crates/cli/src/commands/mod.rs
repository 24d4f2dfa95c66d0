//! Command handlers for the Knowledge Hub CLI.
//!
//! Each command lives in its own submodule; `wiring` builds the shared
//! services from configuration.

pub mod ask;
pub mod resources;
pub mod serve;
mod wiring;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use resources::ResourcesCommand;
pub use serve::ServeCommand;
