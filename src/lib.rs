pub mod adapter;
pub mod archive;
pub mod config;
pub mod docroot;
pub mod error;
pub mod fileutil;
pub mod import;
pub mod project;
pub mod services;
pub mod settings;
pub mod templates;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use adapter::{AdapterRegistry, FrameworkAdapter, FrameworkSpec, TableAdapter, NEOS_FLOW};
pub use config::{Config, DocrootPolicy};
pub use error::FlowError;
pub use project::{DatabaseType, ProjectDescriptor};
pub use services::Services;
