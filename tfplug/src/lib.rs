//! tfplug - Terraform Plugin Framework for Rust
//!
//! Providers implement [`Provider`]: a schema, an explicit list of
//! registrations, a `configure` step that builds shared data, and a single
//! `invoke` entry point. [`ProviderServer`] drives that lifecycle from the
//! host side using msgpack-encoded values.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API
pub mod provider;

// Host side
pub mod logging;
pub mod server;

// Re-exports for convenience
pub use context::Context;
pub use error::{Result, TfplugError};
pub use logging::try_init_logging;
pub use provider::{
    HandlerKind, Invocation, Operation, Outcome, Provider, ProviderMetadata, Registration,
};
pub use schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use server::{EncodedResponse, ProviderSchemaResponse, ProviderServer, ServerConfig};
pub use types::{
    Config, Diagnostic, DiagnosticSeverity, Diagnostics, Dynamic, DynamicValue, State,
    StateBuilder,
};
