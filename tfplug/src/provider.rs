//! The contract between a provider and its host
//!
//! A provider declares a fixed list of registrations and handles every
//! operation through a single `invoke` call. The data produced by `configure`
//! (usually an API client) is handed back to each invocation explicitly.

use crate::context::Context;
use crate::schema::Schema;
use crate::types::{Config, Diagnostics, State};
use async_trait::async_trait;

/// Operations a handler can be asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Data source read, or resource refresh
    Lookup,
    Create,
    Update,
    Delete,
}

/// Whether a registered type is a data source or a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    DataSource,
    Resource,
}

impl HandlerKind {
    /// Data sources only support lookups
    pub fn supports(&self, operation: Operation) -> bool {
        match self {
            HandlerKind::DataSource => operation == Operation::Lookup,
            HandlerKind::Resource => true,
        }
    }
}

/// One entry of a provider's explicit handler list
#[derive(Debug, Clone)]
pub struct Registration {
    /// Full Terraform type name, e.g. "kickflow_user"
    pub type_name: String,
    pub kind: HandlerKind,
    pub schema: Schema,
}

impl Registration {
    pub fn data_source(type_name: impl Into<String>, schema: Schema) -> Self {
        Self {
            type_name: type_name.into(),
            kind: HandlerKind::DataSource,
            schema,
        }
    }

    pub fn resource(type_name: impl Into<String>, schema: Schema) -> Self {
        Self {
            type_name: type_name.into(),
            kind: HandlerKind::Resource,
            schema,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    /// Prefix shared by every registered type name
    pub type_name: String,
    pub version: String,
}

/// A single call into a handler
#[derive(Debug, Clone)]
pub struct Invocation {
    pub type_name: String,
    pub operation: Operation,
    /// User configuration. Empty for deletes.
    pub config: Config,
    /// State before the operation. `None` for data sources and creates.
    pub prior_state: Option<State>,
    /// Planned state for creates and updates
    pub planned_state: Option<State>,
}

/// Result of an invocation. `state` is `None` when the operation failed or
/// when the object no longer exists.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    pub state: Option<State>,
    pub diagnostics: Diagnostics,
}

impl Outcome {
    pub fn state(state: State, diagnostics: Diagnostics) -> Self {
        Self {
            state: Some(state),
            diagnostics,
        }
    }

    pub fn failed(diagnostics: impl Into<Diagnostics>) -> Self {
        Self {
            state: None,
            diagnostics: diagnostics.into(),
        }
    }
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Shared, read-only data built by `configure` and passed to every
    /// invocation
    type Data: Send + Sync + 'static;

    fn metadata(&self) -> ProviderMetadata;

    /// Schema of the provider configuration block
    fn schema(&self) -> Schema;

    /// Every data source and resource this provider serves
    fn registrations(&self) -> Vec<Registration>;

    async fn configure(&self, ctx: Context, config: Config) -> Result<Self::Data, Diagnostics>;

    /// Dispatches to the handler registered under `invocation.type_name`.
    /// The host only calls this for registered types and supported operations.
    async fn invoke(&self, ctx: Context, data: &Self::Data, invocation: Invocation) -> Outcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Diagnostic;

    #[test]
    fn data_sources_only_support_lookup() {
        assert!(HandlerKind::DataSource.supports(Operation::Lookup));
        assert!(!HandlerKind::DataSource.supports(Operation::Create));
        assert!(!HandlerKind::DataSource.supports(Operation::Delete));
        assert!(HandlerKind::Resource.supports(Operation::Update));
    }

    #[test]
    fn failed_outcome_carries_no_state() {
        let outcome = Outcome::failed(Diagnostic::error("API error", "status 500"));
        assert!(outcome.state.is_none());
        assert!(outcome.diagnostics.has_errors());
    }
}
