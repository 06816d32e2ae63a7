//! Host-side driver for a provider
//!
//! `ProviderServer` plays the part of the plugin protocol server: it decodes
//! msgpack values coming from the host, enforces the provider lifecycle
//! (configure before invoke, registered types only, operations allowed for
//! the handler kind) and encodes the resulting state. Transport concerns
//! such as the gRPC handshake sit outside this type.

use crate::context::Context;
use crate::error::{Result, TfplugError};
use crate::provider::{HandlerKind, Invocation, Operation, Outcome, Provider, Registration};
use crate::schema::Schema;
use crate::types::{Config, Diagnostic, Diagnostics, DynamicValue, State};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Server configuration for running a provider
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum size in bytes of any encoded value accepted from the host
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_message_size: 256 << 20, // 256MB
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }
}

pub struct ProviderSchemaResponse {
    pub provider: Schema,
    pub data_sources: HashMap<String, Schema>,
    pub resources: HashMap<String, Schema>,
    pub diagnostics: Diagnostics,
}

/// Encoded state plus diagnostics. An empty `state` means null.
#[derive(Debug, Clone, Default)]
pub struct EncodedResponse {
    pub state: Vec<u8>,
    pub diagnostics: Diagnostics,
}

impl EncodedResponse {
    fn failed(diagnostics: impl Into<Diagnostics>) -> Self {
        Self {
            state: Vec::new(),
            diagnostics: diagnostics.into(),
        }
    }
}

pub struct ProviderServer<P: Provider> {
    provider: P,
    config: ServerConfig,
    registrations: HashMap<String, Registration>,
    registration_diagnostics: Diagnostics,
    data: RwLock<Option<Arc<P::Data>>>,
}

impl<P: Provider> ProviderServer<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, ServerConfig::default())
    }

    pub fn with_config(provider: P, config: ServerConfig) -> Self {
        let prefix = format!("{}_", provider.metadata().type_name);
        let mut registrations = HashMap::new();
        let mut registration_diagnostics = Diagnostics::new();

        for registration in provider.registrations() {
            if !registration.type_name.starts_with(&prefix) {
                registration_diagnostics.add_error(
                    format!("Invalid type name: {}", registration.type_name),
                    Some(format!("Type names must start with \"{}\"", prefix)),
                );
                continue;
            }
            if registrations.contains_key(&registration.type_name) {
                registration_diagnostics.add_error(
                    format!("Duplicate type name: {}", registration.type_name),
                    None::<String>,
                );
                continue;
            }
            registrations.insert(registration.type_name.clone(), registration);
        }

        Self {
            provider,
            config,
            registrations,
            registration_diagnostics,
            data: RwLock::new(None),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn get_provider_schema(&self) -> ProviderSchemaResponse {
        let mut data_sources = HashMap::new();
        let mut resources = HashMap::new();

        for (type_name, registration) in &self.registrations {
            let target = match registration.kind {
                HandlerKind::DataSource => &mut data_sources,
                HandlerKind::Resource => &mut resources,
            };
            target.insert(type_name.clone(), registration.schema.clone());
        }

        ProviderSchemaResponse {
            provider: self.provider.schema(),
            data_sources,
            resources,
            diagnostics: self.registration_diagnostics.clone(),
        }
    }

    pub fn validate_provider_config(&self, config: &[u8]) -> Diagnostics {
        match self.decode(config) {
            Ok(config) => self
                .provider
                .schema()
                .validate_config(&config.unwrap_or_default()),
            Err(e) => Diagnostic::from(e).into(),
        }
    }

    pub fn validate_data_source_config(&self, type_name: &str, config: &[u8]) -> Diagnostics {
        let registration = match self.registration(type_name, HandlerKind::DataSource) {
            Ok(registration) => registration,
            Err(e) => return Diagnostic::from(e).into(),
        };
        match self.decode(config) {
            Ok(config) => registration
                .schema
                .validate_config(&config.unwrap_or_default()),
            Err(e) => Diagnostic::from(e).into(),
        }
    }

    /// Configures the provider and stores the data it produces for all later
    /// invocations. A failed configure leaves the server unconfigured.
    pub async fn configure_provider(&self, ctx: Context, config: &[u8]) -> Diagnostics {
        let config = match self.decode(config) {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => return Diagnostic::from(e).into(),
        };

        tracing::debug!(
            "Configuring provider with attributes: {:?}",
            config.values.keys().collect::<Vec<_>>()
        );

        match self.provider.configure(ctx, config).await {
            Ok(data) => {
                *self.data.write().await = Some(Arc::new(data));
                tracing::info!("Provider configured");
                Diagnostics::new()
            }
            Err(diagnostics) => {
                *self.data.write().await = None;
                tracing::error!("Provider configuration failed: {:?}", diagnostics.errors);
                diagnostics
            }
        }
    }

    pub async fn read_data_source(
        &self,
        ctx: Context,
        type_name: &str,
        config: &[u8],
    ) -> EncodedResponse {
        let config = match self.decode(config) {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => return EncodedResponse::failed(Diagnostic::from(e)),
        };

        let invocation = Invocation {
            type_name: type_name.to_string(),
            operation: Operation::Lookup,
            config,
            prior_state: None,
            planned_state: None,
        };
        self.dispatch(ctx, HandlerKind::DataSource, invocation).await
    }

    /// Refreshes a resource. An empty response state means the object is gone.
    pub async fn read_resource(
        &self,
        ctx: Context,
        type_name: &str,
        current_state: &[u8],
    ) -> EncodedResponse {
        let current_state = match self.decode(current_state) {
            Ok(Some(state)) => state,
            Ok(None) => return EncodedResponse::default(),
            Err(e) => return EncodedResponse::failed(Diagnostic::from(e)),
        };

        let invocation = Invocation {
            type_name: type_name.to_string(),
            operation: Operation::Lookup,
            config: current_state.clone(),
            prior_state: Some(current_state),
            planned_state: None,
        };
        self.dispatch(ctx, HandlerKind::Resource, invocation).await
    }

    /// Applies a planned change. A null prior state means create, a null
    /// planned state means delete, anything else is an update.
    pub async fn apply_resource_change(
        &self,
        ctx: Context,
        type_name: &str,
        prior_state: &[u8],
        planned_state: &[u8],
        config: &[u8],
    ) -> EncodedResponse {
        let decoded = self.decode(prior_state).and_then(|prior| {
            let planned = self.decode(planned_state)?;
            let config = self.decode(config)?;
            Ok((prior, planned, config.unwrap_or_default()))
        });
        let (prior_state, planned_state, config) = match decoded {
            Ok(values) => values,
            Err(e) => return EncodedResponse::failed(Diagnostic::from(e)),
        };

        let operation = match (&prior_state, &planned_state) {
            (None, Some(_)) => Operation::Create,
            (Some(_), None) => Operation::Delete,
            (Some(_), Some(_)) => Operation::Update,
            (None, None) => return EncodedResponse::default(),
        };

        let invocation = Invocation {
            type_name: type_name.to_string(),
            operation,
            config,
            prior_state,
            planned_state,
        };
        self.dispatch(ctx, HandlerKind::Resource, invocation).await
    }

    async fn dispatch(
        &self,
        ctx: Context,
        kind: HandlerKind,
        invocation: Invocation,
    ) -> EncodedResponse {
        if let Err(e) = self.registration(&invocation.type_name, kind) {
            return EncodedResponse::failed(Diagnostic::from(e));
        }
        if !kind.supports(invocation.operation) {
            return EncodedResponse::failed(Diagnostic::error(
                "Unsupported operation",
                format!(
                    "{:?} is not supported by {}",
                    invocation.operation, invocation.type_name
                ),
            ));
        }

        // Clone the Arc so the lock is not held across the invocation
        let data = match self.data.read().await.as_ref() {
            Some(data) => Arc::clone(data),
            None => {
                return EncodedResponse::failed(Diagnostic::from(
                    TfplugError::ProviderNotConfigured,
                ))
            }
        };

        let type_name = invocation.type_name.clone();
        let operation = invocation.operation;
        tracing::debug!("Invoking {:?} on {}", operation, type_name);

        let Outcome { state, diagnostics } = self.provider.invoke(ctx, &data, invocation).await;

        if diagnostics.has_errors() {
            tracing::error!(
                "{:?} on {} failed: {:?}",
                operation,
                type_name,
                diagnostics.errors
            );
            return EncodedResponse::failed(diagnostics);
        }

        self.encode(state, diagnostics)
    }

    fn encode(&self, state: Option<State>, mut diagnostics: Diagnostics) -> EncodedResponse {
        let state = match state {
            Some(state) => match state.encode_msgpack() {
                Ok(bytes) => bytes,
                Err(e) => {
                    diagnostics.push(e.into());
                    return EncodedResponse::failed(diagnostics);
                }
            },
            None => Vec::new(),
        };
        EncodedResponse { state, diagnostics }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Option<Config>> {
        if bytes.len() > self.config.max_message_size {
            return Err(TfplugError::MessageTooLarge {
                size: bytes.len(),
                limit: self.config.max_message_size,
            });
        }
        DynamicValue::decode_msgpack(bytes)
    }

    fn registration(&self, type_name: &str, kind: HandlerKind) -> Result<&Registration> {
        match self.registrations.get(type_name) {
            Some(registration) if registration.kind == kind => Ok(registration),
            _ => Err(match kind {
                HandlerKind::DataSource => TfplugError::DataSourceNotFound(type_name.to_string()),
                HandlerKind::Resource => TfplugError::ResourceNotFound(type_name.to_string()),
            }),
        }
    }
}
