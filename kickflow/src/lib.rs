//! Terraform provider for the Kickflow workflow service
//!
//! [`KickflowProvider`] plugs into [`tfplug::ProviderServer`]. Configuring it
//! builds one [`api::Client`] that every data source read then shares.

pub mod api;
pub mod config;
pub mod data_sources;

use async_trait::async_trait;
use tfplug::{
    AttributeBuilder, Config, Context, Diagnostic, Diagnostics, Invocation, Operation, Outcome,
    Provider, ProviderMetadata, Registration, Schema, SchemaBuilder,
};

use crate::config::ProviderConfig;
use crate::data_sources::UserDataSource;

pub const PROVIDER_TYPE_NAME: &str = "kickflow";

pub struct KickflowProvider {
    version: String,
}

impl Default for KickflowProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl KickflowProvider {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

/// Every handler this provider serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickflowHandler {
    User,
}

impl KickflowHandler {
    pub const ALL: &'static [KickflowHandler] = &[KickflowHandler::User];

    pub fn type_name(&self) -> &'static str {
        match self {
            KickflowHandler::User => data_sources::user::TYPE_NAME,
        }
    }

    pub fn registration(&self) -> Registration {
        match self {
            KickflowHandler::User => {
                Registration::data_source(self.type_name(), UserDataSource::schema_static())
            }
        }
    }

    pub fn from_type_name(type_name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|handler| handler.type_name() == type_name)
    }

    async fn invoke(
        &self,
        ctx: Context,
        client: &api::Client,
        operation: Operation,
        config: Config,
    ) -> Outcome {
        match (self, operation) {
            (KickflowHandler::User, Operation::Lookup) => {
                UserDataSource::read(ctx, client, config).await
            }
            (handler, operation) => Outcome::failed(Diagnostic::error(
                "Unsupported operation",
                format!("{} does not support {:?}", handler.type_name(), operation),
            )),
        }
    }
}

#[async_trait]
impl Provider for KickflowProvider {
    type Data = api::Client;

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE_NAME.to_string(),
            version: self.version.clone(),
        }
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::string("endpoint")
                    .optional()
                    .description("Kickflow API endpoint (default: https://api.kickflow.com)"),
            )
            .attribute(
                AttributeBuilder::string("access_token")
                    .required()
                    .sensitive()
                    .description("Kickflow API access token"),
            )
            .attribute(
                AttributeBuilder::string("caller_id")
                    .required()
                    .description("ID to identify the API request caller"),
            )
            .build(0)
    }

    fn registrations(&self) -> Vec<Registration> {
        KickflowHandler::ALL
            .iter()
            .map(KickflowHandler::registration)
            .collect()
    }

    async fn configure(&self, _ctx: Context, config: Config) -> Result<api::Client, Diagnostics> {
        let client = ProviderConfig::from_config(&config)
            .and_then(ProviderConfig::into_client)
            .map_err(|err| {
                tracing::error!("Failed to configure provider: {}", err);
                Diagnostics::from(Diagnostic::from(err))
            })?;

        tracing::info!(
            "Configured Kickflow provider for {} (caller: {})",
            client.base_url(),
            client.caller_id()
        );
        Ok(client)
    }

    async fn invoke(&self, ctx: Context, client: &api::Client, invocation: Invocation) -> Outcome {
        match KickflowHandler::from_type_name(&invocation.type_name) {
            Some(handler) => {
                handler
                    .invoke(ctx, client, invocation.operation, invocation.config)
                    .await
            }
            None => Outcome::failed(Diagnostic::error(
                "Unknown type name",
                format!("No handler registered for {}", invocation.type_name),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn metadata_uses_crate_version_by_default() {
        let metadata = KickflowProvider::new().metadata();
        assert_eq!(metadata.type_name, "kickflow");
        assert_eq!(metadata.version, env!("CARGO_PKG_VERSION"));

        let pinned = KickflowProvider::with_version("1.2.3").metadata();
        assert_eq!(pinned.version, "1.2.3");
    }

    #[test]
    fn schema_marks_token_sensitive() {
        let schema = KickflowProvider::new().schema();

        assert!(schema.attribute("access_token").unwrap().sensitive);
        assert!(schema.attribute("access_token").unwrap().required);
        assert!(!schema.attribute("caller_id").unwrap().sensitive);
        assert!(!schema.attribute("endpoint").unwrap().required);
    }

    #[test]
    fn handlers_resolve_by_type_name() {
        assert_eq!(
            KickflowHandler::from_type_name("kickflow_user"),
            Some(KickflowHandler::User)
        );
        assert_eq!(KickflowHandler::from_type_name("kickflow_group"), None);

        let registrations = KickflowProvider::new().registrations();
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0].type_name, "kickflow_user");
        assert_eq!(registrations[0].kind, tfplug::HandlerKind::DataSource);
    }

    #[tokio::test]
    async fn handlers_reject_unsupported_operations() {
        let client = api::Client::new("https://api.kickflow.com", "token", "caller").unwrap();
        let outcome = KickflowHandler::User
            .invoke(Context::new(), &client, Operation::Create, Config::new())
            .await;

        assert!(outcome.state.is_none());
        assert_eq!(outcome.diagnostics.errors[0].summary, "Unsupported operation");
    }
}
