use tfplug::{
    AttributeBuilder, Config, Context, Diagnostic, Diagnostics, Dynamic, Outcome, Schema,
    SchemaBuilder, StateBuilder,
};

use crate::api::{ApiError, Client, User, UserLookup};

pub const TYPE_NAME: &str = "kickflow_user";

/// Looks up a single Kickflow user by ID or email address
pub struct UserDataSource;

impl UserDataSource {
    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .description("Data source for retrieving Kickflow user information")
            .attribute(
                AttributeBuilder::string("user_id")
                    .optional()
                    .description("User ID to search for"),
            )
            .attribute(
                AttributeBuilder::string("user_email")
                    .optional()
                    .description("User email to search for"),
            )
            .computed_string("id", "User ID")
            .computed_string("email", "Email address")
            .computed_string("code", "User code")
            .computed_string("first_name", "First name")
            .computed_string("last_name", "Last name")
            .computed_string("full_name", "Full name")
            .computed_string("employee_id", "Employee ID")
            .computed_string("status", "User status")
            .computed_string("locale", "Locale settings")
            .computed_string("created_at", "Created at")
            .computed_string("updated_at", "Updated at")
            .computed_string("deactivated_at", "Deactivated at")
            .build(0)
    }

    /// `user_id` takes precedence over `user_email`
    pub fn lookup(config: &Config, diags: &mut Diagnostics) -> Option<UserLookup> {
        match (config.get_string("user_id"), config.get_string("user_email")) {
            (Some(id), email) => {
                if email.is_some() {
                    tracing::warn!("Both user_id and user_email are set, using user_id");
                    diags.push(
                        Diagnostic::warning(
                            "Conflicting user lookup",
                            "Both user_id and user_email are set. user_email is ignored.",
                        )
                        .with_attribute("user_email"),
                    );
                }
                Some(UserLookup::Id(id.to_string()))
            }
            (None, Some(email)) => Some(UserLookup::Email(email.to_string())),
            (None, None) => None,
        }
    }

    pub async fn read(ctx: Context, client: &Client, config: Config) -> Outcome {
        let mut diags = Diagnostics::new();

        let Some(lookup) = Self::lookup(&config, &mut diags) else {
            diags.add_error(
                "User ID or email address is required",
                Some("Please set either user_id or user_email to identify the user."),
            );
            return Outcome::failed(diags);
        };

        if ctx.is_cancelled() {
            diags.add_error(
                "API request failed",
                Some("Error occurred while retrieving user information: operation cancelled"),
            );
            return Outcome::failed(diags);
        }

        let result = tokio::select! {
            result = client.get_user(&lookup) => result,
            _ = ctx.cancelled() => {
                diags.add_error(
                    "API request failed",
                    Some("Error occurred while retrieving user information: operation cancelled"),
                );
                return Outcome::failed(diags);
            }
        };

        let user = match result {
            Ok(user) => user,
            Err(err) => {
                tracing::error!("Failed to read {}: {}", TYPE_NAME, err);
                diags.push(error_diagnostic(&err));
                return Outcome::failed(diags);
            }
        };

        let state = user_state(&config, user);
        tracing::trace!("read a {} data source", TYPE_NAME);

        Outcome::state(state, diags)
    }
}

fn error_diagnostic(err: &ApiError) -> Diagnostic {
    match err {
        ApiError::Status { status } => Diagnostic::error(
            "API error",
            format!("Received unexpected status code from API: {}", status),
        ),
        ApiError::Parse(cause) => Diagnostic::error(
            "Failed to parse response",
            format!("Error occurred while parsing JSON: {}", cause),
        ),
        other => Diagnostic::error(
            "API request failed",
            format!("Error occurred while retrieving user information: {}", other),
        ),
    }
}

/// Inputs are echoed back as configured, outputs copied as returned
fn user_state(config: &Config, user: User) -> tfplug::State {
    let input = |name: &str| config.get(name).cloned().unwrap_or(Dynamic::Null);

    StateBuilder::new()
        .value("user_id", input("user_id"))
        .value("user_email", input("user_email"))
        .string("id", user.id)
        .string("email", user.email)
        .string("code", user.code)
        .string("first_name", user.first_name)
        .string("last_name", user.last_name)
        .string("full_name", user.full_name)
        .string("employee_id", user.employee_id)
        .string("status", user.status)
        .string("locale", user.locale)
        .string("created_at", user.created_at)
        .string("updated_at", user.updated_at)
        .string("deactivated_at", user.deactivated_at)
        .build()
}
