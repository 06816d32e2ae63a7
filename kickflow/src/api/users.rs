use serde::{Deserialize, Deserializer};

use super::client::Client;
use super::error::ApiError;

/// A Kickflow user as returned by the users API
///
/// Absent or `null` fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub employee_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub locale: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub updated_at: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub deactivated_at: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// How a user is located
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Id(String),
    Email(String),
}

impl UserLookup {
    pub fn path(&self) -> &'static str {
        match self {
            UserLookup::Id(_) => "/users",
            UserLookup::Email(_) => "/lookupByEmail",
        }
    }

    pub fn query(&self) -> [(&'static str, &str); 1] {
        match self {
            UserLookup::Id(id) => [("userId", id.as_str())],
            UserLookup::Email(email) => [("email", email.as_str())],
        }
    }
}

impl Client {
    pub async fn get_user(&self, lookup: &UserLookup) -> Result<User, ApiError> {
        tracing::debug!("Looking up user by {:?}", lookup);
        self.get_json(lookup.path(), &lookup.query()).await
    }
}
