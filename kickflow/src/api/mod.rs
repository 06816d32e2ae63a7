mod client;
mod error;
mod users;

pub use client::{Client, CALLER_ID_HEADER};
pub use error::ApiError;
pub use users::{User, UserLookup};
