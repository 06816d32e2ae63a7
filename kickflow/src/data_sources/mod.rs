pub mod user;

pub use user::UserDataSource;
