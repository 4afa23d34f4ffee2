pub mod db;
pub mod models;
pub mod notes;
pub mod schema;
pub mod search;
pub mod users;
pub mod vector;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
