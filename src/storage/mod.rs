pub mod models;
mod queries;
mod sqlite;

pub use models::Fingerprint;
pub use sqlite::Database;
