pub mod models;
pub mod schema;
pub mod init;
pub mod queries;

pub use models::*;
pub use init::DbPool;
pub use queries::*;
