//! Database bootstrap and schema

pub mod init;
pub mod schema;

pub use init::*;
pub use schema::*;
