//! Database initialization and shared table definitions

pub mod init;

pub use init::init_database;
