pub mod connection;
pub mod migration;
pub mod raw_transaction;
pub mod swap;
