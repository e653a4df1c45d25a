//! Persistence module split across logical submodules.

mod connection;
mod error;
mod products;

pub use connection::ProductStore;
pub use error::{StorageError, StorageResult};
