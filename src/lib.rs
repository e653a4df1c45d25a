//! Core library surface for the inventory manager TUI.
//!
//! The `bin` target only wires these pieces together; keeping them in the
//! library lets the integration tests drive the store and the settings file
//! directly.
pub mod db;
pub mod logging;
pub mod models;
pub mod paths;
pub mod settings;
pub mod ui;

/// Persistence layer: one handle per database file, one connection per call.
pub use db::{ProductStore, StorageError, StorageResult};

pub use models::{Column, ColumnKind, Product, ProductDraft, ProductQuery, SortDirection, SortOrder};

pub use settings::{Settings, SettingsError};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
