//! Ratatui front-end: a product table with an entry form, search bar and
//! status line layered on top.

mod app;
mod forms;
mod helpers;
mod terminal;
mod theme;

pub use app::App;
pub use forms::ValidationError;
pub use terminal::run_app;
pub use theme::Theme;
