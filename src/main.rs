//! Binary entry point: resolve the data directory, bring up logging and the
//! SQLite store, load the saved theme, and drive the Ratatui event loop until
//! the user exits.
use inventory_manager::logging::init_logging;
use inventory_manager::paths::AppPaths;
use inventory_manager::{run_app, App, ProductQuery, ProductStore, Settings};
use tracing::{info, warn};

/// Returning a `Result` bubbles fatal start-up problems (an unwritable data
/// directory, a corrupt database) to the terminal instead of crashing
/// silently. Errors during the session are shown in the status line instead.
fn main() -> anyhow::Result<()> {
    let paths = AppPaths::resolve()?;
    init_logging(&paths.log)?;
    info!(database = %paths.database.display(), "starting inventory manager");

    let settings = Settings::load_or_create(&paths.settings).unwrap_or_else(|err| {
        warn!(path = %paths.settings.display(), "{err}; using default settings");
        Settings::default()
    });

    let store = ProductStore::new(&paths.database);
    store.ensure_schema()?;
    store.verify_schema()?;
    let products = store.fetch(&ProductQuery::all())?;

    let mut app = App::new(store, products, settings, paths.settings);
    run_app(&mut app)
}
