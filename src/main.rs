//! Binary entry point that glues the SQLite-backed customer store to the TUI.
//! The bootstrapping pipeline is short: open the store (creating the schema
//! on first use), load the current customer set, and drive the Ratatui event
//! loop until the user exits.
use customer_manager::{run_app, App, CustomerStore};

/// Initialize persistence, load the customer list, and launch the Ratatui
/// event loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for example
/// an unwritable home directory) to the terminal instead of crashing silently.
fn main() -> anyhow::Result<()> {
    let store = CustomerStore::open()?;
    let customers = store.list_all()?;

    let mut app = App::new(store, customers);
    run_app(&mut app)
}
