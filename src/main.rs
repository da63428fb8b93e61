//! Binary entry point that glues the store-backed domain model to the TUI.
//! Summarizing the bootstrapping pipeline here keeps the intent obvious when
//! revisiting the code: we set up logging, open the durable store (falling
//! back to an ephemeral one), hydrate the two repositories, and drive the
//! Ratatui event loop until the user exits.
use book_loan_manager::{
    run_app, App, BookRepository, LoanLedger, MemoryStore, SqliteStore, StoreAdapter,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Initialize persistence, load cached data, and launch the Ratatui event
/// loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for example
/// a broken terminal) to the shell instead of crashing silently. A store that
/// cannot be opened is deliberately not fatal: the session degrades to an
/// in-memory store and everything except durability keeps working.
fn main() -> anyhow::Result<()> {
    // The TUI owns stdout, so diagnostics go to stderr; redirect it to a file
    // to capture them alongside an interactive session.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let store: Box<dyn StoreAdapter> = match SqliteStore::open_default() {
        Ok(store) => Box::new(store),
        Err(err) => {
            warn!(error = %err, "durable store unavailable, running ephemeral session");
            Box::new(MemoryStore::new())
        }
    };

    let books = BookRepository::load_initial(store.as_ref());
    let loans = LoanLedger::load_initial(store.as_ref());

    let mut app = App::new(store, books, loans);
    run_app(&mut app)
}
