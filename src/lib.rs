//! Core library surface for the Book Loan Manager TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces. Keeping the glue logic documented makes it easy to recall why each
//! re-export exists when revisiting the project.
pub mod catalog;
pub mod loans;
pub mod models;
pub mod store;
pub mod ui;
pub mod views;

/// The persistence boundary: one trait, two backends, two fixed keys.
pub use store::{MemoryStore, SqliteStore, StoreAdapter, StoreError};

/// The two canonical state owners hydrated at session start.
pub use catalog::BookRepository;
pub use loans::LoanLedger;

/// The primary domain types that other layers manipulate.
pub use models::{Book, BookDraft, BookPatch, Loan};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
