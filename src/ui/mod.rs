//! Terminal user interface. Everything under this module is presentation:
//! it renders projections of the repositories and dispatches key presses as
//! intents into them, but owns no canonical state of its own.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
