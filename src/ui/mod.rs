//! Ratatui front-end split across logical submodules: the event loop, the
//! central `App` state machine, form state, and screen state.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
