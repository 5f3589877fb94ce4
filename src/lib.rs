pub mod app;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod state;
pub mod ui;
pub mod util;

pub use config::PanelConfig;
pub use dispatch::{DebitPolicy, Dispatcher, PipeCommand, PipeProperty};
pub use state::{ApplicationState, PipeName, PipeState, StateStore};
