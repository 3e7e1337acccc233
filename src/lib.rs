// Public API for integration tests and potential library usage

pub mod api;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod questions;
pub mod state;
pub mod types;

pub use error::{ErrorKind, GameError, GameResult};
pub use state::AppState;
