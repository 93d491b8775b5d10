//! Host process bootstrap: logging initialization and signal handling.

pub mod logging;
pub mod signals;

pub use logging::*;
pub use signals::*;
