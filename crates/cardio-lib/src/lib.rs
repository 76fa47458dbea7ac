pub mod activity;
pub mod buffer;
pub mod comparison;
pub mod config;
pub mod detectors;
pub mod error;
pub mod io;
pub mod metrics;
pub mod monitor;
pub mod signal;
pub mod simulate;

pub use activity::*;
pub use buffer::*;
pub use comparison::*;
pub use config::*;
pub use detectors::*;
pub use error::CardioError;
pub use metrics::*;
pub use monitor::*;
pub use signal::*;
