pub mod chart;
pub mod cli;
pub mod config;
pub mod delta;
pub mod error;
pub mod fetch;
pub mod history;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod store;
pub mod util;

pub use error::{Error, Result};
