pub mod config;
pub mod error;
pub mod locations;
pub mod provider;
pub mod types;

pub use config::{Config, CurveSource};
pub use error::{Error, Result};
pub use locations::{Location, Region};
pub use provider::ForwardCurveProvider;
pub use types::*;
