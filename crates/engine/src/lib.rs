pub mod batch;
pub mod export;
pub mod ngi;

pub use batch::{BatchRunner, RunHandle};
pub use ngi::NgiClient;
