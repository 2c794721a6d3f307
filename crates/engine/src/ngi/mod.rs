pub mod rest;

pub use rest::NgiClient;
