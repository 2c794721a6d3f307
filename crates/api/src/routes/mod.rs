mod forward;
mod health;
mod locations;
mod strips;

pub use forward::forward_router;
pub use health::health_router;
pub use locations::locations_router;
pub use strips::strips_router;
