pub mod config;
pub mod error;
pub mod event;
pub mod handle;
pub mod probe;
pub mod reactor;
pub mod resource;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod telemetry;
