pub mod live_service;

pub use live_service::{LiveSessionService, StreamEndpoints};
