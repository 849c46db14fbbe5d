pub mod service;

pub use service::{start, DriveMode, RunningService, ServiceError, ServiceHandle};
