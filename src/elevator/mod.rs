pub mod elevator;
pub mod error;
pub mod registry;

pub use elevator::Elevator;
pub use error::{ElevatorError, ElevatorResult};
pub use registry::ElevatorRegistry;
