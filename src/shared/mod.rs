pub mod macros;
pub mod structs;

pub use structs::Behaviour;
pub use structs::ElevatorId;
pub use structs::ElevatorSpec;
pub use structs::ElevatorStatus;
pub use structs::Floor;
