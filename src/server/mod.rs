pub mod params;
pub mod server;
mod server_tests;

pub use params::{ParamError, Params};
pub use server::{router, run, AppState};
