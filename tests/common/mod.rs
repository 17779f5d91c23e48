pub mod fixtures;
pub mod models;

pub use fixtures::*;
pub use models::*;
