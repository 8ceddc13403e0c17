pub mod config;
pub mod fields;
pub mod project;
pub mod task;

pub use config::*;
pub use fields::*;
pub use project::*;
pub use task::*;
