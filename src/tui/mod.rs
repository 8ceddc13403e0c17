pub mod app;
pub mod input;
pub mod markdown;
pub mod render;
pub mod theme;

pub use app::run;
