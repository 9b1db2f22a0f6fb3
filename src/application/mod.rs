pub mod app;
pub mod cli;
pub mod config;
pub mod graph;

pub use app::*;
pub use cli::*;
pub use config::*;
pub use graph::*;
