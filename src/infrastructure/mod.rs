pub mod diagnostics;
pub mod duckdb_storage;
pub mod hooks;
pub mod latency;
pub mod plugins;
pub mod storage;

#[cfg(test)]
pub mod test_utils;

pub use diagnostics::*;
pub use duckdb_storage::*;
pub use hooks::*;
pub use latency::*;
pub use plugins::*;
pub use storage::*;
