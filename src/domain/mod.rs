pub mod axis;
pub mod date_range;
pub mod progress;
pub mod weight_range;

pub use axis::*;
pub use date_range::*;
pub use progress::*;
pub use weight_range::*;
