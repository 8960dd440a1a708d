pub mod buckets;
pub mod engine;
pub mod queries;
pub mod rankings;

pub use buckets::*;
pub use engine::*;
pub use queries::*;
pub use rankings::*;
