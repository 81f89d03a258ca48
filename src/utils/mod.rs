// Utility modules
pub mod error;
pub mod ids;

pub use error::*;
pub use ids::*;
