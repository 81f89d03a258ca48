pub mod contest;
pub mod outcome;
pub mod payment;
pub mod user;

pub use contest::*;
pub use outcome::*;
pub use payment::*;
pub use user::*;
