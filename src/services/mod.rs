pub mod contest_service;
pub mod guard_service;
pub mod payment_service;
pub mod stats_service;
pub mod stripe_service;
pub mod token_service;
pub mod user_service;
