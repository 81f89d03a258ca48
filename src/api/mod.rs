pub mod auth;
pub mod contests;
pub mod health;
pub mod payments;
pub mod stats;
pub mod swagger;
pub mod users;
