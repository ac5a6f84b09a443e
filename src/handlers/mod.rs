pub mod addresses;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod orders;
pub mod payment_methods;
pub mod reviews;
pub mod uploads;
