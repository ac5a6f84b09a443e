pub mod address;
pub mod catalog;
pub mod client;
pub mod order;
pub mod payment_method;
pub mod review;
pub mod user;
