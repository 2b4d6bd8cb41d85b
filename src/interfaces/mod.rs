pub mod payment;
pub mod repositories;
