pub mod jwt;
pub mod stripe;
pub mod validate_utils;
