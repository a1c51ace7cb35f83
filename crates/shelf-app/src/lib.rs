pub mod catalog;
pub mod error;
pub mod rest_api;
pub mod state;
pub mod status;
pub mod validate;
