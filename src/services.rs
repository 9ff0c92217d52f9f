pub mod auth;
pub mod catalog_service;
pub mod sync_service;
