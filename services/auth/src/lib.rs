pub mod config;
pub mod cookie;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod infra;
pub mod router;
pub mod state;
pub mod token;
pub mod usecase;
