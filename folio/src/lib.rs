//! Portfolio site server library
//!
//! Public portfolio pages plus a token-gated admin area for editing their
//! content. The binary entry point is in main.rs.

pub mod admin;
pub mod cache;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod server;
pub mod site;
mod sql;
pub mod state;
pub mod store;
