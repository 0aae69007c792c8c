pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod memory;
pub mod rate_limit;
pub mod state;
pub mod watchlist;
