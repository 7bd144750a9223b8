pub mod assets;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod storage;
pub mod templates;

pub use db::create_pool;
