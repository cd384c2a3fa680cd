//! Quillpost - blog content backend
//!
//! Posts, categories and tags stored in SQLite or MySQL and served over a
//! JSON HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod normalize;
