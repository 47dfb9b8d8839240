// src/lib.rs
pub mod api;
pub mod error;
pub mod models;
pub mod quotes;
pub mod valuation;
