//! Mealbridge server library.
//!
//! Exposed as a library so the CLI (migrations, seeding) can reuse the
//! repositories and models; the binary entry point lives in `main.rs`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
