//! Mealbridge Core - Shared types library.
//!
//! This crate provides common types used across all Mealbridge components:
//! - `server` - HTTP backend (accounts, menu, cart, orders, payments)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and status enums
//! - [`pricing`] - Exact-decimal subtotal/tax/total computation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use types::*;
