//! Campus Hub Core - Shared types library.
//!
//! This crate provides common types used across all Campus Hub client
//! components:
//! - `client` - State stores and the hub API transport
//! - `cli` - Command-line surface for browsing, cart, and checkout
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
