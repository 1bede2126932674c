//! PFG Chapati Core - Shared types library.
//!
//! This crate provides common types used across the ordering components:
//! - `ordering` - Cart store, contact rotation, order messages, offline cache
//! - `cli` - Command-line driver for the ordering flow
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, phone numbers, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
