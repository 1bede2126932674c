//! PFG Chapati ordering library.
//!
//! Everything behind the ordering page: the persisted cart, WhatsApp order
//! messages with round-robin contact selection, checkout, location
//! detection, and the offline asset cache. [`page::OrderPage`] ties the
//! pieces together.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod message;
pub mod notify;
pub mod offline;
pub mod page;
pub mod profile;
pub mod rotation;
pub mod sidebar;
pub mod storage;

pub use config::OrderingConfig;
pub use error::{OrderingError, Result};
pub use page::OrderPage;
