//! # Domain Models
//!
//! Pure types shared across the catalog workspace (`serde`, `bitflags` only).
//! No I/O, networking, or heavy logic here.

pub mod audit;
pub mod auth;
pub mod config;
pub mod constants;
pub mod price;
pub mod registry;
pub mod search;
