//! Kernel utilities shared across slices.
//! Keep this crate lightweight: it holds the web plumbing every slice needs
//! (state, problem-details errors, extractors, config loading) and no business rules.
//!
//! ## ID generation
//! Use `safe_nanoid!` for URL-safe, unambiguous IDs:
//! ```rust
//! # use catalog_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! ## Config loading
//! ```rust,no_run
//! use catalog_kernel::config::load_config;
//! use catalog_kernel::domain::config::AppConfigInner;
//!
//! let cfg: AppConfigInner =
//!     load_config(Some("config/catalog.toml"), &["audit", "identity", "products"]).unwrap();
//! ```
pub mod config;
pub mod security;
pub mod server;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use catalog_domain as domain;
pub use catalog_domain::registry;
pub use nanoid::nanoid;

/// Generates an unambiguous `NanoID` (no visually confusing characters).
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}
