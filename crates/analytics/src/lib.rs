//! # Simdeck Analytics
//!
//! Turns raw simulation output into data a chart or table can show.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of the
//!   network or of storage. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every operation is a plain function of its
//!   inputs, which makes the crate easy to test in isolation.
//!
//! ## Public API
//!
//! - `validate` / `validate_batch`: schema checks for raw result records.
//! - `align`: merges date-keyed series onto one shared date axis.
//! - `histogram`: equal-width frequency buckets for a sample set.
//! - `color_for`: stable series colours from a fixed palette.
//! - `Rejection`: why a record failed validation.

// Declare the modules that constitute this crate.
pub mod aligner;
pub mod error;
pub mod histogram;
pub mod palette;
pub mod validator;

// Re-export the key components to create a clean, public-facing API.
pub use aligner::{DEFAULT_PRECISION, align};
pub use error::Rejection;
pub use histogram::{DEFAULT_BUCKETS, histogram};
pub use palette::{PALETTE, color_for, rgb};
pub use validator::{validate, validate_batch};
