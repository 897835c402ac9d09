//! # recordstore testkit
//!
//! Test utilities for recordstore.
//!
//! This crate provides:
//! - Test fixtures: containers wired to a change feed, common schemas
//! - Property-based test generators using proptest
//! - Cross-crate integration helpers that keep a catalog in step with
//!   containers
//! - Fuzz testing harnesses
//!
//! ## Usage
//!
//! ```rust
//! use recordstore_testkit::prelude::*;
//!
//! let mut test = scenarios::populated_container(3);
//! let uid = test.keys()[2];
//! test.reorder(&uid, 0).unwrap();
//! assert_eq!(test.keys()[0], uid);
//! assert_container_consistent(&test);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use integration::*;
