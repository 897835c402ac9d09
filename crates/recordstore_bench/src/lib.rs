//! Benchmark support for recordstore.

#![warn(missing_docs)]

pub mod utils;
