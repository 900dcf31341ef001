//! Utilities shared by Nova tests.
//!
//! - [`ClassFileBuilder`] hand-assembles classfiles, including deliberately
//!   malformed ones.
//! - [`FixtureDir`] materializes source/class roots on disk.
//! - [`javac`] compiles real Java sources for differential tests (gated behind
//!   the `javac` feature; tests skip themselves when `javac` is not on `PATH`).

mod classfile_builder;

pub use classfile_builder::ClassFileBuilder;

#[cfg(feature = "fixture-fs")]
mod fixtures;

#[cfg(feature = "fixture-fs")]
pub use fixtures::FixtureDir;

#[cfg(feature = "javac")]
pub mod javac;
