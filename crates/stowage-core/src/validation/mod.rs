//! Validation modules

pub mod filename;

pub use filename::{secure_filename, split_extension};
