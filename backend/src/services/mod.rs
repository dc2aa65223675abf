//! Module for core business logic services.

pub mod catalog;

pub use catalog::Catalog;
