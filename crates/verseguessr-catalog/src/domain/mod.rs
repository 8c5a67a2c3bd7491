//! Domain layer for the catalog.

pub mod catalog;
