//! Application layer for the catalog.

pub mod load_handlers;
