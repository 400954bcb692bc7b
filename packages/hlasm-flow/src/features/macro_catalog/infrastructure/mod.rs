//! Macro catalog infrastructure

pub mod catalog_builder;

pub use catalog_builder::MacroCatalogBuilder;
