//! Alias resolver feature

pub mod alias_table;

pub use alias_table::AliasTable;
