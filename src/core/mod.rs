// Spellbook - core/mod.rs
//
// Core business logic: parsing, classification, filtering, detail
// formatting, export. Pure functions of their inputs, no network access.

pub mod classify;
pub mod detail;
pub mod export;
pub mod filter;
pub mod model;
pub mod parser;
