// Spellbook - app/mod.rs
//
// Application layer: export retrieval and caller-held state.
// Dependencies: core, platform.

pub mod fetch;
pub mod state;
