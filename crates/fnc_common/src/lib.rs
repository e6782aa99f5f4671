//! Helpers shared between the fnc crates.

pub mod nom_helpers;
