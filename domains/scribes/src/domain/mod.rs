//! Scribes domain types and search rules

pub mod entities;
pub mod search;
