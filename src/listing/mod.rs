// src/listing/mod.rs
// =============================================================================
// This module reads autoindex listing pages.
//
// Submodules:
// - parse: Extracts (name, is_directory) entries from listing HTML
// - fetch: Downloads a listing page through the Transport and parses it
// =============================================================================

mod fetch;
mod parse;

pub use fetch::fetch_entries;
pub use parse::Entry;
