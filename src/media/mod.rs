/// Photo file handling
///
/// This module handles:
/// - Validating and reading picked photos into data URLs
/// - Writing restored images back to disk

pub mod decoder;
pub mod download;
