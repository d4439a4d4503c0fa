/// State management module
///
/// This module handles all application state, including:
/// - Images and data URL handling (data.rs)
/// - The upload / preview / processing / result workflow (session.rs)

pub mod data;
pub mod session;
