/// Custom widgets
///
/// - `compare.rs` - before/after comparison slider

pub mod compare;
