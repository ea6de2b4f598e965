//! Database ID type definition.

/// Alias for the integer type used for mapping to database IDs.
///
/// Local-fallback records created while the store is unreachable use negative
/// values so they can never collide with store-assigned IDs.
pub type DatabaseId = i64;
