//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; an
/// [`EmailAddress`](crate::EmailAddress) is one, an expense record (which has
/// an id) is not.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
