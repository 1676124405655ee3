//! Value object marker: equality by value, not identity.

/// Marker trait for value objects.
///
/// A value object has no identity. Two instances holding the same values are
/// the same thing, so callers clone before they mutate and never share a
/// mutable reference to a canonical instance.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
