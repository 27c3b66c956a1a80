//! Aggregate root trait for domain models persisted as one consistency unit.

use crate::entity::Entity;

/// Aggregate root marker.
///
/// An aggregate root owns child entities that are only ever loaded and saved
/// through it. Stores persist the whole aggregate in a single transaction.
pub trait AggregateRoot: Entity {
    /// Stable type name, used in logs and store errors.
    const AGGREGATE_TYPE: &'static str;
}
