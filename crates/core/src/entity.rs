//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Entities are created before the store assigns them an identity, so the
/// identifier is optional until the owning aggregate has been persisted.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier, if it has been persisted.
    fn id(&self) -> Option<Self::Id>;

    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
}
