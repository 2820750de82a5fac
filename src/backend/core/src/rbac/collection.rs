//! Ordered entity collection shared by the four store collections.
//!
//! Entities keep insertion order. Lookups are linear, which matches the
//! admin-scale data this store holds and keeps the iteration order stable for
//! the permission resolution contract.

use serde::{Deserialize, Serialize};

use super::models::{Entity, Patch};

/// An insertion-ordered list of entities with unique ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<E> {
    items: Vec<E>,
}

impl<E> Default for Collection<E> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<E: Entity> Collection<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.items.iter()
    }

    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.items.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: &E::Id) -> bool {
        self.get(id).is_some()
    }

    /// Append an entity. The caller guarantees its id is not already present.
    pub(crate) fn push(&mut self, entity: E) {
        self.items.push(entity);
    }

    /// Draw ids from `mint` until one is unused in this collection.
    pub(crate) fn fresh_id(&self, mut mint: impl FnMut() -> E::Id) -> E::Id {
        loop {
            let id = mint();
            if !self.contains(&id) {
                return id;
            }
        }
    }

    /// Apply `patch` to the entity with `id`. Returns whether it was found.
    pub(crate) fn update<P: Patch<E>>(&mut self, id: &E::Id, patch: P) -> bool {
        match self.items.iter_mut().find(|e| e.id() == id) {
            Some(entity) => {
                patch.apply(entity);
                true
            }
            None => false,
        }
    }

    /// Remove the entity with `id`. Returns whether anything was removed.
    pub(crate) fn remove(&mut self, id: &E::Id) -> bool {
        let before = self.items.len();
        self.items.retain(|e| e.id() != id);
        self.items.len() != before
    }

    pub fn into_vec(self) -> Vec<E> {
        self.items
    }
}

impl<E: Entity> From<Vec<E>> for Collection<E> {
    fn from(items: Vec<E>) -> Self {
        Self { items }
    }
}

impl<'a, E> IntoIterator for &'a Collection<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::models::{NewPermission, Permission, PermissionId, PermissionPatch};

    fn perm(id: &str, name: &str) -> Permission {
        NewPermission::new(name, "d", "users", "view").into_permission(PermissionId::new(id))
    }

    #[test]
    fn test_preserves_insertion_order() {
        let mut c = Collection::new();
        c.push(perm("b", "second"));
        c.push(perm("a", "first"));
        let ids: Vec<_> = c.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_update_and_remove_report_presence() {
        let mut c = Collection::new();
        c.push(perm("1", "view_users"));

        assert!(c.update(&PermissionId::new("1"), PermissionPatch::default().name("x")));
        assert!(!c.update(&PermissionId::new("2"), PermissionPatch::default().name("y")));
        assert_eq!(c.get(&PermissionId::new("1")).unwrap().name, "x");

        assert!(c.remove(&PermissionId::new("1")));
        assert!(!c.remove(&PermissionId::new("1")));
        assert!(c.is_empty());
    }

    #[test]
    fn test_fresh_id_skips_taken() {
        let mut c = Collection::new();
        c.push(perm("1", "a"));
        let mut candidates = vec!["2", "1"];
        let id = c.fresh_id(|| PermissionId::new(candidates.pop().unwrap()));
        assert_eq!(id, PermissionId::new("2"));
    }
}
