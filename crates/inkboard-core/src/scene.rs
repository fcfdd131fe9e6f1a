//! The ordered element collection.

use crate::element::{Element, ElementId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Ordered sequence of elements, back to front.
///
/// Elements are shared between clones: cloning a scene for a history
/// snapshot copies pointers, and mutation goes through [`Arc::make_mut`] so
/// stored snapshots never observe later edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scene {
    elements: Vec<Arc<Element>>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        Self {
            elements: elements.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in draw order (back to front).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.elements.iter().map(AsRef::as_ref)
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.iter().map(|e| e.id)
    }

    /// Sequence index of the element with `id`.
    pub fn position(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id).map(AsRef::as_ref)
    }

    /// Mutable access, cloning the element first if a snapshot shares it.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .map(Arc::make_mut)
    }

    /// The topmost element.
    pub fn last(&self) -> Option<&Element> {
        self.elements.last().map(AsRef::as_ref)
    }

    /// Append an element on top.
    pub fn push(&mut self, element: Element) {
        self.elements.push(Arc::new(element));
    }

    /// Replace the element with the same id in place.
    /// Returns false if no such element exists.
    pub fn replace(&mut self, element: Element) -> bool {
        match self.position(element.id) {
            Some(index) => {
                self.elements[index] = Arc::new(element);
                true
            }
            None => false,
        }
    }

    /// Replace the element with the same id, or append it on top.
    pub fn upsert(&mut self, element: Element) {
        if let Some(index) = self.position(element.id) {
            self.elements[index] = Arc::new(element);
        } else {
            self.push(element);
        }
    }

    /// Remove an element, keeping the order of the others.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let index = self.position(id)?;
        let removed = self.elements.remove(index);
        Some(Arc::unwrap_or_clone(removed))
    }

    /// Largest id in the scene.
    pub fn max_id(&self) -> Option<ElementId> {
        self.ids().max()
    }

    /// Apply `f` to every element, sharing nothing with previous snapshots
    /// for the elements it touches.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Element)) {
        for element in &mut self.elements {
            f(Arc::make_mut(element));
        }
    }
}
