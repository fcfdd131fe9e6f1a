//! Linear undo/redo over scene snapshots.

use crate::element::ElementId;
use crate::scene::Scene;

/// Present and future snapshot stacks.
///
/// The top of `present` is always the live scene. The bottom entry is the
/// initial state and is never undone.
#[derive(Debug, Clone)]
pub struct History {
    present: Vec<Scene>,
    future: Vec<Scene>,
    /// Redo stack cleared by the latest push, restored if that push is
    /// withdrawn.
    cleared_future: Vec<Scene>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Scene::new())
    }
}

impl History {
    /// Start a history whose initial state is `initial`.
    pub fn new(initial: Scene) -> Self {
        Self {
            present: vec![initial],
            future: Vec::new(),
            cleared_future: Vec::new(),
        }
    }

    /// The live scene.
    pub fn current(&self) -> &Scene {
        // `present` is never empty: it starts with one entry and undo stops at one.
        &self.present[self.present.len() - 1]
    }

    /// Number of entries on the present stack, initial state included.
    pub fn depth(&self) -> usize {
        self.present.len()
    }

    pub fn can_undo(&self) -> bool {
        self.present.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// The entry below the live scene.
    pub fn previous(&self) -> Option<&Scene> {
        let len = self.present.len();
        (len > 1).then(|| &self.present[len - 2])
    }

    /// Record `scene` as the live state.
    ///
    /// With `overwrite` the top entry is replaced in place; otherwise the
    /// scene is pushed and the redo stack cleared. Pushing a scene equal to
    /// the top is skipped. Returns true if the depth changed.
    pub fn commit(&mut self, scene: Scene, overwrite: bool) -> bool {
        if overwrite {
            let last = self.present.len() - 1;
            self.present[last] = scene;
            return false;
        }
        if *self.current() == scene {
            return false;
        }
        self.present.push(scene);
        self.cleared_future = std::mem::take(&mut self.future);
        true
    }

    /// Step back one entry. Returns false at the initial state.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        if let Some(scene) = self.present.pop() {
            self.future.push(scene);
        }
        self.cleared_future.clear();
        true
    }

    /// Re-apply the most recently undone entry. Returns false if none.
    pub fn redo(&mut self) -> bool {
        match self.future.pop() {
            Some(scene) => {
                self.present.push(scene);
                self.cleared_future.clear();
                true
            }
            None => false,
        }
    }

    /// Drop the top entry if it equals the one below it.
    ///
    /// A gesture that ends where it started leaves such a duplicate behind.
    /// The redo stack its push cleared comes back.
    pub fn collapse_duplicate_top(&mut self) -> bool {
        if self.previous().is_some_and(|below| below == self.current()) {
            return self.withdraw_top();
        }
        false
    }

    /// Drop the top entry without making it redoable, restoring the redo
    /// stack it cleared. Returns false at the initial state.
    pub fn withdraw_top(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.present.pop();
        if self.future.is_empty() {
            self.future = std::mem::take(&mut self.cleared_future);
        }
        self.cleared_future.clear();
        true
    }

    /// Remove element `id` from every entry since it appeared, dropping
    /// entries that are left identical to the one below.
    pub fn erase_element(&mut self, id: ElementId) {
        let first = self
            .present
            .iter()
            .rposition(|scene| !scene.contains(id))
            .map_or(0, |index| index + 1);
        for scene in &mut self.present[first..] {
            scene.remove(id);
        }
        let mut index = first.max(1);
        while index < self.present.len() {
            if self.present[index] == self.present[index - 1] {
                self.present.remove(index);
            } else {
                index += 1;
            }
        }
    }

    /// Drop all entries and start over from `scene`.
    pub fn reset(&mut self, scene: Scene) {
        log::info!("history reset ({} elements)", scene.len());
        self.present = vec![scene];
        self.future.clear();
        self.cleared_future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, StyleOverrides, create_element};
    use kurbo::Point;

    fn scene_with(count: u64) -> Scene {
        Scene::from_elements((0..count).map(|id| {
            create_element(
                id,
                Point::new(0.0, 0.0),
                Point::new(10.0, 10.0),
                ElementKind::Rectangle,
                &StyleOverrides::none(),
            )
        }))
    }

    #[test]
    fn test_undo_at_initial_state_is_noop() {
        let mut history = History::default();
        assert!(!history.undo());
        assert!(!history.redo());
        assert_eq!(history.depth(), 1);
        assert!(history.current().is_empty());
    }

    #[test]
    fn test_push_and_undo_redo() {
        let mut history = History::default();
        assert!(history.commit(scene_with(1), false));
        assert!(history.commit(scene_with(2), false));
        assert_eq!(history.depth(), 3);

        assert!(history.undo());
        assert_eq!(history.current().len(), 1);
        assert!(history.can_redo());

        assert!(history.redo());
        assert_eq!(history.current(), &scene_with(2));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_overwrite_replaces_top() {
        let mut history = History::default();
        history.commit(scene_with(1), false);
        for _ in 0..50 {
            assert!(!history.commit(scene_with(2), true));
        }
        assert_eq!(history.depth(), 2);
        assert_eq!(history.current().len(), 2);
    }

    #[test]
    fn test_duplicate_push_skipped() {
        let mut history = History::default();
        history.commit(scene_with(1), false);
        assert!(!history.commit(scene_with(1), false));
        assert_eq!(history.depth(), 2);
    }

    #[test]
    fn test_new_commit_clears_future() {
        let mut history = History::default();
        history.commit(scene_with(1), false);
        history.commit(scene_with(2), false);
        history.undo();
        history.commit(scene_with(3), false);
        assert!(!history.can_redo());
        assert!(!history.redo());
    }

    #[test]
    fn test_snapshots_are_isolated() {
        let mut history = History::default();
        history.commit(scene_with(1), false);
        let mut live = history.current().clone();
        live.get_mut(0).unwrap().bounds.x1 = 99.0;
        history.commit(live, false);
        history.undo();
        assert_eq!(history.current().get(0).unwrap().bounds.x1, 10.0);
    }

    #[test]
    fn test_collapse_duplicate_top() {
        let mut history = History::default();
        history.commit(scene_with(1), false);
        history.commit(scene_with(2), false);
        history.commit(scene_with(1), true);
        assert!(history.collapse_duplicate_top());
        assert_eq!(history.depth(), 2);
        assert!(!history.collapse_duplicate_top());
    }

    #[test]
    fn test_collapse_restores_redo() {
        let mut history = History::default();
        history.commit(scene_with(1), false);
        history.commit(scene_with(2), false);
        history.undo();

        // A gesture pushes a change, then returns to where it started.
        history.commit(scene_with(3), false);
        assert!(!history.can_redo());
        history.commit(scene_with(1), true);
        assert!(history.collapse_duplicate_top());

        assert_eq!(history.depth(), 2);
        assert!(history.redo());
        assert_eq!(history.current(), &scene_with(2));
    }

    #[test]
    fn test_withdraw_top() {
        let mut history = History::default();
        assert!(!history.withdraw_top());
        history.commit(scene_with(1), false);
        history.commit(scene_with(2), false);
        assert!(history.withdraw_top());
        assert_eq!(history.current(), &scene_with(1));
        assert!(!history.can_redo());
        assert_eq!(history.previous().map(Scene::len), Some(0));
    }

    #[test]
    fn test_erase_element_drops_emptied_entries() {
        let mut history = History::default();
        history.commit(scene_with(1), false);
        history.commit(scene_with(2), false);
        let mut edited = scene_with(2);
        edited.get_mut(1).unwrap().bounds.x1 = 40.0;
        history.commit(edited, false);
        assert_eq!(history.depth(), 4);

        history.erase_element(1);
        assert_eq!(history.depth(), 2);
        assert_eq!(history.current(), &scene_with(1));
        history.undo();
        assert!(history.current().is_empty());
    }

    #[test]
    fn test_undo_forgets_cleared_redo() {
        let mut history = History::default();
        history.commit(scene_with(1), false);
        history.commit(scene_with(2), false);
        history.undo();
        history.commit(scene_with(3), false);
        history.undo();
        history.redo();
        history.commit(scene_with(1), true);
        assert!(history.collapse_duplicate_top());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_reset() {
        let mut history = History::default();
        history.commit(scene_with(1), false);
        history.reset(scene_with(3));
        assert_eq!(history.depth(), 1);
        assert!(!history.can_undo());
        assert_eq!(history.current().len(), 3);
    }
}
