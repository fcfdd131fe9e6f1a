//! Serializable drawing document.

use crate::element::{ElementId, Generator};
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved drawing: the live scene plus the element id counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: Uuid,
    /// Document name.
    pub name: String,
    pub scene: Scene,
    /// Next element id to hand out.
    #[serde(default)]
    pub next_id: ElementId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "Untitled".to_string(),
            scene: Scene::new(),
            next_id: 0,
        }
    }

    pub fn with_scene(name: impl Into<String>, scene: Scene, next_id: ElementId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            scene,
            next_id,
        }
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON and rebuild cached drawables.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut document: Self = serde_json::from_str(json)?;
        document.restore(&Generator::default());
        Ok(document)
    }

    /// Rebuild every cached drawable and make sure the id counter is past
    /// every id in the scene.
    pub fn restore(&mut self, generator: &Generator) {
        self.scene
            .for_each_mut(|element| element.rebuild_drawable(generator));
        if let Some(max) = self.scene.max_id() {
            self.next_id = self.next_id.max(max + 1);
        }
    }
}
