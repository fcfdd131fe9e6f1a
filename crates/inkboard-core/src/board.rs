//! The interaction state machine.
//!
//! A [`Board`] owns the live scene (the top of its [`History`]), the view
//! transform and the transient interaction state. Every pointer, keyboard
//! and panel event is processed to completion, history commit included,
//! before the next one.

use crate::camera::Camera;
use crate::config::BoardConfig;
use crate::document::Document;
use crate::element::{
    Element, ElementBody, ElementFactory, ElementId, ElementKind, Generator, StyleOverrides,
};
use crate::error::{BoardError, BoardResult};
use crate::geometry::{
    CursorStyle, Handle, HitPosition, HitTolerances, adjust_element_coordinates,
    cursor_for_position, element_at, needs_normalization, resized_coordinates,
};
use crate::history::History;
use crate::input::{InputEvent, KeyboardState, PointerButton, Shortcut, shortcut_for};
use crate::scene::Scene;
use crate::sync::{Relay, RelayMessage, SyncError};
use crate::text::{ApproxTextMeasure, TextMeasure};
use crate::tools::{Action, Tool};
use kurbo::{Point, Size, Vec2};
use uuid::Uuid;

/// Where the pointer grabbed the element being moved.
#[derive(Debug, Clone)]
enum Grab {
    /// Pointer minus the element's first corner.
    Offset(Vec2),
    /// Pointer minus each freehand point.
    Points(Vec<Vec2>),
}

/// Context of the gesture in progress.
#[derive(Debug, Clone)]
struct GestureState {
    /// World point at pointer-down.
    start_point: Point,
    grab: Grab,
    /// The handle being dragged while resizing.
    handle: Option<Handle>,
    /// The element as it was at pointer-down.
    original: Option<Element>,
    /// Whether this gesture has pushed its history entry yet.
    committed: bool,
}

impl GestureState {
    fn at(start_point: Point) -> Self {
        Self {
            start_point,
            grab: Grab::Offset(Vec2::ZERO),
            handle: None,
            original: None,
            committed: false,
        }
    }

    fn offset(&self) -> Vec2 {
        match self.grab {
            Grab::Offset(offset) => offset,
            Grab::Points(_) => Vec2::ZERO,
        }
    }
}

/// A drawing board: scene, history, camera and interaction state.
pub struct Board {
    history: History,
    camera: Camera,
    config: BoardConfig,
    factory: ElementFactory,
    tolerances: HitTolerances,
    tool: Tool,
    tool_style: StyleOverrides,
    action: Action,
    selected: Option<ElementId>,
    gesture: Option<GestureState>,
    keys: KeyboardState,
    cursor: CursorStyle,
    next_id: ElementId,
    text_measure: Box<dyn TextMeasure>,
    outbox: Vec<RelayMessage>,
    document_id: Uuid,
    document_name: String,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("document_id", &self.document_id)
            .field("elements", &self.scene().len())
            .field("history_depth", &self.history.depth())
            .field("tool", &self.tool)
            .field("action", &self.action)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl Board {
    /// Create an empty board.
    pub fn new(config: BoardConfig) -> Self {
        let factory = ElementFactory::new(Generator::new(config.roughness))
            .with_default_style(config.default_style.clone());
        Self {
            history: History::default(),
            camera: Camera::with_limits(config.viewport, config.min_zoom, config.max_zoom),
            tolerances: config.tolerances(),
            factory,
            config,
            tool: Tool::default(),
            tool_style: StyleOverrides::none(),
            action: Action::None,
            selected: None,
            gesture: None,
            keys: KeyboardState::new(),
            cursor: CursorStyle::Default,
            next_id: 0,
            text_measure: Box::new(ApproxTextMeasure::default()),
            outbox: Vec::new(),
            document_id: Uuid::new_v4(),
            document_name: "Untitled".to_string(),
        }
    }

    /// Use `measure` for text commits instead of the approximate metric.
    pub fn with_text_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.text_measure = Box::new(measure);
        self
    }

    /// Open a saved document. Its scene becomes the initial history state.
    pub fn from_document(mut document: Document, config: BoardConfig) -> Self {
        let mut board = Self::new(config);
        document.restore(board.factory.generator());
        log::info!(
            "Opened document {} ({} elements)",
            document.id,
            document.scene.len()
        );
        board.history.reset(document.scene);
        board.next_id = document.next_id;
        board.document_id = document.id;
        board.document_name = document.name;
        board
    }

    /// Snapshot of the live scene as a document.
    pub fn to_document(&self) -> Document {
        Document {
            id: self.document_id,
            name: self.document_name.clone(),
            scene: self.scene().clone(),
            next_id: self.next_id,
        }
    }

    // --- Queries ---

    /// The live scene.
    pub fn scene(&self) -> &Scene {
        self.history.current()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn factory(&self) -> &ElementFactory {
        &self.factory
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.and_then(|id| self.scene().get(id))
    }

    /// Look up an element of the live scene.
    pub fn element(&self, id: ElementId) -> BoardResult<&Element> {
        self.scene().get(id).ok_or(BoardError::StaleReference(id))
    }

    /// The text element whose editor is open. Renderers hide it.
    pub fn editing_element(&self) -> Option<&Element> {
        if self.action == Action::Writing {
            self.selected_element()
        } else {
            None
        }
    }

    /// Cursor the host should show.
    pub fn hover_cursor(&self) -> CursorStyle {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_depth(&self) -> usize {
        self.history.depth()
    }

    pub fn keyboard(&self) -> &KeyboardState {
        &self.keys
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    // --- Commands ---

    /// Switch tools. Any gesture in progress is dropped.
    pub fn set_tool(&mut self, tool: Tool) {
        log::debug!("Tool {} -> {}", self.tool, tool);
        self.tool = tool;
        self.reset_interaction();
        self.cursor = match tool {
            Tool::Eraser => CursorStyle::Crosshair,
            _ => CursorStyle::Default,
        };
    }

    /// Style overrides applied to elements created from now on.
    pub fn set_tool_style(&mut self, style: StyleOverrides) {
        self.tool_style = style;
    }

    pub fn tool_style(&self) -> &StyleOverrides {
        &self.tool_style
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.camera.set_viewport(viewport);
    }

    pub fn zoom(&mut self, delta: f64) {
        self.camera.zoom(delta);
    }

    pub fn zoom_in(&mut self) {
        self.camera.zoom(self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.camera.zoom(-self.config.zoom_step);
    }

    pub fn reset_zoom(&mut self) {
        self.camera.reset_zoom();
    }

    /// Step back one history entry. Returns false at the initial state.
    ///
    /// With an empty text editor open, only the editor and its element go.
    pub fn undo(&mut self) -> bool {
        if self.discard_unwritten_text() {
            return true;
        }
        self.reset_interaction();
        if !self.history.undo() {
            return false;
        }
        log::debug!("Undo, history depth {}", self.history.depth());
        self.enqueue(RelayMessage::SceneReplace {
            scene: self.scene().clone(),
        });
        true
    }

    /// Re-apply the last undone entry. Returns false if there is none.
    pub fn redo(&mut self) -> bool {
        self.reset_interaction();
        if !self.history.redo() {
            return false;
        }
        log::debug!("Redo, history depth {}", self.history.depth());
        self.enqueue(RelayMessage::SceneReplace {
            scene: self.scene().clone(),
        });
        true
    }

    pub fn key_down(&mut self, key: &str) {
        self.keys.press(key);
        match shortcut_for(key, self.keys.modifiers()) {
            Some(Shortcut::Undo) => {
                self.undo();
            }
            Some(Shortcut::Redo) => {
                self.redo();
            }
            None => {}
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.release(key);
    }

    /// Scroll: zoom while Ctrl/Cmd is held, pan otherwise.
    pub fn wheel(&mut self, dx: f64, dy: f64) {
        if self.keys.modifiers().platform() {
            self.camera.zoom(-dy * self.config.wheel_zoom_factor);
        } else {
            self.camera.pan_by_wheel(dx, dy);
        }
    }

    // --- Pointer state machine ---

    /// Start a gesture at a screen point.
    pub fn pointer_down(&mut self, screen_point: Point, button: PointerButton) -> BoardResult<()> {
        if self.action == Action::Writing {
            return Ok(());
        }
        let point = self.camera.screen_to_world(screen_point);

        if self.tool == Tool::Pan || button == PointerButton::Middle || self.keys.space_held() {
            self.action = Action::Panning;
            self.gesture = Some(GestureState::at(point));
            self.cursor = CursorStyle::Grabbing;
            log::debug!("Panning from {:?}", point);
            return Ok(());
        }

        match self.tool {
            Tool::Selection => self.begin_manipulation(point),
            Tool::Eraser => self.erase_at(point),
            tool => self.begin_drawing(point, tool),
        }
    }

    fn begin_manipulation(&mut self, point: Point) -> BoardResult<()> {
        let hit = element_at(point, self.scene(), &self.tolerances)
            .map(|hit| (hit.element.clone(), hit.position));
        let Some((element, position)) = hit else {
            self.selected = None;
            return Ok(());
        };

        let grab = match element.points() {
            Some(points) => Grab::Points(points.iter().map(|p| point - *p).collect()),
            None => Grab::Offset(point - element.start()),
        };
        let handle = match position {
            HitPosition::Inside => None,
            HitPosition::Handle(handle) => Some(handle),
        };
        self.action = if handle.is_some() {
            Action::Resizing
        } else {
            Action::Moving
        };
        log::debug!("{:?} element {} at {:?}", self.action, element.id, point);
        self.selected = Some(element.id);
        self.gesture = Some(GestureState {
            start_point: point,
            grab,
            handle,
            original: Some(element),
            committed: false,
        });
        Ok(())
    }

    fn erase_at(&mut self, point: Point) -> BoardResult<()> {
        let Some(id) = element_at(point, self.scene(), &self.tolerances).map(|hit| hit.element.id)
        else {
            return Ok(());
        };
        let mut scene = self.scene().clone();
        scene.remove(id);
        self.commit(scene, false, RelayMessage::ElementRemoved { id });
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.action = Action::None;
        log::debug!("Erased element {}", id);
        Ok(())
    }

    fn begin_drawing(&mut self, point: Point, tool: Tool) -> BoardResult<()> {
        let id = self.next_id;
        let element = self
            .factory
            .create_for_tool(id, point, point, tool, &self.tool_style)?;
        self.next_id += 1;

        let mut scene = self.scene().clone();
        scene.push(element.clone());
        self.commit(scene, false, RelayMessage::ElementPatch { element });

        self.selected = Some(id);
        self.action = if tool == Tool::Text {
            Action::Writing
        } else {
            Action::Drawing
        };
        let mut gesture = GestureState::at(point);
        gesture.committed = true;
        self.gesture = Some(gesture);
        log::debug!("{:?} new {} {}", self.action, tool, id);
        Ok(())
    }

    /// Continue the gesture in progress, or update the hover cursor.
    pub fn pointer_move(&mut self, screen_point: Point) -> BoardResult<()> {
        let point = self.camera.screen_to_world(screen_point);
        match self.action {
            Action::Panning => {
                if let Some(gesture) = &self.gesture {
                    let delta = point - gesture.start_point;
                    self.camera.pan(delta);
                }
                Ok(())
            }
            Action::Drawing => self.continue_drawing(point),
            Action::Moving => self.continue_moving(point),
            Action::Resizing => self.continue_resizing(point),
            Action::None => {
                self.cursor = match self.tool {
                    Tool::Selection => cursor_for_position(
                        element_at(point, self.scene(), &self.tolerances).map(|hit| hit.position),
                    ),
                    Tool::Eraser => CursorStyle::Crosshair,
                    _ => CursorStyle::Default,
                };
                Ok(())
            }
            Action::Writing => Ok(()),
        }
    }

    /// The element targeted by the gesture, or `None` after logging if it
    /// disappeared (erased by a peer, for instance).
    fn gesture_target(&mut self) -> Option<Element> {
        let element = self.selected.and_then(|id| self.scene().get(id)).cloned();
        if element.is_none() {
            log::warn!(
                "Element {:?} vanished during {:?}, dropping gesture",
                self.selected,
                self.action
            );
            self.reset_interaction();
        }
        element
    }

    fn continue_drawing(&mut self, point: Point) -> BoardResult<()> {
        let Some(current) = self.gesture_target() else {
            return Ok(());
        };
        let updated = match current.kind() {
            ElementKind::Freehand => {
                let mut stroke = current;
                stroke.push_point(point)?;
                stroke
            }
            _ => self
                .factory
                .update(&current, current.start(), point, &StyleOverrides::none()),
        };
        self.commit_element(updated);
        Ok(())
    }

    fn continue_moving(&mut self, point: Point) -> BoardResult<()> {
        if self.gesture_target().is_none() {
            return Ok(());
        }
        let Some(GestureState {
            grab,
            original: Some(original),
            ..
        }) = &self.gesture
        else {
            return Ok(());
        };
        let moved = match grab {
            Grab::Points(offsets) => {
                let mut stroke = original.clone();
                stroke.set_points(offsets.iter().map(|offset| point - *offset).collect());
                stroke
            }
            Grab::Offset(offset) => {
                let start = point - *offset;
                let end = start + (original.end() - original.start());
                self.factory
                    .update(original, start, end, &StyleOverrides::none())
            }
        };
        self.commit_element(moved);
        Ok(())
    }

    fn continue_resizing(&mut self, point: Point) -> BoardResult<()> {
        if self.gesture_target().is_none() {
            return Ok(());
        }
        let Some(GestureState {
            handle: Some(handle),
            original: Some(original),
            ..
        }) = &self.gesture
        else {
            return Ok(());
        };
        let bounds = resized_coordinates(point, *handle, original.bounds);
        let resized = self.factory.update(
            original,
            Point::new(bounds.x0, bounds.y0),
            Point::new(bounds.x1, bounds.y1),
            &StyleOverrides::none(),
        );
        self.commit_element(resized);
        Ok(())
    }

    /// Finish the gesture in progress.
    pub fn pointer_up(&mut self, screen_point: Point) -> BoardResult<()> {
        let point = self.camera.screen_to_world(screen_point);
        let finished = self.action;

        if let Some(element) = self.selected_element().cloned() {
            if matches!(finished, Action::Drawing | Action::Resizing)
                && needs_normalization(element.kind())
            {
                let bounds = adjust_element_coordinates(&element);
                if bounds != element.bounds {
                    let normalized = self.factory.update(
                        &element,
                        Point::new(bounds.x0, bounds.y0),
                        Point::new(bounds.x1, bounds.y1),
                        &StyleOverrides::none(),
                    );
                    self.commit_element(normalized);
                }
            }

            let offset = self.gesture.as_ref().map_or(Vec2::ZERO, GestureState::offset);
            if element.kind() == ElementKind::Text
                && !matches!(finished, Action::Moving | Action::Resizing)
                && point - offset == element.start()
            {
                self.action = Action::Writing;
                self.gesture = None;
                return Ok(());
            }
        }

        if finished == Action::Writing {
            return Ok(());
        }
        if self.gesture.as_ref().is_some_and(|g| g.committed)
            && self.history.collapse_duplicate_top()
        {
            log::debug!("Gesture left the scene unchanged");
        }
        if finished == Action::Panning {
            self.cursor = CursorStyle::Default;
        }
        self.action = Action::None;
        self.gesture = None;
        if finished == Action::Drawing {
            self.selected = None;
        }
        log::debug!("{:?} finished", finished);
        Ok(())
    }

    /// Store the text typed into the open editor and close it.
    ///
    /// The element's bounds grow to the measured text: width from the text
    /// metric, height equal to the font size.
    pub fn commit_text(&mut self, text: &str) -> BoardResult<()> {
        let element = match self.editing_element() {
            Some(element) => element.clone(),
            None => {
                return Err(BoardError::MalformedElement(
                    "no text element is being written".to_string(),
                ));
            }
        };
        if text.is_empty() {
            return Err(BoardError::MalformedElement(format!(
                "text element {} committed without text",
                element.id
            )));
        }
        let font_size = element.style.font_size;
        let width = self.text_measure.measure_text(text, font_size);
        let start = element.start();
        let mut written = self.factory.update(
            &element,
            start,
            Point::new(start.x + width, start.y + font_size),
            &StyleOverrides::none(),
        );
        written.body = ElementBody::Text {
            text: text.to_string(),
        };

        let mut scene = self.scene().clone();
        scene.replace(written.clone());
        self.commit(scene, false, RelayMessage::ElementPatch { element: written });
        self.action = Action::None;
        self.selected = None;
        self.gesture = None;
        log::debug!("Committed text for element {}", element.id);
        Ok(())
    }

    /// Dispatch a host event.
    pub fn handle_event(&mut self, event: InputEvent) -> BoardResult<()> {
        match event {
            InputEvent::PointerDown { x, y, button } => self.pointer_down(Point::new(x, y), button),
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(x, y)),
            InputEvent::PointerUp { x, y } => self.pointer_up(Point::new(x, y)),
            InputEvent::Wheel { dx, dy } => {
                self.wheel(dx, dy);
                Ok(())
            }
            InputEvent::KeyDown { key } => {
                self.key_down(&key);
                Ok(())
            }
            InputEvent::KeyUp { key } => {
                self.key_up(&key);
                Ok(())
            }
            InputEvent::TextCommitted { text } => self.commit_text(&text),
            InputEvent::SelectTool { tool } => {
                self.set_tool(tool);
                Ok(())
            }
            InputEvent::UpdateProperties { id, style } => {
                self.update_element_properties(id, &style)
            }
            InputEvent::Zoom { delta } => {
                self.zoom(delta);
                Ok(())
            }
            InputEvent::ResetZoom => {
                self.reset_zoom();
                Ok(())
            }
            InputEvent::Undo => {
                self.undo();
                Ok(())
            }
            InputEvent::Redo => {
                self.redo();
                Ok(())
            }
            InputEvent::Resize { width, height } => {
                self.set_viewport(Size::new(width, height));
                Ok(())
            }
        }
    }

    // --- Relay ---

    /// Take the changes produced since the last call.
    pub fn drain_outbox(&mut self) -> Vec<RelayMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// Apply a change received from another participant as a new history
    /// entry. Remote changes are not echoed to the outbox.
    pub fn apply_remote(&mut self, message: RelayMessage) {
        let mut scene = self.scene().clone();
        match message {
            RelayMessage::SceneReplace { scene: remote } => {
                scene = remote;
                scene.for_each_mut(|element| element.rebuild_drawable(self.factory.generator()));
            }
            RelayMessage::ElementPatch { element } => {
                scene.upsert(self.factory.restore(element));
            }
            RelayMessage::ElementRemoved { id } => {
                if scene.remove(id).is_none() {
                    log::warn!("Remote removal of unknown element {}", id);
                    return;
                }
            }
        }
        if let Some(max) = scene.max_id() {
            self.next_id = self.next_id.max(max + 1);
        }
        self.history.commit(scene, false);
        if self.selected.is_some_and(|id| !self.scene().contains(id)) {
            self.reset_interaction();
        }
    }

    /// Broadcast pending changes and apply everything received.
    ///
    /// Payloads that fail to decode are logged and dropped. Returns the
    /// number of remote changes applied.
    pub fn exchange(&mut self, relay: &impl Relay, session: Uuid) -> Result<usize, SyncError> {
        for message in self.drain_outbox() {
            relay.broadcast(session, &message.encode()?)?;
        }
        let mut applied = 0;
        for payload in relay.poll(session)? {
            match RelayMessage::decode(&payload) {
                Ok(message) => {
                    self.apply_remote(message);
                    applied += 1;
                }
                Err(e) => log::warn!("Dropping relay payload: {}", e),
            }
        }
        Ok(applied)
    }

    // --- Internals ---

    /// Record `scene` in history and queue `change` for peers.
    ///
    /// Returns false if a push was skipped because nothing changed.
    pub(crate) fn commit(&mut self, scene: Scene, overwrite: bool, change: RelayMessage) -> bool {
        if !overwrite && *self.scene() == scene {
            return false;
        }
        self.history.commit(scene, overwrite);
        self.enqueue(change);
        true
    }

    /// Commit an element change made by the current gesture. The first
    /// change pushes a history entry, later ones overwrite it.
    fn commit_element(&mut self, element: Element) {
        let mut scene = self.scene().clone();
        if !scene.replace(element.clone()) {
            return;
        }
        let overwrite = self.gesture.as_ref().is_some_and(|g| g.committed);
        if self.commit(scene, overwrite, RelayMessage::ElementPatch { element }) {
            if let Some(gesture) = self.gesture.as_mut() {
                gesture.committed = true;
            }
        }
    }

    fn enqueue(&mut self, change: RelayMessage) {
        if let (
            Some(RelayMessage::ElementPatch { element: queued }),
            RelayMessage::ElementPatch { element },
        ) = (self.outbox.last_mut(), &change)
        {
            if queued.id == element.id {
                *queued = element.clone();
                return;
            }
        }
        self.outbox.push(change);
    }

    pub(crate) fn select(&mut self, id: ElementId) {
        self.selected = Some(id);
    }

    /// Remove the element of an editor closed before any text was
    /// committed, from the live scene and from the entries since its
    /// creation.
    fn discard_unwritten_text(&mut self) -> bool {
        let Some(id) = self
            .editing_element()
            .filter(|element| element.text().is_some_and(str::is_empty))
            .map(|element| element.id)
        else {
            return false;
        };
        if self.history.previous().is_some_and(|below| !below.contains(id)) {
            self.history.withdraw_top();
        } else {
            self.history.erase_element(id);
        }
        self.enqueue(RelayMessage::ElementRemoved { id });
        self.action = Action::None;
        self.selected = None;
        self.gesture = None;
        log::debug!("Discarded unwritten text element {}", id);
        true
    }

    fn reset_interaction(&mut self) {
        self.discard_unwritten_text();
        self.action = Action::None;
        self.selected = None;
        self.gesture = None;
    }
}
