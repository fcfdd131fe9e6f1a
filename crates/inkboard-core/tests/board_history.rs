//! Whole-board scenarios driven through the public event API.

use inkboard_core::geometry::{HitTolerances, element_at};
use inkboard_core::{
    Action, Board, BoardConfig, Document, HitPosition, InputEvent, MemoryStorage, PointerButton,
    Storage, StyleOverrides, Tool,
};
use kurbo::{Point, Rect};

fn event(board: &mut Board, event: InputEvent) {
    board.handle_event(event).unwrap();
}

fn drag(board: &mut Board, from: (f64, f64), to: (f64, f64)) {
    event(
        board,
        InputEvent::PointerDown {
            x: from.0,
            y: from.1,
            button: PointerButton::Primary,
        },
    );
    for i in 1..=10 {
        let t = f64::from(i) / 10.0;
        event(
            board,
            InputEvent::PointerMove {
                x: from.0 + (to.0 - from.0) * t,
                y: from.1 + (to.1 - from.1) * t,
            },
        );
    }
    event(board, InputEvent::PointerUp { x: to.0, y: to.1 });
}

fn select(board: &mut Board, tool: Tool) {
    event(board, InputEvent::SelectTool { tool });
}

fn sketch(board: &mut Board) {
    select(board, Tool::Rectangle);
    drag(board, (10.0, 10.0), (100.0, 50.0));
    select(board, Tool::Circle);
    drag(board, (200.0, 200.0), (240.0, 200.0));
    select(board, Tool::Line);
    drag(board, (300.0, 10.0), (250.0, 60.0));
    select(board, Tool::Pencil);
    drag(board, (0.0, 300.0), (80.0, 320.0));
    select(board, Tool::Selection);
    drag(board, (50.0, 30.0), (60.0, 40.0));
    drag(board, (109.0, 50.0), (130.0, 70.0));
}

#[test]
fn undo_to_empty_and_redo_to_final_scene() {
    let mut board = Board::default();
    sketch(&mut board);
    let final_scene = board.scene().clone();
    assert_eq!(final_scene.len(), 4);

    while board.can_undo() {
        event(&mut board, InputEvent::Undo);
    }
    assert!(board.scene().is_empty());
    assert!(!board.undo());

    while board.can_redo() {
        event(&mut board, InputEvent::Redo);
    }
    assert_eq!(board.scene(), &final_scene);
    assert!(!board.redo());
}

#[test]
fn each_gesture_adds_exactly_one_entry() {
    let mut board = Board::default();
    select(&mut board, Tool::Rectangle);
    drag(&mut board, (10.0, 10.0), (100.0, 50.0));
    select(&mut board, Tool::Selection);

    let before = board.history_depth();
    event(
        &mut board,
        InputEvent::PointerDown {
            x: 50.0,
            y: 30.0,
            button: PointerButton::Primary,
        },
    );
    for step in 1..=50 {
        event(
            &mut board,
            InputEvent::PointerMove {
                x: 50.0 + f64::from(step),
                y: 30.0,
            },
        );
        assert!(board.history_depth() <= before + 1);
    }
    event(&mut board, InputEvent::PointerUp { x: 100.0, y: 30.0 });
    assert_eq!(board.history_depth(), before + 1);
    assert_eq!(board.action(), Action::None);
}

#[test]
fn drawn_rectangles_are_normalized() {
    let mut board = Board::default();
    select(&mut board, Tool::Rectangle);
    drag(&mut board, (10.0, 10.0), (100.0, 50.0));
    drag(&mut board, (100.0, 50.0), (10.0, 10.0));
    let bounds: Vec<Rect> = board.scene().iter().map(|e| e.bounds).collect();
    assert_eq!(
        bounds,
        vec![
            Rect::new(10.0, 10.0, 100.0, 50.0),
            Rect::new(10.0, 10.0, 100.0, 50.0)
        ]
    );
}

#[test]
fn hit_test_center_and_just_outside() {
    let mut board = Board::default();
    select(&mut board, Tool::Rectangle);
    drag(&mut board, (10.0, 10.0), (100.0, 50.0));
    let tolerances = HitTolerances::default();

    let hit = element_at(Point::new(55.0, 30.0), board.scene(), &tolerances).unwrap();
    assert_eq!(hit.position, HitPosition::Inside);
    assert!(element_at(Point::new(55.0, 52.0), board.scene(), &tolerances).is_none());
    assert!(element_at(Point::new(102.0, 30.0), board.scene(), &tolerances).is_none());
}

#[test]
fn zoom_is_clamped() {
    let mut board = Board::default();
    for _ in 0..30 {
        event(&mut board, InputEvent::Zoom { delta: -0.1 });
    }
    assert!((board.camera().scale - 0.1).abs() < 1e-9);
    for _ in 0..30 {
        event(&mut board, InputEvent::Zoom { delta: 1.0 });
    }
    assert!((board.camera().scale - 20.0).abs() < 1e-9);
    event(&mut board, InputEvent::ResetZoom);
    assert!((board.camera().scale - 1.0).abs() < f64::EPSILON);
}

#[test]
fn erase_is_undoable() {
    let mut board = Board::default();
    sketch(&mut board);
    let circle = board.scene().get(1).unwrap().clone();

    select(&mut board, Tool::Eraser);
    drag(&mut board, (220.0, 200.0), (220.0, 200.0));
    assert!(!board.scene().contains(1));
    assert_eq!(board.scene().len(), 3);

    event(&mut board, InputEvent::Undo);
    assert_eq!(board.scene().get(1), Some(&circle));
    assert_eq!(board.scene().position(1), Some(1));
}

#[test]
fn stale_property_update_is_ignored() {
    let mut board = Board::default();
    sketch(&mut board);
    let scene = board.scene().clone();
    let depth = board.history_depth();
    event(
        &mut board,
        InputEvent::UpdateProperties {
            id: 99,
            style: StyleOverrides::none().with_stroke_width(3.0),
        },
    );
    assert_eq!(board.scene(), &scene);
    assert_eq!(board.history_depth(), depth);
}

#[test]
fn scripted_text_entry() {
    let script = r#"[
        {"event": "select_tool", "tool": "text"},
        {"event": "pointer_down", "x": 40.0, "y": 40.0},
        {"event": "pointer_up", "x": 40.0, "y": 40.0},
        {"event": "text_committed", "text": "hello"}
    ]"#;
    let events: Vec<InputEvent> = serde_json::from_str(script).unwrap();
    let mut board = Board::default();
    for e in events {
        event(&mut board, e);
    }
    let text = board.scene().get(0).unwrap();
    assert_eq!(text.text(), Some("hello"));
    assert!((text.bounds.y1 - 64.0).abs() < f64::EPSILON);
}

#[test]
fn document_survives_storage() {
    let mut board = Board::default();
    sketch(&mut board);
    let storage = MemoryStorage::new();
    let id = storage.save_document(&board.to_document()).unwrap();

    let loaded: Document = storage.load(&id).unwrap();
    let reopened = Board::from_document(loaded, BoardConfig::default());
    assert_eq!(reopened.scene(), board.scene());
    assert!(!reopened.can_undo());
}
