//! Integration tests for the undo/redo history.

use campmap_core::{DocumentStore, InMemoryStore, Module, ModuleType, Position};
use campmap_editor::{MoveCommand, RotateCommand, UndoRedoManager};

fn store() -> InMemoryStore {
    InMemoryStore::from_modules(vec![Module::with_id(
        "a",
        ModuleType::Building,
        Position::new(0.0, 0.0),
    )])
}

fn move_to(x: f64) -> MoveCommand {
    MoveCommand::new("a", Position::new(x - 10.0, 0.0), Position::new(x, 0.0)).unwrap()
}

#[test]
fn test_undo_redo_walks_the_stacks() {
    let mut store = store();
    let before = store.clone();
    let mut history = UndoRedoManager::default();

    history
        .execute(RotateCommand::new("a", 0.0, 30.0).unwrap().into(), &mut store)
        .unwrap();
    let rotated = store.clone();

    assert_eq!(history.undo(&mut store).unwrap().as_deref(), Some("Rotate Module"));
    assert_eq!(store, before);
    assert!(history.can_redo());

    assert_eq!(history.redo(&mut store).unwrap().as_deref(), Some("Rotate Module"));
    assert_eq!(store.get_module("a").unwrap().rotation, 30.0);
    assert_eq!(
        store.get_module("a").unwrap().position,
        rotated.get_module("a").unwrap().position
    );
}

#[test]
fn test_new_command_clears_redo() {
    let mut store = store();
    let mut history = UndoRedoManager::default();

    history.execute(move_to(10.0).into(), &mut store).unwrap();
    history.undo(&mut store).unwrap();
    assert_eq!(history.redo_depth(), 1);

    history.execute(move_to(20.0).into(), &mut store).unwrap();
    assert!(!history.can_redo());
    assert_eq!(history.peek_undo_name(), Some("Move Module"));
}

#[test]
fn test_depth_is_bounded() {
    let mut store = store();
    let mut history = UndoRedoManager::new(3);

    for i in 1..=5 {
        history
            .execute(move_to(i as f64 * 10.0).into(), &mut store)
            .unwrap();
    }
    assert_eq!(history.undo_depth(), 3);

    for _ in 0..3 {
        assert!(history.undo(&mut store).unwrap().is_some());
    }
    assert_eq!(history.undo(&mut store).unwrap(), None);
    // Oldest entries were dropped, so the module keeps the second move.
    assert_eq!(store.get_module("a").unwrap().position, Position::new(20.0, 0.0));
}

#[test]
fn test_failed_command_is_not_recorded() {
    let mut store = store();
    let mut history = UndoRedoManager::default();
    let cmd = RotateCommand::new("missing", 0.0, 10.0).unwrap();

    assert!(history.execute(cmd.into(), &mut store).is_err());
    assert!(!history.can_undo());
}

#[test]
fn test_failed_undo_keeps_command_on_stack() {
    let mut store = store();
    let mut history = UndoRedoManager::default();
    history
        .execute(RotateCommand::new("a", 0.0, 10.0).unwrap().into(), &mut store)
        .unwrap();

    store.remove_module("a");
    assert!(history.undo(&mut store).is_err());
    assert_eq!(history.undo_depth(), 1);
    assert!(!history.can_redo());
}

#[test]
fn test_undo_names_are_most_recent_first() {
    let mut store = store();
    let mut history = UndoRedoManager::default();
    history.execute(move_to(10.0).into(), &mut store).unwrap();
    history
        .execute(RotateCommand::new("a", 0.0, 90.0).unwrap().into(), &mut store)
        .unwrap();

    assert_eq!(history.undo_names(), vec!["Rotate Module", "Move Module"]);

    history.clear();
    assert!(!history.can_undo());
    assert!(!history.can_redo());
}
