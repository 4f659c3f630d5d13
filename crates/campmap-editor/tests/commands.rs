//! Integration tests for the command set.
//! Every command must leave the store deep-equal to its prior state after
//! undo, timestamps included.

use campmap_core::{
    DocumentStore, EditorWarning, Error, InMemoryStore, Metadata, Module, ModulePatch, ModuleType,
    Position, Size, ValidationError,
};
use campmap_editor::{
    AddCommand, BatchCommand, DeleteCommand, MapCommand, MoveCommand, PropertyCommand,
    ReorderCommand, ResizeCommand, RotateCommand, UpdateMetadataCommand,
};
use proptest::prelude::*;

fn module(id: &str, x: f64, y: f64) -> Module {
    Module::with_id(id, ModuleType::Campsite, Position::new(x, y))
}

fn store_of(ids: &[&str]) -> InMemoryStore {
    InMemoryStore::from_modules(
        ids.iter()
            .enumerate()
            .map(|(i, id)| module(id, i as f64 * 100.0, 0.0))
            .collect(),
    )
}

/// Store wrapper that records the order of module updates.
#[derive(Default)]
struct RecordingStore {
    inner: InMemoryStore,
    updates: Vec<String>,
}

impl DocumentStore for RecordingStore {
    fn get_module(&self, id: &str) -> Option<&Module> {
        self.inner.get_module(id)
    }

    fn modules(&self) -> &[Module] {
        self.inner.modules()
    }

    fn add_module(&mut self, module: Module) -> bool {
        self.inner.add_module(module)
    }

    fn remove_module(&mut self, id: &str) -> Option<Module> {
        self.inner.remove_module(id)
    }

    fn update_module(&mut self, id: &str, patch: &ModulePatch) -> bool {
        self.updates.push(id.to_string());
        self.inner.update_module(id, patch)
    }

    fn set_modules(&mut self, modules: Vec<Module>) {
        self.inner.set_modules(modules)
    }
}

#[test]
fn test_add_with_duplicate_inserts_only_new_modules() {
    let mut store = store_of(&["a"]);
    let mut cmd = MapCommand::from(
        AddCommand::new(vec![module("a", 0.0, 0.0), module("b", 5.0, 5.0)]).unwrap(),
    );

    cmd.execute(&mut store).unwrap();
    assert_eq!(store.ids(), vec!["a", "b"]);
    assert_eq!(
        cmd.warnings(),
        [EditorWarning::DuplicateSkipped {
            id: "a".to_string()
        }]
    );

    cmd.undo(&mut store).unwrap();
    assert_eq!(store.ids(), vec!["a"]);
}

#[test]
fn test_delete_undo_reconciles_with_later_additions() {
    let mut store = store_of(&["a", "b", "c"]);
    let before = store.clone();
    let mut cmd = DeleteCommand::from_ids(&store, &["a".to_string(), "b".to_string()]).unwrap();

    cmd.execute(&mut store).unwrap();
    assert_eq!(store.ids(), vec!["c"]);

    store.add_module(module("d", 400.0, 0.0));
    cmd.undo(&mut store).unwrap();

    assert_eq!(store.ids(), vec!["a", "b", "c", "d"]);
    assert_eq!(store.get_module("a"), before.get_module("a"));
    assert_eq!(store.get_module("b"), before.get_module("b"));
}

#[test]
fn test_delete_of_unknown_ids_fails_up_front() {
    let store = store_of(&["a"]);
    let err = DeleteCommand::from_ids(&store, &["zz".to_string()]).unwrap_err();
    assert_eq!(
        err,
        Error::Validation(ValidationError::ModuleNotFound {
            id: "zz".to_string()
        })
    );
}

#[test]
fn test_property_undo_runs_in_reverse_order() {
    let mut store = RecordingStore {
        inner: store_of(&["a", "b", "c"]),
        ..Default::default()
    };
    let updates = ["a", "b", "c"]
        .iter()
        .map(|id| (id.to_string(), ModulePatch::locked(true)))
        .collect();
    let mut cmd = PropertyCommand::from_store("Lock Modules", &store, updates).unwrap();

    cmd.execute(&mut store).unwrap();
    assert_eq!(store.updates, vec!["a", "b", "c"]);
    assert!(store.modules().iter().all(|m| m.locked));

    store.updates.clear();
    cmd.undo(&mut store).unwrap();
    assert_eq!(store.updates, vec!["c", "b", "a"]);
    assert!(store.modules().iter().all(|m| !m.locked));
}

#[test]
fn test_property_skips_missing_modules() {
    let mut store = store_of(&["a"]);
    let updates = vec![
        ("a".to_string(), ModulePatch::visible(false)),
        ("ghost".to_string(), ModulePatch::visible(false)),
    ];
    let mut cmd = PropertyCommand::from_store("Hide Modules", &store, updates).unwrap();

    cmd.execute(&mut store).unwrap();
    assert!(!store.get_module("a").unwrap().visible);
    assert_eq!(
        cmd.warnings(),
        [EditorWarning::MissingSkipped {
            id: "ghost".to_string()
        }]
    );
}

#[test]
fn test_reorder_clamps_negative_index() {
    let mut store = store_of(&["a"]);
    let mut cmd = ReorderCommand::from_store(&store, "a", -7.0).unwrap();
    assert_eq!(cmd.new_z_index(), 0);
    assert_eq!(
        cmd.warnings(),
        [EditorWarning::ZIndexClamped { requested: -7.0 }]
    );

    cmd.execute(&mut store).unwrap();
    assert_eq!(store.get_module("a").unwrap().z_index, 0);
}

#[test]
fn test_reorder_rejects_non_numeric_index() {
    let err = ReorderCommand::new("a", 1.0, f64::NAN).unwrap_err();
    assert!(err.is_validation_error());
    assert!(matches!(
        err,
        Error::Validation(ValidationError::NonNumericZIndex { .. })
    ));
}

#[test]
fn test_reorder_of_missing_module_is_a_warning() {
    let mut store = store_of(&["a"]);
    let mut cmd = ReorderCommand::new("gone", 1.0, 2.0).unwrap();
    cmd.execute(&mut store).unwrap();
    assert_eq!(
        cmd.warnings(),
        [EditorWarning::MissingSkipped {
            id: "gone".to_string()
        }]
    );
}

#[test]
fn test_batch_runs_in_order_and_undoes_in_reverse() {
    let mut store = RecordingStore {
        inner: store_of(&["a", "b"]),
        ..Default::default()
    };
    let before = store.inner.clone();
    let mut batch = MapCommand::from(BatchCommand::new(
        "Arrange",
        vec![
            MoveCommand::new("a", Position::new(0.0, 0.0), Position::new(10.0, 10.0))
                .unwrap()
                .into(),
            RotateCommand::new("b", 0.0, 45.0).unwrap().into(),
        ],
    ));

    batch.execute(&mut store).unwrap();
    assert_eq!(store.updates, vec!["a", "b"]);
    assert_eq!(store.get_module("a").unwrap().position, Position::new(10.0, 10.0));
    assert_eq!(store.get_module("b").unwrap().rotation, 45.0);

    store.updates.clear();
    batch.undo(&mut store).unwrap();
    assert_eq!(store.updates, vec!["b", "a"]);
    assert_eq!(store.inner, before);
}

#[test]
fn test_batch_continues_past_failed_member() {
    let mut store = store_of(&["a"]);
    let mut batch = BatchCommand::new(
        "Mixed",
        vec![
            MoveCommand::new("missing", Position::new(0.0, 0.0), Position::new(1.0, 1.0))
                .unwrap()
                .into(),
            RotateCommand::new("a", 0.0, 90.0).unwrap().into(),
        ],
    );

    batch.execute(&mut store).unwrap();
    assert_eq!(store.get_module("a").unwrap().rotation, 90.0);
    assert!(matches!(
        batch.warnings(),
        [EditorWarning::SubcommandFailed { .. }]
    ));
}

#[test]
fn test_batch_with_every_member_failing_is_an_error() {
    let mut store = store_of(&["a"]);
    let mut batch = BatchCommand::new(
        "Broken",
        vec![RotateCommand::new("missing", 0.0, 90.0).unwrap().into()],
    );
    let err = batch.execute(&mut store).unwrap_err();
    assert!(matches!(err, Error::BatchFailed { .. }));
}

#[test]
fn test_update_metadata_after_delete_fails() {
    let mut store = store_of(&["a"]);
    let changes = Metadata::new().with("siteNumber", "A1");
    let mut cmd = UpdateMetadataCommand::merge(&store, "a", &changes).unwrap();

    store.remove_module("a");
    let err = cmd.execute(&mut store).unwrap_err();
    assert!(err.is_consistency_error());
}

#[test]
fn test_resize_with_position_moves_top_left() {
    let mut store = store_of(&["a"]);
    let mut cmd = ResizeCommand::with_position(
        "a",
        Size::new(60.0, 40.0),
        Size::new(80.0, 40.0),
        Position::new(0.0, 0.0),
        Position::new(20.0, 0.0),
    )
    .unwrap();

    cmd.execute(&mut store).unwrap();
    let m = store.get_module("a").unwrap();
    assert_eq!(m.size, Size::new(80.0, 40.0));
    assert_eq!(m.position, Position::new(20.0, 0.0));
}

#[derive(Debug, Clone)]
enum Op {
    Move(f64, f64),
    Resize(f64, f64),
    Rotate(f64),
    Reorder(f64),
    Lock,
    Metadata,
    Delete,
    Add,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.0..500.0f64, 0.0..500.0f64).prop_map(|(x, y)| Op::Move(x, y)),
        (1.0..300.0f64, 1.0..300.0f64).prop_map(|(w, h)| Op::Resize(w, h)),
        (-720.0..720.0f64).prop_map(Op::Rotate),
        (-50.0..1000.0f64).prop_map(Op::Reorder),
        Just(Op::Lock),
        Just(Op::Metadata),
        Just(Op::Delete),
        Just(Op::Add),
    ]
}

fn build(op: &Op, store: &InMemoryStore, id: &str) -> MapCommand {
    let m = store.get_module(id).unwrap();
    match op {
        Op::Move(x, y) => MoveCommand::new(id, m.position, Position::new(*x, *y))
            .unwrap()
            .into(),
        Op::Resize(w, h) => ResizeCommand::new(id, m.size, Size::new(*w, *h))
            .unwrap()
            .into(),
        Op::Rotate(r) => RotateCommand::new(id, m.rotation, *r).unwrap().into(),
        Op::Reorder(z) => ReorderCommand::from_store(store, id, *z).unwrap().into(),
        Op::Lock => PropertyCommand::from_store(
            "Lock Module",
            store,
            vec![(id.to_string(), ModulePatch::locked(!m.locked))],
        )
        .unwrap()
        .into(),
        Op::Metadata => {
            UpdateMetadataCommand::merge(store, id, &Metadata::new().with("notes", "checked"))
                .unwrap()
                .into()
        }
        Op::Delete => DeleteCommand::from_ids(store, &[id.to_string()])
            .unwrap()
            .into(),
        Op::Add => AddCommand::single(module("fresh", 10.0, 10.0))
            .unwrap()
            .into(),
    }
}

proptest! {
    #[test]
    fn prop_undo_after_execute_restores_store(
        count in 1usize..6,
        pick in 0usize..6,
        ops in prop::collection::vec(op_strategy(), 1..4),
    ) {
        let ids: Vec<String> = (0..count).map(|i| format!("m{}", i)).collect();
        let mut store = InMemoryStore::from_modules(
            ids.iter()
                .enumerate()
                .map(|(i, id)| module(id, i as f64 * 10.0, 5.0))
                .collect(),
        );
        let before = store.clone();
        let id = &ids[pick % count];

        let commands: Vec<MapCommand> = ops.iter().map(|op| build(op, &store, id)).collect();
        let mut batch = MapCommand::from(BatchCommand::new("Random", commands));

        // Members built against the same snapshot may fail once an earlier
        // one deletes the module; the batch tolerates that.
        if batch.execute(&mut store).is_ok() {
            batch.undo(&mut store).unwrap();
        }
        prop_assert_eq!(store, before);
    }

    #[test]
    fn prop_single_command_round_trips(op in op_strategy()) {
        let mut store = store_of(&["a", "b"]);
        let before = store.clone();
        let mut cmd = build(&op, &store, "a");

        cmd.execute(&mut store).unwrap();
        cmd.undo(&mut store).unwrap();
        prop_assert_eq!(&store, &before);

        // A second undo changes nothing.
        cmd.undo(&mut store).unwrap();
        prop_assert_eq!(store, before);
    }
}
