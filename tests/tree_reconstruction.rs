//! Tree Reconstruction Tests
//!
//! Tests for invariants:
//! - Any well-formed pre-order stream rebuilds into a tree that replays the
//!   same stream
//! - Every child is exactly one level below its parent
//! - Sibling order is stream order
//! - Malformed streams and undersized censuses fail explicitly

use dbcheck::container::{
    ColumnManifest, DatabaseManifest, IndexManifest, Manifest, ManifestContainer, TableManifest,
};
use dbcheck::tree::{TreeErrorCode, VisitTree, VisitTreeBuilder};
use dbcheck::validate::{ValidateConfig, Validator};
use dbcheck::visit::{Census, ObjectKind, VisitEvent, VisitSource};
use proptest::prelude::*;

// =============================================================================
// Test Utilities
// =============================================================================

fn census_of(events: &[VisitEvent]) -> Census {
    let mut census = Census::default();
    for event in events {
        census.record(&event.name);
    }
    census
}

fn rebuild(events: &[VisitEvent]) -> VisitTree {
    let mut builder = VisitTreeBuilder::with_capacity(census_of(events));
    for event in events {
        builder.push(event).unwrap();
    }
    builder.finish().unwrap()
}

fn kind_at(depth: u32) -> ObjectKind {
    match depth {
        0 => ObjectKind::Database,
        1 => ObjectKind::Table,
        _ => ObjectKind::Column,
    }
}

/// Well-formed streams: a root, then each event at most one level deeper
/// than the previous one and never back at depth 0.
fn stream() -> impl Strategy<Value = Vec<VisitEvent>> {
    (
        "[a-z]{1,6}",
        prop::collection::vec((0u32..6, "[A-Z_]{0,8}"), 0..64),
    )
        .prop_map(|(root, steps)| {
            let mut events = vec![VisitEvent::new(root, ObjectKind::Database, 0)];
            let mut depth = 0;
            for (choice, name) in steps {
                depth = 1 + choice % (depth + 1);
                events.push(VisitEvent::new(name, kind_at(depth), depth));
            }
            events
        })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_rebuilt_tree_replays_stream(events in stream()) {
        let tree = rebuild(&events);
        prop_assert_eq!(tree.len(), events.len());
        prop_assert_eq!(tree.to_events(), events);
    }

    #[test]
    fn prop_children_are_one_level_down(events in stream()) {
        let tree = rebuild(&events);
        let mut linked = 0;
        for node in tree.preorder() {
            let depth = tree.node(node).depth;
            for child in tree.children(node) {
                prop_assert_eq!(tree.node(child).depth, depth + 1);
                linked += 1;
            }
        }
        // every node but the root hangs off exactly one parent
        prop_assert_eq!(linked, tree.len() - 1);
    }

    #[test]
    fn prop_depth_jump_is_rejected(events in stream(), extra in 2u32..5) {
        let mut events = events;
        let last = events.last().map(|e| e.depth).unwrap_or(0);
        events.push(VisitEvent::new("JUMP", ObjectKind::Column, last + extra));

        let mut builder = VisitTreeBuilder::with_capacity(census_of(&events));
        let mut failure = None;
        for event in &events {
            if let Err(e) = builder.push(event) {
                failure = Some(e);
                break;
            }
        }
        let failure = failure.expect("depth jump accepted");
        prop_assert_eq!(failure.code(), TreeErrorCode::MalformedStream);
    }
}

// =============================================================================
// Fixed cases
// =============================================================================

#[test]
fn test_siblings_keep_stream_order() {
    let events = vec![
        VisitEvent::new("db", ObjectKind::Database, 0),
        VisitEvent::new("SEQUENCE", ObjectKind::Table, 1),
        VisitEvent::new("READ", ObjectKind::Column, 2),
        VisitEvent::new("REFERENCE", ObjectKind::Table, 1),
        VisitEvent::new("PRIMARY_ALIGNMENT", ObjectKind::Table, 1),
    ];
    let tree = rebuild(&events);
    let names: Vec<&str> = tree
        .children(tree.root())
        .map(|child| tree.name(child))
        .collect();
    assert_eq!(names, vec!["SEQUENCE", "REFERENCE", "PRIMARY_ALIGNMENT"]);
}

#[test]
fn test_undersized_census_is_capacity_error() {
    let events = vec![
        VisitEvent::new("db", ObjectKind::Database, 0),
        VisitEvent::new("SEQUENCE", ObjectKind::Table, 1),
    ];
    let mut builder = VisitTreeBuilder::with_capacity(census_of(&events[..1]));
    builder.push(&events[0]).unwrap();
    let err = builder.push(&events[1]).unwrap_err();
    assert_eq!(err.code(), TreeErrorCode::CapacityExceeded);
}

/// The container's own walk rebuilds into the tree its manifest describes.
#[test]
fn test_container_walk_rebuilds_manifest_tree() {
    let manifest = Manifest::Database(DatabaseManifest {
        name: "SRR000001".to_string(),
        schema: "NCBI:align:db:alignment_sorted".to_string(),
        tables: vec![
            TableManifest {
                name: "SEQUENCE".to_string(),
                schema: String::new(),
                columns: vec![
                    ColumnManifest::new("READ", 1, vec![Some(vec![1])]),
                    ColumnManifest::new("QUALITY", 1, vec![Some(vec![30])]),
                ],
                indices: vec![IndexManifest {
                    name: "skey".to_string(),
                    entries: vec!["spot1".to_string()],
                    sha256: None,
                }],
                extra: Vec::new(),
            },
            TableManifest {
                name: "REFERENCE".to_string(),
                schema: String::new(),
                columns: Vec::new(),
                indices: Vec::new(),
                extra: Vec::new(),
            },
        ],
        databases: vec![DatabaseManifest {
            name: "nested".to_string(),
            schema: String::new(),
            tables: Vec::new(),
            databases: Vec::new(),
            extra: Vec::new(),
        }],
        extra: Vec::new(),
    });
    let container = ManifestContainer::from_manifest("/data/SRR000001", manifest).unwrap();

    let config = ValidateConfig::default();
    let tree = Validator::new(&config).build_tree(&container).unwrap();
    assert_eq!(tree.len(), container.census().unwrap().objects);

    let outline = serde_json::to_value(tree.outline(tree.root())).unwrap();
    assert_eq!(outline["name"], "SRR000001");
    assert_eq!(outline["children"][0]["name"], "SEQUENCE");
    assert_eq!(outline["children"][0]["children"][2]["kind"], "index");
    assert_eq!(outline["children"][2]["kind"], "database");
    assert!(outline["children"][1].get("children").is_none());
}
