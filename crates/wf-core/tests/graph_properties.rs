//! Integration tests: graph store invariants and the drop → connect → delete
//! scenario, exercised through the public `wf_core` API.

use wf_core::placement::{self, DEFAULT_GRID_SIZE};
use wf_core::{NodeId, Position, Viewport, WorkflowError, WorkflowGraph, palette};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A graph with a small branching workflow hanging off the start trigger.
fn branching_graph() -> (WorkflowGraph, Vec<NodeId>) {
    let mut graph = WorkflowGraph::initial();
    let start = NodeId::intern("1");
    let mut ids = vec![start];
    for (item, pos) in [
        ("webhook-trigger", (100.0, 40.0)),
        ("if-condition", (320.0, 240.0)),
        ("send-email", (540.0, 160.0)),
        ("database-query", (540.0, 320.0)),
        ("timer-trigger", (100.0, 440.0)),
    ] {
        let node = graph.add_node(
            Position::new(pos.0, pos.1),
            palette::find(item).unwrap(),
        );
        ids.push(node.id);
    }
    graph.connect(ids[0], ids[2], None, None).unwrap();
    graph.connect(ids[1], ids[2], None, None).unwrap();
    graph.connect(ids[2], ids[3], Some("true"), None).unwrap();
    graph.connect(ids[2], ids[4], Some("false"), None).unwrap();
    graph.connect(ids[5], ids[4], None, None).unwrap();
    graph.connect(ids[3], ids[3], None, None).unwrap();
    (graph, ids)
}

fn assert_no_dangling(graph: &WorkflowGraph) {
    for edge in graph.edges() {
        assert!(graph.contains_node(edge.source), "dangling source {edge:?}");
        assert!(graph.contains_node(edge.target), "dangling target {edge:?}");
    }
}

#[test]
fn every_deletion_leaves_no_dangling_edges() {
    init_logging();
    let (_, ids) = branching_graph();
    for victim in &ids {
        let (mut graph, _) = branching_graph();
        let incident = graph.incident_edges(*victim).len();
        let edges_before = graph.edge_count();
        let nodes_before = graph.node_count();

        assert!(graph.delete_node(*victim));
        assert_eq!(graph.node_count(), nodes_before - 1);
        assert_eq!(graph.edge_count(), edges_before - incident);
        assert_no_dangling(&graph);
    }
}

#[test]
fn deleting_isolated_node_keeps_edge_count() {
    init_logging();
    let (mut graph, _) = branching_graph();
    let isolated = graph
        .add_node(Position::new(0.0, 0.0), palette::find("filter-condition").unwrap())
        .id;
    let edges = graph.edge_count();
    let nodes = graph.node_count();
    graph.delete_node(isolated);
    assert_eq!(graph.node_count(), nodes - 1);
    assert_eq!(graph.edge_count(), edges);
}

#[test]
fn connect_to_missing_node_leaves_edges_unchanged() {
    init_logging();
    let (mut graph, ids) = branching_graph();
    let before: Vec<_> = graph.edges().cloned().collect();
    let missing = NodeId::intern("does-not-exist");

    for (a, b) in [(ids[0], missing), (missing, ids[0]), (missing, missing)] {
        let err = graph.connect(a, b, None, None).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidReference { .. }));
    }
    let after: Vec<_> = graph.edges().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn bulk_delete_removes_selection() {
    init_logging();
    let (mut graph, ids) = branching_graph();
    let edge = graph.incident_edges(ids[5])[0].id;
    graph.delete_selection(&[ids[2], NodeId::intern("unknown")], &[edge]);
    assert!(!graph.contains_node(ids[2]));
    assert!(!graph.contains_edge(edge));
    assert_no_dangling(&graph);
}

#[test]
fn drop_connect_delete_scenario() {
    init_logging();
    let mut graph = WorkflowGraph::initial();
    let trigger = NodeId::intern("1");
    assert_eq!(
        graph.node(trigger).unwrap().position,
        Position::new(100.0, 240.0)
    );

    // Pointer lands where the inverse viewport transform gives (133, 121)
    graph.viewport = Viewport {
        x: 20.0,
        y: 10.0,
        zoom: 1.5,
    };
    let screen = Position::new(133.0 * 1.5 + 20.0, 121.0 * 1.5 + 10.0);
    let raw = placement::screen_to_graph(screen, graph.viewport);
    assert!((raw.x - 133.0).abs() < 1e-9 && (raw.y - 121.0).abs() < 1e-9);

    let position = placement::place(screen, graph.viewport, Some(DEFAULT_GRID_SIZE)).unwrap();
    let action = graph
        .add_node(position, palette::find("http-request").unwrap())
        .clone();
    assert_eq!(action.position, Position::new(140.0, 120.0));
    assert_eq!(action.data.label, "HTTP Request");

    let edge = graph.connect(trigger, action.id, None, None).unwrap().clone();
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(edge.source, trigger);
    assert_eq!(edge.target, action.id);

    graph.delete_node(trigger);
    assert_eq!(graph.node_count(), 1);
    assert!(graph.contains_node(action.id));
    assert_eq!(graph.edge_count(), 0);
}
