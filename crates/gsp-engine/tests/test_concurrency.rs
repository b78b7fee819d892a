use gsp_core::{GspEngine, NullLog, Operation, NO_PATH};
use std::sync::Arc;
use std::thread;

fn quiet_engine() -> GspEngine {
    GspEngine::with_log(Arc::new(NullLog))
}

#[test]
fn test_disjoint_adds_count_every_node_once() {
    let engine = quiet_engine();
    let threads = 8;
    let per_thread = 250;

    thread::scope(|s| {
        for t in 0..threads {
            let engine = &engine;
            s.spawn(move || {
                let base = t * 10_000;
                for i in 0..per_thread {
                    engine.add_edge(base + i, base + i + 1);
                }
            });
        }
    });

    // Each thread builds a chain of per_thread edges over per_thread + 1 nodes
    let store = engine.store();
    assert_eq!(store.node_count(), (threads * (per_thread + 1)) as usize);
    assert_eq!(store.edge_count(), (threads * per_thread) as usize);
    for t in 0..threads {
        let base = t * 10_000;
        assert_eq!(engine.query(base, base + per_thread), per_thread);
    }

    let snap = engine.metrics();
    assert_eq!(snap.add.count, (threads * per_thread) as u64);
    assert_eq!(snap.total_nodes, store.node_count() as u64);
}

#[test]
fn test_overlapping_adds_share_nodes() {
    let engine = quiet_engine();

    thread::scope(|s| {
        for _ in 0..6 {
            let engine = &engine;
            s.spawn(move || {
                for i in 0..100 {
                    engine.add_edge(i, (i + 1) % 100);
                }
            });
        }
    });

    assert_eq!(engine.store().node_count(), 100);
    assert_eq!(engine.store().edge_count(), 100);
    assert_eq!(engine.query(0, 99), 99);
    assert_eq!(engine.query(99, 0), 1);
}

#[test]
fn test_queries_see_consistent_graph_during_writes() {
    let engine = quiet_engine();
    // A fixed backbone 0 -> 1 -> ... -> 50 that writers never touch
    engine.load_edges((0..50).map(|i| (i, i + 1)));

    thread::scope(|s| {
        for w in 0..4 {
            let engine = &engine;
            s.spawn(move || {
                for round in 0..200 {
                    let a = 1_000 + w * 100 + round % 50;
                    engine.add_edge(a, a + 1);
                    engine.delete_edge(a, a + 1);
                }
            });
        }
        for _ in 0..4 {
            let engine = &engine;
            s.spawn(move || {
                for _ in 0..200 {
                    assert_eq!(engine.query(0, 50), 50);
                    assert_eq!(engine.query(50, 0), NO_PATH);
                }
            });
        }
    });

    let snap = engine.metrics();
    assert_eq!(snap.query.count, 1_600);
    assert_eq!(snap.add.count, 800);
    assert_eq!(snap.delete.count, 800);
    assert_eq!(engine.store().edge_count(), 50);
}

#[test]
fn test_concurrent_batches_return_one_result_per_query() {
    let engine = quiet_engine();
    engine.load_edges([(1, 2), (2, 3)]);

    thread::scope(|s| {
        for t in 0..6 {
            let engine = &engine;
            s.spawn(move || {
                let private = 100 + t;
                let batch = vec![
                    Operation::query(1, 3),
                    Operation::add(3, private),
                    Operation::query(1, private),
                    Operation::delete(3, private),
                    Operation::query(3, 1),
                ];
                for _ in 0..50 {
                    let results = engine.run_batch(&batch);
                    assert_eq!(results.len(), 3);
                    assert_eq!(results[0], 2);
                    // Only this thread touches the 3 -> private edge
                    assert_eq!(results[1], 3);
                    assert_eq!(results[2], NO_PATH);
                }
            });
        }
    });

    assert_eq!(engine.store().edge_count(), 2);
}
