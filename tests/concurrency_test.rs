//! Concurrent access through cloned graph handles

use std::sync::atomic::{AtomicBool, Ordering};
use vertexa::{open_graph, EdgeId, PropertyMap, Traverser, VertexId};

#[test]
fn test_readers_run_alongside_a_writer() {
    let graph = open_graph();
    let hub = graph.add_vertex("hub", PropertyMap::new()).id;
    for i in 0..50 {
        let spoke = graph.add_vertex("spoke", PropertyMap::new().with("i", i));
        graph.add_edge("link", hub, &spoke, PropertyMap::new()).unwrap();
    }
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let reader = graph.clone();
            let done = &done;
            scope.spawn(move || {
                while !done.load(Ordering::Acquire) {
                    let spokes = reader.traversal().v_ids([hub]).out(&["link"]).count().unwrap();
                    assert!(spokes >= 50);
                }
            });
        }

        let writer = graph.clone();
        scope.spawn(move || {
            for i in 50..100 {
                let spoke = writer.add_vertex("spoke", PropertyMap::new().with("i", i));
                writer.add_edge("link", hub, &spoke, PropertyMap::new()).unwrap();
            }
        });

        // Let the readers see the writer's work before stopping them
        while graph.edge_count() < 100 {
            std::thread::yield_now();
        }
        done.store(true, Ordering::Release);
    });

    assert_eq!(graph.traversal().v_ids([hub]).out(&[]).count().unwrap(), 100);
}

#[test]
fn test_removed_vertices_are_not_emitted_later() {
    let graph = open_graph();
    for i in 0..10 {
        graph.add_vertex("n", PropertyMap::new().with("i", i));
    }

    let mut traversal = graph.traversal().v();
    let first = traversal.next().unwrap().into_vertex().unwrap();

    // Remove everything after the first pull
    for id in 2..=10 {
        graph.remove_vertex(VertexId::new(id)).unwrap();
    }

    assert_eq!(first.id.as_u64(), 1);
    assert!(traversal.try_next().unwrap().is_none());
}

#[test]
fn test_removing_emitted_edges_does_not_skip_live_ones() {
    let graph = open_graph();
    let hub = graph.add_vertex("hub", PropertyMap::new()).id;
    let spokes: Vec<VertexId> = (0..3)
        .map(|_| graph.add_vertex("spoke", PropertyMap::new()).id)
        .collect();

    let filters: [&[&str]; 3] = [&[], &["link"], &["link", "other"]];
    for labels in filters {
        for &spoke in &spokes {
            graph.add_edge("link", hub, spoke, PropertyMap::new()).unwrap();
        }

        let mut traversal = graph.traversal().v_ids([hub]).out_e(labels);
        let mut seen = Vec::new();
        while let Some(edge) = traversal.try_next().unwrap() {
            let edge = edge.into_edge().unwrap();
            seen.push(edge.target);
            graph.remove_edge(edge.id).unwrap();
        }
        assert_eq!(seen, spokes, "labels {:?}", labels);
    }
}

#[test]
fn test_edge_removed_ahead_of_cursor_is_skipped() {
    let graph = open_graph();
    let hub = graph.add_vertex("hub", PropertyMap::new()).id;
    let edges: Vec<EdgeId> = (0..4)
        .map(|_| {
            let spoke = graph.add_vertex("spoke", PropertyMap::new()).id;
            graph.add_edge("link", hub, spoke, PropertyMap::new()).unwrap().id
        })
        .collect();

    let mut traversal = graph.traversal().v_ids([hub]).out_e(&[]);
    let first = traversal.next().unwrap().into_edge().unwrap();
    assert_eq!(first.id, edges[0]);

    graph.remove_edge(edges[0]).unwrap();
    graph.remove_edge(edges[2]).unwrap();

    let rest: Vec<EdgeId> = traversal
        .to_list()
        .unwrap()
        .into_iter()
        .map(|t| t.into_edge().unwrap().id)
        .collect();
    assert_eq!(rest, vec![edges[1], edges[3]]);
}

#[test]
fn test_traversal_moves_between_threads() {
    let graph = open_graph();
    graph.add_vertex("n", PropertyMap::new().with("name", "marko"));
    let traversal = graph.traversal().v().values("name");

    let result = std::thread::spawn(move || traversal.to_list().unwrap())
        .join()
        .unwrap();
    assert_eq!(result.len(), 1);
    assert!(matches!(&result[0], Traverser::Value(v) if v.as_string() == Some("marko")));
}
