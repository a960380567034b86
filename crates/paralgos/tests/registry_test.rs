// crates/paralgos/tests/registry_test.rs

use parcore::{convert_from, convert_to, EdgeAttrs, EngineError, Graph, Params, Value};
use parruntime::{AlgorithmOutput, ParallelRuntime, RuntimeConfig};
use std::sync::Arc;

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn runtime(workers: usize) -> ParallelRuntime {
    let mut runtime = ParallelRuntime::with_registry(
        Arc::new(paralgos::default_registry()),
        RuntimeConfig::default(),
    );
    runtime.set_workers(workers).unwrap();
    runtime
}

// Two triangles sharing node c, a pendant e-f and an isolate z.
fn sample_graph() -> Graph {
    let mut graph = Graph::new();
    for (u, v, w) in [
        ("a", "b", 1.0),
        ("b", "c", 2.0),
        ("a", "c", 4.0),
        ("c", "d", 1.0),
        ("d", "e", 3.0),
        ("c", "e", 1.0),
        ("e", "f", 1.0),
    ] {
        graph.add_weighted_edge(u, v, w);
    }
    graph.add_node("z");
    graph
}

fn cycle(n: usize) -> Graph {
    let mut graph = Graph::new();
    for i in 0..n {
        graph.add_edge(i.to_string(), ((i + 1) % n).to_string(), EdgeAttrs::new());
    }
    graph
}

fn assert_close(left: &Value, right: &Value, path: &str) {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            let same = (a.is_nan() && b.is_nan()) || a == b || (a - b).abs() < 1e-9;
            assert!(same, "{path}: {a} != {b}");
        }
        (Value::Array(a), Value::Array(b)) => {
            assert_eq!(a.len(), b.len(), "{path}: length differs");
            for (i, (x, y)) in a.iter().zip(b).enumerate() {
                assert_close(x, y, &format!("{path}[{i}]"));
            }
        }
        (Value::Object(a), Value::Object(b)) => {
            assert_eq!(a.keys().collect::<Vec<_>>(), b.keys().collect::<Vec<_>>(), "{path}: keys differ");
            for (key, x) in a {
                assert_close(x, &b[key], &format!("{path}.{key}"));
            }
        }
        _ => assert_eq!(left, right, "{path}"),
    }
}

#[test]
fn every_algorithm_is_registered() {
    let registry = paralgos::default_registry();
    let names = registry.list_algorithms();
    for expected in [
        "all_pairs_bellman_ford_path",
        "all_pairs_bellman_ford_path_length",
        "all_pairs_dijkstra",
        "all_pairs_dijkstra_path",
        "all_pairs_dijkstra_path_length",
        "all_pairs_shortest_path",
        "all_pairs_shortest_path_length",
        "betweenness_centrality",
        "closeness_vitality",
        "connectivity.all_pairs_node_connectivity",
        "edge_betweenness_centrality",
        "johnson",
        "local_efficiency",
        "number_of_isolates",
        "square_clustering",
    ] {
        assert!(names.iter().any(|n| n == expected), "{expected} missing");
        let metadata = registry.get_metadata(expected).unwrap();
        assert!(!metadata.description.is_empty());
    }
    assert_eq!(names.len(), 15);
}

#[test]
fn unknown_names_are_not_found() {
    init_logging();
    let runtime = runtime(2);
    for name in ["foo.bar", "connectivity.missing", "all_pairs_node_connectivity"] {
        let result = runtime.execute(name, sample_graph(), &Params::new());
        assert!(matches!(result, Err(EngineError::NotFound(n)) if n == name));
    }
}

#[test]
fn results_do_not_depend_on_worker_count() {
    init_logging();
    let graph = Arc::new(sample_graph());
    let single = runtime(1);
    let many = runtime(4);

    for name in single.registry().list_algorithms() {
        let expected = single
            .execute(&name, Arc::clone(&graph), &Params::new())
            .and_then(AlgorithmOutput::into_value)
            .unwrap_or_else(|e| panic!("{name} failed: {e}"));
        let actual = many
            .execute(&name, Arc::clone(&graph), &Params::new())
            .and_then(AlgorithmOutput::into_value)
            .unwrap_or_else(|e| panic!("{name} failed: {e}"));
        assert_close(&expected, &actual, &name);
    }
}

#[test]
fn wrapped_and_plain_graphs_agree() {
    let runtime = runtime(3);
    let plain = sample_graph();
    let wrapped = convert_from(plain.clone());

    let from_plain = runtime
        .execute("betweenness_centrality", plain, &Params::new())
        .and_then(AlgorithmOutput::into_value)
        .unwrap();
    let from_wrapped = runtime
        .execute("betweenness_centrality", wrapped.clone(), &Params::new())
        .and_then(AlgorithmOutput::into_value)
        .unwrap();
    assert_close(&from_plain, &from_wrapped, "betweenness_centrality");

    let back = convert_to(wrapped);
    assert_eq!(back.node_count(), 7);
}

#[test]
fn lazy_algorithms_stream_one_item_per_source() {
    let runtime = runtime(2);
    let output = runtime
        .execute("all_pairs_dijkstra_path_length", sample_graph(), &Params::new())
        .unwrap();
    let AlgorithmOutput::Stream(items) = output else {
        panic!("expected a stream");
    };

    let items: Vec<(String, Value)> = items.collect::<Result<_, _>>().unwrap();
    let sources: Vec<&str> = items.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(sources, vec!["a", "b", "c", "d", "e", "f", "z"]);

    let from_a = items[0].1.as_object().unwrap();
    // a-b-c costs 3, cheaper than the direct a-c edge.
    assert_eq!(from_a["c"], Value::Number(3.0));
    assert_eq!(from_a["f"], Value::Number(5.0));
    assert!(!from_a.contains_key("z"));
}

#[test]
fn parameters_reach_the_algorithm() {
    let runtime = runtime(2);
    let graph = Arc::new(sample_graph());

    let hops = runtime
        .execute(
            "all_pairs_shortest_path_length",
            Arc::clone(&graph),
            &Params::new().with("cutoff", 1.0),
        )
        .and_then(AlgorithmOutput::into_value)
        .unwrap();
    let from_a = hops.as_object().unwrap()["a"].as_object().unwrap();
    assert_eq!(from_a.len(), 3);

    let subset = runtime
        .execute(
            "square_clustering",
            Arc::clone(&graph),
            &Params::new().with("nodes", vec!["c", "z"]),
        )
        .and_then(AlgorithmOutput::into_value)
        .unwrap();
    assert_eq!(subset.as_object().unwrap().len(), 2);

    let isolates = runtime
        .execute("number_of_isolates", graph, &Params::new())
        .and_then(AlgorithmOutput::into_value)
        .unwrap();
    assert_eq!(isolates, Value::Number(1.0));
}

#[test]
fn invalid_parameters_are_rejected() {
    let runtime = runtime(2);
    let graph = Arc::new(sample_graph());

    for (name, params) in [
        ("betweenness_centrality", Params::new().with("k", 2.0)),
        ("all_pairs_shortest_path", Params::new().with("cutoff", 1.5)),
        ("all_pairs_dijkstra", Params::new().with("weight", 3.0)),
        ("betweenness_centrality", Params::new().with("normalized", "yes")),
    ] {
        let result = runtime.execute(name, Arc::clone(&graph), &params);
        assert!(
            matches!(result, Err(EngineError::InvalidArgument(_))),
            "{name} accepted bad parameters"
        );
    }

    let missing = runtime.execute("closeness_vitality", graph, &Params::new().with("node", "nope"));
    assert!(missing.is_err());
}

#[test]
fn closeness_vitality_of_triangle() {
    let runtime = runtime(2);
    let all = runtime
        .execute("closeness_vitality", cycle(3), &Params::new())
        .and_then(AlgorithmOutput::into_value)
        .unwrap();
    for value in all.as_object().unwrap().values() {
        assert_eq!(*value, Value::Number(2.0));
    }

    let one = runtime
        .execute("closeness_vitality", cycle(3), &Params::new().with("node", "1"))
        .and_then(AlgorithmOutput::into_value)
        .unwrap();
    assert_eq!(one, Value::Number(2.0));
}

#[test]
fn dotted_connectivity_on_cycle() {
    let runtime = runtime(3);
    let value = runtime
        .execute("connectivity.all_pairs_node_connectivity", cycle(4), &Params::new())
        .and_then(AlgorithmOutput::into_value)
        .unwrap();
    let table = value.as_object().unwrap();
    assert_eq!(table["0"].as_object().unwrap()["2"], Value::Number(2.0));
    assert_eq!(table["2"].as_object().unwrap()["0"], Value::Number(2.0));
    // Adjacent nodes: the edge itself plus one route around the cycle.
    assert_eq!(table["0"].as_object().unwrap()["1"], Value::Number(2.0));
}

#[test]
fn runs_publish_events() {
    let runtime = runtime(2);
    let mut events = runtime.subscribe_events();
    runtime
        .execute("number_of_isolates", sample_graph(), &Params::new())
        .unwrap();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(matches!(seen.first(), Some(parcore::ExecutionEvent::RunStarted { .. })));
    assert!(matches!(
        seen.last(),
        Some(parcore::ExecutionEvent::RunCompleted { success: true, .. })
    ));
}
