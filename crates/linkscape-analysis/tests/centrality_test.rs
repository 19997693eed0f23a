use linkscape_analysis::centrality::{self, CentralityKind, rank};
use linkscape_analysis::Error;
use linkscape_graph::{CancelToken, Graph, GraphBuilder};

fn star(leaves: usize) -> Graph {
    let mut b = GraphBuilder::undirected();
    for i in 0..leaves {
        b.set_edge("hub", format!("leaf{i}"));
    }
    b.build()
}

#[test]
fn eigenvector_on_isolated_nodes_is_zero_and_not_converged() {
    let mut b = GraphBuilder::undirected();
    b.set_node("a", None);
    b.set_node("b", None);
    let result = rank(&b.build(), CentralityKind::Eigenvector, &CancelToken::new())
        .expect("fallback is not an error");
    assert!(!result.converged);
    assert_eq!(result.scores.len(), 2);
    assert!(result.scores.iter().all(|&(_, s)| s == 0.0));
}

#[test]
fn every_kind_ranks_the_star_hub_first() {
    let g = star(6);
    for kind in CentralityKind::ALL {
        let result = rank(&g, kind, &CancelToken::new()).expect("computable");
        assert_eq!(result.kind, kind);
        assert_eq!(result.scores[0].0, "hub", "{kind}");
        assert_eq!(result.scores.len(), 7);
        assert!(result.converged, "{kind}");
    }
}

#[test]
fn star_scores_match_closed_forms() {
    let g = star(10);
    let cancel = CancelToken::new();
    let degree = rank(&g, CentralityKind::Degree, &cancel).expect("computable");
    assert_eq!(degree.score("hub"), Some(1.0));
    assert_eq!(degree.score("leaf0"), Some(0.1));

    let betweenness = rank(&g, CentralityKind::Betweenness, &cancel).expect("computable");
    assert_eq!(betweenness.score("hub"), Some(1.0));
    assert_eq!(betweenness.score("leaf3"), Some(0.0));
}

#[test]
fn directed_closeness_uses_incoming_distances() {
    // a -> b -> c: only c is reached by everyone.
    let mut b = GraphBuilder::directed();
    b.set_path(&["a", "b", "c"]);
    let g = b.build();
    let c = centrality::closeness(&g, &CancelToken::new()).expect("computable");
    assert_eq!(c[0], 0.0);
    // b: reached by a at distance 1 -> (1/1) * (1/2)
    assert!((c[1] - 0.5).abs() < 1e-12);
    // c: reached by b (1) and a (2) -> (2/3) * (2/2)
    assert!((c[2] - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn disconnected_closeness_is_scaled_by_reach() {
    let mut b = GraphBuilder::undirected();
    b.set_edge("a", "b");
    b.set_node("c", None);
    let c = centrality::closeness(&b.build(), &CancelToken::new()).expect("computable");
    // a reaches one node at distance 1 among three: (1/1) * (1/2).
    assert!((c[0] - 0.5).abs() < 1e-12);
    assert_eq!(c[2], 0.0);
}

#[test]
fn directed_betweenness_normalizes_over_ordered_pairs() {
    let mut b = GraphBuilder::directed();
    b.set_path(&["a", "b", "c"]);
    let cb = centrality::betweenness(&b.build(), &CancelToken::new()).expect("computable");
    assert_eq!(cb, vec![0.0, 0.5, 0.0]);
}

#[test]
fn empty_graph_has_empty_rankings() {
    let g = GraphBuilder::undirected().build();
    for kind in CentralityKind::ALL {
        let result = rank(&g, kind, &CancelToken::new()).expect("computable");
        assert!(result.scores.is_empty());
    }
}

#[test]
fn cancelled_token_interrupts_path_based_kinds() {
    let g = star(5);
    let cancel = CancelToken::new();
    cancel.cancel();
    for kind in [
        CentralityKind::Closeness,
        CentralityKind::Betweenness,
        CentralityKind::Eigenvector,
    ] {
        assert!(matches!(rank(&g, kind, &cancel), Err(Error::Cancelled)));
    }
    // Degree is a single pass and ignores the token.
    assert!(rank(&g, CentralityKind::Degree, &cancel).is_ok());
}

#[test]
fn kind_serializes_in_snake_case() {
    let json = serde_json::to_string(&CentralityKind::Eigenvector).expect("serializable");
    assert_eq!(json, "\"eigenvector\"");
}
