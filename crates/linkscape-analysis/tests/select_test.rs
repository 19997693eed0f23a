use linkscape_analysis::select::{
    self, Advisory, Selection, keyword_filter, largest_component, neighborhood, top_by_degree,
};
use linkscape_analysis::Error;
use linkscape_graph::{Graph, GraphBuilder};

fn star(leaves: usize) -> Graph {
    let mut b = GraphBuilder::undirected();
    for i in 0..leaves {
        b.set_edge("center", format!("leaf{i:02}"));
    }
    b.build()
}

#[test]
fn largest_component_picks_five_over_three() {
    let mut b = GraphBuilder::directed();
    b.set_path(&["a1", "a2", "a3", "a4", "a5"]);
    b.set_path(&["b1", "b2", "b3"]);
    let g = b.build();

    let sub = largest_component(&g);
    assert_eq!(sub.node_count(), 5);
    assert!(sub.node_ids().all(|id| id.starts_with('a')));
    assert_eq!(sub.edge_count(), 4);
    assert!(sub.is_directed());
}

#[test]
fn star_neighborhood_by_radius() {
    let g = star(10);
    assert_eq!(neighborhood(&g, "center", 1).map(|s| s.node_count()).ok(), Some(11));

    let only_seed = neighborhood(&g, "center", 0).expect("seed exists");
    let ids: Vec<&str> = only_seed.node_ids().collect();
    assert_eq!(ids, vec!["center"]);

    // Leaf to leaf takes two hops through the center.
    assert_eq!(neighborhood(&g, "leaf03", 1).map(|s| s.node_count()).ok(), Some(2));
    assert_eq!(neighborhood(&g, "leaf03", 2).map(|s| s.node_count()).ok(), Some(11));
}

#[test]
fn neighborhood_ignores_direction() {
    let mut b = GraphBuilder::directed();
    b.set_edge("a", "seed");
    b.set_edge("seed", "b");
    let g = b.build();
    assert_eq!(neighborhood(&g, "seed", 1).map(|s| s.node_count()).ok(), Some(3));
}

#[test]
fn neighborhood_of_missing_seed_is_not_found() {
    let err = neighborhood(&star(3), "ghost", 1).expect_err("absent seed");
    assert!(matches!(err, Error::NotFound { ref id } if id == "ghost"));
}

#[test]
fn top_by_degree_returns_min_k_n_highest_degree_nodes() {
    let mut b = GraphBuilder::undirected();
    b.set_path(&["a", "b", "c", "d", "e"]);
    b.set_edge("c", "f");
    b.set_edge("c", "g");
    let g = b.build();

    for k in 0..10 {
        let sub = top_by_degree(&g, k);
        assert_eq!(sub.node_count(), k.min(g.node_count()), "k = {k}");

        let min_kept = sub
            .node_ids()
            .filter_map(|id| g.degree(id))
            .min()
            .unwrap_or(usize::MAX);
        let max_dropped = g
            .node_ids()
            .filter(|id| !sub.has_node(id))
            .filter_map(|id| g.degree(id))
            .max()
            .unwrap_or(0);
        assert!(sub.is_empty() || min_kept >= max_dropped, "k = {k}");
    }

    // b and d both have degree 2; b wins on id.
    let top2 = top_by_degree(&g, 2);
    assert!(top2.has_node("c") && top2.has_node("b"));
}

#[test]
fn keyword_filter_matches_labels_case_insensitively() {
    let mut b = GraphBuilder::undirected();
    b.set_node("q1", Some("Quantum Mechanics".to_string()));
    b.set_node("q2", Some("Classical mechanics".to_string()));
    b.set_node("photon", None);
    b.set_node("q3", Some("Thermodynamics".to_string()));
    b.set_edge("q1", "q2");
    b.set_edge("q1", "photon");
    let g = b.build();

    let sub = keyword_filter(&g, &["MECHANICS"]);
    let ids: Vec<&str> = sub.node_ids().collect();
    assert_eq!(ids, vec!["q1", "q2"]);
    assert_eq!(sub.edge_count(), 1);

    // Unlabeled nodes match on their id.
    let sub = keyword_filter(&g, &["thermo", " Phot "]);
    let ids: Vec<&str> = sub.node_ids().collect();
    assert_eq!(ids, vec!["photon", "q3"]);

    assert!(keyword_filter(&g, &["biology"]).is_empty());
}

#[test]
fn community_selection_takes_the_largest_by_default() {
    let mut b = GraphBuilder::undirected();
    let clique = ["a", "b", "c", "d"];
    for (i, v) in clique.iter().enumerate() {
        for w in &clique[i + 1..] {
            b.set_edge(*v, *w);
        }
    }
    b.set_edge("x", "y");
    let g = b.build();

    let out = select::select(&g, &Selection::Community {
        index: 0,
        options: Default::default(),
    });
    assert_eq!(out.graph.node_count(), 4);
    assert!(out.advisory.is_none());

    let out = select::select(&g, &Selection::Community {
        index: 9,
        options: Default::default(),
    });
    assert!(out.graph.is_empty());
}

#[test]
fn selection_deserializes_from_tagged_json() {
    let sel: Selection =
        serde_json::from_str(r#"{"kind": "neighborhood", "seed": "Rust"}"#).expect("valid");
    assert_eq!(sel, Selection::Neighborhood {
        seed: "Rust".to_string(),
        radius: 1,
    });

    let sel: Selection = serde_json::from_str(r#"{"kind": "top_by_degree", "k": 3}"#).expect("valid");
    assert_eq!(sel, Selection::TopByDegree { k: 3 });

    assert!(serde_json::from_str::<Selection>(r#"{"kind": "everything"}"#).is_err());
}

#[test]
fn advisory_serializes_with_kind_tag() {
    let json = serde_json::to_value(Advisory::SeedNotFound {
        seed: "x".to_string(),
    })
    .expect("serializable");
    assert_eq!(json, serde_json::json!({"kind": "seed_not_found", "seed": "x"}));
}
