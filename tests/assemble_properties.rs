//! Structural properties of assembled provenance graphs

mod common;

use common::*;
use provgraph::{
    assemble, AssembleError, Assembler, AssemblyFilter, Dataset, FileRole, GraphError, NodeId,
    NodeKind,
};

fn grch38() -> AssemblyFilter {
    AssemblyFilter::new(ASSEMBLY)
}

#[test]
fn test_end_to_end_raw_processed_and_coalesced_references() {
    let references = numbered_ids("X", 6);
    let mut inputs = vec!["/files/R/".to_string()];
    inputs.extend(references.iter().cloned());

    let files = vec![
        file("/files/R/").build(),
        file("/files/P/")
            .derived_from(&inputs)
            .step("/analysis-steps/S1/", "alignment")
            .build(),
    ];
    let dataset = dataset_with_contributing(&references);

    let assembly = assemble(&dataset, None, &files, &grch38()).unwrap();
    let graph = &assembly.graph;
    assert_well_formed(graph);

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 3);

    let steps = step_nodes(graph);
    assert_eq!(steps.len(), 1);
    let step = &steps[0].id;
    assert_eq!(steps[0].label, "alignment");

    let coalesced = coalesced_nodes(graph);
    assert_eq!(coalesced.len(), 1);
    assert_eq!(coalesced[0].label, "6 contributing files");

    assert!(graph.has_edge(step, &NodeId::file("/files/P/")));
    assert!(graph.has_edge(&NodeId::file("/files/R/"), step));
    assert!(graph.has_edge(&coalesced[0].id, step));

    assert!(assembly.is_graphed("/files/R/"));
    assert!(assembly.is_graphed("/files/P/"));
    assert_eq!(assembly.graphed_files.len(), 2);
    for reference in &references {
        assert!(!assembly.is_graphed(reference));
        assert!(!graph.contains_node(&NodeId::file(reference)));
    }
}

#[test]
fn test_five_identical_contributors_coalesce() {
    let contributors = numbered_ids("C", 5);
    let files = vec![
        file("/files/A/").derived_from(&contributors).build(),
        file("/files/B/").derived_from(&contributors).build(),
    ];
    let dataset = dataset_with_contributing(&contributors);

    let graph = assemble(&dataset, None, &files, &grch38()).unwrap().graph;
    assert_well_formed(&graph);

    assert_eq!(coalesced_nodes(&graph).len(), 1);
    assert!(nodes_with_role(&graph, FileRole::Contributing).is_empty());
    // A, B, their shared unknown-software step, the group
    assert_eq!(graph.node_count(), 4);
}

#[test]
fn test_four_identical_contributors_stay_individual() {
    let contributors = numbered_ids("C", 4);
    let files = vec![
        file("/files/A/").derived_from(&contributors).build(),
        file("/files/B/").derived_from(&contributors).build(),
    ];
    let dataset = dataset_with_contributing(&contributors);

    let graph = assemble(&dataset, None, &files, &grch38()).unwrap().graph;
    assert_well_formed(&graph);

    assert!(coalesced_nodes(&graph).is_empty());
    let individual = nodes_with_role(&graph, FileRole::Contributing);
    assert_eq!(individual.len(), 4);
    assert!(individual.iter().any(|n| n.label == "C1"));
}

#[test]
fn test_coalesce_threshold_is_configurable() {
    let contributors = numbered_ids("C", 3);
    let files = vec![file("/files/A/").derived_from(&contributors).build()];
    let dataset = dataset_with_contributing(&contributors);

    let assembly = Assembler::new()
        .min_coalesce_count(3)
        .assemble(&dataset, None, &files, &grch38())
        .unwrap();
    assert_eq!(coalesced_nodes(&assembly.graph).len(), 1);
}

#[test]
fn test_island_file_is_excluded() {
    let files = vec![
        file("/files/R/").build(),
        file("/files/P/").derived_from(&["/files/R/"]).build(),
        file("/files/ISLAND/").build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");

    let assembly = assemble(&dataset, None, &files, &grch38()).unwrap();
    assert_well_formed(&assembly.graph);
    assert!(!assembly.graph.contains_node(&NodeId::file("/files/ISLAND/")));
    assert!(!assembly.is_graphed("/files/ISLAND/"));
}

#[test]
fn test_missing_derivation_target_is_flagged() {
    let files = vec![file("/files/P/").derived_from(&["/files/ENCFF999ZZZ/"]).build()];
    let dataset = Dataset::new("ENCSR000AAA");

    let graph = assemble(&dataset, None, &files, &grch38()).unwrap().graph;
    assert_well_formed(&graph);

    let missing = nodes_with_role(&graph, FileRole::Missing);
    assert_eq!(missing.len(), 1);
    assert!(missing[0].is_flagged());
    assert_eq!(missing[0].label, "ENCFF999ZZZ (unknown)");
    assert_eq!(missing[0].id, NodeId::file("/files/ENCFF999ZZZ/"));
}

#[test]
fn test_same_step_same_inputs_share_one_step_node() {
    let inputs = ["/files/R1/", "/files/R2/"];
    let files = vec![
        file("/files/R1/").build(),
        file("/files/R2/").build(),
        file("/files/A/").derived_from(&inputs).step("/analysis-steps/S/", "peak calling").build(),
        file("/files/B/").derived_from(&["/files/R2/", "/files/R1/"]).step("/analysis-steps/S/", "peak calling").build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");

    let graph = assemble(&dataset, None, &files, &grch38()).unwrap().graph;
    assert_well_formed(&graph);

    let steps = step_nodes(&graph);
    assert_eq!(steps.len(), 1);
    let step = &steps[0].id;
    assert_eq!(graph.incoming(step).count(), 2);
    assert_eq!(graph.outgoing(step).count(), 2);
    assert!(graph.has_edge(step, &NodeId::file("/files/A/")));
    assert!(graph.has_edge(step, &NodeId::file("/files/B/")));
}

#[test]
fn test_same_step_different_inputs_get_distinct_step_nodes() {
    let files = vec![
        file("/files/R1/").build(),
        file("/files/R2/").build(),
        file("/files/A/").derived_from(&["/files/R1/"]).step("/analysis-steps/S/", "alignment").build(),
        file("/files/B/").derived_from(&["/files/R2/"]).step("/analysis-steps/S/", "alignment").build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");

    let graph = assemble(&dataset, None, &files, &grch38()).unwrap().graph;
    assert_well_formed(&graph);
    assert_eq!(step_nodes(&graph).len(), 2);
}

#[test]
fn test_filter_miss_fails_with_no_relationships() {
    let files = vec![
        file("/files/R/").assembly("hg19").build(),
        file("/files/P/").assembly("hg19").derived_from(&["/files/R/"]).build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");

    let err = assemble(&dataset, None, &files, &grch38()).unwrap_err();
    assert!(matches!(err, AssembleError::NoRelationships { islands: 0, .. }));
}

#[test]
fn test_only_islands_fails_with_island_count() {
    let files = vec![file("/files/A/").build(), file("/files/B/").build()];
    let dataset = Dataset::new("ENCSR000AAA");

    match assemble(&dataset, None, &files, &grch38()) {
        Err(AssembleError::NoRelationships { filter, islands }) => {
            assert_eq!(islands, 2);
            assert_eq!(filter, grch38());
        }
        other => panic!("expected NoRelationships, got {:?}", other.map(|a| a.graph.node_count())),
    }
}

#[test]
fn test_unknown_software_step_is_flagged() {
    let files = vec![
        file("/files/R/").build(),
        file("/files/P/").derived_from(&["/files/R/"]).build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");

    let graph = assemble(&dataset, None, &files, &grch38()).unwrap().graph;
    let steps = step_nodes(&graph);
    assert_eq!(steps.len(), 1);
    assert!(steps[0].is_flagged());
    assert_eq!(steps[0].label, "Software unknown");
    assert_eq!(steps[0].id, NodeId::unknown_step("/files/R/"));
}

#[test]
fn test_replicate_nodes_parent_files_and_steps() {
    let files = vec![
        file("/files/R/").replicates(&[1]).build(),
        file("/files/P/")
            .replicates(&[1])
            .derived_from(&["/files/R/"])
            .step("/analysis-steps/S/", "alignment")
            .build(),
        file("/files/POOLED/")
            .replicates(&[1, 2])
            .derived_from(&["/files/P/"])
            .build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");

    let graph = assemble(&dataset, None, &files, &grch38()).unwrap().graph;
    assert_well_formed(&graph);

    let rep = NodeId::replicate(1);
    assert!(graph.contains_node(&rep));
    assert!(!graph.contains_node(&NodeId::replicate(2)));

    let p = graph.get_node(&NodeId::file("/files/P/")).unwrap();
    assert_eq!(p.parent.as_ref(), Some(&rep));
    let pooled = graph.get_node(&NodeId::file("/files/POOLED/")).unwrap();
    assert_eq!(pooled.parent, None);

    let step = step_nodes(&graph)
        .into_iter()
        .find(|s| matches!(&s.kind, NodeKind::Step { file_id, .. } if file_id == "/files/P/"))
        .unwrap();
    assert_eq!(step.parent.as_ref(), Some(&rep));
}

#[test]
fn test_non_matching_input_becomes_anchor() {
    let files = vec![
        file("/files/HG19/").assembly("hg19").build(),
        file("/files/P/").derived_from(&["/files/HG19/"]).build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");

    let assembly = assemble(&dataset, None, &files, &grch38()).unwrap();
    assert_well_formed(&assembly.graph);

    let anchors = nodes_with_role(&assembly.graph, FileRole::Derived);
    assert_eq!(anchors.len(), 1);
    assert_eq!(anchors[0].label, "HG19 (alignments)");
    assert!(assembly.is_graphed("/files/HG19/"));
}

#[test]
fn test_step_without_inputs_is_not_graphed_itself() {
    // Q has a step but no derivations: it cannot be placed as a dataset
    // file, but P still needs it as an input anchor
    let files = vec![
        file("/files/Q/").step("/analysis-steps/S/", "alignment").build(),
        file("/files/P/").derived_from(&["/files/Q/"]).build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");

    let graph = assemble(&dataset, None, &files, &grch38()).unwrap().graph;
    assert_well_formed(&graph);
    let q = graph.get_node(&NodeId::file("/files/Q/")).unwrap();
    assert!(matches!(q.kind, NodeKind::File { role: FileRole::Derived, .. }));
}

#[test]
fn test_fetched_contributing_file_keeps_its_record() {
    let contributor = "/files/REF/".to_string();
    let files = vec![
        file(&contributor).assembly("hg19").build(),
        file("/files/P/").derived_from(&[contributor.as_str()]).build(),
    ];
    let dataset = dataset_with_contributing(&[contributor.clone()]);

    let assembly = assemble(&dataset, None, &files, &grch38()).unwrap();
    assert_well_formed(&assembly.graph);

    let contributing = nodes_with_role(&assembly.graph, FileRole::Contributing);
    assert_eq!(contributing.len(), 1);
    assert_eq!(contributing[0].label, "REF (alignments)");
    assert!(assembly.is_graphed(&contributor));
}

#[test]
fn test_quality_metrics_are_subnodes() {
    let files = vec![
        file("/files/R/").build(),
        file("/files/P/").derived_from(&["/files/R/"]).qc("/qc/1/").qc("/qc/2/").build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");
    let selected = NodeId::qc("/qc/2/", "/files/P/");

    let graph = assemble(&dataset, Some(&selected), &files, &grch38()).unwrap().graph;
    assert_well_formed(&graph);

    let p = graph.get_node(&NodeId::file("/files/P/")).unwrap();
    assert_eq!(p.subnodes.len(), 2);
    assert!(p.subnodes[1].active);
    assert!(!p.active);
    assert!(graph.nodes().all(|n| n.id.namespace() != Some(provgraph::Namespace::Qc)));
}

#[test]
fn test_selected_node_is_active() {
    let files = vec![
        file("/files/R/").build(),
        file("/files/P/").derived_from(&["/files/R/"]).build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");
    let selected = NodeId::file("/files/R/");

    let graph = assemble(&dataset, Some(&selected), &files, &grch38()).unwrap().graph;
    let active: Vec<&NodeId> = graph.nodes().filter(|n| n.active).map(|n| &n.id).collect();
    assert_eq!(active, vec![&selected]);
}

#[test]
fn test_annotation_selects_subset() {
    let files = vec![
        file("/files/R/").annotation("V24").build(),
        file("/files/P/").annotation("V24").derived_from(&["/files/R/"]).build(),
        file("/files/OLD/").annotation("V19").derived_from(&["/files/R/"]).build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");

    let assembly = assemble(&dataset, None, &files, &grch38().with_annotation("V24")).unwrap();
    assert!(assembly.is_graphed("/files/P/"));
    assert!(!assembly.is_graphed("/files/OLD/"));

    let err = assemble(&dataset, None, &files, &grch38()).unwrap_err();
    assert!(matches!(err, AssembleError::NoRelationships { .. }));
}

#[test]
fn test_archived_files_are_dropped_by_candidates() {
    let files = vec![
        file("/files/R/").build(),
        file("/files/P/").derived_from(&["/files/R/"]).status("archived").build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");

    let err = assemble(&dataset, None, provgraph::graph_candidates(&files), &grch38()).unwrap_err();
    assert!(matches!(err, AssembleError::NoRelationships { .. }));
}

#[test]
fn test_assembly_is_repeatable() {
    let references = numbered_ids("X", 7);
    let mut inputs = references.clone();
    inputs.push("/files/R/".into());
    inputs.push("/files/GHOST/".into());
    let files = vec![
        file("/files/R/").replicates(&[1]).build(),
        file("/files/P/").replicates(&[1]).derived_from(&inputs).step("/analysis-steps/S/", "alignment").build(),
    ];
    let dataset = dataset_with_contributing(&references);

    let first = assemble(&dataset, None, &files, &grch38()).unwrap();
    let second = assemble(&dataset, None, &files, &grch38()).unwrap();
    assert_well_formed(&first.graph);

    let ids = |a: &provgraph::Assembly| a.graph.nodes().map(|n| n.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(first.graph.edge_count(), second.graph.edge_count());
}

#[test]
fn test_self_derivation_adds_no_loop() {
    let files = vec![
        file("/files/R/").build(),
        file("/files/P/")
            .derived_from(&["/files/P/", "/files/R/"])
            .step("/analysis-steps/S/", "alignment")
            .build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");

    let graph = assemble(&dataset, None, &files, &grch38()).unwrap().graph;
    assert_well_formed(&graph);

    let p = NodeId::file("/files/P/");
    let step = &step_nodes(&graph)[0].id;
    assert!(graph.has_edge(step, &p));
    assert!(!graph.has_edge(&p, step));
    assert!(graph.has_edge(&NodeId::file("/files/R/"), step));
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn test_file_deriving_only_from_itself() {
    let files = vec![file("/files/P/")
        .derived_from(&["/files/P/"])
        .step("/analysis-steps/S/", "alignment")
        .build()];
    let dataset = Dataset::new("ENCSR000AAA");

    let graph = assemble(&dataset, None, &files, &grch38()).unwrap().graph;
    assert_well_formed(&graph);
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_mutual_derivation_is_an_integrity_error() {
    let files = vec![
        file("/files/A/").derived_from(&["/files/B/"]).build(),
        file("/files/B/").derived_from(&["/files/A/"]).build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");

    let err = assemble(&dataset, None, &files, &grch38()).unwrap_err();
    assert!(matches!(err, AssembleError::Integrity(GraphError::Cycle(_))));
}

#[test]
fn test_assembly_outlives_a_temporary_dataset() {
    let files = vec![
        file("/files/R/").build(),
        file("/files/P/").derived_from(&["/files/R/"]).build(),
    ];

    let assembly = assemble(&Dataset::new("ENCSR000AAA"), None, &files, &grch38()).unwrap();
    assert_eq!(assembly.graph.accession, "ENCSR000AAA");
    assert!(assembly.is_graphed("/files/P/"));
}

#[test]
fn test_duplicate_ids_keep_the_later_record() {
    let mut earlier = file("/files/P/").derived_from(&["/files/R/"]).build();
    earlier.output_type = Some("unfiltered alignments".into());
    let later = file("/files/P/").derived_from(&["/files/R/"]).build();
    let files = vec![file("/files/R/").build(), earlier, later];
    let dataset = Dataset::new("ENCSR000AAA");

    let assembly = assemble(&dataset, None, &files, &grch38()).unwrap();
    assert_well_formed(&assembly.graph);

    let graphed = assembly.graphed_files["/files/P/"];
    assert!(std::ptr::eq(graphed, &files[2]));
    let p = assembly.graph.get_node(&NodeId::file("/files/P/")).unwrap();
    assert_eq!(p.label, "P (alignments)");
}

#[test]
fn test_later_duplicate_outside_filter_removes_the_file() {
    let files = vec![
        file("/files/R/").build(),
        file("/files/P/").derived_from(&["/files/R/"]).build(),
        file("/files/P/").assembly("hg19").derived_from(&["/files/R/"]).build(),
    ];
    let dataset = Dataset::new("ENCSR000AAA");

    let err = assemble(&dataset, None, &files, &grch38()).unwrap_err();
    assert!(matches!(err, AssembleError::NoRelationships { islands: 1, .. }));
}
