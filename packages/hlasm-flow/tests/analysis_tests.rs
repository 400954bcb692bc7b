//! Block chunk analysis and dependency-following tests

mod common;

use common::{source, SourceTree};
use hlasm_flow::features::chunking::SectionKind;
use hlasm_flow::{FlowConfig, HlasmAnalysis};
use pretty_assertions::assert_eq;

fn layout() -> SourceTree {
    let tree = SourceTree::new();
    tree.driver(&source(&[
        "DRIVER   CSECT",
        "         CALL  SUBPROG",
        "         CALL  GONE",
        "         END",
    ]));
    tree.lib(
        "SubProg.ASM",
        &source(&["SUBPROG  CSECT", "         LINK  EP=LEAF", "         END"]),
    );
    tree.lib(
        "leaf.asm",
        &source(&[
            "LEAF     CSECT",
            "         CALL  SUBPROG",
            "         BR    R14",
            "         END",
        ]),
    );
    tree
}

#[test]
fn test_analyze_file_chunks() {
    let tree = layout();
    let analysis = HlasmAnalysis::new(FlowConfig::default()).unwrap();
    let file = analysis.analyze_file(&tree.root().join("driver.asm")).unwrap();

    assert_eq!(file.program, "DRIVER");
    assert_eq!(file.chunks.len(), 1);
    assert_eq!(file.chunks[0].section_kind, SectionKind::Csect);
    assert_eq!(file.chunks[0].dependencies, vec!["SUBPROG", "GONE"]);
    assert_eq!(file.chunks[0].instruction_count(), 4);
    assert_eq!(file.vertex_name(&file.chunks[0]), "DRIVER");
}

#[test]
fn test_dependencies_followed_across_files() {
    let tree = layout();
    let analysis = HlasmAnalysis::new(FlowConfig::default())
        .unwrap()
        .with_external_dir(tree.lib_dir());
    let report = analysis
        .analyze_with_dependencies(&tree.root().join("driver.asm"))
        .unwrap();

    let programs: Vec<_> = report.files.iter().map(|f| f.program.as_str()).collect();
    assert_eq!(programs, vec!["DRIVER", "SUBPROG", "LEAF"]);

    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].dep_name, "GONE");
    assert_eq!(report.missing[0].referenced_in_chunk, "DRIVER");

    let map = &report.dependency_map;
    assert_eq!(map.direct_dependencies("DRIVER"), vec!["SUBPROG", "GONE"]);
    assert_eq!(map.all_dependencies("DRIVER"), vec!["SUBPROG", "GONE", "LEAF"]);
    assert_eq!(map.dependents("SUBPROG"), vec!["DRIVER", "LEAF"]);
    assert_eq!(
        map.cycles(),
        vec![vec!["LEAF".to_string(), "SUBPROG".to_string()]]
    );
}

#[test]
fn test_depth_limit_abandons_branch() {
    let tree = layout();
    let analysis = HlasmAnalysis::new(FlowConfig::default().max_depth(1))
        .unwrap()
        .with_external_dir(tree.lib_dir());
    let report = analysis
        .analyze_with_dependencies(&tree.root().join("driver.asm"))
        .unwrap();

    let programs: Vec<_> = report.files.iter().map(|f| f.program.as_str()).collect();
    assert_eq!(programs, vec!["DRIVER", "SUBPROG"]);
    assert!(report.missing.iter().all(|m| m.dep_name != "LEAF"));
}

#[test]
fn test_missing_entry_is_error() {
    let tree = SourceTree::new();
    let analysis = HlasmAnalysis::new(FlowConfig::default()).unwrap();
    assert!(analysis
        .analyze_with_dependencies(&tree.root().join("absent.asm"))
        .is_err());
}

#[test]
fn test_dependency_map_json() {
    let tree = layout();
    let analysis = HlasmAnalysis::new(FlowConfig::default())
        .unwrap()
        .with_external_dir(tree.lib_dir());
    let report = analysis
        .analyze_with_dependencies(&tree.root().join("driver.asm"))
        .unwrap();
    let json = report.dependency_map.to_json();
    assert_eq!(json["edges"][0], serde_json::json!({"src": "DRIVER", "dest": "SUBPROG"}));
    assert!(json["vertices"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("LEAF")));
}
