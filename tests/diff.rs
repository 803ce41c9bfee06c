//! Diff tokenization tests
//!
//! Unified diff input through the worker: per-line token lists for both
//! sides, whitespace visualization and the shared node budget.

mod common;

use common::{fake_worker, FakeEngine};
use syntax_worker::diff::{
    parse_unified_diff, Change, ChangeKind, Hunk, SPACE_CLASS, TAB_CLASS, TOKENIZE_NODE_LIMIT,
};
use syntax_worker::syntax::LanguageLoader;
use syntax_worker::tree::{text_of, Node};
use syntax_worker::worker::{JobId, Request, Response, TokenizePayload, Worker};
use syntax_worker::{SyntaxClient, WorkerConfig};

const RUST_DIFF: &str = "\
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,3 @@
 fn answer() -> u32 {
-    41
+    42
 }
";

fn classes_of(line: &[Node]) -> Vec<String> {
    line.iter()
        .filter_map(Node::as_element)
        .flat_map(|e| e.properties.class_name.iter().cloned())
        .collect()
}

#[test]
fn test_rust_hunk_both_sides() {
    let hunks = parse_unified_diff(RUST_DIFF).unwrap();
    let mut client = SyntaxClient::spawn(&WorkerConfig::default()).unwrap();

    let tokens = client.tokenize_hunks(hunks, "rust", false).unwrap();
    assert_eq!(tokens.old.len(), 3);
    assert_eq!(tokens.new.len(), 3);
    assert_eq!(text_of(&tokens.old[1]), "    41");
    assert_eq!(text_of(&tokens.new[1]), "    42");
    assert_eq!(text_of(&tokens.new[2]), "}");

    assert!(classes_of(&tokens.old[0]).iter().any(|c| c == "keyword"));
    assert!(classes_of(&tokens.new[1]).iter().any(|c| c == "token"));
    client.shutdown();
}

#[test]
fn test_whitespace_marks_every_space_and_tab() {
    let hunk = Hunk {
        changes: vec![Change::new(ChangeKind::Insert, "\ta  b")],
        ..Default::default()
    };
    let mut client = SyntaxClient::spawn(&WorkerConfig::default()).unwrap();

    let tokens = client.tokenize_hunks(vec![hunk], "text", true).unwrap();
    assert!(tokens.old.is_empty());
    let line = &tokens.new[0];
    assert_eq!(text_of(line), "\ta  b");

    let classes = classes_of(line);
    assert_eq!(classes.iter().filter(|c| *c == TAB_CLASS).count(), 1);
    assert_eq!(classes.iter().filter(|c| *c == SPACE_CLASS).count(), 2);
}

#[test]
fn test_over_budget_is_structured_failure() {
    let config = WorkerConfig {
        tokenize_node_limit: 3,
        ..Default::default()
    };
    let hunks = parse_unified_diff(RUST_DIFF).unwrap();
    let mut client = SyntaxClient::spawn(&config).unwrap();

    let reason = client.tokenize_hunks(hunks, "rust", true).unwrap_err();
    assert!(reason.starts_with("Node limit (3) reached. Current nodes: "));
}

#[test]
fn test_tokenize_failure_payload_has_success_false() {
    let mut worker = Worker::new(
        FakeEngine::default().failing("missing"),
        LanguageLoader::default(),
        TOKENIZE_NODE_LIMIT,
    );
    let hunk = Hunk {
        changes: vec![Change::new(ChangeKind::Normal, "x")],
        ..Default::default()
    };

    let response = worker
        .handle(Request::Tokenize {
            id: JobId(1),
            payload: TokenizePayload {
                hunks: vec![hunk],
                language: "missing".to_string(),
                whitespace: false,
            },
        })
        .unwrap();

    match response {
        Response::Failure { id, payload } => {
            assert_eq!(id, JobId(1));
            assert_eq!(payload.success, Some(false));
            assert_eq!(payload.reason, "grammar missing is not registered");
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_old_and_new_sides_follow_change_kinds() {
    let (mut worker, _) = fake_worker();
    let hunk = Hunk {
        changes: vec![
            Change::new(ChangeKind::Delete, "gone"),
            Change::new(ChangeKind::Normal, "kept"),
            Change::new(ChangeKind::Insert, "added"),
        ],
        ..Default::default()
    };

    let response = worker
        .handle(Request::Tokenize {
            id: JobId(2),
            payload: TokenizePayload {
                hunks: vec![hunk],
                language: "text".to_string(),
                whitespace: false,
            },
        })
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["payload"]["success"], true);

    let tokens = &json["payload"]["tokens"];
    assert_eq!(tokens["old"].as_array().unwrap().len(), 2);
    assert_eq!(tokens["new"].as_array().unwrap().len(), 2);
    assert_eq!(tokens["old"][0][0]["children"][0]["value"], "gone");
    assert_eq!(tokens["new"][1][0]["children"][0]["value"], "added");
}
