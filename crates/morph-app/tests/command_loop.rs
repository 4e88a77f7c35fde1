// End-to-end tests for the morph-duel command loop, driven from the shipped
// defaults and word list.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use morph_app::app;
use morph_core::broadcast::ChannelBroadcaster;
use morph_core::config::{self, CONFIG_FILE};
use morph_core::dictionary::Dictionary;
use morph_core::duel::{DuelEngine, EngineSettings};
use morph_core::insight::BranchLevel;
use serde_json::Value;
use tokio::sync::mpsc;

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fresh base directory holding copies of `defaults/` and `data/`.
fn scratch_base(name: &str) -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    let base = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&base);
    fs::create_dir_all(base.join("defaults")).unwrap();
    fs::create_dir_all(base.join("data")).unwrap();
    fs::copy(
        manifest.join("defaults").join(CONFIG_FILE),
        base.join("defaults").join(CONFIG_FILE),
    )
    .unwrap();
    fs::copy(
        manifest.join("data/words.txt"),
        base.join("data/words.txt"),
    )
    .unwrap();
    base
}

/// Run `requests` through a freshly built engine and return every output
/// line as JSON.
async fn run_script(base: &Path, requests: &[&str]) -> Vec<Value> {
    let config = config::load_config(base).unwrap();
    let dictionary =
        Arc::new(Dictionary::load(&config.dictionary, base, config.game.word_length).unwrap());

    let (event_tx, event_rx) = mpsc::channel(256);
    let (line_tx, line_rx) = mpsc::channel(64);
    let engine = DuelEngine::new(
        EngineSettings::from_config(&config),
        dictionary.graph(),
        dictionary,
    )
    .with_broadcaster(Arc::new(ChannelBroadcaster::new(event_tx)));

    for request in requests {
        line_tx.send(request.to_string()).await.unwrap();
    }
    drop(line_tx);

    let mut out: Vec<u8> = Vec::new();
    app::run(&engine, line_rx, event_rx, &mut out).await.unwrap();

    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// `(channel, outcome-or-event)` for each output line.
fn shape(lines: &[Value]) -> Vec<(String, String)> {
    lines
        .iter()
        .map(|line| {
            let channel = line["channel"].as_str().unwrap().to_string();
            let kind = match channel.as_str() {
                "response" => line["response"]["outcome"].as_str(),
                _ => line["event"]["event"].as_str(),
            };
            (channel, kind.unwrap().to_string())
        })
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn shipped_word_list_supports_random_starts() {
    let base = scratch_base("morph_app_word_list");
    let config = config::load_config(&base).unwrap();
    let dictionary = Dictionary::load(&config.dictionary, &base, config.game.word_length).unwrap();
    let graph = dictionary.graph();

    assert!(graph.len() > 1000);
    assert!(graph.words_with_min_degree(config.game.min_start_degree).len() >= 2);
    assert!(graph.words().iter().all(|w| graph.degree(w.as_str()) >= 2));

    let high = graph
        .words()
        .into_iter()
        .filter(|w| {
            BranchLevel::from_degree(graph.degree(w.as_str()), &config.game.branching)
                == BranchLevel::High
        })
        .count();
    assert!(high > 0, "no word reaches high branching");
    for word in ["STONE", "SHONE", "SHORE", "STORE"] {
        assert!(graph.contains(word), "{word} should be morphable");
    }

    let _ = fs::remove_dir_all(&base);
}

#[tokio::test]
async fn scripted_duel_produces_responses_and_events_in_order() {
    let base = scratch_base("morph_app_scripted_duel");
    let lines = run_script(
        &base,
        &[
            r#"{"type":"start_duel","matchId":"m1","players":[{"userId":"ana","username":"Ana"},{"userId":"ben","username":"Ben"}],"startWord":"stone","targetWord":"shore"}"#,
            r#"{"type":"submit_move","matchId":"m1","userId":"ana","word":"shone"}"#,
            r#"{"type":"submit_move","matchId":"m1","userId":"ben","word":"crane"}"#,
            r#"{"type":"submit_move","matchId":"m1","userId":"ben","word":"store"}"#,
            r#"{"type":"submit_move","matchId":"m1","userId":"ana","word":"shore"}"#,
            r#"{"type":"submit_move""#,
            r#"{"type":"stats"}"#,
        ],
    )
    .await;

    let expected: Vec<(String, String)> = [
        ("response", "started"),
        ("event", "started"),
        ("response", "move_accepted"),
        ("event", "move_accepted"),
        ("response", "rejected"),
        ("response", "move_accepted"),
        ("event", "move_accepted"),
        ("response", "move_accepted"),
        ("event", "move_accepted"),
        ("event", "finished"),
        ("response", "rejected"),
        ("response", "stats"),
    ]
    .iter()
    .map(|(c, k)| (c.to_string(), k.to_string()))
    .collect();
    assert_eq!(shape(&lines), expected);

    let rejected = &lines[4]["response"];
    assert_eq!(rejected["error"]["code"], "INVALID_TRANSFORMATION");
    assert_eq!(rejected["state"]["currentPlayer"], "ben");

    let winning = &lines[7]["response"];
    assert_eq!(winning["completed"], true);
    assert_eq!(winning["state"]["winnerId"], "ana");
    assert_eq!(winning["summary"]["standings"][0]["score"], 100 - 10 + 50);

    assert_eq!(lines[10]["response"]["error"]["code"], "INVALID_REQUEST");
    assert_eq!(lines[11]["response"]["finishedMatches"], 1);
    assert_eq!(lines[11]["response"]["activeMatches"], 0);

    let _ = fs::remove_dir_all(&base);
}

#[tokio::test]
async fn hint_request_reports_budget() {
    let base = scratch_base("morph_app_hint");
    let lines = run_script(
        &base,
        &[
            r#"{"type":"start_duel","matchId":"h1","players":[{"userId":"ana","username":"Ana"},{"userId":"ben","username":"Ben"}],"startWord":"stone","targetWord":"shore"}"#,
            r#"{"type":"request_hint","matchId":"h1","userId":"ana"}"#,
            r#"{"type":"request_hint","matchId":"missing","userId":"ana"}"#,
        ],
    )
    .await;

    let hint = &lines[2]["response"];
    assert_eq!(hint["outcome"], "hint");
    assert_eq!(hint["hintBudget"]["used"], 1);
    assert_eq!(hint["hintBudget"]["limit"], 5);
    assert!(!hint["suggestions"].as_array().unwrap().is_empty());
    assert_eq!(lines[3]["event"]["event"], "hint_granted");

    let missing = &lines[4]["response"];
    assert_eq!(missing["error"]["code"], "MATCH_NOT_FOUND");

    let _ = fs::remove_dir_all(&base);
}
