// Spellbook - tests/e2e_pipeline.rs
//
// End-to-end tests for the load, classify, query and export pipeline.
//
// These tests exercise the real filesystem, a real loopback HTTP server and
// the full path from a raw export on disk or on the wire to filtered,
// formatted and exported records.

use spellbook::app::fetch::{fetch_text, FetchConfig};
use spellbook::app::state::AppState;
use spellbook::core::classify::{build_class_index, Classifier};
use spellbook::core::export::{export, ExportFormat};
use spellbook::core::filter::{query, FilterState, QueryMode};
use spellbook::core::parser::{parse, parse_content, ParseConfig};
use spellbook::util::error::FetchError;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to an on-disk fixture file.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).expect("read fixture")
}

fn listed_ids(state: &AppState) -> Vec<String> {
    state
        .filtered_records()
        .map(|r| r.id().unwrap_or_default().to_string())
        .collect()
}

/// Serve one raw HTTP response on a loopback port and return the URL.
fn serve_raw(response: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");

    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });

    format!("http://{addr}/spells.txt")
}

/// Serve one response with a Content-Length header.
fn serve_once(status_line: &str, body: &str) -> String {
    serve_raw(format!(
        "HTTP/1.1 {status_line}\r\n\
         Content-Type: text/plain\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    ))
}

/// Serve one 200 response as chunked transfer encoding, without a
/// Content-Length header.
fn serve_chunked(chunks: &[&str]) -> String {
    let mut response = String::from(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/plain\r\n\
         Transfer-Encoding: chunked\r\n\
         Connection: close\r\n\r\n",
    );
    for chunk in chunks {
        response.push_str(&format!("{:x}\r\n{chunk}\r\n", chunk.len()));
    }
    response.push_str("0\r\n\r\n");
    serve_raw(response)
}

// =============================================================================
// Parsing E2E
// =============================================================================

#[test]
fn e2e_direct_fixture_parses_every_block() {
    let records = parse(&fixture_text("spells_direct.txt"));
    assert_eq!(records.len(), 8);

    let mind_flay = &records[3];
    assert_eq!(mind_flay.id(), Some("15407"));
    assert_eq!(
        mind_flay.get("Description"),
        Some("Assault the target's mind: deals damage over 3 sec.")
    );

    let corruption = &records[6];
    assert_eq!(corruption.get("Rank"), Some("2"));

    let unclassed = &records[7];
    assert_eq!(unclassed.name(), Some("Unclassed Effect"));
    assert_eq!(unclassed.id(), None);
    assert_eq!(unclassed.len(), 1);
}

#[test]
fn e2e_family_fixture_drops_unmarked_records() {
    let text = fixture_text("spells_family.txt");
    let result = parse_content(&text, &ParseConfig::spell_family());
    let ids: Vec<_> = result.records.iter().filter_map(|r| r.id()).collect();
    assert_eq!(ids, vec!["133", "49998", "198013", "361469", "8936", "77"]);
    assert_eq!(result.records_dropped, 1);
    assert_eq!(result.records[0].spell_family_id(), Some("3"));
}

// =============================================================================
// Classification and query E2E
// =============================================================================

#[test]
fn e2e_family_classification_and_index() {
    let records =
        parse_content(&fixture_text("spells_family.txt"), &ParseConfig::spell_family()).records;
    let filter = FilterState {
        hide_passives: true,
        ..Default::default()
    };
    let index = build_class_index(&records, &filter, Classifier::SpellFamily);

    let enabled: Vec<_> = index.enabled_labels().collect();
    assert_eq!(enabled, vec!["Death Knight", "Demon Hunter", "Evoker", "Mage"]);
    assert!(!index.is_enabled("Druid"), "passive-only class must be disabled");

    let mut filter = filter;
    filter.toggle_select_all(&index);
    let result = query(&records, &filter, Classifier::SpellFamily, QueryMode::Class);
    let ids: Vec<_> = result.iter().filter_map(|&i| records[i].id()).collect();
    assert_eq!(ids, vec!["133", "49998", "198013", "361469"]);
}

#[test]
fn e2e_state_browsing_session() {
    let mut state = AppState::new(Classifier::Direct, QueryMode::Class);
    state
        .load_source(fixture("spells_direct.txt").to_str().unwrap(), &FetchConfig::default())
        .expect("load fixture");

    assert!(listed_ids(&state).is_empty(), "default-closed before selection");

    state.set_class_selected("Warlock", true);
    assert_eq!(listed_ids(&state), vec!["589", "172"]);

    state.toggle_select_all();
    state.set_hide_passives(true);
    state.set_hide_hidden(true);
    assert_eq!(listed_ids(&state), vec!["133", "122", "15407", "589", "172"]);
    assert!(!state.class_index().is_enabled("Rogue"));

    state.set_query_mode(QueryMode::Search);
    state.set_search("SHADOW");
    assert_eq!(listed_ids(&state), vec!["589"]);

    state.set_query_mode(QueryMode::Combined);
    state.set_search("o");
    assert_eq!(listed_ids(&state), vec!["122", "589", "172"]);

    assert!(state.select_id("15407").is_some());
    let detail = state.selected_detail();
    assert_eq!(detail.sanitized_token, "MindFlay");
    assert_eq!(detail.export_line(), "MindFlay = 15407,");
    assert!(detail.display_text.starts_with("Name: Mind Flay (Rank 2) (id=15407)\nid: 15407\n"));
}

#[test]
fn e2e_reload_replaces_previous_records() {
    let mut state = AppState::new(Classifier::Direct, QueryMode::Search);
    state.load_text(&fixture_text("spells_direct.txt"));
    assert_eq!(state.records().len(), 8);

    state.load_text("Name: Smite (id=585)\nClass: Priest\n");
    assert_eq!(listed_ids(&state), vec!["585"]);
    assert!(state.select_id("133").is_none());
}

// =============================================================================
// Export E2E
// =============================================================================

#[test]
fn e2e_export_filtered_records_to_disk() {
    let mut state = AppState::new(Classifier::Direct, QueryMode::Class);
    state.load_text(&fixture_text("spells_direct.txt"));
    state.set_class_selected("Priest", true);

    let dir = tempfile::TempDir::new().expect("tmpdir");

    let csv_path = dir.path().join("priest.csv");
    let file = std::fs::File::create(&csv_path).expect("create csv");
    let count = export(ExportFormat::Csv, state.filtered_records(), file, &csv_path).unwrap();
    assert_eq!(count, 2);
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("Name,id,Class,School,Description\n"));
    assert!(csv.contains("\"Priest, Warlock\""));

    let lines_path = dir.path().join("priest.txt");
    let file = std::fs::File::create(&lines_path).expect("create lines");
    export(ExportFormat::Lines, state.filtered_records(), file, &lines_path).unwrap();
    assert_eq!(
        std::fs::read_to_string(&lines_path).unwrap(),
        "MindFlay = 15407,\nShadowWordPain = 589,\n"
    );
}

// =============================================================================
// Retrieval E2E
// =============================================================================

#[test]
fn e2e_fetch_over_http() {
    let url = serve_once("200 OK", "Name: Fireball (id=133)\nClass: Mage\n");
    let mut state = AppState::new(Classifier::Direct, QueryMode::Search);
    state.load_source(&url, &FetchConfig::default()).expect("fetch");
    assert_eq!(listed_ids(&state), vec!["133"]);
}

#[test]
fn e2e_http_error_keeps_previous_state() {
    let mut state = AppState::new(Classifier::Direct, QueryMode::Search);
    state.load_text("Name: Smite (id=585)\n");

    let url = serve_once("404 Not Found", "missing");
    let err = state.load_source(&url, &FetchConfig::default()).unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert_eq!(listed_ids(&state), vec!["585"]);
}

#[test]
fn e2e_files_rejected_when_disallowed() {
    let config = FetchConfig {
        allow_files: false,
        ..Default::default()
    };
    let err = fetch_text(fixture("spells_direct.txt").to_str().unwrap(), &config).unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl { .. }));
}

#[test]
fn e2e_chunked_body_within_cap() {
    let url = serve_chunked(&["Name: Fireball (id=133)\n", "Class: Mage\n"]);
    let text = fetch_text(&url, &FetchConfig::default()).expect("fetch");
    assert_eq!(text, "Name: Fireball (id=133)\nClass: Mage\n");
}

#[test]
fn e2e_chunked_body_over_cap_is_rejected() {
    let chunk = "Name: Fireball (id=133)\n";
    let url = serve_chunked(&[chunk, chunk, chunk]);
    let config = FetchConfig {
        max_bytes: 30,
        ..Default::default()
    };
    let err = fetch_text(&url, &config).unwrap_err();
    assert!(
        matches!(err, FetchError::TooLarge { size: 31, max_size: 30, .. }),
        "unexpected error: {err:?}"
    );
}
