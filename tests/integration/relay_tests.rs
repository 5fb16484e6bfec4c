//! Integration tests for the relay
//!
//! These tests drive complete runs: first with in-process fake collaborators,
//! then with wiremock servers standing in for the forum and the Bot API.

use async_trait::async_trait;
use forum_relay::config::Config;
use forum_relay::notify::{Notifier, TelegramNotifier};
use forum_relay::relay::{FetchResult, HttpFetcher, PageSource};
use forum_relay::store::{Fingerprint, SeenSet, StateFile};
use forum_relay::{Relay, RelayError, RunOutcome};
use std::sync::Mutex;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE_URL: &str = "http://muchong.com/";

const TWO_POSTS: &str = r#"
<html><body><table>
  <tr class="forum_list">
    <th class="thread-name"><a class="a_subject" href="/a-1">Post One</a></th>
  </tr>
  <tr class="forum_list">
    <th class="thread-name"><a class="a_subject" href="/a-2">Post Two</a></th>
  </tr>
</table></body></html>
"#;

/// Page source returning a fixed result
struct FixedPage(FetchResult);

#[async_trait]
impl PageSource for FixedPage {
    fn url(&self) -> &str {
        "http://muchong.com/f-430-1"
    }

    async fn fetch(&self) -> FetchResult {
        self.0.clone()
    }
}

fn page(body: &str) -> FixedPage {
    FixedPage(FetchResult::Page {
        status: 200,
        body: body.to_string(),
    })
}

/// Notifier that records every message it is asked to send
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), RelayError> {
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Creates a test configuration whose state file lives in `dir`
fn create_test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.source.base_url = BASE_URL.to_string();
    config.store.path = dir
        .path()
        .join("MuchongSaved.txt")
        .to_string_lossy()
        .into_owned();
    config.telegram.chat_id = "@relay_test".to_string();
    config
}

fn relay_messages<S: PageSource>(relay: &Relay<S, RecordingNotifier>) -> Vec<String> {
    relay.notifier().messages()
}

fn fingerprint(href: &str) -> Fingerprint {
    Fingerprint::of(&format!("{}{}", BASE_URL, href))
}

#[tokio::test]
async fn test_two_new_posts_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let state = StateFile::new(&config.store.path);

    let relay = Relay::new(config, page(TWO_POSTS), RecordingNotifier::default());
    let report = relay.run().await.expect("Run failed");

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.candidates, 2);
    assert_eq!(report.new_links, 2);
    assert_eq!(report.delivered, 2);

    // Notifications in page order
    let sent = relay_messages(&relay);
    assert_eq!(
        sent,
        vec![
            "<a href='http://muchong.com//a-1'>Post One</a>".to_string(),
            "<a href='http://muchong.com//a-2'>Post Two</a>".to_string(),
        ]
    );

    // Exactly the two fingerprints, comma-terminated
    let raw = state.read_raw().await.unwrap().expect("State file missing");
    assert_eq!(
        raw,
        format!("{},{},", fingerprint("/a-1"), fingerprint("/a-2"))
    );
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let dir = TempDir::new().unwrap();

    let first = Relay::new(
        create_test_config(&dir),
        page(TWO_POSTS),
        RecordingNotifier::default(),
    );
    first.run().await.expect("First run failed");
    assert_eq!(relay_messages(&first).len(), 2);

    let second = Relay::new(
        create_test_config(&dir),
        page(TWO_POSTS),
        RecordingNotifier::default(),
    );
    let report = second.run().await.expect("Second run failed");

    assert_eq!(report.new_links, 0);
    assert_eq!(report.duplicates, 2);
    assert!(relay_messages(&second).is_empty());
}

#[tokio::test]
async fn test_seen_link_is_never_renotified() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);

    let mut existing = SeenSet::new();
    existing.add(fingerprint("/a-1"));
    StateFile::new(&config.store.path)
        .write(&existing)
        .await
        .unwrap();

    let relay = Relay::new(config, page(TWO_POSTS), RecordingNotifier::default());
    let report = relay.run().await.expect("Run failed");

    assert_eq!(report.new_links, 1);
    assert_eq!(
        relay_messages(&relay),
        vec!["<a href='http://muchong.com//a-2'>Post Two</a>".to_string()]
    );

    let stored = relay.state_file().read().await.unwrap();
    assert!(stored.contains(&fingerprint("/a-1")));
    assert!(stored.contains(&fingerprint("/a-2")));
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_fetch_failure_leaves_state_untouched() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);

    // Legacy content, including a reset marker, must survive byte for byte
    let before = format!("start,{},", fingerprint("/a-9"));
    std::fs::write(&config.store.path, &before).unwrap();

    let relay = Relay::new(
        config,
        FixedPage(FetchResult::Unavailable {
            error: "operation timed out".to_string(),
        }),
        RecordingNotifier::default(),
    );
    let report = relay.run().await.expect("A failed fetch must not fail the run");

    assert!(report.outcome.is_skipped());
    assert!(relay_messages(&relay).is_empty());
    assert_eq!(
        relay.state_file().read_raw().await.unwrap(),
        Some(before)
    );
}

#[tokio::test]
async fn test_oversized_history_is_not_written_when_fetch_fails() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir);
    config.store.max_entries = 1;

    let before = format!("{},{},", fingerprint("/a-1"), fingerprint("/a-2"));
    std::fs::write(&config.store.path, &before).unwrap();

    let relay = Relay::new(
        config,
        FixedPage(FetchResult::Unavailable {
            error: "connection refused".to_string(),
        }),
        RecordingNotifier::default(),
    );
    let report = relay.run().await.unwrap();

    assert!(report.store_reset);
    assert!(report.outcome.is_skipped());
    assert_eq!(relay.state_file().read_raw().await.unwrap(), Some(before));
}

#[tokio::test]
async fn test_titles_are_sanitised_in_messages() {
    let dir = TempDir::new().unwrap();
    let listing = r#"<a class="a_subject" href="t-5-1">&lt;script&gt;</a>"#;

    let relay = Relay::new(
        create_test_config(&dir),
        page(listing),
        RecordingNotifier::default(),
    );
    relay.run().await.unwrap();

    assert_eq!(
        relay_messages(&relay),
        vec!["<a href='http://muchong.com/t-5-1'>script</a>".to_string()]
    );
}

#[tokio::test]
async fn test_existing_history_file_is_honoured() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);

    // Written by the earlier poller: reset marker, then MD5 tokens of both posts
    let legacy =
        "start,fc9ad3b8ffdc359b4636f158dc5d5ca7,d342e7598b09fadf58a6cfc17aa72bf4,".to_string();
    std::fs::write(&config.store.path, &legacy).unwrap();

    let relay = Relay::new(config, page(TWO_POSTS), RecordingNotifier::default());
    let report = relay.run().await.expect("Run failed");

    assert_eq!(report.new_links, 0);
    assert_eq!(report.duplicates, 2);
    assert!(relay_messages(&relay).is_empty());

    // Marker dropped on rewrite, tokens kept in order
    assert_eq!(
        relay.state_file().read_raw().await.unwrap(),
        Some("fc9ad3b8ffdc359b4636f158dc5d5ca7,d342e7598b09fadf58a6cfc17aa72bf4,".to_string())
    );
}

#[tokio::test]
async fn test_ampersand_in_title_is_escaped() {
    let dir = TempDir::new().unwrap();
    let listing = r#"<a class="a_subject" href="t-7-1">R&amp;D lab hiring</a>"#;

    let relay = Relay::new(
        create_test_config(&dir),
        page(listing),
        RecordingNotifier::default(),
    );
    relay.run().await.unwrap();

    assert_eq!(
        relay_messages(&relay),
        vec!["<a href='http://muchong.com/t-7-1'>R&amp;D lab hiring</a>".to_string()]
    );
}

#[tokio::test]
async fn test_full_run_against_mock_forum_and_bot_api() {
    let forum = MockServer::start().await;
    let bot_api = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/f-430-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(TWO_POSTS)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(2)
        .mount(&forum)
        .await;

    Mock::given(method("POST"))
        .and(path("/bottest-token/sendMessage"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"ok": true, "result": {"message_id": 1}})),
        )
        .expect(2)
        .mount(&bot_api)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir);
    config.source.listing_url = format!("{}/f-430-1", forum.uri());
    config.source.timeout_secs = 2;
    config.telegram.api_base = bot_api.uri();

    // Two runs against the same page: only the first delivers
    for _ in 0..2 {
        let fetcher = HttpFetcher::new(config.source.clone()).unwrap();
        let notifier = TelegramNotifier::new(&config.telegram, "test-token").unwrap();
        let report = Relay::new(config.clone(), fetcher, notifier)
            .run()
            .await
            .expect("Run failed");
        assert_eq!(report.outcome, RunOutcome::Completed);
    }

    let requests = bot_api.received_requests().await.unwrap();
    let texts: Vec<String> = requests
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            assert_eq!(body["chat_id"], "@relay_test");
            assert_eq!(body["parse_mode"], "HTML");
            body["text"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        texts,
        vec![
            "<a href='http://muchong.com//a-1'>Post One</a>",
            "<a href='http://muchong.com//a-2'>Post Two</a>",
        ]
    );
}

#[tokio::test]
async fn test_bot_api_failure_does_not_block_recording() {
    let bot_api = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests: retry after 5"
        })))
        .expect(2)
        .mount(&bot_api)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir);
    config.telegram.api_base = bot_api.uri();

    let notifier = TelegramNotifier::new(&config.telegram, "test-token").unwrap();
    let relay = Relay::new(config, page(TWO_POSTS), notifier);
    let report = relay.run().await.expect("Delivery failures must not fail the run");

    assert_eq!(report.new_links, 2);
    assert_eq!(report.delivered, 0);
    assert_eq!(report.delivery_failures, 2);

    let stored = relay.state_file().read().await.unwrap();
    assert!(stored.contains(&fingerprint("/a-1")));
    assert!(stored.contains(&fingerprint("/a-2")));
}

#[tokio::test]
async fn test_unreachable_forum_skips_run() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir);
    // Nothing listens on port 9 on loopback
    config.source.listing_url = "http://127.0.0.1:9/f-430-1".to_string();
    config.source.timeout_secs = 2;

    let fetcher = HttpFetcher::new(config.source.clone()).unwrap();
    let relay = Relay::new(config, fetcher, RecordingNotifier::default());
    let report = relay.run().await.expect("Unreachable forum must not fail the run");

    assert!(report.outcome.is_skipped());
    assert_eq!(relay.state_file().read_raw().await.unwrap(), None);
}
