//! Infinitives generation against a mock dictionary server.
//!
//! Entry ids without a mock answer 404, so every letter but the mocked
//! ones finishes on its first request.

use std::fs;

use conjugaison_harvester::config::{HarvestConfig, COUNTERS_FILE, GEN_INFINITIVES_FILE};
use conjugaison_harvester::gen_infinitives::{load_counters, GenSummary, COUNTER_DONE};
use conjugaison_harvester::generate_infinitives;
use indicatif::ProgressBar;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn article(entry_id: &str, heading: &str, category: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html lang=fr><body>
<input type=search name=term required>
<div class=s_Entree_haut><h1>{heading}</h1><p>{entry_id}</div>
<div id="{entry_id}"><p class=s_Nature><span class="s_cat">{category}</span><p>Définition</div>
</body></html>"#
    )
}

async fn mount_article(server: &MockServer, entry_id: &str, heading: &str, category: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/article/{entry_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(article(entry_id, heading, category)))
        .expect(1)
        .mount(server)
        .await;
}

fn config_for(server: &MockServer, dir: &TempDir) -> HarvestConfig {
    HarvestConfig {
        base_url: server.uri(),
        jsession_id: Some("MOCK1".to_string()),
        requests_delay_ms: 1,
        max_retry: 2,
        output_dir: dir.path().join("output"),
        ..HarvestConfig::default()
    }
    .validate()
    .unwrap()
}

async fn run(config: HarvestConfig) -> GenSummary {
    tokio::task::spawn_blocking(move || generate_infinitives(&config, &ProgressBar::hidden()).unwrap())
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_walks_every_letter() {
    let mock_server = MockServer::start().await;
    mount_article(&mock_server, "A9A0001", "abaisser", "verbe transitif").await;
    mount_article(&mock_server, "A9A0002", "abondamment", "adverbe").await;
    mount_article(&mock_server, "A9A0003", "abstenir (s’)", "verbe pronominal").await;
    mount_article(&mock_server, "A9B0001", "Baisser", "verbe intransitif").await;

    let dir = TempDir::new().unwrap();
    let config = config_for(&mock_server, &dir);
    let gen_dir = config.gen_infs_dir();

    let summary = run(config).await;
    assert_eq!(
        summary,
        GenSummary {
            visited: 4 + 26,
            verbs: 3,
            letters_done: 26,
            ..GenSummary::default()
        }
    );

    let infinitives = fs::read_to_string(gen_dir.join(GEN_INFINITIVES_FILE)).unwrap();
    assert_eq!(infinitives, "abaisser\nabstenir\nbaisser\n");

    let counters = load_counters(&gen_dir.join(COUNTERS_FILE)).unwrap();
    assert!(counters.values().all(|&n| n == COUNTER_DONE));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_resumes_from_counters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article/A9A0001"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/article/A9A0003"))
        .and(header_regex("cookie", r"^JSESSIONID=MOCK1; "))
        .respond_with(ResponseTemplate::new(200).set_body_string(article(
            "A9A0003",
            "abaisser",
            "verbe transitif",
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_article(&mock_server, "A9A0004", "abattre", "verbe transitif").await;

    let dir = TempDir::new().unwrap();
    let config = config_for(&mock_server, &dir);
    let gen_dir = config.gen_infs_dir();
    fs::create_dir_all(&gen_dir).unwrap();
    fs::write(gen_dir.join(GEN_INFINITIVES_FILE), "abaisser\n").unwrap();

    let mut counters = load_counters(&gen_dir.join(COUNTERS_FILE)).unwrap();
    counters.values_mut().for_each(|n| *n = COUNTER_DONE);
    counters.insert("A".to_string(), 2);
    fs::write(gen_dir.join(COUNTERS_FILE), serde_json::to_string(&counters).unwrap()).unwrap();

    let summary = run(config).await;
    assert_eq!(summary.visited, 3);
    assert_eq!(summary.verbs, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.letters_done, 26);

    let infinitives = fs::read_to_string(gen_dir.join(GEN_INFINITIVES_FILE)).unwrap();
    assert_eq!(infinitives, "abaisser\nabattre\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_errors_stop_run_and_keep_position() {
    let mock_server = MockServer::start().await;
    mount_article(&mock_server, "A9A0001", "abaisser", "verbe transitif").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = config_for(&mock_server, &dir);
    let gen_dir = config.gen_infs_dir();

    let result = tokio::task::spawn_blocking(move || {
        generate_infinitives(&config, &ProgressBar::hidden())
    })
    .await
    .unwrap();
    assert!(result.is_err());

    let counters = load_counters(&gen_dir.join(COUNTERS_FILE)).unwrap();
    assert_eq!(counters["A"], 1);
    assert_eq!(counters["B"], 0);
    let infinitives = fs::read_to_string(gen_dir.join(GEN_INFINITIVES_FILE)).unwrap();
    assert_eq!(infinitives, "abaisser\n");
}
