#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

use std::fs;
use std::path::Path;

use resume_polish::commands;
use resume_polish::config::{Config, OllamaConfig};
use resume_polish::index::{self, FlatIndex};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ollama_config_for(server_uri: &str) -> OllamaConfig {
    let url = Url::parse(server_uri).expect("Mock server URI should parse");
    OllamaConfig {
        protocol: url.scheme().to_string(),
        host: url
            .host_str()
            .expect("Mock server URI should have a host")
            .to_string(),
        port: url.port().expect("Mock server URI should have a port"),
        embedding_dimension: 3,
        ..OllamaConfig::default()
    }
}

fn fixture_config(root: &Path, server_uri: &str) -> Config {
    let mut config = Config::default();
    config.ollama = ollama_config_for(server_uri);
    config.paths.data_dir = root.join("data");
    config.paths.template_file = "template.txt".to_string();
    config.paths.artifact_base = root.join("embeddings").join("resume_index");
    config.paths.rules_file = root.join("rules.txt");
    config
}

fn write_corpus(data_dir: &Path) {
    fs::create_dir_all(data_dir).expect("Failed to create data dir");
    fs::write(data_dir.join("template.txt"), "NAME\nEXPERIENCE\nSKILLS")
        .expect("Failed to write template");
    fs::write(
        data_dir.join("alpha_before.txt"),
        "alpha raw sales experience",
    )
    .expect("Failed to write alpha before");
    fs::write(
        data_dir.join("alpha_after.txt"),
        "alpha polished SDR resume",
    )
    .expect("Failed to write alpha after");
    fs::write(data_dir.join("beta_before.txt"), "beta raw retail history")
        .expect("Failed to write beta before");
    fs::write(data_dir.join("beta_after.txt"), "beta polished SDR resume")
        .expect("Failed to write beta after");
}

async fn mount_ollama_mocks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": []
        })))
        .mount(server)
        .await;

    // Records are embedded as a single ordered batch (`input` field);
    // alpha sorts before beta, so the rows come back in that order.
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_string_contains("\"input\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "embeddings": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
        })))
        .mount(server)
        .await;

    // Single-text queries go through the `prompt` field.
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_string_contains("\"prompt\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "embedding": [0.9, 0.1, 0.0]
        })))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn build_persists_both_artifacts() {
    let server = MockServer::start().await;
    mount_ollama_mocks(&server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = fixture_config(temp_dir.path(), &server.uri());
    write_corpus(&config.paths.data_dir);

    let dump_path = temp_dir.path().join("records.txt");
    {
        let config = config.clone();
        let dump_path = dump_path.clone();
        tokio::task::spawn_blocking(move || commands::build(&config, Some(&dump_path)))
            .await
            .expect("Build task panicked")
            .expect("Build should succeed");
    }

    let index =
        FlatIndex::load(&config.index_path(), &config.ollama.model).expect("Index should load");
    assert_eq!(index.row_count(), 2);
    assert_eq!(index.dimension(), 3);

    let records = index::load_records(&config.records_path()).expect("Records should load");
    assert_eq!(records.len(), 2);
    assert!(records[0].contains("alpha raw sales experience"));
    assert!(records[0].contains("alpha polished SDR resume"));
    assert!(records[0].contains("NAME\nEXPERIENCE\nSKILLS"));
    assert!(records[1].contains("beta raw retail history"));

    let dump = fs::read_to_string(&dump_path).expect("Dump file should exist");
    assert!(dump.contains("=== Example 1 ==="));
    assert!(dump.contains("=== Example 2 ==="));
}

#[tokio::test(flavor = "multi_thread")]
async fn build_reports_unmatched_before_files() {
    let server = MockServer::start().await;
    mount_ollama_mocks(&server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = fixture_config(temp_dir.path(), &server.uri());
    write_corpus(&config.paths.data_dir);
    fs::write(
        config.paths.data_dir.join("gamma_before.txt"),
        "gamma has no after",
    )
    .expect("Failed to write gamma before");

    {
        let config = config.clone();
        tokio::task::spawn_blocking(move || commands::build(&config, None))
            .await
            .expect("Build task panicked")
            .expect("Build should still succeed");
    }

    // The unmatched file is skipped, not embedded.
    let index =
        FlatIndex::load(&config.index_path(), &config.ollama.model).expect("Index should load");
    assert_eq!(index.row_count(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn build_with_empty_corpus_persists_empty_index() {
    let server = MockServer::start().await;
    // Only the ping endpoint is mounted: an empty corpus must not hit
    // the embedding endpoint at all.
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": []
        })))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = fixture_config(temp_dir.path(), &server.uri());
    fs::create_dir_all(&config.paths.data_dir).expect("Failed to create data dir");
    fs::write(
        config.paths.data_dir.join("template.txt"),
        "NAME\nEXPERIENCE",
    )
    .expect("Failed to write template");

    {
        let config = config.clone();
        tokio::task::spawn_blocking(move || commands::build(&config, None))
            .await
            .expect("Build task panicked")
            .expect("Build should succeed");
    }

    let index =
        FlatIndex::load(&config.index_path(), &config.ollama.model).expect("Index should load");
    assert_eq!(index.row_count(), 0);
    assert_eq!(index.dimension(), 3);

    let records = index::load_records(&config.records_path()).expect("Records should load");
    assert!(records.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn build_fails_without_template() {
    let server = MockServer::start().await;
    mount_ollama_mocks(&server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = fixture_config(temp_dir.path(), &server.uri());
    fs::create_dir_all(&config.paths.data_dir).expect("Failed to create data dir");
    fs::write(config.paths.data_dir.join("alpha_before.txt"), "text")
        .expect("Failed to write before");
    fs::write(config.paths.data_dir.join("alpha_after.txt"), "text")
        .expect("Failed to write after");

    let result = tokio::task::spawn_blocking(move || commands::build(&config, None))
        .await
        .expect("Build task panicked");
    assert!(result.is_err());
}
