//! HTTP integration tests against a local mock server.
//!
//! The harvester uses a blocking client, so every call runs on a
//! `spawn_blocking` thread while wiremock serves from the async runtime.

use std::io::Write;

use mediathek_harvester::catalog::download_catalog;
use mediathek_harvester::harvester::harvest_with;
use mediathek_harvester::http::{create_client, open_stream};
use mediathek_harvester::mirror::resolve_mirror;
use mediathek_harvester::{HarvesterError, Result};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NOW: i64 = 1_791_800_000;

const CATALOG: &str = "<Mediathek>\
    <Feldinfo><a>Sender</a><b>Titel</b><c>Datum</c></Feldinfo>\
    <X><a>ARD</a><b>Tatort</b><c>1.1.2000</c></X>\
    <X><a>ZDF</a><b>Der Alte</b><c>2.1.2000</c></X>\
    </Mediathek>";

fn control_document(server_uri: &str) -> String {
    format!(
        "<Mediathek>\
           <Server><URL>{server_uri}/slow/Filmliste-akt.xml.bz2</URL><Datum>14.10.2026</Datum><Zeit>06:00:00</Zeit><Prio>1</Prio></Server>\
           <Server><URL>{server_uri}/Filmliste-akt.xml.bz2</URL><Datum>13.10.2026</Datum><Zeit>06:00:00</Zeit><Prio>2</Prio></Server>\
         </Mediathek>"
    )
}

fn bzip2_bytes(text: &str) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

/// Run a blocking harvester call off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_resolve_mirror_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/update.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(control_document(&server.uri())))
        .expect(1)
        .mount(&server)
        .await;

    let control_url = format!("{}/update.xml", server.uri());
    let resolved = blocking(move || resolve_mirror(&create_client()?, &control_url))
        .await
        .unwrap();
    assert_eq!(resolved, format!("{}/Filmliste-akt.xml.bz2", server.uri()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_harvest_downloads_compressed_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/update.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(control_document(&server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Filmliste-akt.xml.bz2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bzip2_bytes(CATALOG)))
        .expect(1)
        .mount(&server)
        .await;

    let control_url = format!("{}/update.xml", server.uri());
    let harvest = blocking(move || harvest_with(&create_client()?, &control_url, None, NOW))
        .await
        .unwrap();

    let titles: Vec<_> = harvest
        .liste
        .broadcasts()
        .iter()
        .filter_map(|b| b.titel.clone())
        .collect();
    assert_eq!(titles, vec!["Tatort", "Der Alte"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/filmliste.xml"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/filmliste.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/filmliste.xml", server.uri());
    let liste = blocking(move || download_catalog(&create_client()?, &url, NOW))
        .await
        .unwrap();
    assert_eq!(liste.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_retries_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/update.xml"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let url = format!("{}/update.xml", server.uri());
    let err = blocking(move || open_stream(&create_client()?, &url).map(|_| ()))
        .await
        .unwrap_err();
    match err {
        HarvesterError::RetriesExhausted { attempts, message } => {
            assert_eq!(attempts, 3);
            assert!(message.contains("500"), "{message}");
        }
        other => panic!("expected retries exhausted, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/missing.xml", server.uri());
    let expected_url = url.clone();
    let err = blocking(move || download_catalog(&create_client()?, &url, NOW))
        .await
        .unwrap_err();
    match err {
        HarvesterError::CatalogDownload { url, source } => {
            assert_eq!(url, expected_url);
            assert_eq!(source.status().map(|s| s.as_u16()), Some(404));
        }
        other => panic!("expected catalog download error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_control_document_without_mirrors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/update.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<Mediathek></Mediathek>"))
        .mount(&server)
        .await;

    let control_url = format!("{}/update.xml", server.uri());
    let err = blocking(move || resolve_mirror(&create_client()?, &control_url))
        .await
        .unwrap_err();
    assert!(matches!(err, HarvesterError::NoMirrorResolved { .. }), "{err:?}");
}
