//! Integration tests for the sync engine
//!
//! These tests use wiremock to stand in for both scripture sites and drive
//! a full sync into a temporary SQLite database.

use bible_sync::config::Config;
use bible_sync::storage::CorpusStore;
use bible_sync::{SourceKind, SyncEngine, SyncError, SyncPhase};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing both sources at the mock server
fn create_test_config(base_url: &str, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.database.path = dir
        .path()
        .join("bible.db")
        .to_string_lossy()
        .into_owned();
    config.http.user_agent = "bible-sync-test/1.0".to_string();
    config.gateway.base_url = base_url.to_string();
    config.gateway.versions = vec!["KJ21".to_string()];
    config.gateway.chapters_per_request = 2;
    config.toba.base_url = format!("{}/", base_url);
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

const VERSION_INDEX: &str = r#"<table>
    <tr><td><span class="language-display" id="lang-en">English</span> (EN)</td></tr>
    <tr data-language="en"><td data-translation><span><a href="/versions/kj21/#booklist">21st Century King James Version (KJ21)</a></span></td></tr>
    <tr data-language="en"><td data-translation><span><a href="/versions/niv/#booklist">New International Version (NIV)</a></span></td></tr>
</table>"#;

const BOOK_LIST: &str = r#"<table>
    <tr class="ot-book"><td class="book-name"><span class="collapse"></span>Ruth<span class="num-chapters">3</span></td></tr>
    <tr class="nt-book"><td class="book-name"><span class="collapse"></span>Jude<span class="num-chapters">1</span></td></tr>
</table>"#;

const RUTH_1_2: &str = r#"<div class="passage-text">
    <p class="verse"><span class="chapternum">1&nbsp;</span>Now it came to pass</p>
    <p class="verse"><sup class="versenum">2&nbsp;</sup>And the name of the man</p>
    <p class="verse"><span class="chapternum">2&nbsp;</span>And Naomi had a kinsman</p>
    <p class="verse"><sup class="versenum">2&nbsp;</sup>And Ruth the Moabitess said</p>
</div>"#;

const RUTH_3: &str = r#"<div class="passage-text">
    <p class="verse"><span class="chapternum">3&nbsp;</span>Then Naomi her mother in law</p>
    <p class="verse"><sup class="versenum">2&nbsp;</sup>And now is not Boaz</p>
</div>"#;

const JUDE_1: &str = r#"<div class="passage-text">
    <p class="verse"><span class="chapternum">1&nbsp;</span>Jude, the servant of Jesus Christ</p>
    <p class="verse"><sup class="versenum">2&nbsp;</sup>Mercy unto you</p>
    <p class="verse"><sup class="versenum">3&nbsp;</sup>Beloved, when I gave all diligence</p>
</div>"#;

/// Mounts the whole gateway site; `expected` is how many runs will hit it
async fn mount_gateway(server: &MockServer, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/versions/"))
        .respond_with(html(VERSION_INDEX))
        .expect(expected)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/versions/kj21/"))
        .respond_with(html(BOOK_LIST))
        .expect(expected)
        .mount(server)
        .await;

    for (search, body) in [("Ruth 1-2", RUTH_1_2), ("Ruth 3", RUTH_3), ("Jude 1", JUDE_1)] {
        Mock::given(method("GET"))
            .and(path("/passage/"))
            .and(query_param("search", search))
            .and(query_param("version", "KJ21"))
            .respond_with(html(body))
            .expect(expected)
            .mount(server)
            .await;
    }
}

async fn mount_toba(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<div class="entry entry-content">
                <p><a href="/1-padan-na-robi/rut/">Rut</a></p>
                <p><a href="/2-padan-na-imbaru/judas/">Judas</a></p>
                <p><a href="/hatorangan/">Hatorangan</a></p>
            </div>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/1-padan-na-robi/rut/"))
        .respond_with(html(
            "<h2 class=\"entry-title\">Rut 1</h2>\
             <div class=\"entry-content\"><p>Naomi dohot Rut\n1:1. Dung i di tingki\n1:2. Jala goar ni baoa i\n</p></div>\
             <h2 class=\"entry-title\">Rut 2</h2>\
             <div class=\"entry-content\"><p>2:1. Adong do sada dongan\n</p></div>",
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2-padan-na-imbaru/judas/"))
        .respond_with(html(
            "<h2 class=\"entry-title\">Judas 1</h2>\
             <div class=\"entry-content\"><p>1:1. Si Judas, naposo ni Jesus Kristus\n1:2. Asi ni roha\n</p></div>",
        ))
        .mount(server)
        .await;
}

fn query_strings(engine: &SyncEngine, sql: &str) -> Vec<String> {
    let store = engine.open_store().unwrap();
    let mut stmt = store.connection().prepare(sql).unwrap();
    let rows = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();
    rows
}

#[tokio::test]
async fn test_gateway_sync_end_to_end() {
    let server = MockServer::start().await;
    mount_gateway(&server, 1).await;

    let dir = TempDir::new().unwrap();
    let engine = SyncEngine::new(create_test_config(&server.uri(), &dir)).unwrap();

    let report = engine.run(SourceKind::Gateway).await.unwrap();

    assert_eq!(report.phase, SyncPhase::Committed);
    assert_eq!(report.counts.languages, 1);
    assert_eq!(report.counts.versions, 1);
    assert_eq!(report.counts.books, 2);
    assert_eq!(report.counts.verses, 9);

    let refs = query_strings(
        &engine,
        "SELECT b.name || ' ' || v.chapter || ':' || v.number
         FROM verses v JOIN books b ON b.uid = v.book_uid
         ORDER BY b.name, v.chapter, v.number",
    );
    assert_eq!(
        refs,
        vec![
            "Jude 1:1", "Jude 1:2", "Jude 1:3", "Ruth 1:1", "Ruth 1:2", "Ruth 2:1", "Ruth 2:2",
            "Ruth 3:1", "Ruth 3:2",
        ]
    );

    let bodies = query_strings(
        &engine,
        "SELECT v.body FROM verses v JOIN books b ON b.uid = v.book_uid
         WHERE b.name = 'Ruth' AND v.chapter = 2 ORDER BY v.number",
    );
    assert_eq!(bodies, vec!["And Naomi had a kinsman", "And Ruth the Moabitess said"]);

    let testaments = query_strings(
        &engine,
        "SELECT b.name || '=' || t.code FROM books b
         JOIN testaments t ON t.uid = b.testament_uid ORDER BY b.name",
    );
    assert_eq!(testaments, vec!["Jude=NT", "Ruth=OT"]);

    let versions = query_strings(&engine, "SELECT code || '/' || slug FROM versions");
    assert_eq!(versions, vec!["KJ21/kj21"]);
}

#[tokio::test]
async fn test_gateway_sync_twice_keeps_uids() {
    let server = MockServer::start().await;
    mount_gateway(&server, 2).await;

    let dir = TempDir::new().unwrap();
    let engine = SyncEngine::new(create_test_config(&server.uri(), &dir)).unwrap();

    let all_uids = "SELECT uid FROM languages UNION ALL SELECT uid FROM versions
                    UNION ALL SELECT uid FROM books UNION ALL SELECT uid FROM verses";

    engine.run(SourceKind::Gateway).await.unwrap();
    let first = query_strings(&engine, all_uids);

    engine.run(SourceKind::Gateway).await.unwrap();
    let second = query_strings(&engine, all_uids);

    assert_eq!(first.len(), 1 + 1 + 2 + 9);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_gateway_error_status_aborts_without_writes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/versions/"))
        .respond_with(html(VERSION_INDEX))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/versions/kj21/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/passage/"))
        .respond_with(html(JUDE_1))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = SyncEngine::new(create_test_config(&server.uri(), &dir)).unwrap();

    let err = engine.run(SourceKind::Gateway).await.unwrap_err();
    assert!(matches!(err, SyncError::Status { status: 503, .. }));

    let counts = engine.open_store().unwrap().table_counts().unwrap();
    assert_eq!(
        (counts.languages, counts.versions, counts.books, counts.verses),
        (0, 0, 0, 0)
    );
}

#[tokio::test]
async fn test_gateway_passage_failure_mid_book_aborts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/versions/"))
        .respond_with(html(VERSION_INDEX))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/versions/kj21/"))
        .respond_with(html(BOOK_LIST))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/passage/"))
        .and(query_param("search", "Ruth 1-2"))
        .respond_with(html(RUTH_1_2))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/passage/"))
        .and(query_param("search", "Ruth 3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = SyncEngine::new(create_test_config(&server.uri(), &dir)).unwrap();

    let err = engine.run(SourceKind::Gateway).await.unwrap_err();
    assert!(matches!(err, SyncError::Status { status: 404, .. }));
    assert_eq!(engine.open_store().unwrap().table_counts().unwrap().verses, 0);
}

#[tokio::test]
async fn test_toba_sync_end_to_end() {
    let server = MockServer::start().await;
    mount_toba(&server).await;

    let dir = TempDir::new().unwrap();
    let engine = SyncEngine::new(create_test_config(&server.uri(), &dir)).unwrap();

    let report = engine.run(SourceKind::Toba).await.unwrap();

    assert_eq!(report.source, "toba");
    assert_eq!(report.counts.books, 2);
    assert_eq!(report.counts.verses, 5);

    let languages = query_strings(&engine, "SELECT name || ' (' || code || ')' FROM languages");
    assert_eq!(languages, vec!["Bahasa Batak Toba (BBC)"]);

    let books = query_strings(
        &engine,
        "SELECT b.name || '=' || t.code || '/' || b.chapters_count FROM books b
         JOIN testaments t ON t.uid = b.testament_uid ORDER BY b.name",
    );
    assert_eq!(books, vec!["Judas=NT/1", "Rut=OT/2"]);

    let bodies = query_strings(
        &engine,
        "SELECT v.body FROM verses v JOIN books b ON b.uid = v.book_uid
         WHERE b.name = 'Rut' ORDER BY v.chapter, v.number",
    );
    assert_eq!(
        bodies,
        vec!["Dung i di tingki", "Jala goar ni baoa i", "Adong do sada dongan"]
    );
}

#[tokio::test]
async fn test_same_language_code_across_runs_keeps_uid() {
    let server = MockServer::start().await;
    mount_toba(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir);

    let engine = SyncEngine::new(config.clone()).unwrap();
    engine.run(SourceKind::Toba).await.unwrap();
    let first = query_strings(&engine, "SELECT uid FROM languages");

    let mut renamed = config;
    renamed.toba.language_name = "Hata Batak Toba".to_string();
    let engine = SyncEngine::new(renamed).unwrap();
    engine.run(SourceKind::Toba).await.unwrap();
    let second = query_strings(&engine, "SELECT uid FROM languages");

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
    assert_eq!(
        query_strings(&engine, "SELECT name FROM languages"),
        vec!["Hata Batak Toba"]
    );
}

#[tokio::test]
async fn test_toba_book_page_error_aborts_without_writes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<div class="entry entry-content">
                <p><a href="/1-padan-na-robi/rut/">Rut</a></p>
                <p><a href="/2-padan-na-imbaru/judas/">Judas</a></p>
            </div>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/1-padan-na-robi/rut/"))
        .respond_with(html(
            "<h2 class=\"entry-title\">Rut 1</h2>\
             <div class=\"entry-content\"><p>1:1. Dung i di tingki\n</p></div>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2-padan-na-imbaru/judas/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = SyncEngine::new(create_test_config(&server.uri(), &dir)).unwrap();

    let err = engine.run(SourceKind::Toba).await.unwrap_err();
    assert!(matches!(err, SyncError::Status { status: 500, .. }));

    let counts = engine.open_store().unwrap().table_counts().unwrap();
    assert_eq!(
        (counts.languages, counts.versions, counts.books, counts.verses),
        (0, 0, 0, 0)
    );
    assert!(query_strings(&engine, "SELECT source FROM sync_locks").is_empty());
}
