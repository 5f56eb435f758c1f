//! Integration tests for the crawler
//!
//! These tests use wiremock to serve feeds and article pages and run full
//! crawl cycles end-to-end against an in-memory store.

use async_trait::async_trait;
use feed_rs::model::Feed;
use newsbot_crawler::analysis::DefaultAnalyzer;
use newsbot_crawler::config::{load_config, CrawlerConfig, UserAgentConfig};
use newsbot_crawler::crawler::{build_http_client, Cycle, CycleReport};
use newsbot_crawler::storage::ArticleStore;
use newsbot_crawler::{
    CrawlResponse, Crawler, FeedSource, Link, Result, Source, SourceOptions, SqliteStore,
};
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY: &str = r#"<div class="entry-content">
    <p>Parliament approved the new budget on Tuesday. Ministers said the budget supports farmers.</p>
    <p>Farmers welcomed the budget.</p>
</div>"#;

/// Builds an RSS document whose items point at `{base}/article/{n}`
fn rss(base: &str, items: &[u32]) -> String {
    let items: String = items
        .iter()
        .map(|n| {
            format!(
                r#"<item>
      <title>Story {n}</title>
      <link>{base}/article/{n}</link>
      <guid>guid-{n}</guid>
      <description>Feed description of the budget story {n}</description>
      <pubDate>Tue, 10 Jun 2025 04:00:00 GMT</pubDate>
    </item>"#
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Test News</title>
    <link>{base}/</link>
    <description>Latest</description>
    {items}
  </channel>
</rss>"#
    )
}

/// Builds an article page with the given meta tags
fn article_page(meta: &[(&str, &str)]) -> String {
    let meta: String = meta
        .iter()
        .map(|(property, content)| {
            format!(r#"<meta property="{property}" content="{content}">"#)
        })
        .collect();
    format!("<html><head>{meta}</head><body>{BODY}</body></html>")
}

async fn mount_feed(server: &MockServer, feed_path: &str, items: &[u32]) {
    Mock::given(method("GET"))
        .and(path(feed_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rss(&server.uri(), items))
                .insert_header("content-type", "application/rss+xml"),
        )
        .mount(server)
        .await;
}

async fn mount_article(server: &MockServer, n: u32, meta: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path(format!("/article/{}", n)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_page(meta))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn feed_source(name: &str, server: &MockServer, feed_path: &str, use_meta_desc: bool) -> Arc<dyn Source> {
    Arc::new(
        FeedSource::new(
            name,
            "test.local",
            vec![Link::new("World", &format!("{}{}", server.uri(), feed_path))],
            SourceOptions::new(use_meta_desc, ".entry-content p"),
        )
        .expect("valid selector"),
    )
}

fn test_config(channel_capacity: usize) -> CrawlerConfig {
    CrawlerConfig {
        channel_capacity,
        max_concurrent_fetches: 4,
        entry_delay_ms: 0,
        request_timeout_secs: 5,
        ..CrawlerConfig::default()
    }
}

fn test_crawler(
    sources: Vec<Arc<dyn Source>>,
    store: &Arc<SqliteStore>,
    channel_capacity: usize,
) -> Arc<Crawler> {
    crawler_with_config(sources, store, test_config(channel_capacity))
}

fn crawler_with_config(
    sources: Vec<Arc<dyn Source>>,
    store: &Arc<SqliteStore>,
    config: CrawlerConfig,
) -> Arc<Crawler> {
    let client = build_http_client(&UserAgentConfig::default(), config.request_timeout())
        .expect("Failed to build client");

    Arc::new(Crawler::from_config(
        sources,
        &config,
        client,
        Arc::clone(store) as Arc<dyn ArticleStore>,
        Arc::new(DefaultAnalyzer::default()),
    ))
}

/// Runs `cycles` crawl cycles with the dispatch loop running, then stops
async fn run_cycles(crawler: &Arc<Crawler>, cycles: usize) -> Vec<CycleReport> {
    let listener = {
        let crawler = Arc::clone(crawler);
        tokio::spawn(async move { crawler.listen().await })
    };

    let mut reports = Vec::new();
    for _ in 0..cycles {
        let report = tokio::time::timeout(Duration::from_secs(10), crawler.run())
            .await
            .expect("cycle should finish");
        reports.push(report);
    }

    crawler.stop();
    listener
        .await
        .expect("listener task failed")
        .expect("listener returned an error");
    reports
}

fn memory_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::new_in_memory().expect("Failed to open store"))
}

#[tokio::test]
async fn test_single_entry_is_stored() {
    let server = MockServer::start().await;
    mount_feed(&server, "/feed.xml", &[1]).await;
    mount_article(&server, 1, &[("og:image", "https://cdn.test/1.jpg")]).await;

    let store = memory_store();
    let crawler = test_crawler(vec![feed_source("test", &server, "/feed.xml", false)], &store, 10);

    let reports = run_cycles(&crawler, 1).await;
    assert_eq!(reports[0].discovered, 1);
    assert_eq!(store.count_articles().unwrap(), 1);

    let article = store
        .get_article("guid-1")
        .unwrap()
        .expect("article should be stored");
    assert_eq!(article.title, "Story 1");
    assert_eq!(article.link, format!("{}/article/1", server.uri()));
    assert_eq!(article.domain, "test.local");
    assert_eq!(article.image, "https://cdn.test/1.jpg");
    assert_eq!(article.description, "Feed description of the budget story 1");
    assert_eq!(article.topic_id.as_deref(), Some("world"));
    assert!(article.tags.contains(&"budget".to_string()));
    assert_eq!(article.summary.len(), 3);
    assert!(article.published.is_some());

    let assessment = article.assessment.expect("assessment should be stored");
    assert_eq!(assessment.num_sentences, 3.0);
    assert_eq!(assessment.num_paragraphs, 2.0);
}

#[tokio::test]
async fn test_entry_without_image_is_skipped() {
    let server = MockServer::start().await;
    mount_feed(&server, "/feed.xml", &[1]).await;
    mount_article(&server, 1, &[("og:title", "Story 1")]).await;

    let store = memory_store();
    let crawler = test_crawler(vec![feed_source("test", &server, "/feed.xml", false)], &store, 10);

    let reports = run_cycles(&crawler, 1).await;
    assert_eq!(reports[0].discovered, 0);
    assert_eq!(store.count_articles().unwrap(), 0);
}

#[tokio::test]
async fn test_meta_description_required_when_configured() {
    let server = MockServer::start().await;
    mount_feed(&server, "/feed.xml", &[1]).await;
    mount_article(&server, 1, &[("og:image", "https://cdn.test/1.jpg")]).await;

    let store = memory_store();
    let crawler = test_crawler(vec![feed_source("test", &server, "/feed.xml", true)], &store, 10);

    let reports = run_cycles(&crawler, 1).await;
    assert_eq!(reports[0].discovered, 0);
    assert_eq!(store.count_articles().unwrap(), 0);
}

#[tokio::test]
async fn test_meta_description_replaces_feed_description() {
    let server = MockServer::start().await;
    mount_feed(&server, "/feed.xml", &[1]).await;
    mount_article(
        &server,
        1,
        &[
            ("og:image", "https://cdn.test/1.jpg"),
            ("og:description", "Page description"),
        ],
    )
    .await;

    let store = memory_store();
    let crawler = test_crawler(vec![feed_source("test", &server, "/feed.xml", true)], &store, 10);

    run_cycles(&crawler, 1).await;
    let article = store.get_article("guid-1").unwrap().unwrap();
    assert_eq!(article.description, "Page description");
}

#[tokio::test]
async fn test_feed_with_missing_and_unreachable_pages() {
    let server = MockServer::start().await;
    mount_feed(&server, "/feed.xml", &[1, 2, 3, 4]).await;
    mount_article(&server, 1, &[("og:image", "https://cdn.test/1.jpg")]).await;
    mount_article(&server, 2, &[]).await;
    mount_article(&server, 3, &[("og:image", "https://cdn.test/3.jpg")]).await;
    Mock::given(method("GET"))
        .and(path("/article/4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = memory_store();
    let crawler = test_crawler(vec![feed_source("test", &server, "/feed.xml", false)], &store, 10);

    let reports = run_cycles(&crawler, 1).await;
    assert_eq!(reports[0].discovered, 2);
    assert_eq!(store.count_articles().unwrap(), 2);
    assert!(store.article_exists("guid-1").unwrap());
    assert!(!store.article_exists("guid-2").unwrap());
    assert!(store.article_exists("guid-3").unwrap());
    assert!(!store.article_exists("guid-4").unwrap());
}

#[tokio::test]
async fn test_second_cycle_discovers_nothing() {
    let server = MockServer::start().await;
    mount_feed(&server, "/feed.xml", &[1, 2]).await;
    mount_article(&server, 1, &[("og:image", "https://cdn.test/1.jpg")]).await;
    mount_article(&server, 2, &[("og:image", "https://cdn.test/2.jpg")]).await;

    let store = memory_store();
    let crawler = test_crawler(vec![feed_source("test", &server, "/feed.xml", false)], &store, 10);

    let reports = run_cycles(&crawler, 2).await;
    assert_eq!(reports[0].discovered, 2);
    assert_eq!(reports[1].discovered, 0);
    assert_eq!(reports[1].cycle, 2);
    assert_eq!(store.count_articles().unwrap(), 2);
}

#[tokio::test]
async fn test_unreachable_feed_does_not_stop_other_sources() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_feed(&server, "/feed.xml", &[1]).await;
    mount_article(&server, 1, &[("og:image", "https://cdn.test/1.jpg")]).await;

    let store = memory_store();
    let crawler = test_crawler(
        vec![
            feed_source("down", &server, "/down.xml", false),
            feed_source("up", &server, "/feed.xml", false),
        ],
        &store,
        10,
    );

    let reports = run_cycles(&crawler, 1).await;
    assert_eq!(reports[0].discovered, 1);
    assert_eq!(store.count_articles().unwrap(), 1);
}

#[tokio::test]
async fn test_capacity_one_with_two_producers_drops_nothing() {
    let server = MockServer::start().await;
    mount_feed(&server, "/one.xml", &[1]).await;
    mount_feed(&server, "/two.xml", &[2]).await;
    mount_article(&server, 1, &[("og:image", "https://cdn.test/1.jpg")]).await;
    mount_article(&server, 2, &[("og:image", "https://cdn.test/2.jpg")]).await;

    let store = memory_store();
    let crawler = test_crawler(
        vec![
            feed_source("one", &server, "/one.xml", false),
            feed_source("two", &server, "/two.xml", false),
        ],
        &store,
        1,
    );

    let reports = run_cycles(&crawler, 1).await;
    assert_eq!(reports[0].discovered, 2);
    assert_eq!(store.count_articles().unwrap(), 2);
}

#[tokio::test]
async fn test_entry_delay_spaces_out_entries() {
    let server = MockServer::start().await;
    mount_feed(&server, "/feed.xml", &[1, 2, 3]).await;
    for n in 1..=3 {
        mount_article(&server, n, &[("og:image", "https://cdn.test/img.jpg")]).await;
    }

    let store = memory_store();
    let config = CrawlerConfig {
        entry_delay_ms: 150,
        ..test_config(10)
    };
    let crawler = crawler_with_config(
        vec![feed_source("test", &server, "/feed.xml", false)],
        &store,
        config,
    );

    let started = Instant::now();
    let reports = run_cycles(&crawler, 1).await;
    let elapsed = started.elapsed();

    assert_eq!(reports[0].discovered, 3);
    assert!(
        elapsed >= Duration::from_millis(450),
        "three entries took only {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_shared_guid_across_category_feeds_counted_once() {
    let server = MockServer::start().await;
    mount_feed(&server, "/a.xml", &[1]).await;
    mount_feed(&server, "/b.xml", &[1]).await;
    mount_article(&server, 1, &[("og:image", "https://cdn.test/1.jpg")]).await;

    let source: Arc<dyn Source> = Arc::new(
        FeedSource::new(
            "test",
            "test.local",
            vec![
                Link::new("World", &format!("{}/a.xml", server.uri())),
                Link::new("Politics", &format!("{}/b.xml", server.uri())),
            ],
            SourceOptions::new(false, ".entry-content p"),
        )
        .expect("valid selector"),
    );

    let store = memory_store();
    let crawler = test_crawler(vec![source], &store, 10);

    let reports = run_cycles(&crawler, 1).await;
    assert_eq!(reports[0].discovered, 1);
    assert_eq!(store.count_articles().unwrap(), 1);
    assert!(store.article_exists("guid-1").unwrap());
}

/// A source whose feed fetch always panics
struct PanickingSource {
    links: Vec<Link>,
}

#[async_trait]
impl Source for PanickingSource {
    fn name(&self) -> &str {
        "panicking"
    }

    fn domain(&self) -> &str {
        "panic.test"
    }

    fn links(&self) -> &[Link] {
        &self.links
    }

    async fn fetch(&self, _cycle: &Cycle, _link: &Link) -> Result<Feed> {
        panic!("simulated fetch panic");
    }

    async fn process(&self, _response: CrawlResponse) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_panicking_source_does_not_hang_cycle() {
    let server = MockServer::start().await;
    mount_feed(&server, "/feed.xml", &[1]).await;
    mount_article(&server, 1, &[("og:image", "https://cdn.test/1.jpg")]).await;

    let store = memory_store();
    let panicking: Arc<dyn Source> = Arc::new(PanickingSource {
        links: vec![
            Link::new("World", "https://panic.test/a"),
            Link::new("World", "https://panic.test/b"),
        ],
    });
    let crawler = test_crawler(
        vec![panicking, feed_source("test", &server, "/feed.xml", false)],
        &store,
        10,
    );

    let reports = run_cycles(&crawler, 1).await;
    assert_eq!(reports[0].discovered, 1);
    assert_eq!(store.count_articles().unwrap(), 1);
}

#[tokio::test]
async fn test_crawler_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[crawler]
interval = "90s"
channel-capacity = 3
entry-delay-ms = 0

[storage]
database-path = "/tmp/newsbot-test.db"
"#
    )
    .unwrap();

    let config = load_config(file.path()).expect("config should load");
    assert_eq!(config.crawler.channel_capacity, 3);

    let store = memory_store();
    let client = build_http_client(&config.user_agent, config.crawler.request_timeout()).unwrap();
    let crawler = Crawler::from_config(
        Vec::new(),
        &config.crawler,
        client,
        store as Arc<dyn ArticleStore>,
        Arc::new(DefaultAnalyzer::default()),
    );

    if std::env::var("CRAWL_INTERVAL").is_err() {
        assert_eq!(crawler.interval(), Duration::from_secs(90));
    }
    let report = crawler.run().await;
    assert_eq!(report.discovered, 0);
}
