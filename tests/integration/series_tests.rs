//! Series runs: listing, range selection and per-chapter workspaces

use crate::{
    chapter_page, coordinator, file_names, mount_html, mount_png, read_log, reference,
    series_page, test_config,
};
use scan_harvest::crawler::ChapterRange;
use scan_harvest::output::RUN_LOG_FILE;
use scan_harvest::{ChapterNumber, ReferenceKind};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn range(start: u64, end: u64) -> ChapterRange {
    ChapterRange::new(ChapterNumber::whole(start), Some(ChapterNumber::whole(end))).unwrap()
}

#[tokio::test]
async fn test_range_stops_at_first_chapter_past_the_end() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server, &tmp);

    mount_html(
        &server,
        "/manga/berserk",
        series_page(&[
            ("Capitolo 1", "/scan/berserk/1"),
            ("Capitolo 2", "/scan/berserk/2"),
            ("Capitolo 3", "/scan/berserk/3"),
            ("Capitolo 5", "/scan/berserk/5"),
            ("Capitolo 4", "/scan/berserk/4"),
        ]),
        1,
    )
    .await;
    mount_html(&server, "/scan/berserk/1", chapter_page(&[], None), 0).await;
    mount_html(&server, "/scan/berserk/2", chapter_page(&["/img/2-01.png"], None), 1).await;
    mount_html(&server, "/scan/berserk/3", chapter_page(&["/img/3-01.png"], None), 1).await;
    mount_html(&server, "/scan/berserk/4", chapter_page(&[], None), 0).await;
    mount_html(&server, "/scan/berserk/5", chapter_page(&[], None), 0).await;
    mount_png(&server, "/img/2-01.png", 20).await;
    mount_png(&server, "/img/3-01.png", 30).await;

    let target = reference(&server, &config, "/manga/berserk");
    assert_eq!(target.kind(), ReferenceKind::Series);
    assert_eq!(target.name(), "berserk");

    let summary = coordinator(config, &tmp)
        .run(&target, &range(2, 4))
        .await
        .expect("Run failed");

    let titles: Vec<&str> = summary.chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Capitolo 2", "Capitolo 3"]);
    assert_eq!(summary.total_downloaded(), 2);

    let series_dir = tmp.path().join("out").join("berserk");
    assert_eq!(
        file_names(&series_dir),
        vec!["Capitolo 2", "Capitolo 3", RUN_LOG_FILE]
    );
    assert_eq!(
        file_names(&series_dir.join("Capitolo 2")),
        vec!["2-01.png"]
    );

    let log = read_log(series_dir.join(RUN_LOG_FILE));
    assert!(log.contains("Download started for berserk"));
    assert!(log.contains("Processing chapter: Capitolo 2"));
    assert!(log.contains("Processing chapter: Capitolo 3"));
    assert!(!log.contains("Capitolo 5"));
}

#[tokio::test]
async fn test_latest_first_listing_is_processed_oldest_first() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&server, &tmp);
    config.download.latest_first = true;

    mount_html(
        &server,
        "/manga/vagabond",
        series_page(&[
            ("Capitolo 3", "/scan/vagabond/3"),
            ("Capitolo 2", "/scan/vagabond/2"),
            ("Capitolo 1", "/scan/vagabond/1"),
        ]),
        1,
    )
    .await;
    mount_html(&server, "/scan/vagabond/1", chapter_page(&[], None), 1).await;
    mount_html(&server, "/scan/vagabond/2", chapter_page(&[], None), 1).await;
    mount_html(&server, "/scan/vagabond/3", chapter_page(&[], None), 0).await;

    let target = reference(&server, &config, "/manga/vagabond");
    let summary = coordinator(config, &tmp)
        .run(&target, &range(1, 2))
        .await
        .unwrap();

    let titles: Vec<&str> = summary.chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Capitolo 1", "Capitolo 2"]);
}

#[tokio::test]
async fn test_card_without_number_is_skipped() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server, &tmp);

    mount_html(
        &server,
        "/manga/monster",
        series_page(&[
            ("Capitolo 1", "/scan/monster/1"),
            ("Extra", "/scan/monster/extra"),
            ("Capitolo 2.5", "/scan/monster/2-5"),
        ]),
        1,
    )
    .await;
    mount_html(&server, "/scan/monster/1", chapter_page(&[], None), 1).await;
    mount_html(&server, "/scan/monster/extra", chapter_page(&[], None), 0).await;
    mount_html(&server, "/scan/monster/2-5", chapter_page(&[], None), 1).await;

    let target = reference(&server, &config, "/manga/monster");
    let summary = coordinator(config, &tmp)
        .run(&target, &ChapterRange::default())
        .await
        .unwrap();

    assert_eq!(summary.chapters.len(), 2);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].title, "Extra");

    let log = read_log(tmp.path().join("out").join("monster").join(RUN_LOG_FILE));
    assert!(log.contains("Skipped chapter card Extra"));
}

#[tokio::test]
async fn test_unreachable_series_page_is_reported() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server, &tmp);

    Mock::given(method("GET"))
        .and(path("/manga/missing"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let target = reference(&server, &config, "/manga/missing");
    let summary = coordinator(config, &tmp)
        .run(&target, &ChapterRange::default())
        .await
        .expect("A failing listing must not fail the run");

    assert!(summary.chapters.is_empty());
    assert!(summary.listing_error.is_some());

    let log = read_log(tmp.path().join("out").join("missing").join(RUN_LOG_FILE));
    assert!(log.contains("Error fetching page:"));
    assert!(log.contains("HTTP 503"));
}

#[tokio::test]
async fn test_dry_run_listing_fetches_nothing_else() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server, &tmp);

    mount_html(
        &server,
        "/manga/berserk",
        series_page(&[("Capitolo 1", "/scan/berserk/1")]),
        1,
    )
    .await;
    mount_html(&server, "/scan/berserk/1", chapter_page(&[], None), 0).await;

    let target = reference(&server, &config, "/manga/berserk");
    let listing = coordinator(config, &tmp)
        .list_chapters(&target)
        .await
        .unwrap();

    assert_eq!(listing.chapters.len(), 1);
    assert_eq!(listing.chapters[0].number, ChapterNumber::whole(1));
    assert!(!tmp.path().join("out").exists());
}

#[tokio::test]
async fn test_incomplete_cards_are_counted() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server, &tmp);

    let body = r#"<html><body>
        <div class="col-chapter"><a href="/scan/dune/1"><h5>Capitolo 1</h5></a></div>
        <div class="col-chapter"><h5>Capitolo 2</h5></div>
        <div class="col-chapter"><a href="/scan/dune/3">no title</a></div>
        </body></html>"#;
    mount_html(&server, "/manga/dune", body.to_string(), 1).await;
    mount_html(&server, "/scan/dune/1", chapter_page(&[], None), 1).await;
    mount_html(&server, "/scan/dune/3", chapter_page(&[], None), 0).await;

    let target = reference(&server, &config, "/manga/dune");
    let summary = coordinator(config, &tmp)
        .run(&target, &ChapterRange::default())
        .await
        .unwrap();

    assert_eq!(summary.chapters.len(), 1);
    assert_eq!(summary.incomplete_cards, 2);
    assert!(summary.skipped.is_empty());
}
