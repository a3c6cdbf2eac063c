//! Single chapter runs: page walking, downloads and document assembly

use crate::{
    chapter_page, coordinator, file_names, mount_html, mount_png, read_log, reference,
    test_config,
};
use scan_harvest::crawler::{ChapterRange, CrawlStop};
use scan_harvest::output::{DOCUMENT_FILE, RUN_LOG_FILE};
use scan_harvest::{ChapterNumber, ReferenceKind};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_walk_follows_next_links_until_the_end() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server, &tmp);

    mount_html(
        &server,
        "/scan/berserk/1",
        chapter_page(&["/img/01.png", "/img/02.png"], Some("/scan/berserk/1/2")),
        1,
    )
    .await;
    mount_html(
        &server,
        "/scan/berserk/1/2",
        chapter_page(&["/img/03.png"], None),
        1,
    )
    .await;
    for (i, name) in ["/img/01.png", "/img/02.png", "/img/03.png"].iter().enumerate() {
        mount_png(&server, name, 40 * i as u8).await;
    }

    let target = reference(&server, &config, "/scan/berserk/1");
    assert_eq!(target.kind(), ReferenceKind::SingleChapter);

    let coordinator = coordinator(config, &tmp);
    let summary = coordinator
        .run(&target, &ChapterRange::default())
        .await
        .expect("Run failed");

    assert_eq!(summary.chapters.len(), 1);
    let chapter = &summary.chapters[0];
    assert_eq!(chapter.pages_visited, 2);
    assert_eq!(chapter.downloaded, 3);
    assert_eq!(chapter.failed, 0);
    assert_eq!(chapter.stop, CrawlStop::Exhausted);
    // PDF creation is off by default
    assert!(chapter.assembly.is_none());

    let dir = tmp.path().join("out").join("1");
    assert_eq!(chapter.dir, dir);
    assert_eq!(
        file_names(&dir),
        vec!["01.png", "02.png", "03.png", RUN_LOG_FILE]
    );
}

#[tokio::test]
async fn test_second_run_overwrites_instead_of_duplicating() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server, &tmp);

    mount_html(
        &server,
        "/scan/berserk/7",
        chapter_page(&["/img/01.png", "/img/02.png"], None),
        2,
    )
    .await;
    mount_png(&server, "/img/01.png", 10).await;
    mount_png(&server, "/img/02.png", 20).await;

    let target = reference(&server, &config, "/scan/berserk/7");
    let coordinator = coordinator(config, &tmp);

    coordinator
        .run(&target, &ChapterRange::default())
        .await
        .unwrap();
    let dir = tmp.path().join("out").join("7");
    let first = file_names(&dir);

    coordinator
        .run(&target, &ChapterRange::default())
        .await
        .unwrap();
    assert_eq!(file_names(&dir), first);

    // The run log is recreated per run
    let log = read_log(dir.join(RUN_LOG_FILE));
    assert_eq!(log.matches("Download started for 7").count(), 1);
}

#[tokio::test]
async fn test_missing_root_page_yields_no_images() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server, &tmp);

    Mock::given(method("GET"))
        .and(path("/scan/berserk/404"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let target = reference(&server, &config, "/scan/berserk/404");
    let coordinator = coordinator(config, &tmp);
    let summary = coordinator
        .run(&target, &ChapterRange::default())
        .await
        .expect("A failing page must not fail the run");

    let chapter = &summary.chapters[0];
    assert_eq!(chapter.pages_visited, 0);
    assert_eq!(chapter.downloaded, 0);
    assert!(matches!(chapter.stop, CrawlStop::FetchFailed { .. }));

    let log = read_log(chapter.dir.join(RUN_LOG_FILE));
    assert_eq!(log.matches("Error fetching page:").count(), 1);
    assert!(log.contains("HTTP 404"));
}

#[tokio::test]
async fn test_failed_image_is_logged_and_skipped() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server, &tmp);

    mount_html(
        &server,
        "/scan/berserk/3",
        chapter_page(&["/img/01.png", "/img/gone.png", "/img/03.png"], None),
        1,
    )
    .await;
    mount_png(&server, "/img/01.png", 10).await;
    mount_png(&server, "/img/03.png", 30).await;
    Mock::given(method("GET"))
        .and(path("/img/gone.png"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let target = reference(&server, &config, "/scan/berserk/3");
    let summary = coordinator(config, &tmp)
        .run(&target, &ChapterRange::default())
        .await
        .unwrap();

    let chapter = &summary.chapters[0];
    assert_eq!(chapter.downloaded, 2);
    assert_eq!(chapter.failed, 1);

    let log = read_log(chapter.dir.join(RUN_LOG_FILE));
    let line = log
        .lines()
        .find(|line| line.contains("Error downloading gone.png:"))
        .expect("Missing failure line");
    assert!(line.ends_with("(HTTP 500)"));
}

#[tokio::test]
async fn test_page_limit_stops_an_endless_chain() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&server, &tmp);
    config.crawler.max_pages_per_chapter = 2;

    mount_html(&server, "/scan/long/1", chapter_page(&[], Some("/scan/long/1/2")), 1).await;
    mount_html(&server, "/scan/long/1/2", chapter_page(&[], Some("/scan/long/1/3")), 1).await;
    mount_html(&server, "/scan/long/1/3", chapter_page(&[], None), 0).await;

    let target = reference(&server, &config, "/scan/long/1");
    let summary = coordinator(config, &tmp)
        .run(&target, &ChapterRange::default())
        .await
        .unwrap();

    let chapter = &summary.chapters[0];
    assert_eq!(chapter.pages_visited, 2);
    assert!(matches!(chapter.stop, CrawlStop::PageLimit { ref url } if url.ends_with("/scan/long/1/3")));

    let log = read_log(chapter.dir.join(RUN_LOG_FILE));
    assert!(log.contains("Page limit reached"));
}

#[tokio::test]
async fn test_circular_chain_terminates() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server, &tmp);

    mount_html(&server, "/scan/loop/1", chapter_page(&["/img/a.png"], Some("/scan/loop/1/2")), 1)
        .await;
    mount_html(&server, "/scan/loop/1/2", chapter_page(&["/img/b.png"], Some("/scan/loop/1")), 1)
        .await;
    mount_png(&server, "/img/a.png", 10).await;
    mount_png(&server, "/img/b.png", 20).await;

    let target = reference(&server, &config, "/scan/loop/1");
    let summary = coordinator(config, &tmp)
        .run(&target, &ChapterRange::default())
        .await
        .unwrap();

    let chapter = &summary.chapters[0];
    assert_eq!(chapter.pages_visited, 2);
    assert_eq!(chapter.downloaded, 2);
    assert!(matches!(chapter.stop, CrawlStop::Revisit { .. }));
}

#[tokio::test]
async fn test_document_assembled_in_page_order() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&server, &tmp);
    config.download.create_pdf = true;

    mount_html(
        &server,
        "/scan/berserk/9",
        chapter_page(&["/img/page2.png", "/img/page10.png", "/img/page1.png"], None),
        1,
    )
    .await;
    mount_png(&server, "/img/page1.png", 10).await;
    mount_png(&server, "/img/page2.png", 20).await;
    mount_png(&server, "/img/page10.png", 30).await;

    let target = reference(&server, &config, "/scan/berserk/9");
    let summary = coordinator(config, &tmp)
        .run(&target, &ChapterRange::default())
        .await
        .unwrap();

    let chapter = &summary.chapters[0];
    let assembly = chapter.assembly.as_ref().expect("Assembly should have run");
    assert_eq!(assembly.page_count, 3);
    assert!(assembly.excluded.is_empty());

    let document_path = chapter.dir.join(DOCUMENT_FILE);
    assert_eq!(chapter.document(), Some(&document_path));

    let document = lopdf::Document::load(&document_path).expect("Invalid PDF");
    assert_eq!(document.get_pages().len(), 3);

    let log = read_log(chapter.dir.join(RUN_LOG_FILE));
    assert!(log.contains("Document created:"));
}

#[tokio::test]
async fn test_scan_folder_nests_single_chapters() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&server, &tmp);
    config.download.create_scan_folder = true;

    mount_html(&server, "/scan/berserk/2", chapter_page(&[], None), 1).await;

    let target = reference(&server, &config, "/scan/berserk/2");
    let summary = coordinator(config, &tmp)
        .run(&target, &ChapterRange::default())
        .await
        .unwrap();

    assert_eq!(
        summary.chapters[0].dir,
        tmp.path().join("out").join("Scan").join("2")
    );
}

#[tokio::test]
async fn test_single_chapter_ignores_chapter_bounds() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server, &tmp);

    mount_html(&server, "/scan/berserk/1", chapter_page(&["/img/01.png"], None), 1).await;
    mount_png(&server, "/img/01.png", 10).await;

    let bounds = ChapterRange::new(ChapterNumber::whole(50), Some(ChapterNumber::whole(60)))
        .unwrap();
    let target = reference(&server, &config, "/scan/berserk/1");
    let summary = coordinator(config, &tmp).run(&target, &bounds).await.unwrap();

    assert_eq!(summary.chapters.len(), 1);
    assert_eq!(summary.chapters[0].downloaded, 1);
}

#[tokio::test]
async fn test_failed_reference_does_not_stop_the_next() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = test_config(&server, &tmp);

    // A plain file where the first chapter's workspace should go
    let out = tmp.path().join("out");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("blocked"), "not a directory").unwrap();

    mount_html(&server, "/scan/berserk/blocked", chapter_page(&[], None), 0).await;
    mount_html(&server, "/scan/berserk/ok", chapter_page(&["/img/01.png"], None), 1).await;
    mount_png(&server, "/img/01.png", 10).await;

    let targets = vec![
        reference(&server, &config, "/scan/berserk/blocked"),
        reference(&server, &config, "/scan/berserk/ok"),
    ];
    let results = coordinator(config, &tmp)
        .run_all(&targets, &ChapterRange::default())
        .await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_err());
    let second = results[1].as_ref().expect("Second run should succeed");
    assert_eq!(second.target, "ok");
    assert_eq!(second.total_downloaded(), 1);
    assert!(out.join("ok").join("01.png").exists());
}
