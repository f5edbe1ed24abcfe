use log::{error, info};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

use crate::countdown::Clock;
use crate::feed::Feed;
use crate::fetch::FeedLoader;
use crate::filter::Mode;
use crate::locale::Lang;
use crate::page::{page_file_name, render_page, write_page};
use crate::render::{render_item, Node, RenderOptions};

/// Status line plus list contents of a rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub status: String,
    pub list: Vec<Node>,
    pub failed: bool,
}

impl Board {
    pub fn shown(&self) -> usize {
        self.list
            .iter()
            .filter(|node| matches!(node, Node::Card(_)))
            .count()
    }

    pub fn list_html(&self) -> String {
        self.list.iter().map(Node::to_html).collect()
    }
}

pub fn render_feed(feed: &Feed, opts: &RenderOptions, clock: &Clock) -> Board {
    let mut list: Vec<Node> = feed
        .items
        .iter()
        .filter_map(|item| render_item(item, opts, clock))
        .map(Node::Card)
        .collect();
    let shown = list.len();

    let generated_at = feed.generated_at.as_deref().unwrap_or("-");
    let status = opts.lang.loaded(shown, generated_at);
    if shown == 0 {
        list.push(Node::Empty(opts.lang.empty().to_string()));
    }
    info!(
        "Rendered {shown} of {} items (lang: {}, mode: {})",
        feed.items.len(),
        opts.lang,
        opts.mode
    );

    Board {
        status,
        list,
        failed: false,
    }
}

pub fn render_failure(error: &impl Display, lang: Lang) -> Board {
    Board {
        status: lang.load_failed().to_string(),
        list: vec![Node::Error(error.to_string())],
        failed: true,
    }
}

/// Loads the feed and renders it, turning any failure into an error board.
pub fn run_app(loader: &FeedLoader, opts: &RenderOptions, clock: &Clock) -> Board {
    match loader.load() {
        Ok(feed) => render_feed(&feed, opts, clock),
        Err(e) => {
            error!("Failed to load feed from {}: {}", loader.source(), e);
            render_failure(&e, opts.lang)
        }
    }
}

/// Result of rendering every language and mode.
#[derive(Debug)]
pub struct BuildReport {
    pub pages: Vec<PathBuf>,
    pub failed: bool,
}

/// Loads the feed once and writes one page per language and mode into
/// `output_dir`.
pub fn build_all(
    loader: &FeedLoader,
    clock: &Clock,
    output_dir: &Path,
    compress: bool,
) -> anyhow::Result<BuildReport> {
    let feed = loader.load();
    if let Err(e) = &feed {
        error!("Failed to load feed from {}: {}", loader.source(), e);
    }

    let mut pages = Vec::new();
    for lang in Lang::iter() {
        for mode in Mode::iter() {
            let opts = RenderOptions::new(lang, mode);
            let board = match &feed {
                Ok(feed) => render_feed(feed, &opts, clock),
                Err(e) => render_failure(e, lang),
            };
            let html = render_page(&board, lang);
            let path = write_page(&html, &output_dir.join(page_file_name(lang, mode)), compress)?;
            pages.push(path);
        }
    }
    info!("Wrote {} pages to {}", pages.len(), output_dir.display());
    Ok(BuildReport {
        pages,
        failed: feed.is_err(),
    })
}

#[cfg(test)]
mod test_app {
    use serde_json::json;
    use std::fs;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};
    use time::{macros::datetime, UtcOffset};

    use super::*;
    use crate::errors::Error;
    use crate::feed::test::load_file;
    use crate::fetch::FeedSource;

    fn init() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    fn clock() -> Clock {
        Clock::new(datetime!(2024-05-01 00:00 UTC), UtcOffset::UTC)
    }

    fn path_loader(path: PathBuf) -> FeedLoader {
        FeedLoader::offline(FeedSource::Path(path))
    }

    fn fixture_loader() -> (NamedTempFile, FeedLoader) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(load_file("sales.json").as_bytes()).unwrap();
        let loader = path_loader(file.path().to_path_buf());
        (file, loader)
    }

    #[test]
    fn all_items_en() {
        init();
        let (_file, loader) = fixture_loader();
        let board = run_app(&loader, &RenderOptions::new(Lang::En, Mode::All), &clock());
        assert!(!board.failed);
        assert_eq!(board.shown(), 3);
        assert_eq!(
            board.status,
            "Loaded: 3 items (generated_at: 2024-05-01T09:00:00+09:00)"
        );
    }

    #[test]
    fn modes_partition_items() {
        init();
        let (_file, loader) = fixture_loader();
        let r18 = run_app(&loader, &RenderOptions::new(Lang::Ja, Mode::R18Only), &clock());
        let safe = run_app(&loader, &RenderOptions::new(Lang::Ja, Mode::Safe), &clock());
        assert_eq!(r18.shown(), 1);
        assert_eq!(safe.shown(), 2);
        assert_eq!(
            r18.status,
            "読み込み完了：1件（generated_at: 2024-05-01T09:00:00+09:00)"
        );
        match &r18.list[0] {
            Node::Card(card) => assert_eq!(card.title, "夜の物語"),
            node => panic!("unexpected node {node:?}"),
        }
    }

    #[test]
    fn keeps_feed_order() {
        let feed: Feed = load_file("sales.json").parse().unwrap();
        let board = render_feed(&feed, &RenderOptions::new(Lang::En, Mode::All), &clock());
        let titles: Vec<&str> = board
            .list
            .iter()
            .map(|node| match node {
                Node::Card(card) => card.title.as_str(),
                node => panic!("unexpected node {node:?}"),
            })
            .collect();
        assert_eq!(titles, vec!["Summer Story", "夜の物語", "Untitled <Beta>"]);
    }

    #[test]
    fn empty_feed_shows_hint() {
        init();
        let feed: Feed = json!({ "items": [] }).to_string().parse().unwrap();
        let board = render_feed(&feed, &RenderOptions::new(Lang::En, Mode::All), &clock());
        assert_eq!(board.status, "Loaded: 0 items (generated_at: -)");
        assert_eq!(
            board.list,
            vec![Node::Empty(
                "No items to show. Check data/sales.json or filters.".to_string()
            )]
        );
        assert_eq!(board.shown(), 0);
        assert!(!board.failed);
    }

    #[test]
    fn filtered_out_shows_hint() {
        let feed: Feed = json!({ "items": [{ "rating": "general" }] })
            .to_string()
            .parse()
            .unwrap();
        let board = render_feed(&feed, &RenderOptions::new(Lang::Ja, Mode::R18Only), &clock());
        assert_eq!(board.shown(), 0);
        assert!(matches!(board.list.as_slice(), [Node::Empty(_)]));
    }

    #[test]
    fn mistyped_fields_still_render() {
        init();
        let feed: Feed = json!({
            "items": [
                { "title_en": "Stringly priced", "price_jpy": "1320", "discount_percent": "50" },
                { "title_en": "Epoch end", "sale_ends_at": 1714600000000u64 },
                { "title_en": "Numeric store", "store": 7 }
            ]
        })
        .to_string()
        .parse()
        .unwrap();
        let board = render_feed(&feed, &RenderOptions::new(Lang::En, Mode::All), &clock());
        assert_eq!(board.shown(), 3);
        assert_eq!(board.status, "Loaded: 3 items (generated_at: -)");

        let html = board.list_html();
        assert!(html.contains("¥1,320"), "{html}");
        assert!(html.contains("Off 50%"), "{html}");
        assert!(html.contains("~22h left"), "{html}");
        assert!(html.contains("<span class=\"badge\">7</span>"), "{html}");
    }

    #[test]
    fn missing_file_fails() {
        init();
        let dir = tempdir().unwrap();
        let loader = path_loader(dir.path().join("sales.json"));
        let board = run_app(&loader, &RenderOptions::new(Lang::En, Mode::All), &clock());
        assert!(board.failed);
        assert_eq!(board.status, "Load failed");
        match board.list.as_slice() {
            [Node::Error(text)] => assert!(text.contains("sales.json"), "{text}"),
            list => panic!("unexpected list {list:?}"),
        }
    }

    #[test]
    fn invalid_json_fails() {
        init();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"<html>not json</html>").unwrap();
        let loader = path_loader(file.path().to_path_buf());
        let board = run_app(&loader, &RenderOptions::new(Lang::Ja, Mode::All), &clock());
        assert!(board.failed);
        assert_eq!(board.status, "読み込み失敗");
        assert_eq!(board.shown(), 0);
    }

    #[test]
    fn failure_board_text() {
        let err = Error::Http {
            url: None,
            status: Some(503),
            message: "fetch failed: 503 Service Unavailable".to_string(),
        };
        let board = render_failure(&err, Lang::En);
        assert_eq!(
            board.list_html(),
            "<div class=\"error\">fetch failed: 503 Service Unavailable</div>\n"
        );
    }

    #[test]
    fn build_writes_every_page() {
        init();
        let (_file, loader) = fixture_loader();
        let output_dir = tempdir().unwrap();
        let report = build_all(&loader, &clock(), output_dir.path(), false).unwrap();
        assert!(!report.failed);
        assert_eq!(report.pages.len(), 6);
        for name in [
            "all.ja.html",
            "r18only.ja.html",
            "safe.ja.html",
            "all.en.html",
            "r18only.en.html",
            "safe.en.html",
        ] {
            assert!(output_dir.path().join(name).exists(), "missing {name}");
        }
        let safe = fs::read_to_string(output_dir.path().join("safe.en.html")).unwrap();
        assert!(safe.contains("Summer Story"));
        assert!(!safe.contains("夜の物語"));
    }

    #[test]
    fn build_with_failed_feed_writes_error_pages() {
        init();
        let dir = tempdir().unwrap();
        let loader = path_loader(dir.path().join("missing.json"));
        let output_dir = tempdir().unwrap();
        let report = build_all(&loader, &clock(), output_dir.path(), false).unwrap();
        assert!(report.failed);
        let page = fs::read_to_string(output_dir.path().join("all.en.html")).unwrap();
        assert!(page.contains("Load failed"));
    }
}
