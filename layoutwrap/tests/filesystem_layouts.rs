use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use layoutwrap::{ContentItem, LayoutCache, LayoutStage, StageOptions};

const HELLO_HTML: &str = "<html><body><p>Hello</p></body></html>\n";

fn hello() -> ContentItem {
    ContentItem::new("hello.html", "<p>Hello</p>")
}

fn write_at(path: &Path, body: &str, modified: SystemTime) {
    fs::write(path, body).unwrap();
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(modified)
        .unwrap();
}

#[test]
fn rewritten_layout_with_newer_mtime_is_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let layout = dir.path().join("layout.ejs");
    let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    write_at(&layout, "<html><body><%- file.contents %></body></html>\n", t0);

    let location = layout.to_str().unwrap();
    let cache = Arc::new(LayoutCache::filesystem());
    let stage =
        LayoutStage::with_cache(location, StageOptions::engine("ejs"), cache.clone()).unwrap();

    assert_eq!(stage.process(hello()).unwrap().contents_str(), HELLO_HTML);
    assert_eq!(stage.process(hello()).unwrap().contents_str(), HELLO_HTML);

    write_at(&layout, "<html></html>", t0 + Duration::from_millis(1));
    assert_eq!(stage.process(hello()).unwrap().contents_str(), "<html></html>");
    assert_eq!(cache.len(), 1);
}

#[test]
fn content_change_without_mtime_change_keeps_cached_layout() {
    let dir = tempfile::tempdir().unwrap();
    let layout = dir.path().join("layout.hbs");
    let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    write_at(&layout, "<html><body>{{{file.contents}}}</body></html>\n", t0);

    let stage = LayoutStage::handlebars(layout.to_str().unwrap(), StageOptions::default()).unwrap();
    assert_eq!(stage.process(hello()).unwrap().contents_str(), HELLO_HTML);

    write_at(&layout, "changed", t0);
    assert_eq!(stage.process(hello()).unwrap().contents_str(), HELLO_HTML);
}

#[test]
fn deleted_layout_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let layout = dir.path().join("layout.njk");
    fs::write(&layout, "{{ file.contents | safe }}").unwrap();

    let stage = LayoutStage::nunjucks(layout.to_str().unwrap(), StageOptions::default()).unwrap();
    assert_eq!(stage.process(hello()).unwrap().contents_str(), "<p>Hello</p>");

    fs::remove_file(&layout).unwrap();
    assert!(stage.process(hello()).unwrap_err().is_not_found());
}
