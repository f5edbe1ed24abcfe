use flate2::{write::GzEncoder, Compression};
use log::info;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::app::Board;
use crate::errors::Result;
use crate::filter::Mode;
use crate::locale::Lang;
use crate::render::escape_html;

const STYLESHEET: &str = "\
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 960px; padding: 16px; }
#list { display: grid; gap: 12px; }
.card { border: 1px solid #ddd; border-radius: 12px; padding: 12px 14px; }
.row { display: flex; flex-wrap: wrap; gap: 8px; align-items: center; }
.badge { border: 1px solid #ccc; border-radius: 999px; font-size: 12px; padding: 2px 8px; }
.badge.r18 { border-color: #c62828; color: #c62828; }
.kpi { font-size: 14px; }
.price { font-weight: 700; }
.muted { color: #777; }
.error { color: #c62828; white-space: pre-wrap; }
";

pub fn page_file_name(lang: Lang, mode: Mode) -> String {
    format!("{mode}.{lang}.html")
}

/// Wraps a board into a standalone HTML document.
pub fn render_page(board: &Board, lang: Lang) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
{STYLESHEET}</style>
</head>
<body>
<div id="status">{status}</div>
<div id="list">
{list}</div>
</body>
</html>
"#,
        title = lang.page_title(),
        status = escape_html(&board.status),
        list = board.list_html(),
    )
}

/// Writes `html` to `path`, or to `path` with `.gz` appended when
/// compressing. Returns the path written.
pub fn write_page(html: &str, path: &Path, compress: bool) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let path = if compress {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    } else {
        path.to_path_buf()
    };
    info!("Saving page as {}", path.display());

    let mut file = BufWriter::new(File::create(&path)?);
    if compress {
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(html.as_bytes())?;
        // The gzip trailer is only written by finish, not by flush.
        encoder.finish()?.flush()?;
    } else {
        file.write_all(html.as_bytes())?;
        file.flush()?;
    }
    Ok(path)
}
