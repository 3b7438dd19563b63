//! Generated index pages for directories without an `index.html`.
//!
//! Plugged in as the `ServeDir` fallback, so it only runs once the file
//! lookup has failed. Anything that is not a directory under the served
//! root still answers 404.

use std::io;
use std::path::{Component, Path, PathBuf};

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Bytes escaped when a file name is used as a relative link.
const LINK_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b':')
    .add(b'\\');

/// One row of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Render the listing for `request_path` under `root`.
pub async fn render(root: &Path, request_path: &str) -> Response {
    // Directory URLs always end in a slash; ServeDir redirects the rest.
    if !request_path.ends_with('/') {
        return StatusCode::NOT_FOUND.into_response();
    }

    let Some(dir) = resolve(root, request_path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match read_entries(&dir).await {
        Ok(entries) => (
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            page(&entries),
        )
            .into_response(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "Failed to read directory");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error reading directory\n").into_response()
        }
    }
}

/// Map a request path onto the filesystem, refusing anything that would
/// leave `root`.
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path.trim_start_matches('/'))
        .decode_utf8()
        .ok()?;

    let mut dir = root.to_path_buf();
    for component in Path::new(&*decoded).components() {
        match component {
            Component::Normal(part) => dir.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(dir)
}

/// Entries of `dir`, sorted by name.
pub async fn read_entries(dir: &Path) -> io::Result<Vec<ListingEntry>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// HTML body with one relative link per entry. Directories get a trailing slash.
pub fn page(entries: &[ListingEntry]) -> String {
    let mut html = String::from(
        "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
    );
    for entry in entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        html.push_str(&format!(
            "<a href=\"{}{}\">{}{}</a>\n",
            utf8_percent_encode(&entry.name, LINK_SEGMENT),
            suffix,
            escape_html(&entry.name),
            suffix
        ));
    }
    html.push_str("</pre>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
