use std::path::{Component, Path, PathBuf};

pub const INDEX_PAGE: &str = "index.html";
pub const DETAILS_PAGE: &str = "book-details.html";

pub fn resolve_request_path(path: &str) -> String {
    let mapped = match path {
        "/" | "" => INDEX_PAGE,
        "/bd" => DETAILS_PAGE,
        p if p.starts_with("/bd/") => DETAILS_PAGE,
        p => p.trim_start_matches('/'),
    };

    if mapped.is_empty() {
        INDEX_PAGE.to_string()
    } else {
        mapped.to_string()
    }
}

/// Joins a relative request path onto the root, refusing anything that could
/// climb out of it.
pub fn safe_join(root: &Path, relative: &str) -> Option<PathBuf> {
    let candidate = Path::new(relative);

    let mut joined = root.to_path_buf();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(joined)
}

pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") => "image/jpg",
        Some("ico") => "image/x-icon",
        _ => "text/html",
    }
}
