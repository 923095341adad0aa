//! Path mechanics for moniker identity and file filtering.
//!
//! File names arrive normalized with `/` separators, the way the language
//! service reports them.

/// Joins `path` onto `base` unless `path` is already absolute.
pub fn resolve(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    }
}

pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}

pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Path of `file` relative to `dir`, when `file` lives under it.
pub fn relative(dir: &str, file: &str) -> Option<String> {
    let prefix = format!("{}/", dir.trim_end_matches('/'));
    file.strip_prefix(&prefix).map(|rest| rest.to_string())
}

pub fn is_under(dir: &str, file: &str) -> bool {
    file.starts_with(&format!("{}/", dir.trim_end_matches('/')))
}

/// Maps a source location under `root_dir` to the corresponding location
/// under `out_dir`, rewriting the source extension to the emitted `.js`.
pub fn to_out_location(file: &str, root_dir: &str, out_dir: &str) -> String {
    let rebased = match relative(root_dir, file) {
        Some(rest) => format!("{}/{}", out_dir.trim_end_matches('/'), rest),
        None => file.to_string(),
    };
    for source_ext in [".tsx", ".ts"] {
        if let Some(stem) = rebased.strip_suffix(source_ext) {
            return format!("{stem}.js");
        }
    }
    rebased
}

/// Longest common directory prefix of the given files; the fallback root when
/// the compiler options carry none.
pub fn common_directory_prefix(files: &[String]) -> Option<String> {
    let first = files.first()?;
    let mut prefix: Vec<&str> = dirname(first).split('/').collect();
    for file in &files[1..] {
        let dir: Vec<&str> = dirname(file).split('/').collect();
        let shared = prefix
            .iter()
            .zip(dir.iter())
            .take_while(|(a, b)| a == b)
            .count();
        prefix.truncate(shared);
        if prefix.is_empty() {
            return None;
        }
    }
    let joined = prefix.join("/");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// True when any ancestor directory component is `node_modules`.
pub fn traverses_node_modules(file: &str) -> bool {
    dirname(file).split('/').any(|part| part == "node_modules")
}

pub fn to_uri(path: &str) -> String {
    format!("file://{path}")
}
