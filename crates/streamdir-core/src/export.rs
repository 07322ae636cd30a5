//! Export encoders: M3U playlist, tab-separated, and JSON renderings of the
//! final result set.
//!
//! Each encoder renders the whole set to a string and writes it atomically
//! (temp file + rename). Entries are sorted by display name then URL so an
//! artifact is internally consistent run to run; an empty set still yields
//! a valid, empty-bodied artifact.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::resultset::ResultSet;

#[derive(Debug, Serialize)]
struct ExportEntry<'a> {
    name: &'a str,
    url: &'a str,
}

/// M3U playlist: `#EXTM3U` header, then per entry a metadata line with the
/// display name (and group label when present) followed by the URL line.
pub fn render_playlist(set: &ResultSet) -> String {
    let mut out = String::from("#EXTM3U\n");
    for (url, entry) in set.sorted_entries() {
        if entry.group.is_empty() {
            out.push_str(&format!("#EXTINF:-1,{}\n", entry.name));
        } else {
            out.push_str(&format!(
                "#EXTINF:-1 group-title=\"{}\",{}\n",
                entry.group, entry.name
            ));
        }
        out.push_str(url);
        out.push('\n');
    }
    out
}

/// One line per URL: `displayName<TAB>url`.
pub fn render_tsv(set: &ResultSet) -> String {
    let mut out = String::new();
    for (url, entry) in set.sorted_entries() {
        out.push_str(&format!("{}\t{}\n", entry.name, url));
    }
    out
}

/// Pretty-printed JSON array of `{name, url}` objects.
pub fn render_json(set: &ResultSet) -> Result<String> {
    let entries: Vec<ExportEntry<'_>> = set
        .sorted_entries()
        .into_iter()
        .map(|(url, entry)| ExportEntry {
            name: &entry.name,
            url,
        })
        .collect();
    let mut json = serde_json::to_string_pretty(&entries).context("serialize export")?;
    json.push('\n');
    Ok(json)
}

/// Write `contents` to `path` atomically (temp file in the same directory,
/// then rename), so no reader ever sees a partial artifact.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let dir = parent.unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp artifact in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes()).context("write artifact")?;
    tmp.persist(path)
        .with_context(|| format!("replace artifact: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Candidate;
    use tempfile::tempdir;

    fn set_of(entries: &[(&str, &str, &str)]) -> ResultSet {
        let mut set = ResultSet::new();
        for (name, url, group) in entries {
            set.insert(Candidate {
                name: name.to_string(),
                url: url.to_string(),
                group: group.to_string(),
            });
        }
        set
    }

    #[test]
    fn playlist_header_and_line_pairs() {
        let set = set_of(&[("News 24", "http://cdn/news.m3u8", "news")]);
        let m3u = render_playlist(&set);
        let lines: Vec<&str> = m3u.lines().collect();
        assert_eq!(
            lines,
            vec![
                "#EXTM3U",
                "#EXTINF:-1 group-title=\"news\",News 24",
                "http://cdn/news.m3u8",
            ]
        );
    }

    #[test]
    fn playlist_omits_empty_group() {
        let set = set_of(&[("Plain", "http://cdn/plain.m3u8", "")]);
        let m3u = render_playlist(&set);
        assert!(m3u.contains("#EXTINF:-1,Plain\n"));
        assert!(!m3u.contains("group-title"));
    }

    #[test]
    fn tsv_one_line_per_url() {
        let set = set_of(&[("A", "http://a", ""), ("B", "http://b", "")]);
        assert_eq!(render_tsv(&set), "A\thttp://a\nB\thttp://b\n");
    }

    #[test]
    fn empty_set_yields_valid_artifacts() {
        let set = ResultSet::new();
        assert_eq!(render_playlist(&set), "#EXTM3U\n");
        assert_eq!(render_tsv(&set), "");
        assert_eq!(render_json(&set).unwrap(), "[]\n");
    }

    #[test]
    fn tsv_and_json_carry_the_same_entries() {
        let set = set_of(&[("Alice", "http://a", ""), ("Bob", "http://b", "tv")]);
        let tsv = render_tsv(&set);
        let json = render_json(&set).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), tsv.lines().count());
        for value in parsed {
            let name = value["name"].as_str().unwrap();
            let url = value["url"].as_str().unwrap();
            assert!(tsv.lines().any(|l| l == format!("{}\t{}", name, url)));
        }
    }

    #[test]
    fn write_artifact_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("streams.tsv");
        write_artifact(&path, "old\thttp://old\n").unwrap();
        write_artifact(&path, "new\thttp://new\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\thttp://new\n");
    }
}
