//! Shared helpers for every backend: path normalization, line conversion and numbering,
//! read windows, string replacement, output truncation, glob and grep over a [`Files`] map.
//!
//! All functions are pure and synchronous. Backends that do not keep a `Files` map in memory
//! (the filesystem backend) still go through the same formatting so output shape never
//! depends on the storage medium.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;

use crate::backends::protocol::{FileData, FileInfo, Files, GrepMatch, GrepOutputMode};
use crate::error::{BackendError, BackendResult};

/// Returned by reads of an empty or whitespace-only file instead of zero lines.
pub const EMPTY_CONTENT_WARNING: &str = "System reminder: File exists but has empty contents";
/// Longest line emitted by line-numbered rendering, in characters.
pub const MAX_LINE_LENGTH: usize = 10_000;
/// Width of the right-justified line-number field.
pub const LINE_NUMBER_WIDTH: usize = 6;
/// Token budget for a single tool result.
pub const TOOL_RESULT_TOKEN_LIMIT: usize = 20_000;
/// Characters per token used to turn the token budget into a character budget.
pub const CHARS_PER_TOKEN: usize = 4;
/// Character budget for a single tool result.
pub const TOOL_RESULT_CHAR_LIMIT: usize = TOOL_RESULT_TOKEN_LIMIT * CHARS_PER_TOKEN;
/// Appended to truncated results.
pub const TRUNCATION_GUIDANCE: &str =
    "... [results truncated, try being more specific with your parameters]";
/// Glob sentinel for zero matches.
pub const NO_FILES_FOUND: &str = "No files found";
/// Grep sentinel for zero matches.
pub const NO_MATCHES_FOUND: &str = "No matches found";
/// Default first line (0-based) for reads.
pub const DEFAULT_READ_OFFSET: usize = 0;
/// Default number of lines for reads.
pub const DEFAULT_READ_LIMIT: usize = 500;

/// Normalizes a search base to a directory-style prefix: leading and trailing `/`.
///
/// `None` or `""` means `/`. A whitespace-only path is rejected.
pub fn validate_path(path: Option<&str>) -> BackendResult<String> {
    let path = match path {
        None | Some("") => "/",
        Some(p) => p,
    };
    if path.trim().is_empty() {
        return Err(BackendError::InvalidPath("path cannot be empty".to_string()));
    }
    let mut normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Ok(normalized)
}

/// Normalizes a file key: leading `/`, no trailing `/`.
pub fn normalize_file_path(file_path: &str) -> BackendResult<String> {
    let trimmed = file_path.trim_end_matches('/');
    if trimmed.trim().is_empty() {
        return Err(BackendError::InvalidPath(format!(
            "'{}' does not name a file",
            file_path
        )));
    }
    Ok(if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    })
}

/// Splits content on `\n`, dropping the one empty line a trailing newline produces.
pub fn lines_of(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = content.split('\n').map(String::from).collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// The file's text: lines joined with `\n`.
pub fn file_data_to_string(file_data: &FileData) -> String {
    file_data.content.join("\n")
}

/// Fresh file data stamped with the current time.
pub fn create_file_data(content: &str) -> FileData {
    let now = Utc::now();
    FileData {
        content: lines_of(content),
        created_at: now,
        modified_at: now,
    }
}

/// New content for an existing file: keeps `created_at`, refreshes `modified_at`.
pub fn update_file_data(file_data: &FileData, content: &str) -> FileData {
    FileData {
        content: lines_of(content),
        created_at: file_data.created_at,
        modified_at: Utc::now().max(file_data.created_at),
    }
}

/// Listing projection of one stored file.
pub fn file_info(path: &str, file_data: &FileData) -> FileInfo {
    FileInfo {
        path: path.to_string(),
        is_dir: false,
        size: file_data_to_string(file_data).chars().count() as u64,
        modified_at: Some(file_data.modified_at),
    }
}

/// Splits `line` into pieces of at most `size` characters (char boundaries respected).
fn chunk_chars(line: &str, size: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in line.char_indices() {
        if count == size {
            chunks.push(&line[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&line[start..]);
    chunks
}

/// `cat -n` style rendering starting at `start_line` (1-based).
///
/// Lines longer than [`MAX_LINE_LENGTH`] are split; continuation chunks are numbered `N.K`.
pub fn format_content_with_line_numbers<S: AsRef<str>>(lines: &[S], start_line: usize) -> String {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let line_num = start_line + i;
        if line.chars().count() <= MAX_LINE_LENGTH {
            out.push(format!(
                "{:>width$}\t{}",
                line_num,
                line,
                width = LINE_NUMBER_WIDTH
            ));
            continue;
        }
        for (chunk_idx, chunk) in chunk_chars(line, MAX_LINE_LENGTH).into_iter().enumerate() {
            let marker = if chunk_idx == 0 {
                line_num.to_string()
            } else {
                format!("{}.{}", line_num, chunk_idx)
            };
            out.push(format!(
                "{:>width$}\t{}",
                marker,
                chunk,
                width = LINE_NUMBER_WIDTH
            ));
        }
    }
    out.join("\n")
}

/// [`EMPTY_CONTENT_WARNING`] when `content` is empty or whitespace-only.
pub fn check_empty_content(content: &str) -> Option<&'static str> {
    if content.trim().is_empty() {
        Some(EMPTY_CONTENT_WARNING)
    } else {
        None
    }
}

/// Line-numbered window `[offset, offset + limit)` of a file.
pub fn format_read_response(file_data: &FileData, offset: usize, limit: usize) -> BackendResult<String> {
    if let Some(warning) = check_empty_content(&file_data_to_string(file_data)) {
        return Ok(warning.to_string());
    }
    let lines = &file_data.content;
    if offset >= lines.len() {
        return Err(BackendError::OffsetOutOfRange {
            offset,
            len: lines.len(),
        });
    }
    let end = offset.saturating_add(limit).min(lines.len());
    Ok(format_content_with_line_numbers(&lines[offset..end], offset + 1))
}

/// Replaces `old_string` with `new_string`, returning the new content and the number of
/// occurrences replaced.
///
/// Zero occurrences, or several without `replace_all`, are errors; nothing is replaced unless
/// the target is unambiguous.
pub fn perform_string_replacement(
    content: &str,
    old_string: &str,
    new_string: &str,
    replace_all: bool,
) -> BackendResult<(String, usize)> {
    if old_string.is_empty() {
        return Err(BackendError::EmptyOldString);
    }
    let occurrences = content.matches(old_string).count();
    if occurrences == 0 {
        return Err(BackendError::StringNotFound(old_string.to_string()));
    }
    if occurrences > 1 && !replace_all {
        return Err(BackendError::AmbiguousReplacement {
            old: old_string.to_string(),
            count: occurrences,
        });
    }
    Ok((content.replace(old_string, new_string), occurrences))
}

/// Keeps a list result within [`TOOL_RESULT_CHAR_LIMIT`], shrinking proportionally to its
/// total size and appending [`TRUNCATION_GUIDANCE`].
pub fn truncate_lines_if_too_long(items: Vec<String>) -> Vec<String> {
    let total: usize = items.iter().map(|s| s.chars().count()).sum();
    if total <= TOOL_RESULT_CHAR_LIMIT {
        return items;
    }
    let keep = items.len() * TOOL_RESULT_CHAR_LIMIT / total;
    let mut out: Vec<String> = items.into_iter().take(keep).collect();
    out.push(TRUNCATION_GUIDANCE.to_string());
    out
}

/// Keeps a text result within [`TOOL_RESULT_CHAR_LIMIT`], appending a newline and
/// [`TRUNCATION_GUIDANCE`] when cut.
pub fn truncate_text_if_too_long(text: String) -> String {
    match text.char_indices().nth(TOOL_RESULT_CHAR_LIMIT) {
        None => text,
        Some((cut, _)) => format!("{}\n{}", &text[..cut], TRUNCATION_GUIDANCE),
    }
}

/// Replaces path separators and dots so an external id is safe inside a storage key.
pub fn sanitize_tool_call_id(tool_call_id: &str) -> String {
    tool_call_id.replace(&['.', '/', '\\'][..], "_")
}

/// Compiles a shell glob: `*` and `?` stop at `/`, `**` spans directories, `{a,b}` alternates.
pub fn compile_glob(pattern: &str) -> BackendResult<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| BackendError::InvalidGlob(e.to_string()))
}

/// Compiles a grep pattern.
pub fn compile_regex(pattern: &str) -> BackendResult<Regex> {
    Regex::new(pattern).map_err(|e| BackendError::InvalidRegex(e.to_string()))
}

/// Path of `file_path` relative to the directory prefix `base` (which ends with `/`).
pub fn relative_to<'a>(file_path: &'a str, base: &str) -> Option<&'a str> {
    file_path
        .strip_prefix(base)
        .map(|rel| rel.trim_start_matches('/'))
}

/// Final path component.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Newest first; ties broken by path so output is deterministic.
pub fn sort_by_modified_desc(infos: &mut [FileInfo]) {
    infos.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| a.path.cmp(&b.path))
    });
}

/// Immediate children of `path` in `files`: files with size/timestamp, then inferred
/// subdirectories, all sorted by path.
pub fn ls_info_from_files(files: &Files, path: &str) -> BackendResult<Vec<FileInfo>> {
    let base = validate_path(Some(path))?;
    let mut infos = Vec::new();
    let mut subdirs = std::collections::BTreeSet::new();
    for (file_path, data) in files.range(base.clone()..) {
        let Some(rel) = file_path.strip_prefix(&base) else {
            break;
        };
        match rel.split_once('/') {
            Some((dir, _)) => {
                subdirs.insert(format!("{}{}/", base, dir));
            }
            None => infos.push(file_info(file_path, data)),
        }
    }
    infos.extend(subdirs.into_iter().map(FileInfo::dir));
    infos.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(infos)
}

/// Files under `path` whose path relative to it matches `pattern`, newest first.
///
/// Patterns without `/` match only the top level under `path`; use `**` to recurse.
pub fn glob_search_files(files: &Files, pattern: &str, path: &str) -> BackendResult<Vec<FileInfo>> {
    let matcher = compile_glob(pattern)?;
    let Ok(base) = validate_path(Some(path)) else {
        return Ok(Vec::new());
    };
    let mut matches: Vec<FileInfo> = files
        .iter()
        .filter(|(file_path, _)| {
            relative_to(file_path, &base).is_some_and(|rel| matcher.is_match(rel))
        })
        .map(|(file_path, data)| file_info(file_path, data))
        .collect();
    sort_by_modified_desc(&mut matches);
    Ok(matches)
}

/// Matching lines of one file, 1-based.
pub fn grep_lines<'a, I>(path: &str, lines: I, regex: &Regex) -> Vec<GrepMatch>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .enumerate()
        .filter(|(_, line)| regex.is_match(line))
        .map(|(idx, line)| GrepMatch {
            path: path.to_string(),
            line: idx + 1,
            text: line.to_string(),
        })
        .collect()
}

/// Raw grep over `files`: regex search of every line under `path`, optionally restricted to
/// files whose basename matches `glob`.
pub fn grep_matches_from_files(
    files: &Files,
    pattern: &str,
    path: Option<&str>,
    glob: Option<&str>,
) -> BackendResult<Vec<GrepMatch>> {
    let regex = compile_regex(pattern)?;
    let glob = glob.map(compile_glob).transpose()?;
    let Ok(base) = validate_path(path) else {
        return Ok(Vec::new());
    };
    let mut matches = Vec::new();
    for (file_path, data) in files.iter() {
        if !file_path.starts_with(&base) {
            continue;
        }
        if let Some(g) = &glob {
            if !g.is_match(basename(file_path)) {
                continue;
            }
        }
        matches.extend(grep_lines(
            file_path,
            data.content.iter().map(String::as_str),
            &regex,
        ));
    }
    Ok(matches)
}

/// Groups matches by path (sorted), keeping line order within each file.
pub fn build_grep_results_dict(matches: &[GrepMatch]) -> BTreeMap<&str, Vec<(usize, &str)>> {
    let mut grouped: BTreeMap<&str, Vec<(usize, &str)>> = BTreeMap::new();
    for m in matches {
        grouped
            .entry(m.path.as_str())
            .or_default()
            .push((m.line, m.text.as_str()));
    }
    grouped
}

/// Renders grep matches in the requested mode, or [`NO_MATCHES_FOUND`].
pub fn format_grep_matches(matches: &[GrepMatch], output_mode: GrepOutputMode) -> String {
    if matches.is_empty() {
        return NO_MATCHES_FOUND.to_string();
    }
    let grouped = build_grep_results_dict(matches);
    let mut out = Vec::new();
    match output_mode {
        GrepOutputMode::FilesWithMatches => {
            out.extend(grouped.keys().map(|p| p.to_string()));
        }
        GrepOutputMode::Count => {
            out.extend(grouped.iter().map(|(p, lines)| format!("{}: {}", p, lines.len())));
        }
        GrepOutputMode::Content => {
            for (p, lines) in &grouped {
                out.push(format!("{}:", p));
                out.extend(lines.iter().map(|(n, text)| format!("  {}: {}", n, text)));
            }
        }
    }
    out.join("\n")
}

/// Glob results one path per line, or [`NO_FILES_FOUND`].
pub fn format_glob_results(infos: &[FileInfo]) -> String {
    if infos.is_empty() {
        return NO_FILES_FOUND.to_string();
    }
    infos
        .iter()
        .map(|i| i.path.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Listing one path per line; an empty directory renders as an empty string.
pub fn format_ls_results(infos: &[FileInfo]) -> String {
    infos
        .iter()
        .map(|i| i.path.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Timestamp helper for tests and backends that read times from metadata.
pub fn system_time_to_utc(t: std::time::SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fd_at(content: &str, minutes: i64) -> FileData {
        let ts = DateTime::<Utc>::UNIX_EPOCH + Duration::minutes(minutes);
        FileData {
            content: lines_of(content),
            created_at: ts,
            modified_at: ts,
        }
    }

    #[test]
    fn validate_path_defaults_and_normalizes() {
        assert_eq!(validate_path(None).unwrap(), "/");
        assert_eq!(validate_path(Some("")).unwrap(), "/");
        assert_eq!(validate_path(Some("notes")).unwrap(), "/notes/");
        assert_eq!(validate_path(Some("/notes/")).unwrap(), "/notes/");
        assert!(matches!(
            validate_path(Some("   ")),
            Err(BackendError::InvalidPath(_))
        ));
    }

    #[test]
    fn normalize_file_path_adds_leading_slash() {
        assert_eq!(normalize_file_path("a/b.txt").unwrap(), "/a/b.txt");
        assert_eq!(normalize_file_path("/a/b.txt/").unwrap(), "/a/b.txt");
        assert!(normalize_file_path("/").is_err());
    }

    /// **Scenario**: content → lines → joined → lines is stable (single trailing newline dropped).
    #[test]
    fn lines_round_trip_stable() {
        for c in ["a\nb", "a\nb\n", "", "x", "  \n\tindent"] {
            let lines = lines_of(c);
            assert_eq!(lines_of(&lines.join("\n")), lines, "content {:?}", c);
        }
        assert!(lines_of("").is_empty());
        assert_eq!(lines_of("a\n"), vec!["a"]);
    }

    /// **Scenario**: update keeps created_at, moves modified_at forward.
    #[test]
    fn update_preserves_created_at() {
        let old = fd_at("one", 0);
        let new = update_file_data(&old, "two\n");
        assert_eq!(new.created_at, old.created_at);
        assert!(new.modified_at >= new.created_at);
        assert_eq!(new.content, vec!["two"]);
    }

    /// **Scenario**: 10 lines starting at 5 are numbered 5..=14, right-justified width 6.
    #[test]
    fn line_numbers_start_and_width() {
        let lines: Vec<String> = (0..10).map(|i| format!("l{}", i)).collect();
        let out = format_content_with_line_numbers(&lines, 5);
        let rendered: Vec<&str> = out.lines().collect();
        assert_eq!(rendered.len(), 10);
        assert_eq!(rendered[0], "     5\tl0");
        assert_eq!(rendered[9], "    14\tl9");
    }

    /// **Scenario**: an over-long line is split into MAX_LINE_LENGTH chunks with N.K markers.
    #[test]
    fn long_line_split_with_continuation_markers() {
        let long = "x".repeat(MAX_LINE_LENGTH * 2 + 5);
        let out = format_content_with_line_numbers(&[long.as_str(), "short"], 1);
        let rendered: Vec<&str> = out.split('\n').collect();
        assert_eq!(rendered.len(), 4);
        assert!(rendered[0].starts_with("     1\t"));
        assert!(rendered[1].starts_with("   1.1\t"));
        assert!(rendered[2].starts_with("   1.2\t"));
        assert_eq!(rendered[2].len(), "   1.2\t".len() + 5);
        assert_eq!(rendered[3], "     2\tshort");
        for line in &rendered {
            let body = line.split_once('\t').unwrap().1;
            assert!(body.chars().count() <= MAX_LINE_LENGTH);
        }
    }

    #[test]
    fn read_response_empty_file_returns_warning() {
        assert_eq!(
            format_read_response(&fd_at("", 0), 0, 10).unwrap(),
            EMPTY_CONTENT_WARNING
        );
        assert_eq!(
            format_read_response(&fd_at("  \n \n", 0), 0, 10).unwrap(),
            EMPTY_CONTENT_WARNING
        );
    }

    #[test]
    fn read_response_window_and_offset_error() {
        let fd = fd_at("a\nb\nc\nd", 0);
        assert_eq!(
            format_read_response(&fd, 1, 2).unwrap(),
            "     2\tb\n     3\tc"
        );
        assert_eq!(format_read_response(&fd, 3, 100).unwrap(), "     4\td");
        let err = format_read_response(&fd, 4, 10).unwrap_err();
        assert!(matches!(err, BackendError::OffsetOutOfRange { offset: 4, len: 4 }));
    }

    #[test]
    fn replacement_single_occurrence() {
        let (out, n) = perform_string_replacement("hello world", "world", "there", false).unwrap();
        assert_eq!(out, "hello there");
        assert_eq!(n, 1);
    }

    /// **Scenario**: N>1 occurrences without replace_all reports N; with replace_all replaces all.
    #[test]
    fn replacement_multiple_occurrences() {
        let err = perform_string_replacement("a a a", "a", "b", false).unwrap_err();
        assert!(err.to_string().contains("3 times"), "{}", err);
        let (out, n) = perform_string_replacement("a a a", "a", "b", true).unwrap();
        assert_eq!(out, "b b b");
        assert_eq!(n, 3);
    }

    #[test]
    fn replacement_missing_and_empty() {
        let err = perform_string_replacement("abc", "zzz", "y", true).unwrap_err();
        assert!(matches!(err, BackendError::StringNotFound(ref s) if s == "zzz"));
        assert!(matches!(
            perform_string_replacement("abc", "", "y", true),
            Err(BackendError::EmptyOldString)
        ));
    }

    /// **Scenario**: an over-budget list shrinks proportionally and ends with the guidance marker.
    #[test]
    fn truncate_list_proportional() {
        let item = "y".repeat(1000);
        let items: Vec<String> = (0..200).map(|_| item.clone()).collect();
        let out = truncate_lines_if_too_long(items);
        assert_eq!(out.len(), 80 + 1);
        assert_eq!(out.last().unwrap(), TRUNCATION_GUIDANCE);

        let small = vec!["a".to_string(), "b".to_string()];
        assert_eq!(truncate_lines_if_too_long(small.clone()), small);
    }

    #[test]
    fn truncate_text_hard_cut() {
        let text = "z".repeat(TOOL_RESULT_CHAR_LIMIT + 10);
        let out = truncate_text_if_too_long(text);
        assert!(out.ends_with(&format!("\n{}", TRUNCATION_GUIDANCE)));
        assert_eq!(
            out.chars().count(),
            TOOL_RESULT_CHAR_LIMIT + 1 + TRUNCATION_GUIDANCE.chars().count()
        );
        assert_eq!(truncate_text_if_too_long("short".into()), "short");
    }

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize_tool_call_id("call.1/../x\\y"), "call_1____x_y");
        assert_eq!(sanitize_tool_call_id("toolu_01"), "toolu_01");
    }

    /// **Scenario**: `*.py` at `/` matches only the top level; `**/*.py` recurses.
    #[test]
    fn glob_non_recursive_vs_globstar() {
        let mut files = Files::new();
        files.insert("/a.py".into(), fd_at("x", 1));
        files.insert("/b/c.py".into(), fd_at("y", 2));

        let top = glob_search_files(&files, "*.py", "/").unwrap();
        assert_eq!(format_glob_results(&top), "/a.py");

        let all = glob_search_files(&files, "**/*.py", "/").unwrap();
        assert_eq!(format_glob_results(&all), "/b/c.py\n/a.py");
    }

    #[test]
    fn glob_braces_base_path_and_sentinel() {
        let mut files = Files::new();
        files.insert("/src/main.rs".into(), fd_at("", 1));
        files.insert("/src/lib.toml".into(), fd_at("", 3));
        files.insert("/src/notes.md".into(), fd_at("", 2));
        let out = glob_search_files(&files, "*.{rs,toml}", "/src").unwrap();
        assert_eq!(format_glob_results(&out), "/src/lib.toml\n/src/main.rs");
        let none = glob_search_files(&files, "*.py", "/").unwrap();
        assert_eq!(format_glob_results(&none), NO_FILES_FOUND);
        assert!(matches!(
            glob_search_files(&files, "[", "/"),
            Err(BackendError::InvalidGlob(_))
        ));
    }

    #[test]
    fn grep_invalid_regex_is_error_not_panic() {
        let files = Files::new();
        let err = grep_matches_from_files(&files, "(unclosed", None, None).unwrap_err();
        assert!(err.to_string().contains("Invalid"));
    }

    #[test]
    fn grep_output_modes() {
        let mut files = Files::new();
        files.insert("/b.txt".into(), fd_at("foo\nbar\nfoo again", 1));
        files.insert("/a.md".into(), fd_at("nothing\nfoo", 2));
        files.insert("/dir/c.txt".into(), fd_at("no match", 3));

        let m = grep_matches_from_files(&files, "foo", Some("/"), None).unwrap();
        assert_eq!(
            format_grep_matches(&m, GrepOutputMode::FilesWithMatches),
            "/a.md\n/b.txt"
        );
        assert_eq!(
            format_grep_matches(&m, GrepOutputMode::Count),
            "/a.md: 1\n/b.txt: 2"
        );
        assert_eq!(
            format_grep_matches(&m, GrepOutputMode::Content),
            "/a.md:\n  2: foo\n/b.txt:\n  1: foo\n  3: foo again"
        );

        let filtered = grep_matches_from_files(&files, "foo", None, Some("*.txt")).unwrap();
        assert_eq!(
            format_grep_matches(&filtered, GrepOutputMode::FilesWithMatches),
            "/b.txt"
        );
        let none = grep_matches_from_files(&files, "zzz", None, None).unwrap();
        assert_eq!(format_grep_matches(&none, GrepOutputMode::Content), NO_MATCHES_FOUND);
    }

    #[test]
    fn ls_lists_files_and_inferred_dirs() {
        let mut files = Files::new();
        files.insert("/a.txt".into(), fd_at("abc", 1));
        files.insert("/dir/x.txt".into(), fd_at("", 1));
        files.insert("/dir/sub/y.txt".into(), fd_at("", 1));
        files.insert("/dirt.txt".into(), fd_at("", 1));

        let root = ls_info_from_files(&files, "/").unwrap();
        let paths: Vec<&str> = root.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["/a.txt", "/dir/", "/dirt.txt"]);
        assert_eq!(root[0].size, 3);
        assert!(root[1].is_dir);

        let dir = ls_info_from_files(&files, "/dir").unwrap();
        let paths: Vec<&str> = dir.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["/dir/sub/", "/dir/x.txt"]);
    }
}
