use std::path::Path;
use std::sync::LazyLock;

use rand::Rng;
use rustc_hash::FxHashMap;

/// Baseline browser-shaped headers sent with every request. The
/// `user-agent` entry is a placeholder that submission replaces with a
/// random pick from [`random_user_agent`].
pub const DEFAULT_HEADERS: [(&str, &str); 9] = [
    ("upgrade-insecure-requests", "1"),
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    ),
    ("sec-fetch-site", "same-origin"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-user", "?1"),
    ("accept-encoding", "gzip, deflate, br, zstd"),
    ("accept-language", "zh-CN,zh;q=0.9,en;q=0.8,en-GB;q=0.7,en-US;q=0.6"),
    ("user-agent", "curl/7.8.0"),
];

const USER_AGENTS: [&str; 10] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36 Edg/123.0.2420.81",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (iPad; CPU OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
];

pub fn random_user_agent() -> &'static str {
    USER_AGENTS[rand::rng().random_range(0..USER_AGENTS.len())]
}

/// Parses rendered header lines into ordered `(name, value)` pairs.
///
/// Lines split on the first colon; blank lines and lines without one are
/// dropped; repeated names merge their values with `", "`.
pub fn headers_string_to_object(headers: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();

    for line in headers.split(['\r', '\n']) {
        if line.trim().is_empty() {
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();

        match result.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => result.push((name.to_string(), value.to_string())),
        }
    }

    result
}

/// Replaces the header in place, matching names case-insensitively, or
/// appends it when absent.
pub fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: impl Into<String>) {
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
    {
        Some((_, existing)) => *existing = value.into(),
        None => headers.push((name.to_string(), value.into())),
    }
}

static MIME_TYPES: LazyLock<FxHashMap<&'static str, &'static str>> = LazyLock::new(|| {
    FxHashMap::from_iter([
        ("html", "text/html"),
        ("htm", "text/html"),
        ("txt", "text/plain"),
        ("css", "text/css"),
        ("csv", "text/csv"),
        ("js", "text/javascript"),
        ("json", "application/json"),
        ("xml", "application/xml"),
        ("pdf", "application/pdf"),
        ("zip", "application/zip"),
        ("gz", "application/gzip"),
        ("bin", "application/octet-stream"),
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("gif", "image/gif"),
        ("svg", "image/svg+xml"),
        ("webp", "image/webp"),
        ("ico", "image/vnd.microsoft.icon"),
        ("mp3", "audio/mpeg"),
        ("mp4", "video/mp4"),
        ("woff2", "font/woff2"),
        // Custom body-template extensions.
        ("urlencoded", "application/x-www-form-urlencoded"),
        ("form", "multipart/form-data"),
        ("form-data", "multipart/form-data"),
    ])
});

/// Looks up a MIME type by the path's extension, case-insensitively.
pub fn mime_by_extension(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    MIME_TYPES.get(extension.as_str()).copied()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_headers_string_basic() {
        let parsed = headers_string_to_object("Content-Type: application/json\nAccept: */*");
        assert_eq!(
            parsed,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "*/*".to_string()),
            ]
        );
    }

    #[test]
    fn test_headers_string_crlf_and_blank_lines() {
        let parsed = headers_string_to_object("a: 1\r\n\r\nb: 2\r\n");
        assert_eq!(
            parsed,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_headers_string_merges_duplicates() {
        let parsed = headers_string_to_object("x-tag: one\nx-tag: two");
        assert_eq!(parsed, vec![("x-tag".to_string(), "one, two".to_string())]);
    }

    #[test]
    fn test_headers_string_skips_lines_without_colon() {
        let parsed = headers_string_to_object("not a header\nok: yes");
        assert_eq!(parsed, vec![("ok".to_string(), "yes".to_string())]);
    }

    #[test]
    fn test_headers_string_splits_on_first_colon_only() {
        let parsed = headers_string_to_object("referer: http://example.com/a");
        assert_eq!(
            parsed,
            vec![("referer".to_string(), "http://example.com/a".to_string())]
        );
    }

    #[test]
    fn test_set_header_overrides_case_insensitively() {
        let mut headers = vec![("user-agent".to_string(), "curl/7.8.0".to_string())];
        set_header(&mut headers, "User-Agent", "TestAgent/1.0");
        assert_eq!(
            headers,
            vec![("user-agent".to_string(), "TestAgent/1.0".to_string())]
        );
    }

    #[test]
    fn test_set_header_appends_new_names() {
        let mut headers = Vec::new();
        set_header(&mut headers, "cookie", "a=1");
        assert_eq!(headers, vec![("cookie".to_string(), "a=1".to_string())]);
    }

    #[test]
    fn test_random_user_agent_comes_from_pool() {
        for _ in 0..50 {
            assert!(USER_AGENTS.contains(&random_user_agent()));
        }
    }

    #[rstest]
    #[case::html("page.html", Some("text/html"))]
    #[case::json("body.json", Some("application/json"))]
    #[case::uppercase("IMAGE.PNG", Some("image/png"))]
    #[case::urlencoded("login.urlencoded", Some("application/x-www-form-urlencoded"))]
    #[case::form_data("upload.form-data", Some("multipart/form-data"))]
    #[case::unknown("data.xyz", None)]
    #[case::no_extension("Makefile", None)]
    fn test_mime_by_extension(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(mime_by_extension(Path::new(path)), expected);
    }
}
