use itertools::Itertools;
use url::Url;

/// One record from a Netscape-format cookie file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub domain: String,
    /// The include-subdomains flag, second column of the file.
    pub flag: bool,
    pub path: String,
    pub secure: bool,
    /// Unix seconds; zero for session cookies.
    pub expiration: i64,
    pub name: String,
    pub value: String,
}

/// Parses Netscape cookie-file text into a jar.
///
/// Blank lines, `#` comment lines and rows with fewer than seven
/// tab-separated fields are dropped.
pub fn load_from_string(data: &str) -> Vec<Cookie> {
    data.lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let fields: Vec<&str> = line.trim().split('\t').collect();
            if fields.len() < 7 {
                return None;
            }

            Some(Cookie {
                domain: fields[0].to_string(),
                flag: fields[1] == "TRUE",
                path: fields[2].to_string(),
                secure: fields[3] == "TRUE",
                expiration: fields[4].parse().unwrap_or(0),
                name: fields[5].to_string(),
                value: fields[6].to_string(),
            })
        })
        .collect()
}

/// Serializes the jar into a `cookie` header value.
///
/// With a URL the jar is filtered by domain suffix, path prefix and the
/// secure flag; with a nonzero `time` expired cookies are dropped. More
/// specific paths come first. Names and values are emitted verbatim, the
/// file is trusted to be encoded already.
pub fn to_header_string(jar: &[Cookie], url: Option<&Url>, time: i64) -> String {
    let mut filtered: Vec<&Cookie> = jar
        .iter()
        .filter(|cookie| time == 0 || cookie.expiration >= time)
        .filter(|cookie| url.is_none_or(|url| matches(cookie, url)))
        .collect();

    filtered.sort_by(|a, b| b.path.len().cmp(&a.path.len()));

    filtered
        .iter()
        .map(|cookie| format!("{}={}", cookie.name, cookie.value))
        .join("; ")
}

fn matches(cookie: &Cookie, url: &Url) -> bool {
    let host = url.host_str().unwrap_or("").to_lowercase();
    let domain = cookie.domain.strip_prefix('.').unwrap_or(&cookie.domain).to_lowercase();

    if !host.ends_with(&domain) {
        return false;
    }
    if !url.path().starts_with(&cookie.path) {
        return false;
    }
    if cookie.secure && url.scheme() != "https" {
        return false;
    }

    true
}
