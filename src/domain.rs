//! Canonical site keys derived from navigation URLs.

use url::Url;

/// Extract the canonical domain for a URL.
///
/// The key is the lowercased host with any `www.` prefix, userinfo, port,
/// path, query and fragment removed. Returns `None` for empty input and for
/// URLs that have no host (`about:blank`, `mailto:`, `file:///...`).
pub fn extract_domain(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    primary_host(url).or_else(|| fallback_host(url))
}

enum SchemeSplit<'a> {
    /// `scheme://rest`, or no scheme at all
    Hierarchical(&'a str),
    /// `scheme:rest` with no authority
    Opaque,
}

fn split_scheme(url: &str) -> SchemeSplit<'_> {
    let Some(colon) = url.find(':') else {
        return SchemeSplit::Hierarchical(url);
    };
    let (scheme, after) = url.split_at(colon);
    let after = after.strip_prefix(':').unwrap_or(after);

    if !is_scheme(scheme) {
        return SchemeSplit::Hierarchical(url);
    }
    if let Some(rest) = after.strip_prefix("//") {
        return SchemeSplit::Hierarchical(rest);
    }
    // "example.com:8080/..." is a host with a port, not a scheme
    if after.is_empty() || after.starts_with(|c: char| c.is_ascii_digit()) {
        return SchemeSplit::Hierarchical(url);
    }
    SchemeSplit::Opaque
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

fn primary_host(url: &str) -> Option<String> {
    let rest = match split_scheme(url) {
        SchemeSplit::Hierarchical(rest) => rest,
        SchemeSplit::Opaque => return None,
    };

    let authority_len = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, _) = rest.split_at(authority_len);
    let host_port = match authority.rfind('@') {
        Some(at) => authority.split_at(at + 1).1,
        None => authority,
    };

    let host = strip_www(host_port);
    let host = if host.starts_with('[') {
        // IPv6 literal keeps its brackets and drops the port
        match host.find(']') {
            Some(close) => host.split_at(close + 1).0,
            None => return None,
        }
    } else {
        let end = host.find(':').unwrap_or(host.len());
        host.split_at(end).0
    };

    normalize(host)
}

fn fallback_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().and_then(|host| normalize(strip_www(host)))
}

fn strip_www(host: &str) -> &str {
    match host.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("www.") => host.get(4..).unwrap_or(""),
        _ => host,
    }
}

fn normalize(host: &str) -> Option<String> {
    let host = host.trim_end_matches('.');
    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}
