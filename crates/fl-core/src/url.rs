//! Fast URL slicing utilities
//!
//! These functions avoid allocations and work directly on string slices. They
//! never fail: a URL that cannot be sliced simply has no host or query. Full
//! parsing with error reporting lives in the interpreter.

// =============================================================================
// Scheme and Host
// =============================================================================

/// Get the position after "://".
#[inline]
pub fn get_scheme_end(url: &str) -> Option<usize> {
    let bytes = url.as_bytes();

    let colon_pos = bytes.iter().position(|&b| b == b':')?;

    if bytes.len() > colon_pos + 2
        && bytes[colon_pos + 1] == b'/'
        && bytes[colon_pos + 2] == b'/'
    {
        return Some(colon_pos + 3);
    }

    None
}

/// Get the start and end positions of the hostname in a URL.
#[inline]
pub fn get_host_position(url: &str) -> Option<(usize, usize)> {
    let scheme_end = get_scheme_end(url)?;
    let bytes = url.as_bytes();

    // Skip userinfo
    let mut host_start = scheme_end;
    for i in scheme_end..bytes.len() {
        if bytes[i] == b'@' {
            host_start = i + 1;
            break;
        }
        if bytes[i] == b'/' || bytes[i] == b'?' || bytes[i] == b'#' {
            break;
        }
    }

    let mut host_end = bytes.len();
    for i in host_start..bytes.len() {
        let b = bytes[i];
        if b == b'/' || b == b'?' || b == b'#' || b == b':' {
            host_end = i;
            break;
        }
    }

    Some((host_start, host_end))
}

/// Hostname without port or userinfo. Returns a slice into the input.
#[inline]
pub fn extract_host(url: &str) -> Option<&str> {
    let (host_start, host_end) = get_host_position(url)?;
    let host = &url[host_start..host_end];
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

// =============================================================================
// Path, Query, Fragment
// =============================================================================

/// Extract the path portion of a URL.
#[inline]
pub fn extract_path(url: &str) -> &str {
    let scheme_end = match get_scheme_end(url) {
        Some(pos) => pos,
        None => return "/",
    };

    let bytes = url.as_bytes();

    let mut path_start = None;
    for (i, &b) in bytes[scheme_end..].iter().enumerate() {
        if b == b'/' {
            path_start = Some(scheme_end + i);
            break;
        }
        if b == b'?' || b == b'#' {
            return "/";
        }
    }

    let path_start = match path_start {
        Some(pos) => pos,
        None => return "/",
    };

    let mut path_end = bytes.len();
    for (i, &b) in bytes[path_start..].iter().enumerate() {
        if b == b'?' || b == b'#' {
            path_end = path_start + i;
            break;
        }
    }

    &url[path_start..path_end]
}

/// Query string without the leading `?` and without the fragment.
#[inline]
pub fn extract_query(url: &str) -> Option<&str> {
    let q_pos = url.find('?')?;
    let rest = &url[q_pos + 1..];
    let query = match rest.find('#') {
        Some(hash_pos) => &rest[..hash_pos],
        None => rest,
    };
    if query.is_empty() {
        None
    } else {
        Some(query)
    }
}

/// Fragment without the leading `#`.
#[inline]
pub fn extract_fragment(url: &str) -> Option<&str> {
    let hash_pos = url.find('#')?;
    let fragment = &url[hash_pos + 1..];
    if fragment.is_empty() {
        None
    } else {
        Some(fragment)
    }
}

/// Raw (still encoded) `key=value` pairs of a query string.
pub fn raw_query_pairs(query: &str) -> impl Iterator<Item = (&str, &str)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
}

/// Whether the query string has a parameter named `key`.
pub fn has_query_key(query: &str, key: &str) -> bool {
    raw_query_pairs(query).any(|(k, _)| k == key)
}

/// ASCII case-insensitive substring search.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

// =============================================================================
// Listing Pages
// =============================================================================

const LISTING_PATHS: &[&str] = &["/", "/media", "/media/"];
const FILTER_QUERY_KEYS: &[&str] = &["field", "metaproperty", "tags", "text"];

/// Whether the URL is the portal's unfiltered asset listing: a listing path
/// with no query, or a query carrying only view settings (`viewType`).
pub fn is_bare_listing(url: &str) -> bool {
    if !LISTING_PATHS.contains(&extract_path(url)) {
        return false;
    }

    match extract_query(url) {
        None => true,
        Some(query) => {
            has_query_key(query, "viewType")
                && !FILTER_QUERY_KEYS.iter().any(|key| has_query_key(query, key))
        }
    }
}
