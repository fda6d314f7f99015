use crate::{UrlError, UrlResult};
use url::Url;

/// Turns a discovered href into an absolute target URL
///
/// # Normalization Rules
///
/// 1. If the href already contains `site_base`, it is kept unchanged
/// 2. Otherwise `site_base` is prepended
/// 3. When `site_base` ends with `/` and the href starts with `/`, the
///    doubled slash at the seam is collapsed
///
/// No other rewriting happens: hrefs pointing at a different host end up
/// prefixed with the site base just like relative ones.
///
/// # Examples
///
/// ```
/// use faq_harvester::url::absolutize;
///
/// assert_eq!(
///     absolutize("/faq/show/1", "https://example.com"),
///     "https://example.com/faq/show/1"
/// );
/// assert_eq!(
///     absolutize("https://example.com/faq/show/1", "https://example.com"),
///     "https://example.com/faq/show/1"
/// );
/// ```
pub fn absolutize(href: &str, site_base: &str) -> String {
    if href.contains(site_base) {
        return href.to_string();
    }

    match (site_base.strip_suffix('/'), href.strip_prefix('/')) {
        (Some(base), Some(_)) => format!("{}{}", base, href),
        _ => format!("{}{}", site_base, href),
    }
}

/// Checks user input before a crawl is started
///
/// Rejects empty input and anything that is not an absolute HTTP(S) URL.
/// The trimmed input is returned verbatim (not re-serialized) because the
/// site base is matched textually against discovered hrefs.
///
/// # Examples
///
/// ```
/// use faq_harvester::url::parse_site_base;
///
/// assert_eq!(parse_site_base(" https://example.com ").unwrap(), "https://example.com");
/// assert!(parse_site_base("").is_err());
/// assert!(parse_site_base("ftp://example.com").is_err());
/// ```
pub fn parse_site_base(input: &str) -> UrlResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    Ok(trimmed.to_string())
}
