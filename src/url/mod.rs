//! URL handling module for Tag-Harvester
//!
//! Builds the explorer URLs the harvester visits and qualifies the icon sources
//! found on listing pages.

use thiserror::Error;
use url::Url;

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("URL cannot carry path segments: {0}")]
    CannotBeABase(String),
}

/// Result type alias for URL operations
pub type UrlResult<T> = Result<T, UrlError>;

/// Parses the configured site root
pub fn parse_base_url(base: &str) -> UrlResult<Url> {
    Ok(Url::parse(base.trim())?)
}

/// URL of the tag cloud page (`{base}/tag`)
pub fn tag_cloud_url(base: &Url) -> UrlResult<Url> {
    with_segments(base, &["tag"])
}

/// URL of the first listing page for `tag` (`{base}/tag/{tag}`)
///
/// The tag is percent-encoded as a single path segment, so tags containing
/// spaces or slashes still address one listing.
///
/// # Example
///
/// ```
/// use tag_harvester::url::{parse_base_url, tag_listing_url};
///
/// let base = parse_base_url("https://ethplorer.io").unwrap();
/// let url = tag_listing_url(&base, "Liquid Staking").unwrap();
/// assert_eq!(url.as_str(), "https://ethplorer.io/tag/Liquid%20Staking");
/// ```
pub fn tag_listing_url(base: &Url, tag: &str) -> UrlResult<Url> {
    with_segments(base, &["tag", tag])
}

fn with_segments(base: &Url, segments: &[&str]) -> UrlResult<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| UrlError::CannotBeABase(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Qualifies an icon `src` attribute into an absolute http(s) URL
///
/// Absolute and protocol-relative (`//cdn.host/x.png`) sources resolve as
/// usual. Other relative sources (`/images/x.png`, `x.png`) are placed under
/// the base path, so a site hosted below `/explorer` serves its icons there too.
///
/// # Returns
///
/// * `Some(Url)` - A fetchable http(s) URL
/// * `None` - The source is empty, inline (`data:`), or uses another scheme
pub fn resolve_icon_url(src: &str, base: &Url) -> Option<Url> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }

    let resolved = match Url::parse(src) {
        Ok(absolute) => absolute,
        Err(url::ParseError::RelativeUrlWithoutBase) if src.starts_with("//") => {
            base.join(src).ok()?
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let relative = format!("./{}", src.trim_start_matches('/'));
            base_directory(base).join(&relative).ok()?
        }
        Err(_) => return None,
    };

    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// `base` with a trailing slash and without query or fragment
fn base_directory(base: &Url) -> Url {
    let mut dir = base.clone();
    dir.set_query(None);
    dir.set_fragment(None);
    if !dir.path().ends_with('/') {
        let path = format!("{}/", dir.path());
        dir.set_path(&path);
    }
    dir
}
