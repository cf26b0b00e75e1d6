//! Tag discovery from the explorer's tag cloud

use crate::config::{NavigatorConfig, SelectorConfig};
use crate::harvest::record::normalize_tags;
use crate::harvest::ExtractError;
use crate::navigator::PageNavigator;
use crate::url::tag_cloud_url;
use url::Url;

/// Reads every tag from the tag cloud page, in page order without repeats
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Discovered tags; empty when the cloud never rendered
/// * `Err(ExtractError)` - The tag cloud page could not be loaded or queried
pub async fn discover_tags<N: PageNavigator>(
    navigator: &mut N,
    base_url: &Url,
    selectors: &SelectorConfig,
    timing: &NavigatorConfig,
) -> Result<Vec<String>, ExtractError> {
    let url = tag_cloud_url(base_url)?;

    navigator
        .navigate(&url)
        .await
        .map_err(|source| ExtractError::Navigation {
            url: url.to_string(),
            source,
        })?;

    if !navigator
        .wait_for(&selectors.tag_cloud, timing.render_timeout())
        .await?
    {
        tracing::warn!("Tag cloud at {} did not render", url);
        return Ok(Vec::new());
    }

    let mut raw = Vec::new();
    for handle in navigator.query_all(&selectors.tag_cloud).await? {
        raw.push(navigator.text(&handle).await?);
    }

    let tags = normalize_tags(raw);
    tracing::info!("Discovered {} tags at {}", tags.len(), url);
    Ok(tags)
}
