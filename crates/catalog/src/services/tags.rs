//! Tag frequencies and tag-scoped listings.

use std::collections::HashMap;

use serde::Serialize;
use tracing::instrument;

use crate::db::{CatalogRepository, RepositoryError, TagFilter};
use crate::models::Store;

/// A distinct tag and how many stores carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// The tag page: every tag with its count plus the stores for the
/// selected tag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagListing {
    pub tags: Vec<TagCount>,
    /// The tag the stores were filtered by, if any.
    pub active_tag: Option<String>,
    pub stores: Vec<Store>,
}

/// Count tag usage across tag lists, most used first and ties in
/// lexicographic order.
pub fn count_tags<I>(tag_lists: I) -> Vec<TagCount>
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for tag in tag_lists.into_iter().flatten() {
        *counts.entry(tag).or_insert(0) += 1;
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    tags
}

/// Every distinct tag with its usage count.
///
/// # Errors
///
/// Returns `RepositoryError` if the tag lists cannot be loaded.
#[instrument(skip_all)]
pub async fn list_tags(repo: &dyn CatalogRepository) -> Result<Vec<TagCount>, RepositoryError> {
    Ok(count_tags(repo.store_tag_lists().await?))
}

/// Tag counts plus the stores for `tag`.
///
/// The tag is trimmed the same way stored tags are. With no tag (or a
/// blank one) the stores are every store that has at least one tag.
///
/// # Errors
///
/// Returns `RepositoryError` if either query fails.
#[instrument(skip(repo))]
pub async fn list_by_tag(
    repo: &dyn CatalogRepository,
    tag: Option<&str>,
) -> Result<TagListing, RepositoryError> {
    let tag = tag.map(str::trim).filter(|t| !t.is_empty());
    let filter = tag.map_or(TagFilter::AnyTag, TagFilter::Tag);

    let (tags, stores) = tokio::try_join!(list_tags(repo), repo.stores_by_tag(filter))?;

    Ok(TagListing {
        tags,
        active_tag: tag.map(str::to_owned),
        stores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|tags| tags.iter().map(|t| (*t).to_owned()).collect())
            .collect()
    }

    #[test]
    fn test_count_tags_sorted_by_count_then_name() {
        let counts = count_tags(lists(&[
            &["Wifi", "Open Late"],
            &["Wifi", "Family Friendly"],
            &["Licensed", "Wifi"],
            &["Open Late"],
            &[],
        ]));
        let pairs: Vec<(&str, usize)> = counts.iter().map(|t| (t.tag.as_str(), t.count)).collect();
        assert_eq!(
            pairs,
            [
                ("Wifi", 3),
                ("Open Late", 2),
                ("Family Friendly", 1),
                ("Licensed", 1),
            ]
        );
    }

    #[test]
    fn test_count_tags_empty() {
        assert!(count_tags(Vec::<Vec<String>>::new()).is_empty());
    }
}
