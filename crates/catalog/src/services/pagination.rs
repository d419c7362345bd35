//! Page-bounded store listing.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::db::{CatalogRepository, RepositoryError};
use crate::models::Store;

/// One page of the newest-first store listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePage {
    pub stores: Vec<Store>,
    pub total_count: usize,
    pub total_pages: usize,
    /// 1-based.
    pub page: usize,
}

/// Result of asking for a page.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PageOutcome {
    Page(StorePage),
    /// The requested page is past the end; show `page` instead.
    Redirect { page: usize, notice: String },
}

/// Number of pages needed for `total` items.
#[must_use]
pub const fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

/// Fetch page `page` (1-based; 0 reads as 1) of the store listing.
///
/// An empty page is only a redirect when stores were skipped to reach it.
/// Page 1 of an empty catalog is a normal, empty page.
///
/// # Errors
///
/// Returns `RepositoryError` if either query fails.
#[instrument(skip(repo))]
pub async fn list_page(
    repo: &dyn CatalogRepository,
    page: usize,
    page_size: usize,
) -> Result<PageOutcome, RepositoryError> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let skip = (page - 1).saturating_mul(page_size);

    let (stores, total_count) = tokio::try_join!(
        repo.list_stores(skip, Some(page_size)),
        repo.count_stores()
    )?;
    let total_pages = total_pages(total_count, page_size);

    if stores.is_empty() && skip > 0 {
        let target = total_pages.max(1);
        debug!(requested = page, target, "Page out of range, redirecting");
        return Ok(PageOutcome::Redirect {
            page: target,
            notice: format!(
                "Hey! You asked for page {page}. But that doesn't exist. So I put you on page {target}"
            ),
        });
    }

    Ok(PageOutcome::Page(StorePage {
        stores,
        total_count,
        total_pages,
        page,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 8), 0);
        assert_eq!(total_pages(1, 8), 1);
        assert_eq!(total_pages(8, 8), 1);
        assert_eq!(total_pages(9, 8), 2);
        assert_eq!(total_pages(24, 8), 3);
    }
}
