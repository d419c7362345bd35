//! The catalog facade.
//!
//! [`Catalog`] owns the repository handle, the text index and the ranking
//! cache, and exposes every catalog operation. Write paths run validation
//! and slug assignment before persisting, then keep the index and cache in
//! step.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::future::Cache;
use tracing::{debug, info, instrument, warn};

use storefinder_core::{FieldError, StoreId, UserId};

use crate::config::CatalogSettings;
use crate::db::{CatalogRepository, RepositoryError};
use crate::error::CatalogError;
use crate::models::{
    AuthoredReview, NewReview, NewStore, NewUser, Review, Store, StoreChanges, StoreDetail,
    StoreSummary, User,
};
use crate::search::{self, SearchIndex};
use crate::services::locator::NearQuery;
use crate::services::pagination::PageOutcome;
use crate::services::ranking::TopStore;
use crate::services::tags::{TagCount, TagListing};
use crate::services::{favorites, identity, locator, pagination, ranking, tags};
use crate::validation::{
    AccountInput, RegisterInput, ReviewInput, StoreInput, validate_account, validate_registration,
    validate_review, validate_store,
};

const OWNERSHIP_MESSAGE: &str = "You must own a store in order to edit it!";
const EMAIL_TAKEN_MESSAGE: &str = "That email is already registered!";

/// Handle to the catalog. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    repo: Arc<dyn CatalogRepository>,
    search: SearchIndex,
    /// Keyed by `(ranking_generation, limit)`. `None` when caching is
    /// disabled.
    top_stores: Option<Cache<(u64, usize), Arc<Vec<TopStore>>>>,
    /// Bumped after every write that can change the ranking. A ranking
    /// computed under an older generation is never read back.
    ranking_generation: AtomicU64,
    settings: CatalogSettings,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("search", &self.inner.search)
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

impl Catalog {
    /// Open a catalog over `repo` and build the text index from its stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be created or loaded.
    #[instrument(skip_all)]
    pub async fn open(
        repo: Arc<dyn CatalogRepository>,
        settings: CatalogSettings,
    ) -> Result<Self, CatalogError> {
        let search = SearchIndex::new()?;
        let indexed = search::rebuild_from_repository(repo.as_ref(), &search).await?;

        let top_stores = settings.top_stores_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(16)
                .time_to_live(ttl)
                .build()
        });

        info!(indexed, "Catalog opened");
        Ok(Self {
            inner: Arc::new(CatalogInner {
                repo,
                search,
                top_stores,
                ranking_generation: AtomicU64::new(0),
                settings,
            }),
        })
    }

    /// The settings the catalog was opened with.
    #[must_use]
    pub fn settings(&self) -> &CatalogSettings {
        &self.inner.settings
    }

    fn repo(&self) -> &dyn CatalogRepository {
        self.inner.repo.as_ref()
    }

    // =========================================================================
    // Stores
    // =========================================================================

    /// Validate and create a store owned by `author`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for bad input and
    /// `CatalogError::NotFound` if the author does not exist.
    #[instrument(skip(self, input), fields(author = %author))]
    pub async fn create_store(
        &self,
        author: UserId,
        input: &StoreInput,
    ) -> Result<Store, CatalogError> {
        let valid = validate_store(input)?;
        self.require_user(author).await?;

        let slug = identity::assign_slug(self.repo(), &valid.base_slug, None).await?;
        let store = self
            .repo()
            .insert_store(NewStore {
                name: valid.name,
                slug,
                description: valid.description,
                tags: valid.tags,
                location: valid.location,
                photo: valid.photo,
                author,
            })
            .await?;

        info!(store = %store.id, slug = %store.slug, "Store created");
        self.index_store(&store);
        self.invalidate_top_stores().await;
        Ok(store)
    }

    /// Replace a store's editable fields. Only the author may do this.
    ///
    /// The slug is re-derived only when the name changes. A missing photo
    /// keeps the current one.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound`, `CatalogError::Forbidden` when
    /// `acting` is not the author, or `CatalogError::Validation`.
    #[instrument(skip(self, input), fields(store = %id, acting = %acting))]
    pub async fn update_store(
        &self,
        id: StoreId,
        acting: UserId,
        input: &StoreInput,
    ) -> Result<Store, CatalogError> {
        let current = self.owned_store(id, acting).await?;
        let valid = validate_store(input)?;

        let slug = if identity::name_changed(&current.name, &valid.name) {
            identity::assign_slug(self.repo(), &valid.base_slug, Some(id)).await?
        } else {
            current.slug
        };

        let store = self
            .repo()
            .update_store(
                id,
                StoreChanges {
                    name: valid.name,
                    slug,
                    description: valid.description,
                    tags: valid.tags,
                    location: valid.location,
                    photo: valid.photo.or(current.photo),
                },
            )
            .await?;

        info!(slug = %store.slug, "Store updated");
        self.index_store(&store);
        self.invalidate_top_stores().await;
        Ok(store)
    }

    /// Fetch a store for its edit form. Only the author may do this.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` or `CatalogError::Forbidden`.
    #[instrument(skip(self), fields(store = %id, acting = %acting))]
    pub async fn get_store_for_edit(
        &self,
        id: StoreId,
        acting: UserId,
    ) -> Result<Store, CatalogError> {
        self.owned_store(id, acting).await
    }

    /// A store with its author and every review (each with its author).
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown slug.
    #[instrument(skip(self))]
    pub async fn store_by_slug(&self, slug: &str) -> Result<StoreDetail, CatalogError> {
        let store = self
            .repo()
            .get_store_by_slug(slug)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("store {slug}")))?;
        let reviews = self.repo().reviews_for_store(store.id).await?;

        let mut user_ids: Vec<UserId> = reviews.iter().map(|r| r.author).collect();
        user_ids.push(store.author);
        let users = self.repo().get_users(&user_ids).await?;
        let find_user = |id: UserId| users.iter().find(|u| u.id == id).cloned();

        let reviews = reviews
            .into_iter()
            .map(|review| AuthoredReview {
                author: find_user(review.author),
                review,
            })
            .collect();

        Ok(StoreDetail {
            author: find_user(store.author),
            store,
            reviews,
        })
    }

    /// Every store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_stores(&self) -> Result<Vec<Store>, CatalogError> {
        Ok(self.repo().list_stores(0, None).await?)
    }

    /// One page of the store listing, or a redirect past the last page.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_page(&self, page: usize) -> Result<PageOutcome, CatalogError> {
        Ok(pagination::list_page(self.repo(), page, self.inner.settings.page_size).await?)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Every tag with its usage count.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_tags(&self) -> Result<Vec<TagCount>, CatalogError> {
        Ok(tags::list_tags(self.repo()).await?)
    }

    /// Tag counts plus the stores carrying `tag` (or any tag).
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_by_tag(&self, tag: Option<&str>) -> Result<TagListing, CatalogError> {
        Ok(tags::list_by_tag(self.repo(), tag).await?)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// The best text matches for `query`, most relevant first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Search` or `CatalogError::Repository`.
    #[instrument(skip(self))]
    pub async fn search_text(&self, query: &str) -> Result<Vec<Store>, CatalogError> {
        let hits = self
            .inner
            .search
            .search(query, self.inner.settings.search_limit)?;
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<StoreId> = hits.iter().map(|h| h.store).collect();
        let mut stores = self.repo().stores_by_ids(&ids).await?;

        let mut ranked = Vec::with_capacity(hits.len());
        for hit in &hits {
            if let Some(pos) = stores.iter().position(|s| s.id == hit.store) {
                ranked.push(stores.swap_remove(pos));
            } else {
                warn!(store = %hit.store, "Search hit has no stored store");
            }
        }
        Ok(ranked)
    }

    /// Rebuild the text index from storage. Returns the indexed count.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` or `CatalogError::Search`.
    #[instrument(skip(self))]
    pub async fn reindex_search(&self) -> Result<usize, CatalogError> {
        search::rebuild_from_repository(self.repo(), &self.inner.search).await
    }

    // =========================================================================
    // Proximity
    // =========================================================================

    /// Stores near a point, nearest first. Bad input gives an empty list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the lookup fails.
    #[instrument(skip(self))]
    pub async fn near(&self, query: &NearQuery) -> Result<Vec<StoreSummary>, CatalogError> {
        let settings = &self.inner.settings;
        Ok(locator::near(
            self.repo(),
            query,
            settings.near_radius_meters,
            settings.near_limit,
        )
        .await?)
    }

    // =========================================================================
    // Reviews & ranking
    // =========================================================================

    /// Validate and add a review by `author` to `store`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for bad input and
    /// `CatalogError::NotFound` if the store or author does not exist.
    #[instrument(skip(self, input), fields(author = %author, store = %store))]
    pub async fn add_review(
        &self,
        author: UserId,
        store: StoreId,
        input: &ReviewInput,
    ) -> Result<Review, CatalogError> {
        let valid = validate_review(input)?;
        self.require_user(author).await?;
        self.require_store(store).await?;

        let review = self
            .repo()
            .insert_review(NewReview {
                store,
                author,
                text: valid.text,
                rating: valid.rating,
            })
            .await?;

        info!(review = %review.id, rating = %review.rating, "Review added");
        self.invalidate_top_stores().await;
        Ok(review)
    }

    /// Stores ranked by mean rating (at least two reviews each).
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the join fails.
    #[instrument(skip(self))]
    pub async fn top_stores(&self) -> Result<Vec<TopStore>, CatalogError> {
        let limit = self.inner.settings.top_stores_limit;

        let Some(cache) = &self.inner.top_stores else {
            return Ok(ranking::top_stores(self.repo(), limit).await?);
        };

        // Read the generation before the repository so a write landing
        // mid-computation files this result under a key nobody reads.
        let key = (self.inner.ranking_generation.load(Ordering::Acquire), limit);
        if let Some(cached) = cache.get(&key).await {
            debug!("Cache hit for top stores");
            return Ok(cached.as_ref().clone());
        }

        let ranked = ranking::top_stores(self.repo(), limit).await?;
        cache.insert(key, Arc::new(ranked.clone())).await;
        Ok(ranked)
    }

    // =========================================================================
    // Users & hearts
    // =========================================================================

    /// Validate and register a user. Credentials are not stored here.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation`, including for a taken email.
    #[instrument(skip_all)]
    pub async fn register_user(&self, input: &RegisterInput) -> Result<User, CatalogError> {
        let profile = validate_registration(input)?;

        let user = self
            .repo()
            .insert_user(NewUser {
                email: profile.email,
                name: profile.name,
            })
            .await
            .map_err(email_conflict)?;

        info!(user = %user.id, "User registered");
        Ok(user)
    }

    /// Change a user's name and email.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` (including for a taken email) or
    /// `CatalogError::NotFound`.
    #[instrument(skip(self, input), fields(user = %user))]
    pub async fn update_account(
        &self,
        user: UserId,
        input: &AccountInput,
    ) -> Result<User, CatalogError> {
        let profile = validate_account(input)?;

        self.repo()
            .update_user(user, profile.name, profile.email)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CatalogError::NotFound(format!("user {user}")),
                other => email_conflict(other),
            })
    }

    /// Add or remove `store` from the user's hearts.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the user or store does not exist.
    #[instrument(skip(self), fields(user = %user, store = %store))]
    pub async fn toggle_heart(&self, user: UserId, store: StoreId) -> Result<User, CatalogError> {
        self.require_store(store).await?;
        favorites::toggle_heart(self.repo(), user, store)
            .await
            .map_err(|e| not_found_as(e, || format!("user {user}")))
    }

    /// The stores the user has hearted.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn list_hearted(&self, user: UserId) -> Result<Vec<Store>, CatalogError> {
        favorites::list_hearted(self.repo(), user)
            .await
            .map_err(|e| not_found_as(e, || format!("user {user}")))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn owned_store(&self, id: StoreId, acting: UserId) -> Result<Store, CatalogError> {
        let store = self.require_store(id).await?;
        if store.author != acting {
            warn!(author = %store.author, "Ownership check failed");
            return Err(CatalogError::Forbidden(OWNERSHIP_MESSAGE.to_owned()));
        }
        Ok(store)
    }

    async fn require_store(&self, id: StoreId) -> Result<Store, CatalogError> {
        self.repo()
            .get_store(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("store {id}")))
    }

    async fn require_user(&self, id: UserId) -> Result<User, CatalogError> {
        self.repo()
            .get_user(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("user {id}")))
    }

    /// Index failures leave the stored write in place; a reindex repairs them.
    fn index_store(&self, store: &Store) {
        if let Err(e) = self.inner.search.upsert(store) {
            warn!(error = %e, store = %store.id, "Failed to index store");
        }
    }

    async fn invalidate_top_stores(&self) {
        self.inner.ranking_generation.fetch_add(1, Ordering::AcqRel);
        if let Some(cache) = &self.inner.top_stores {
            cache.invalidate_all();
            cache.run_pending_tasks().await;
            debug!("Top stores cache invalidated");
        }
    }
}

fn email_conflict(e: RepositoryError) -> CatalogError {
    match e {
        RepositoryError::Conflict(_) => CatalogError::Validation(vec![FieldError::new(
            "email",
            EMAIL_TAKEN_MESSAGE,
        )]),
        other => CatalogError::Repository(other),
    }
}

fn not_found_as(e: RepositoryError, what: impl FnOnce() -> String) -> CatalogError {
    match e {
        RepositoryError::NotFound => CatalogError::NotFound(what()),
        other => CatalogError::Repository(other),
    }
}
