//! Process-local repository backed by plain collections.
//!
//! Mirrors the constraints of the `PostgreSQL` schema (unique slug, unique
//! email, heart set semantics) so services behave the same against either
//! backend.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use storefinder_core::{Email, GeoPoint, ReviewId, Slug, StoreId, UserId};

use super::{CatalogRepository, RepositoryError, StoreReviews, TagFilter};
use crate::models::{NewReview, NewStore, NewUser, Review, Store, StoreChanges, User};

#[derive(Debug, Default)]
struct State {
    stores: BTreeMap<StoreId, Store>,
    reviews: BTreeMap<ReviewId, Review>,
    users: BTreeMap<UserId, User>,
    next_store: i32,
    next_review: i32,
    next_user: i32,
}

impl State {
    fn slug_taken(&self, slug: &Slug, except: Option<StoreId>) -> bool {
        self.stores
            .values()
            .any(|s| Some(s.id) != except && s.slug == *slug)
    }

    fn email_taken(&self, email: &Email, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email == *email)
    }

    fn newest_first(&self) -> Vec<&Store> {
        let mut stores: Vec<&Store> = self.stores.values().collect();
        stores.sort_by(|a, b| newest_first(a, b));
        stores
    }

    fn reviews_of(&self, store: StoreId) -> Vec<Review> {
        let mut reviews: Vec<Review> = self
            .reviews
            .values()
            .filter(|r| r.store == store)
            .cloned()
            .collect();
        reviews.sort_by(newest_review_first);
        reviews
    }
}

fn newest_review_first(a: &Review, b: &Review) -> Ordering {
    b.created.cmp(&a.created).then(b.id.cmp(&a.id))
}

fn newest_first(a: &Store, b: &Store) -> Ordering {
    b.created.cmp(&a.created).then(b.id.cmp(&a.id))
}

/// In-memory [`CatalogRepository`].
///
/// Ids are assigned sequentially starting at 1. Timestamps come from the
/// system clock; two inserts in the same instant are ordered by id.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn insert_store(&self, store: NewStore) -> Result<Store, RepositoryError> {
        let mut state = self.state.write().await;
        if state.slug_taken(&store.slug, None) {
            return Err(RepositoryError::Conflict(format!(
                "slug already exists: {}",
                store.slug
            )));
        }

        state.next_store += 1;
        let stored = Store {
            id: StoreId::new(state.next_store),
            name: store.name,
            slug: store.slug,
            description: store.description,
            tags: store.tags,
            created: Utc::now(),
            location: store.location,
            photo: store.photo,
            author: store.author,
        };
        state.stores.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_store(
        &self,
        id: StoreId,
        changes: StoreChanges,
    ) -> Result<Store, RepositoryError> {
        let mut state = self.state.write().await;
        if state.slug_taken(&changes.slug, Some(id)) {
            return Err(RepositoryError::Conflict(format!(
                "slug already exists: {}",
                changes.slug
            )));
        }

        let store = state.stores.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        store.name = changes.name;
        store.slug = changes.slug;
        store.description = changes.description;
        store.tags = changes.tags;
        store.location = changes.location;
        store.photo = changes.photo;
        Ok(store.clone())
    }

    async fn get_store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        Ok(self.state.read().await.stores.get(&id).cloned())
    }

    async fn get_store_by_slug(&self, slug: &str) -> Result<Option<Store>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .stores
            .values()
            .find(|s| s.slug.as_str() == slug)
            .cloned())
    }

    async fn count_slug_family(
        &self,
        base: &Slug,
        exclude: Option<StoreId>,
    ) -> Result<usize, RepositoryError> {
        let family = base
            .family_regex()
            .map_err(|e| RepositoryError::DataCorruption(format!("slug pattern: {e}")))?;
        let state = self.state.read().await;
        Ok(state
            .stores
            .values()
            .filter(|s| Some(s.id) != exclude && family.is_match(s.slug.as_str()))
            .count())
    }

    async fn list_stores(
        &self,
        skip: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Store>, RepositoryError> {
        let state = self.state.read().await;
        let page = state.newest_first().into_iter().skip(skip);
        Ok(match limit {
            Some(limit) => page.take(limit).cloned().collect(),
            None => page.cloned().collect(),
        })
    }

    async fn count_stores(&self) -> Result<usize, RepositoryError> {
        Ok(self.state.read().await.stores.len())
    }

    async fn stores_by_tag(&self, filter: TagFilter<'_>) -> Result<Vec<Store>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .newest_first()
            .into_iter()
            .filter(|s| filter.matches(&s.tags))
            .cloned()
            .collect())
    }

    async fn store_tag_lists(&self) -> Result<Vec<Vec<String>>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.stores.values().map(|s| s.tags.clone()).collect())
    }

    async fn stores_near(
        &self,
        point: GeoPoint,
        max_distance_m: f64,
        limit: usize,
    ) -> Result<Vec<Store>, RepositoryError> {
        let state = self.state.read().await;
        let bbox = point.bounding_box(max_distance_m);
        let mut hits: Vec<(f64, &Store)> = state
            .stores
            .values()
            .filter(|s| bbox.contains(&s.location.coordinates))
            .map(|s| (point.distance_meters(&s.location.coordinates), s))
            .filter(|(d, _)| *d < max_distance_m)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.id.cmp(&b.1.id)));
        Ok(hits
            .into_iter()
            .take(limit)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn stores_by_ids(&self, ids: &[StoreId]) -> Result<Vec<Store>, RepositoryError> {
        let state = self.state.read().await;
        let wanted: BTreeSet<StoreId> = ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| state.stores.get(&id).cloned())
            .collect())
    }

    async fn insert_review(&self, review: NewReview) -> Result<Review, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.stores.contains_key(&review.store) {
            return Err(RepositoryError::NotFound);
        }

        state.next_review += 1;
        let stored = Review {
            id: ReviewId::new(state.next_review),
            store: review.store,
            author: review.author,
            text: review.text,
            rating: review.rating,
            created: Utc::now(),
        };
        state.reviews.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn reviews_for_store(&self, store: StoreId) -> Result<Vec<Review>, RepositoryError> {
        Ok(self.state.read().await.reviews_of(store))
    }

    async fn reviewed_stores(
        &self,
        min_reviews: usize,
    ) -> Result<Vec<StoreReviews>, RepositoryError> {
        let state = self.state.read().await;

        let mut by_store: HashMap<StoreId, Vec<Review>> = HashMap::new();
        for review in state.reviews.values() {
            by_store.entry(review.store).or_default().push(review.clone());
        }

        Ok(state
            .newest_first()
            .into_iter()
            .filter_map(|store| {
                let mut reviews = by_store.remove(&store.id).unwrap_or_default();
                if reviews.len() < min_reviews {
                    return None;
                }
                reviews.sort_by(newest_review_first);
                Some(StoreReviews {
                    store: store.clone(),
                    reviews,
                })
            })
            .collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut state = self.state.write().await;
        if state.email_taken(&user.email, None) {
            return Err(RepositoryError::Conflict(format!(
                "email already exists: {}",
                user.email
            )));
        }

        state.next_user += 1;
        let stored = User {
            id: UserId::new(state.next_user),
            email: user.email,
            name: user.name,
            hearts: BTreeSet::new(),
        };
        state.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        let state = self.state.read().await;
        let wanted: BTreeSet<UserId> = ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| state.users.get(&id).cloned())
            .collect())
    }

    async fn update_user(
        &self,
        id: UserId,
        name: String,
        email: Email,
    ) -> Result<User, RepositoryError> {
        let mut state = self.state.write().await;
        if state.email_taken(&email, Some(id)) {
            return Err(RepositoryError::Conflict(format!(
                "email already exists: {email}"
            )));
        }

        let user = state.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.name = name;
        user.email = email;
        Ok(user.clone())
    }

    async fn add_heart(&self, user: UserId, store: StoreId) -> Result<User, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.stores.contains_key(&store) {
            return Err(RepositoryError::NotFound);
        }
        let user = state.users.get_mut(&user).ok_or(RepositoryError::NotFound)?;
        user.hearts.insert(store);
        Ok(user.clone())
    }

    async fn remove_heart(&self, user: UserId, store: StoreId) -> Result<User, RepositoryError> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&user).ok_or(RepositoryError::NotFound)?;
        user.hearts.remove(&store);
        Ok(user.clone())
    }
}
