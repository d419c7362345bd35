//! Domain models for the catalog.
//!
//! These types represent validated domain objects separate from database
//! row types. They serialise to the JSON shapes returned by the API
//! operations (`searchText`, `near`, `toggleHeart`, `topStores`).

pub mod review;
pub mod store;
pub mod user;

pub use review::{AuthoredReview, NewReview, Review};
pub use store::{NewStore, Store, StoreChanges, StoreDetail, StoreSummary};
pub use user::{NewUser, User};
