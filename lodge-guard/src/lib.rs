//! Resource guards.
//!
//! Each guard loads the target entity, resolves its ownership (for bookings, through the
//! owning property), asks [`AccessPolicy`](lodge_core::AccessPolicy) for a verdict and only
//! then touches storage.

pub mod property;
pub mod booking;
pub mod comment;
pub mod suggestion;

pub use booking::BookingGuard;
pub use comment::CommentGuard;
pub use property::PropertyGuard;
pub use suggestion::SuggestionGuard;

use lodge_core::{CoreError, CoreResult, ResourceKind};
use uuid::Uuid;

pub(crate) fn found<T>(entity: Option<T>, kind: ResourceKind, id: Uuid) -> CoreResult<T> {
    entity.ok_or_else(|| CoreError::NotFound(format!("{} {}", kind, id)))
}

/// Trimmed, non-empty text.
pub(crate) fn required_text(field: &str, value: &str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::ValidationError(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use lodge_core::repository::PropertyRepository;
    use lodge_core::Actor;
    use lodge_shared::{NewBooking, Property};
    use lodge_store::{MemoryStore, Repositories};
    use uuid::Uuid;

    use crate::{BookingGuard, CommentGuard, PropertyGuard, SuggestionGuard};

    pub struct World {
        pub store: Arc<MemoryStore>,
        pub properties: PropertyGuard,
        pub bookings: BookingGuard,
        pub comments: CommentGuard,
        pub suggestions: SuggestionGuard,
        pub admin: Actor,
        pub supplier: Actor,
        pub guest: Actor,
        pub other_guest: Actor,
        pub property: Property,
    }

    impl World {
        pub async fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let repos = Repositories::in_memory(store.clone());

            let admin = Actor::admin(Uuid::new_v4());
            let supplier = Actor::supplier(Uuid::new_v4());
            let guest = Actor::guest(Uuid::new_v4());
            let other_guest = Actor::guest(Uuid::new_v4());
            for actor in [admin, supplier, guest, other_guest] {
                store.register_account(actor).await;
            }

            let property = Property::new(supplier.id, "Casa Azul".to_string(), "Lisbon".to_string(), None);
            store.insert_property(&property).await.unwrap();

            Self {
                properties: PropertyGuard::new(repos.properties.clone(), repos.bookings.clone(), repos.accounts.clone()),
                bookings: BookingGuard::new(repos.accounts.clone(), repos.properties.clone(), repos.bookings.clone()),
                comments: CommentGuard::new(repos.comments.clone()),
                suggestions: SuggestionGuard::new(repos.suggestions.clone(), repos.properties.clone(), repos.bookings.clone()),
                store,
                admin,
                supplier,
                guest,
                other_guest,
                property,
            }
        }

        pub fn stay(&self, property_id: Uuid) -> NewBooking {
            NewBooking {
                property_id,
                guest_id: None,
                check_in: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                check_out: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            }
        }
    }
}
