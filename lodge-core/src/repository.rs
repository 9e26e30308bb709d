use async_trait::async_trait;
use lodge_shared::{Booking, BookingStatus, Comment, Page, Property, PropertyFilter, Suggestion};
use uuid::Uuid;

use crate::identity::Actor;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A referenced record does not exist.
    #[error("{0}")]
    NotFound(String),
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Booking selection. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingQuery {
    pub guest_id: Option<Uuid>,
    pub property_ids: Option<Vec<Uuid>>,
    pub status: Option<BookingStatus>,
}

impl BookingQuery {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.guest_id.map_or(true, |id| booking.guest_id == id)
            && self
                .property_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&booking.property_id))
            && self.status.map_or(true, |status| booking.status == status)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionQuery {
    pub author_id: Option<Uuid>,
    pub property_id: Option<Uuid>,
}

impl SuggestionQuery {
    pub fn matches(&self, suggestion: &Suggestion) -> bool {
        self.author_id.map_or(true, |id| suggestion.author_id == id)
            && self.property_id.map_or(true, |id| suggestion.property_id == id)
    }
}

/// Lookup of registered accounts
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Actor>>;
}

/// Repository trait for the property catalog
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn insert_property(&self, property: &Property) -> StoreResult<()>;

    async fn get_property(&self, id: Uuid) -> StoreResult<Option<Property>>;

    async fn update_property(&self, property: &Property) -> StoreResult<()>;

    async fn delete_property(&self, id: Uuid) -> StoreResult<()>;

    async fn list_properties(&self, filter: &PropertyFilter) -> StoreResult<Page<Property>>;

    async fn list_properties_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Property>>;
}

/// Repository trait for booking data access
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Fails with `StoreError::NotFound` when the referenced property is missing.
    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()>;

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>>;

    async fn update_booking(&self, booking: &Booking) -> StoreResult<()>;

    async fn delete_booking(&self, id: Uuid) -> StoreResult<()>;

    async fn list_bookings(&self, query: &BookingQuery) -> StoreResult<Vec<Booking>>;

    async fn exists_booking(
        &self,
        guest_id: Uuid,
        property_id: Uuid,
        status: BookingStatus,
    ) -> StoreResult<bool>;
}

/// Repository trait for comments, listed newest first
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()>;

    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<Comment>>;

    async fn update_comment(&self, comment: &Comment) -> StoreResult<()>;

    async fn delete_comment(&self, id: Uuid) -> StoreResult<()>;

    async fn list_comments(&self, author_id: Option<Uuid>) -> StoreResult<Vec<Comment>>;
}

/// Repository trait for suggestions, listed newest first
#[async_trait]
pub trait SuggestionRepository: Send + Sync {
    async fn insert_suggestion(&self, suggestion: &Suggestion) -> StoreResult<()>;

    async fn get_suggestion(&self, id: Uuid) -> StoreResult<Option<Suggestion>>;

    async fn update_suggestion(&self, suggestion: &Suggestion) -> StoreResult<()>;

    async fn delete_suggestion(&self, id: Uuid) -> StoreResult<()>;

    async fn list_suggestions(&self, query: &SuggestionQuery) -> StoreResult<Vec<Suggestion>>;
}
