use std::collections::HashMap;

use async_trait::async_trait;
use lodge_core::repository::{
    AccountRepository, BookingQuery, BookingRepository, CommentRepository, PropertyRepository,
    SuggestionQuery, SuggestionRepository,
};
use lodge_core::{Actor, StoreError, StoreResult};
use lodge_shared::{Booking, BookingStatus, Comment, Page, Pagination, Property, PropertyFilter, Suggestion};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory backing store (development and tests)
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<Uuid, Actor>>,
    properties: RwLock<HashMap<Uuid, Property>>,
    bookings: RwLock<HashMap<Uuid, Booking>>,
    comments: RwLock<HashMap<Uuid, Comment>>,
    suggestions: RwLock<HashMap<Uuid, Suggestion>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account so comments and suggestions can reference it as author.
    pub async fn register_account(&self, actor: Actor) {
        self.accounts.write().await.insert(actor.id, actor);
    }
}

fn missing(kind: &str, id: Uuid) -> StoreError {
    StoreError::NotFound(format!("{} {}", kind, id))
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<chrono::Utc>, Uuid)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Actor>> {
        Ok(self.accounts.read().await.get(&id).copied())
    }
}

#[async_trait]
impl PropertyRepository for MemoryStore {
    async fn insert_property(&self, property: &Property) -> StoreResult<()> {
        self.properties.write().await.insert(property.id, property.clone());
        Ok(())
    }

    async fn get_property(&self, id: Uuid) -> StoreResult<Option<Property>> {
        Ok(self.properties.read().await.get(&id).cloned())
    }

    async fn update_property(&self, property: &Property) -> StoreResult<()> {
        let mut properties = self.properties.write().await;
        let slot = properties
            .get_mut(&property.id)
            .ok_or_else(|| missing("property", property.id))?;
        *slot = property.clone();
        Ok(())
    }

    async fn delete_property(&self, id: Uuid) -> StoreResult<()> {
        self.properties
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing("property", id))?;
        // Mirrors the ON DELETE CASCADE of the relational schema.
        self.bookings.write().await.retain(|_, b| b.property_id != id);
        self.suggestions.write().await.retain(|_, s| s.property_id != id);
        Ok(())
    }

    async fn list_properties(&self, filter: &PropertyFilter) -> StoreResult<Page<Property>> {
        let properties = self.properties.read().await;
        let mut matching: Vec<Property> = properties
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| filter.compare(a, b).then_with(|| a.id.cmp(&b.id)));

        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .collect();

        Ok(Page {
            data,
            pagination: Pagination::new(filter.page(), filter.limit(), total),
        })
    }

    async fn list_properties_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Property>> {
        Ok(self
            .properties
            .read()
            .await
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        if !self.properties.read().await.contains_key(&booking.property_id) {
            return Err(missing("property", booking.property_id));
        }
        self.bookings.write().await.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn update_booking(&self, booking: &Booking) -> StoreResult<()> {
        let mut bookings = self.bookings.write().await;
        let slot = bookings
            .get_mut(&booking.id)
            .ok_or_else(|| missing("booking", booking.id))?;
        *slot = booking.clone();
        Ok(())
    }

    async fn delete_booking(&self, id: Uuid) -> StoreResult<()> {
        self.bookings
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing("booking", id))
    }

    async fn list_bookings(&self, query: &BookingQuery) -> StoreResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| query.matches(b))
            .cloned()
            .collect();
        newest_first(&mut bookings, |b| (b.created_at, b.id));
        Ok(bookings)
    }

    async fn exists_booking(
        &self,
        guest_id: Uuid,
        property_id: Uuid,
        status: BookingStatus,
    ) -> StoreResult<bool> {
        Ok(self.bookings.read().await.values().any(|b| {
            b.guest_id == guest_id && b.property_id == property_id && b.status == status
        }))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        if !self.accounts.read().await.contains_key(&comment.author_id) {
            return Err(missing("account", comment.author_id));
        }
        self.comments.write().await.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(self.comments.read().await.get(&id).cloned())
    }

    async fn update_comment(&self, comment: &Comment) -> StoreResult<()> {
        let mut comments = self.comments.write().await;
        let slot = comments
            .get_mut(&comment.id)
            .ok_or_else(|| missing("comment", comment.id))?;
        *slot = comment.clone();
        Ok(())
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<()> {
        self.comments
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing("comment", id))
    }

    async fn list_comments(&self, author_id: Option<Uuid>) -> StoreResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .read()
            .await
            .values()
            .filter(|c| author_id.map_or(true, |id| c.author_id == id))
            .cloned()
            .collect();
        newest_first(&mut comments, |c| (c.created_at, c.id));
        Ok(comments)
    }
}

#[async_trait]
impl SuggestionRepository for MemoryStore {
    async fn insert_suggestion(&self, suggestion: &Suggestion) -> StoreResult<()> {
        if !self.accounts.read().await.contains_key(&suggestion.author_id) {
            return Err(missing("account", suggestion.author_id));
        }
        if !self.properties.read().await.contains_key(&suggestion.property_id) {
            return Err(missing("property", suggestion.property_id));
        }
        self.suggestions.write().await.insert(suggestion.id, suggestion.clone());
        Ok(())
    }

    async fn get_suggestion(&self, id: Uuid) -> StoreResult<Option<Suggestion>> {
        Ok(self.suggestions.read().await.get(&id).cloned())
    }

    async fn update_suggestion(&self, suggestion: &Suggestion) -> StoreResult<()> {
        let mut suggestions = self.suggestions.write().await;
        let slot = suggestions
            .get_mut(&suggestion.id)
            .ok_or_else(|| missing("suggestion", suggestion.id))?;
        *slot = suggestion.clone();
        Ok(())
    }

    async fn delete_suggestion(&self, id: Uuid) -> StoreResult<()> {
        self.suggestions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing("suggestion", id))
    }

    async fn list_suggestions(&self, query: &SuggestionQuery) -> StoreResult<Vec<Suggestion>> {
        let mut suggestions: Vec<Suggestion> = self
            .suggestions
            .read()
            .await
            .values()
            .filter(|s| query.matches(s))
            .cloned()
            .collect();
        newest_first(&mut suggestions, |s| (s.created_at, s.id));
        Ok(suggestions)
    }
}
