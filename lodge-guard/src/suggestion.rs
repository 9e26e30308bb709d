use std::sync::Arc;

use lodge_booking::VisitGate;
use lodge_core::repository::{BookingRepository, PropertyRepository, SuggestionQuery, SuggestionRepository};
use lodge_core::{AccessPolicy, Action, Actor, CoreResult, Resource, ResourceKind, VisibilityScope};
use lodge_shared::{NewSuggestion, Suggestion, SuggestionPatch};
use tracing::info;
use uuid::Uuid;

use crate::{found, required_text};

/// Suggestions are only accepted from guests who completed a stay at the property.
#[derive(Clone)]
pub struct SuggestionGuard {
    suggestions: Arc<dyn SuggestionRepository>,
    properties: Arc<dyn PropertyRepository>,
    visits: VisitGate,
}

impl SuggestionGuard {
    pub fn new(
        suggestions: Arc<dyn SuggestionRepository>,
        properties: Arc<dyn PropertyRepository>,
        bookings: Arc<dyn BookingRepository>,
    ) -> Self {
        Self {
            suggestions,
            properties,
            visits: VisitGate::new(bookings),
        }
    }

    pub async fn create(&self, actor: &Actor, new: NewSuggestion) -> CoreResult<Suggestion> {
        let content = required_text("content", &new.content)?;
        let property = found(
            self.properties.get_property(new.property_id).await?,
            ResourceKind::Property,
            new.property_id,
        )?;

        self.visits.ensure_visited(actor.id, property.id).await?;
        AccessPolicy::authorize(actor, Action::Create, &Resource::owned_by(ResourceKind::Suggestion, actor.id))?;

        let suggestion = Suggestion::new(actor.id, property.id, content);
        self.suggestions.insert_suggestion(&suggestion).await?;

        info!("Suggestion {} accepted from {} for property {}", suggestion.id, actor.id, property.id);
        Ok(suggestion)
    }

    pub async fn read(&self, id: Uuid, actor: &Actor) -> CoreResult<Suggestion> {
        let suggestion = self.load(id).await?;
        AccessPolicy::authorize(actor, Action::Read, &Resource::suggestion(&suggestion))?;
        Ok(suggestion)
    }

    pub async fn update(&self, id: Uuid, patch: SuggestionPatch, actor: &Actor) -> CoreResult<Suggestion> {
        let mut suggestion = self.load(id).await?;
        AccessPolicy::authorize(actor, Action::Update, &Resource::suggestion(&suggestion))?;

        let content = patch.content.map(|c| required_text("content", &c)).transpose()?;
        suggestion.apply(SuggestionPatch { content });
        self.suggestions.update_suggestion(&suggestion).await?;
        self.read(id, actor).await
    }

    pub async fn delete(&self, id: Uuid, actor: &Actor) -> CoreResult<()> {
        let suggestion = self.load(id).await?;
        AccessPolicy::authorize(actor, Action::Delete, &Resource::suggestion(&suggestion))?;

        self.suggestions.delete_suggestion(id).await?;
        info!("Suggestion {} deleted by {} {}", id, actor.role, actor.id);
        Ok(())
    }

    pub async fn list(&self, actor: &Actor, property_id: Option<Uuid>) -> CoreResult<Vec<Suggestion>> {
        let author_id = match AccessPolicy::scope(actor, ResourceKind::Suggestion) {
            VisibilityScope::All => None,
            VisibilityScope::Author(id) | VisibilityScope::Guest(id) | VisibilityScope::PropertyOwner(id) => Some(id),
        };
        let query = SuggestionQuery { author_id, property_id };
        Ok(self.suggestions.list_suggestions(&query).await?)
    }

    async fn load(&self, id: Uuid) -> CoreResult<Suggestion> {
        found(self.suggestions.get_suggestion(id).await?, ResourceKind::Suggestion, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::World;
    use lodge_core::CoreError;
    use lodge_shared::{BookingStatus, Property};

    fn idea(property_id: Uuid) -> NewSuggestion {
        NewSuggestion {
            property_id,
            content: "A kettle in the room would be great".to_string(),
        }
    }

    async fn completed_stay(w: &World, guest: &Actor, property_id: Uuid) {
        let booking = w.bookings.create(guest, w.stay(property_id)).await.unwrap();
        w.bookings.approve(booking.id, &w.admin).await.unwrap();
        w.bookings.complete(booking.id, &w.admin).await.unwrap();
    }

    #[tokio::test]
    async fn test_approve_complete_then_suggest() {
        let w = World::new().await;
        let booking = w.bookings.create(&w.guest, w.stay(w.property.id)).await.unwrap();

        let approved = w.bookings.approve(booking.id, &w.supplier).await.unwrap();
        assert_eq!(approved.status, BookingStatus::Approved);

        let err = w.bookings.approve(booking.id, &w.other_guest).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        let completed = w.bookings.complete(booking.id, &w.admin).await.unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);

        let suggestion = w.suggestions.create(&w.guest, idea(w.property.id)).await.unwrap();
        assert_eq!(suggestion.author_id, w.guest.id);
        assert_eq!(suggestion.property_id, w.property.id);

        let err = w.suggestions.create(&w.other_guest, idea(w.property.id)).await.unwrap_err();
        assert!(matches!(err, CoreError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn test_gate_needs_a_completed_stay() {
        let w = World::new().await;

        let err = w.suggestions.create(&w.guest, idea(w.property.id)).await.unwrap_err();
        assert!(matches!(err, CoreError::PreconditionFailed(_)));

        // Approval alone is not a visit.
        let booking = w.bookings.create(&w.guest, w.stay(w.property.id)).await.unwrap();
        w.bookings.approve(booking.id, &w.supplier).await.unwrap();
        let err = w.suggestions.create(&w.guest, idea(w.property.id)).await.unwrap_err();
        assert!(matches!(err, CoreError::PreconditionFailed(_)));

        w.bookings.complete(booking.id, &w.admin).await.unwrap();
        assert!(w.suggestions.create(&w.guest, idea(w.property.id)).await.is_ok());
    }

    #[tokio::test]
    async fn test_visit_is_per_property() {
        let w = World::new().await;
        let elsewhere = Property::new(w.supplier.id, "Quinta Verde".to_string(), "Sintra".to_string(), None);
        w.store.insert_property(&elsewhere).await.unwrap();
        completed_stay(&w, &w.guest, w.property.id).await;

        let err = w.suggestions.create(&w.guest, idea(elsewhere.id)).await.unwrap_err();
        assert!(matches!(err, CoreError::PreconditionFailed(_)));

        let err = w.suggestions.create(&w.guest, idea(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_only_author_or_admin_manage_suggestion() {
        let w = World::new().await;
        completed_stay(&w, &w.guest, w.property.id).await;
        completed_stay(&w, &w.other_guest, w.property.id).await;
        let suggestion = w.suggestions.create(&w.guest, idea(w.property.id)).await.unwrap();
        w.suggestions.create(&w.other_guest, idea(w.property.id)).await.unwrap();

        // Owning the property grants nothing over its suggestions.
        let err = w.suggestions.read(suggestion.id, &w.supplier).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
        let err = w.suggestions.delete(suggestion.id, &w.other_guest).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        let patch = SuggestionPatch { content: Some("A kettle and some tea".to_string()) };
        let edited = w.suggestions.update(suggestion.id, patch, &w.guest).await.unwrap();
        assert_eq!(edited.content, "A kettle and some tea");

        assert_eq!(w.suggestions.list(&w.guest, None).await.unwrap().len(), 1);
        assert_eq!(w.suggestions.list(&w.admin, Some(w.property.id)).await.unwrap().len(), 2);
        assert!(w.suggestions.list(&w.supplier, Some(w.property.id)).await.unwrap().is_empty());

        w.suggestions.delete(suggestion.id, &w.guest).await.unwrap();
        assert_eq!(w.suggestions.list(&w.admin, None).await.unwrap().len(), 1);
    }
}
