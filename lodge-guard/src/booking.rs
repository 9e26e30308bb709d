use std::sync::Arc;

use chrono::NaiveDate;
use lodge_booking::BookingLifecycle;
use lodge_core::repository::{AccountRepository, BookingQuery, BookingRepository, PropertyRepository};
use lodge_core::{
    AccessPolicy, Action, Actor, CoreError, CoreResult, Resource, ResourceKind, Role, VisibilityScope,
};
use lodge_shared::{Booking, BookingPatch, BookingStatus, NewBooking, Property};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::found;

fn validate_stay(check_in: NaiveDate, check_out: NaiveDate) -> CoreResult<()> {
    if check_out <= check_in {
        return Err(CoreError::ValidationError(format!(
            "check_out ({}) must be after check_in ({})",
            check_out, check_in
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct BookingGuard {
    accounts: Arc<dyn AccountRepository>,
    properties: Arc<dyn PropertyRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl BookingGuard {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        properties: Arc<dyn PropertyRepository>,
        bookings: Arc<dyn BookingRepository>,
    ) -> Self {
        Self { accounts, properties, bookings }
    }

    pub async fn create(&self, actor: &Actor, new: NewBooking) -> CoreResult<Booking> {
        validate_stay(new.check_in, new.check_out)?;

        let guest_id = new.guest_id.unwrap_or(actor.id);
        AccessPolicy::authorize(actor, Action::Create, &Resource::owned_by(ResourceKind::Booking, guest_id))?;

        let property = found(
            self.properties.get_property(new.property_id).await?,
            ResourceKind::Property,
            new.property_id,
        )?;
        if !property.is_active {
            return Err(CoreError::ValidationError(format!(
                "property {} is not accepting bookings",
                property.id
            )));
        }

        let guest = self
            .accounts
            .find_account(guest_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("account {}", guest_id)))?;
        if guest.role != Role::Guest {
            return Err(CoreError::ValidationError(format!("account {} is not a guest", guest_id)));
        }

        let booking = Booking::new(guest_id, property.id, new.check_in, new.check_out);
        self.bookings.insert_booking(&booking).await?;

        info!(
            "Booking {} created for guest {} at property {} ({} nights)",
            booking.id,
            guest_id,
            property.id,
            booking.nights()
        );
        Ok(booking)
    }

    pub async fn read(&self, id: Uuid, actor: &Actor) -> CoreResult<Booking> {
        let (booking, property) = self.resolve(id).await?;
        AccessPolicy::authorize(actor, Action::Read, &Resource::booking(&booking, &property))?;
        Ok(booking)
    }

    /// Applies date changes and, for suppliers and admins, a status change routed through
    /// [`BookingLifecycle`].
    pub async fn update(&self, id: Uuid, patch: BookingPatch, actor: &Actor) -> CoreResult<Booking> {
        let (mut booking, property) = self.resolve(id).await?;
        let resource = Resource::booking(&booking, &property);
        AccessPolicy::authorize(actor, Action::Update, &resource)?;

        if let Some(status) = patch.status {
            BookingLifecycle::check_requested_status(actor, &booking, status)?;
        }

        if patch.touches_dates() {
            if booking.status.is_terminal() {
                return Err(CoreError::ValidationError(format!(
                    "booking {} is {} and can no longer be rescheduled",
                    booking.id, booking.status
                )));
            }
            let check_in = patch.check_in.unwrap_or(booking.check_in);
            let check_out = patch.check_out.unwrap_or(booking.check_out);
            validate_stay(check_in, check_out)?;
            booking.reschedule(check_in, check_out);
        }

        if let Some(status) = patch.status {
            BookingLifecycle::transition(actor, &mut booking, &resource, status)?;
        }

        self.bookings.update_booking(&booking).await?;
        self.read(id, actor).await
    }

    pub async fn delete(&self, id: Uuid, actor: &Actor) -> CoreResult<()> {
        let (booking, property) = self.resolve(id).await?;
        AccessPolicy::authorize(actor, Action::Delete, &Resource::booking(&booking, &property))?;

        self.bookings.delete_booking(id).await?;
        info!("Booking {} deleted by {} {}", id, actor.role, actor.id);
        Ok(())
    }

    pub async fn approve(&self, id: Uuid, actor: &Actor) -> CoreResult<Booking> {
        self.move_to(id, actor, BookingStatus::Approved).await
    }

    pub async fn reject(&self, id: Uuid, actor: &Actor) -> CoreResult<Booking> {
        self.move_to(id, actor, BookingStatus::Rejected).await
    }

    /// Marks the stay as finished. Only administrators hold the `complete` action.
    pub async fn complete(&self, id: Uuid, actor: &Actor) -> CoreResult<Booking> {
        self.move_to(id, actor, BookingStatus::Completed).await
    }

    pub async fn list(&self, actor: &Actor) -> CoreResult<Vec<Booking>> {
        let query = match AccessPolicy::scope(actor, ResourceKind::Booking) {
            VisibilityScope::All => BookingQuery::default(),
            VisibilityScope::Guest(guest_id) => BookingQuery {
                guest_id: Some(guest_id),
                ..Default::default()
            },
            VisibilityScope::PropertyOwner(owner_id) => {
                let owned = self.properties.list_properties_by_owner(owner_id).await?;
                if owned.is_empty() {
                    return Ok(Vec::new());
                }
                BookingQuery {
                    property_ids: Some(owned.into_iter().map(|p| p.id).collect()),
                    ..Default::default()
                }
            }
            VisibilityScope::Author(_) => return Ok(Vec::new()),
        };

        let bookings = self.bookings.list_bookings(&query).await?;
        debug!("Listed {} bookings for {} {}", bookings.len(), actor.role, actor.id);
        Ok(bookings)
    }

    /// Pending requests for one property. Guests see their own requests; suppliers must own the
    /// property.
    pub async fn pending_for_property(&self, property_id: Uuid, actor: &Actor) -> CoreResult<Vec<Booking>> {
        let property = found(
            self.properties.get_property(property_id).await?,
            ResourceKind::Property,
            property_id,
        )?;

        let mut query = BookingQuery {
            property_ids: Some(vec![property.id]),
            status: Some(BookingStatus::Pending),
            ..Default::default()
        };
        match AccessPolicy::scope(actor, ResourceKind::Booking) {
            VisibilityScope::All => {}
            VisibilityScope::Guest(guest_id) => query.guest_id = Some(guest_id),
            VisibilityScope::PropertyOwner(owner_id) if owner_id == property.owner_id => {}
            VisibilityScope::PropertyOwner(_) | VisibilityScope::Author(_) => {
                warn!(
                    actor_id = %actor.id,
                    property_id = %property.id,
                    "Pending bookings denied to non-owner"
                );
                return Err(CoreError::Forbidden(format!(
                    "{} may not review bookings of property {}",
                    actor.role, property.id
                )));
            }
        }

        Ok(self.bookings.list_bookings(&query).await?)
    }

    async fn move_to(&self, id: Uuid, actor: &Actor, to: BookingStatus) -> CoreResult<Booking> {
        let (mut booking, property) = self.resolve(id).await?;
        let resource = Resource::booking(&booking, &property);

        BookingLifecycle::transition(actor, &mut booking, &resource, to)?;
        self.bookings.update_booking(&booking).await?;
        Ok(booking)
    }

    /// Loads a booking together with the property that carries its chain owner.
    async fn resolve(&self, id: Uuid) -> CoreResult<(Booking, Property)> {
        let booking = found(self.bookings.get_booking(id).await?, ResourceKind::Booking, id)?;
        let property = self
            .properties
            .get_property(booking.property_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!(
                    "property {} of booking {}",
                    booking.property_id, booking.id
                ))
            })?;
        Ok((booking, property))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::World;
    use lodge_store::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    #[tokio::test]
    async fn test_guest_creates_pending_booking() {
        let w = World::new().await;

        let booking = w.bookings.create(&w.guest, w.stay(w.property.id)).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.guest_id, w.guest.id);
        assert_eq!(booking.nights(), 3);
    }

    #[tokio::test]
    async fn test_create_validates_references_and_dates() {
        let w = World::new().await;

        let mut new = w.stay(w.property.id);
        new.check_out = new.check_in;
        let err = w.bookings.create(&w.guest, new).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));

        let err = w.bookings.create(&w.guest, w.stay(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));

        // Guests book for themselves only.
        let mut new = w.stay(w.property.id);
        new.guest_id = Some(w.other_guest.id);
        let err = w.bookings.create(&w.guest, new).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        // Admins may book on behalf of a registered guest, but not of a supplier.
        let mut new = w.stay(w.property.id);
        new.guest_id = Some(w.other_guest.id);
        let booking = w.bookings.create(&w.admin, new).await.unwrap();
        assert_eq!(booking.guest_id, w.other_guest.id);

        let mut new = w.stay(w.property.id);
        new.guest_id = Some(w.supplier.id);
        let err = w.bookings.create(&w.admin, new).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));

        // The booked-for account has to exist.
        let mut new = w.stay(w.property.id);
        new.guest_id = Some(Uuid::new_v4());
        let err = w.bookings.create(&w.admin, new).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));

        let unregistered = Actor::guest(Uuid::new_v4());
        let err = w.bookings.create(&unregistered, w.stay(w.property.id)).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert_eq!(w.store.list_bookings(&BookingQuery::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_inactive_property_refuses_bookings() {
        let w = World::new().await;
        let patch = lodge_shared::PropertyPatch { is_active: Some(false), ..Default::default() };
        w.properties.update(w.property.id, patch, &w.supplier).await.unwrap();

        let err = w.bookings.create(&w.guest, w.stay(w.property.id)).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_guest_owns_their_booking_only() {
        let w = World::new().await;
        let booking = w.bookings.create(&w.guest, w.stay(w.property.id)).await.unwrap();

        assert_eq!(w.bookings.read(booking.id, &w.guest).await.unwrap().id, booking.id);
        let moved = BookingPatch { check_out: Some(day(6)), ..Default::default() };
        let updated = w.bookings.update(booking.id, moved.clone(), &w.guest).await.unwrap();
        assert_eq!(updated.check_out, day(6));

        let err = w.bookings.read(booking.id, &w.other_guest).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
        let err = w.bookings.update(booking.id, moved, &w.other_guest).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
        let err = w.bookings.delete(booking.id, &w.other_guest).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        w.bookings.delete(booking.id, &w.guest).await.unwrap();
        let err = w.bookings.read(booking.id, &w.guest).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_owning_supplier_decides_others_cannot() {
        let w = World::new().await;
        let other_supplier = Actor::supplier(Uuid::new_v4());
        let first = w.bookings.create(&w.guest, w.stay(w.property.id)).await.unwrap();
        let second = w.bookings.create(&w.other_guest, w.stay(w.property.id)).await.unwrap();

        let err = w.bookings.approve(first.id, &other_supplier).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
        let err = w.bookings.reject(first.id, &w.guest).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        let approved = w.bookings.approve(first.id, &w.supplier).await.unwrap();
        assert_eq!(approved.status, BookingStatus::Approved);

        let patch = BookingPatch { status: Some(BookingStatus::Rejected), ..Default::default() };
        let rejected = w.bookings.update(second.id, patch, &w.supplier).await.unwrap();
        assert_eq!(rejected.status, BookingStatus::Rejected);

        // Rejected is terminal.
        let err = w.bookings.approve(second.id, &w.supplier).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition { from: BookingStatus::Rejected, to: BookingStatus::Approved }
        ));
    }

    #[tokio::test]
    async fn test_guest_status_patch_is_rejected() {
        let w = World::new().await;
        let booking = w.bookings.create(&w.guest, w.stay(w.property.id)).await.unwrap();

        let patch = BookingPatch {
            check_out: Some(day(8)),
            status: Some(BookingStatus::Approved),
            ..Default::default()
        };
        let err = w.bookings.update(booking.id, patch, &w.guest).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));

        // Nothing from the rejected patch was persisted.
        let stored = w.bookings.read(booking.id, &w.guest).await.unwrap();
        assert_eq!(stored.status, BookingStatus::Pending);
        assert_eq!(stored.check_out, day(4));
    }

    #[tokio::test]
    async fn test_completion_is_admin_only_and_needs_approval() {
        let w = World::new().await;
        let booking = w.bookings.create(&w.guest, w.stay(w.property.id)).await.unwrap();

        let err = w.bookings.complete(booking.id, &w.admin).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));

        w.bookings.approve(booking.id, &w.supplier).await.unwrap();
        let err = w.bookings.complete(booking.id, &w.supplier).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
        let err = w.bookings.complete(booking.id, &w.guest).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        let patch = BookingPatch { status: Some(BookingStatus::Completed), ..Default::default() };
        let err = w.bookings.update(booking.id, patch, &w.admin).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));

        let completed = w.bookings.complete(booking.id, &w.admin).await.unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);

        let moved = BookingPatch { check_in: Some(day(2)), ..Default::default() };
        let err = w.bookings.update(booking.id, moved, &w.guest).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_missing_property_surfaces_as_not_found() {
        let w = World::new().await;
        let orphan = Booking::new(w.guest.id, w.property.id, day(1), day(3));
        w.store.insert_booking(&orphan).await.unwrap();

        // Resolve the chain against a catalog that no longer knows the property.
        let empty_catalog = Arc::new(MemoryStore::new());
        let guard = BookingGuard::new(w.store.clone(), empty_catalog, w.store.clone());

        for actor in [w.admin, w.guest] {
            let err = guard.read(orphan.id, &actor).await.unwrap_err();
            assert!(matches!(err, CoreError::NotFound(_)));
        }
        let err = guard.approve(orphan.id, &w.supplier).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_lists_are_scoped() {
        let w = World::new().await;
        let other_supplier = Actor::supplier(Uuid::new_v4());
        let mine = w.bookings.create(&w.guest, w.stay(w.property.id)).await.unwrap();
        let theirs = w.bookings.create(&w.other_guest, w.stay(w.property.id)).await.unwrap();

        let listed = w.bookings.list(&w.guest).await.unwrap();
        assert_eq!(listed.iter().map(|b| b.id).collect::<Vec<_>>(), vec![mine.id]);

        assert_eq!(w.bookings.list(&w.supplier).await.unwrap().len(), 2);
        assert_eq!(w.bookings.list(&w.admin).await.unwrap().len(), 2);
        assert!(w.bookings.list(&other_supplier).await.unwrap().is_empty());

        w.bookings.approve(theirs.id, &w.supplier).await.unwrap();
        let pending = w.bookings.pending_for_property(w.property.id, &w.supplier).await.unwrap();
        assert_eq!(pending.iter().map(|b| b.id).collect::<Vec<_>>(), vec![mine.id]);
        let err = w.bookings.pending_for_property(w.property.id, &other_supplier).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
        assert!(w.bookings.pending_for_property(w.property.id, &w.other_guest).await.unwrap().is_empty());

        let err = w.bookings.pending_for_property(Uuid::new_v4(), &w.admin).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
