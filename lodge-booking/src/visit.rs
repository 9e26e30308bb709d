use std::sync::Arc;

use lodge_core::repository::BookingRepository;
use lodge_core::{CoreError, CoreResult};
use lodge_shared::BookingStatus;
use tracing::{debug, warn};
use uuid::Uuid;

/// Derives visit eligibility from booking history.
///
/// Evaluated on every call; booking status changes between calls, so nothing is cached.
#[derive(Clone)]
pub struct VisitGate {
    bookings: Arc<dyn BookingRepository>,
}

impl VisitGate {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    /// True iff the guest has a completed booking at the property.
    pub async fn has_visited(&self, guest_id: Uuid, property_id: Uuid) -> CoreResult<bool> {
        let visited = self
            .bookings
            .exists_booking(guest_id, property_id, BookingStatus::Completed)
            .await?;
        debug!("Visit check guest={} property={} -> {}", guest_id, property_id, visited);
        Ok(visited)
    }

    pub async fn ensure_visited(&self, guest_id: Uuid, property_id: Uuid) -> CoreResult<()> {
        if self.has_visited(guest_id, property_id).await? {
            return Ok(());
        }
        warn!("Guest {} has no completed stay at property {}", guest_id, property_id);
        Err(CoreError::PreconditionFailed(format!(
            "suggestions require a completed stay at property {}",
            property_id
        )))
    }
}
