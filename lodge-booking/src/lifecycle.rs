use lodge_core::{AccessPolicy, Action, Actor, CoreError, CoreResult, Resource, Role};
use lodge_shared::{Booking, BookingStatus};
use tracing::info;

/// Booking status state machine.
///
/// ```text
/// PENDING ──approve──▶ APPROVED ──complete──▶ COMPLETED
///    │
///    └────reject────▶ REJECTED
/// ```
///
/// REJECTED and COMPLETED are terminal.
pub struct BookingLifecycle;

impl BookingLifecycle {
    /// Whether `from → to` is an edge of the state machine.
    pub fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
        matches!(
            (from, to),
            (BookingStatus::Pending, BookingStatus::Approved)
                | (BookingStatus::Pending, BookingStatus::Rejected)
                | (BookingStatus::Approved, BookingStatus::Completed)
        )
    }

    /// Policy action an actor must hold to move a booking into `to`.
    pub fn required_action(to: BookingStatus) -> Action {
        match to {
            BookingStatus::Approved => Action::Approve,
            BookingStatus::Rejected => Action::Reject,
            BookingStatus::Completed => Action::Complete,
            BookingStatus::Pending => Action::Update,
        }
    }

    /// Authorize and apply `booking.status → to`.
    ///
    /// `resource` carries the booking's resolved ownership chain. The booking is left
    /// untouched on any error.
    pub fn transition(
        actor: &Actor,
        booking: &mut Booking,
        resource: &Resource,
        to: BookingStatus,
    ) -> CoreResult<()> {
        AccessPolicy::authorize(actor, Self::required_action(to), resource)?;

        let from = booking.status;
        if !Self::can_transition(from, to) {
            return Err(CoreError::InvalidTransition { from, to });
        }

        booking.update_status(to);
        info!("Booking {} moved {} -> {} by {} {}", booking.id, from, to, actor.role, actor.id);
        Ok(())
    }

    /// Gate for a status carried by a generic update request.
    ///
    /// Guests never set status, and completion is only reachable through its own operation.
    pub fn check_requested_status(
        actor: &Actor,
        booking: &Booking,
        requested: BookingStatus,
    ) -> CoreResult<()> {
        if actor.role == Role::Guest || requested == BookingStatus::Completed {
            return Err(CoreError::InvalidTransition {
                from: booking.status,
                to: requested,
            });
        }
        Ok(())
    }
}
