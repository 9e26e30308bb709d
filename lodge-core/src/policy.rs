//! Access policy.
//!
//! [`AccessPolicy::decide`] is a pure function of the actor, the requested action and the
//! ownership facts of the target. Callers resolve ownership (including the booking →
//! property → owner hop) before asking; the policy never touches storage.
//!
//! Rules, first match wins:
//!
//! | # | condition                                             | verdict                                  |
//! |---|-------------------------------------------------------|------------------------------------------|
//! | 1 | actor is admin                                        | allow everything                         |
//! | 2 | read of a collection                                  | allow, results filtered by [`VisibilityScope`] |
//! | 2b| read of a single property                             | allow (the catalog is public)            |
//! | 3 | actor is the direct owner                             | allow read/create/update/delete          |
//! | 4 | supplier owns the property a booking points at        | allow read/update/approve/reject         |
//! | 5 | anything else                                         | deny                                     |

use std::fmt;

use lodge_shared::{Booking, Comment, Property, Suggestion};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{Actor, Role};
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Approve,
    Reject,
    /// Marking a stay as finished. Only rule 1 grants it.
    Complete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Approve => "approve",
            Action::Reject => "reject",
            Action::Complete => "complete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Property,
    Booking,
    Comment,
    Suggestion,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Property => "property",
            ResourceKind::Booking => "booking",
            ResourceKind::Comment => "comment",
            ResourceKind::Suggestion => "suggestion",
        }
    }

    /// Roles allowed to create a record of this kind for themselves.
    fn creatable_by(&self, role: Role) -> bool {
        match self {
            ResourceKind::Property => role == Role::Supplier,
            ResourceKind::Booking | ResourceKind::Comment | ResourceKind::Suggestion => true,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership facts of a target, resolved by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// No single target: a list read.
    Collection,
    Direct { owner_id: Uuid },
    /// Owned directly by `owner_id` and transitively by `chain_owner_id`.
    Chained { owner_id: Uuid, chain_owner_id: Uuid },
}

impl Ownership {
    pub fn direct_owner(&self) -> Option<Uuid> {
        match self {
            Ownership::Collection => None,
            Ownership::Direct { owner_id } | Ownership::Chained { owner_id, .. } => Some(*owner_id),
        }
    }

    pub fn chain_owner(&self) -> Option<Uuid> {
        match self {
            Ownership::Chained { chain_owner_id, .. } => Some(*chain_owner_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub ownership: Ownership,
}

impl Resource {
    pub fn collection(kind: ResourceKind) -> Self {
        Self { kind, ownership: Ownership::Collection }
    }

    /// A record about to be created on behalf of `owner_id`.
    pub fn owned_by(kind: ResourceKind, owner_id: Uuid) -> Self {
        Self { kind, ownership: Ownership::Direct { owner_id } }
    }

    pub fn property(property: &Property) -> Self {
        Self::owned_by(ResourceKind::Property, property.owner_id)
    }

    /// `property` must be the one `booking.property_id` references.
    pub fn booking(booking: &Booking, property: &Property) -> Self {
        debug_assert_eq!(booking.property_id, property.id);
        Self {
            kind: ResourceKind::Booking,
            ownership: Ownership::Chained {
                owner_id: booking.guest_id,
                chain_owner_id: property.owner_id,
            },
        }
    }

    pub fn comment(comment: &Comment) -> Self {
        Self::owned_by(ResourceKind::Comment, comment.author_id)
    }

    pub fn suggestion(suggestion: &Suggestion) -> Self {
        Self::owned_by(ResourceKind::Suggestion, suggestion.author_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny,
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        *self == Verdict::Allow
    }
}

/// Which records a list read may return to an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    All,
    /// Bookings made by this guest.
    Guest(Uuid),
    /// Bookings against properties this supplier owns.
    PropertyOwner(Uuid),
    /// Comments or suggestions written by this actor.
    Author(Uuid),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn decide(actor: &Actor, action: Action, resource: &Resource) -> Verdict {
        match actor.role {
            Role::Admin => Verdict::Allow,
            Role::Guest | Role::Supplier => Self::decide_non_admin(actor, action, resource),
        }
    }

    fn decide_non_admin(actor: &Actor, action: Action, resource: &Resource) -> Verdict {
        if action == Action::Read {
            if resource.ownership == Ownership::Collection {
                return Verdict::Allow;
            }
            if resource.kind == ResourceKind::Property {
                return Verdict::Allow;
            }
        }

        if resource.ownership.direct_owner() == Some(actor.id) {
            let allowed = match action {
                Action::Create => resource.kind.creatable_by(actor.role),
                Action::Read | Action::Update | Action::Delete => true,
                Action::Approve | Action::Reject | Action::Complete => false,
            };
            if allowed {
                return Verdict::Allow;
            }
        }

        if actor.role == Role::Supplier
            && resource.kind == ResourceKind::Booking
            && resource.ownership.chain_owner() == Some(actor.id)
            && matches!(action, Action::Read | Action::Update | Action::Approve | Action::Reject)
        {
            return Verdict::Allow;
        }

        Verdict::Deny
    }

    /// Like [`decide`](Self::decide), but a denial becomes [`CoreError::Forbidden`].
    pub fn authorize(actor: &Actor, action: Action, resource: &Resource) -> CoreResult<()> {
        match Self::decide(actor, action, resource) {
            Verdict::Allow => Ok(()),
            Verdict::Deny => {
                tracing::warn!(
                    actor_id = %actor.id,
                    role = %actor.role,
                    action = %action,
                    kind = %resource.kind,
                    "Access denied"
                );
                Err(CoreError::Forbidden(format!(
                    "{} may not {} this {}",
                    actor.role, action, resource.kind
                )))
            }
        }
    }

    /// Visibility of list reads. Part of the policy: callers must filter with it.
    pub fn scope(actor: &Actor, kind: ResourceKind) -> VisibilityScope {
        match (actor.role, kind) {
            (Role::Admin, _) => VisibilityScope::All,
            (_, ResourceKind::Property) => VisibilityScope::All,
            (Role::Guest, ResourceKind::Booking) => VisibilityScope::Guest(actor.id),
            (Role::Supplier, ResourceKind::Booking) => VisibilityScope::PropertyOwner(actor.id),
            (_, ResourceKind::Comment | ResourceKind::Suggestion) => VisibilityScope::Author(actor.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ACTIONS: [Action; 7] = [
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Approve,
        Action::Reject,
        Action::Complete,
    ];

    fn booking_resource(guest: Uuid, owner: Uuid) -> Resource {
        Resource {
            kind: ResourceKind::Booking,
            ownership: Ownership::Chained { owner_id: guest, chain_owner_id: owner },
        }
    }

    #[test]
    fn test_admin_is_allowed_everything() {
        let admin = Actor::admin(Uuid::new_v4());
        let resources = [
            Resource::collection(ResourceKind::Booking),
            Resource::owned_by(ResourceKind::Comment, Uuid::new_v4()),
            Resource::owned_by(ResourceKind::Property, Uuid::new_v4()),
            booking_resource(Uuid::new_v4(), Uuid::new_v4()),
        ];

        for resource in &resources {
            for action in ALL_ACTIONS {
                assert_eq!(AccessPolicy::decide(&admin, action, resource), Verdict::Allow);
            }
        }
    }

    #[test]
    fn test_guest_owns_their_booking() {
        let guest = Actor::guest(Uuid::new_v4());
        let other = Actor::guest(Uuid::new_v4());
        let booking = booking_resource(guest.id, Uuid::new_v4());

        for action in [Action::Read, Action::Update, Action::Delete] {
            assert!(AccessPolicy::decide(&guest, action, &booking).is_allowed());
            assert_eq!(AccessPolicy::decide(&other, action, &booking), Verdict::Deny);
        }

        // Owning a booking never lets a guest drive its status.
        for action in [Action::Approve, Action::Reject, Action::Complete] {
            assert_eq!(AccessPolicy::decide(&guest, action, &booking), Verdict::Deny);
        }
    }

    #[test]
    fn test_supplier_reaches_bookings_through_owned_property() {
        let supplier = Actor::supplier(Uuid::new_v4());
        let stranger = Actor::supplier(Uuid::new_v4());
        let booking = booking_resource(Uuid::new_v4(), supplier.id);

        for action in [Action::Read, Action::Update, Action::Approve, Action::Reject] {
            assert!(AccessPolicy::decide(&supplier, action, &booking).is_allowed());
            assert_eq!(AccessPolicy::decide(&stranger, action, &booking), Verdict::Deny);
        }

        assert_eq!(AccessPolicy::decide(&supplier, Action::Delete, &booking), Verdict::Deny);
        assert_eq!(AccessPolicy::decide(&supplier, Action::Complete, &booking), Verdict::Deny);
    }

    #[test]
    fn test_chain_ownership_only_applies_to_suppliers() {
        // A guest id that happens to match the chain owner gets nothing from rule 4.
        let guest = Actor::guest(Uuid::new_v4());
        let booking = booking_resource(Uuid::new_v4(), guest.id);
        assert_eq!(AccessPolicy::decide(&guest, Action::Approve, &booking), Verdict::Deny);
        assert_eq!(AccessPolicy::decide(&guest, Action::Read, &booking), Verdict::Deny);
    }

    #[test]
    fn test_collection_reads_are_allowed_but_scoped() {
        let guest = Actor::guest(Uuid::new_v4());
        let supplier = Actor::supplier(Uuid::new_v4());
        let list = Resource::collection(ResourceKind::Booking);

        assert!(AccessPolicy::decide(&guest, Action::Read, &list).is_allowed());
        assert_eq!(AccessPolicy::decide(&guest, Action::Update, &list), Verdict::Deny);

        assert_eq!(AccessPolicy::scope(&guest, ResourceKind::Booking), VisibilityScope::Guest(guest.id));
        assert_eq!(
            AccessPolicy::scope(&supplier, ResourceKind::Booking),
            VisibilityScope::PropertyOwner(supplier.id)
        );
        assert_eq!(
            AccessPolicy::scope(&supplier, ResourceKind::Suggestion),
            VisibilityScope::Author(supplier.id)
        );
        assert_eq!(AccessPolicy::scope(&guest, ResourceKind::Property), VisibilityScope::All);
    }

    #[test]
    fn test_suppliers_have_no_rights_over_feedback() {
        let supplier = Actor::supplier(Uuid::new_v4());
        let comment = Resource::owned_by(ResourceKind::Comment, Uuid::new_v4());

        for action in [Action::Read, Action::Update, Action::Delete] {
            assert_eq!(AccessPolicy::decide(&supplier, action, &comment), Verdict::Deny);
        }
    }

    #[test]
    fn test_only_suppliers_create_properties() {
        let supplier = Actor::supplier(Uuid::new_v4());
        let guest = Actor::guest(Uuid::new_v4());

        let own = Resource::owned_by(ResourceKind::Property, supplier.id);
        assert!(AccessPolicy::decide(&supplier, Action::Create, &own).is_allowed());

        let guest_owned = Resource::owned_by(ResourceKind::Property, guest.id);
        assert_eq!(AccessPolicy::decide(&guest, Action::Create, &guest_owned), Verdict::Deny);

        // Anyone may read a single catalog entry.
        assert!(AccessPolicy::decide(&guest, Action::Read, &own).is_allowed());
        assert_eq!(AccessPolicy::decide(&guest, Action::Update, &own), Verdict::Deny);
    }

    #[test]
    fn test_authorize_maps_deny_to_forbidden() {
        let guest = Actor::guest(Uuid::new_v4());
        let comment = Resource::owned_by(ResourceKind::Comment, Uuid::new_v4());

        let err = AccessPolicy::authorize(&guest, Action::Delete, &comment).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }
}
