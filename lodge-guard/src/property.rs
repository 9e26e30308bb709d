use std::collections::HashSet;
use std::sync::Arc;

use lodge_core::repository::{AccountRepository, BookingQuery, BookingRepository, PropertyRepository};
use lodge_core::{AccessPolicy, Action, Actor, CoreError, CoreResult, Resource, ResourceKind, Role};
use lodge_shared::{
    BookingStatus, NewProperty, Page, Property, PropertyFilter, PropertyPatch, PropertyView,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{found, required_text};

/// Guards the property catalog. Reads are public; mutations belong to the owner or an admin.
#[derive(Clone)]
pub struct PropertyGuard {
    properties: Arc<dyn PropertyRepository>,
    bookings: Arc<dyn BookingRepository>,
    accounts: Arc<dyn AccountRepository>,
}

impl PropertyGuard {
    pub fn new(
        properties: Arc<dyn PropertyRepository>,
        bookings: Arc<dyn BookingRepository>,
        accounts: Arc<dyn AccountRepository>,
    ) -> Self {
        Self { properties, bookings, accounts }
    }

    pub async fn create(&self, actor: &Actor, new: NewProperty) -> CoreResult<PropertyView> {
        let owner_id = new.owner_id.unwrap_or(actor.id);
        AccessPolicy::authorize(actor, Action::Create, &Resource::owned_by(ResourceKind::Property, owner_id))?;

        if owner_id != actor.id {
            let owner = self
                .accounts
                .find_account(owner_id)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("account {}", owner_id)))?;
            if owner.role != Role::Supplier {
                return Err(CoreError::ValidationError(format!(
                    "account {} is not a supplier",
                    owner_id
                )));
            }
        }

        let mut property = Property::new(
            owner_id,
            required_text("name", &new.name)?,
            required_text("location", &new.location)?,
            new.description,
        );
        property.payment_type = new.payment_type.unwrap_or_default();
        property.availability_period = new.availability_period.unwrap_or_default();
        self.properties.insert_property(&property).await?;

        info!("Property {} created for owner {}", property.id, owner_id);
        Ok(PropertyView { property, has_pending_bookings: false })
    }

    pub async fn read(&self, id: Uuid) -> CoreResult<PropertyView> {
        let property = self.load(id).await?;
        self.view(property).await
    }

    pub async fn list(&self, filter: &PropertyFilter) -> CoreResult<Page<PropertyView>> {
        let page = self.properties.list_properties(filter).await?;
        debug!("Catalog page {} returned {} of {}", page.pagination.page, page.data.len(), page.pagination.total);

        let pending: HashSet<Uuid> = if page.data.is_empty() {
            HashSet::new()
        } else {
            let query = BookingQuery {
                property_ids: Some(page.data.iter().map(|p| p.id).collect()),
                status: Some(BookingStatus::Pending),
                ..Default::default()
            };
            self.bookings
                .list_bookings(&query)
                .await?
                .into_iter()
                .map(|b| b.property_id)
                .collect()
        };

        Ok(page.map(|property| PropertyView {
            has_pending_bookings: pending.contains(&property.id),
            property,
        }))
    }

    pub async fn update(&self, id: Uuid, patch: PropertyPatch, actor: &Actor) -> CoreResult<PropertyView> {
        let mut property = self.load(id).await?;
        AccessPolicy::authorize(actor, Action::Update, &Resource::property(&property))?;

        let patch = PropertyPatch {
            name: patch.name.map(|n| required_text("name", &n)).transpose()?,
            location: patch.location.map(|l| required_text("location", &l)).transpose()?,
            ..patch
        };
        property.apply(patch);
        self.properties.update_property(&property).await?;

        info!("Property {} updated by {} {}", id, actor.role, actor.id);
        self.read(id).await
    }

    /// Dependent bookings and suggestions are handled by the persistence layer.
    pub async fn delete(&self, id: Uuid, actor: &Actor) -> CoreResult<()> {
        let property = self.load(id).await?;
        AccessPolicy::authorize(actor, Action::Delete, &Resource::property(&property))?;

        self.properties.delete_property(id).await?;
        info!("Property {} deleted by {} {}", id, actor.role, actor.id);
        Ok(())
    }

    async fn load(&self, id: Uuid) -> CoreResult<Property> {
        found(self.properties.get_property(id).await?, ResourceKind::Property, id)
    }

    async fn view(&self, property: Property) -> CoreResult<PropertyView> {
        let query = BookingQuery {
            property_ids: Some(vec![property.id]),
            status: Some(BookingStatus::Pending),
            ..Default::default()
        };
        let has_pending_bookings = !self.bookings.list_bookings(&query).await?.is_empty();
        Ok(PropertyView { property, has_pending_bookings })
    }
}
