use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// How a stay is paid for.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    WorkHours,
    #[default]
    Money,
    Mixed,
}

impl PaymentType {
    pub const ALL: [PaymentType; 3] = [PaymentType::WorkHours, PaymentType::Money, PaymentType::Mixed];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::WorkHours => "work_hours",
            PaymentType::Money => "money",
            PaymentType::Mixed => "mixed",
        }
    }
}

/// The unit a property is offered by.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityPeriod {
    #[default]
    Nightly,
    Weekly,
    Monthly,
}

impl AvailabilityPeriod {
    pub const ALL: [AvailabilityPeriod; 3] =
        [AvailabilityPeriod::Nightly, AvailabilityPeriod::Weekly, AvailabilityPeriod::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityPeriod::Nightly => "nightly",
            AvailabilityPeriod::Weekly => "weekly",
            AvailabilityPeriod::Monthly => "monthly",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AvailabilityPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown property term: {0}")]
pub struct ParseTermError(pub String);

impl FromStr for PaymentType {
    type Err = ParseTermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseTermError(s.to_string()))
    }
}

impl FromStr for AvailabilityPeriod {
    type Err = ParseTermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AvailabilityPeriod::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParseTermError(s.to_string()))
    }
}

/// A rentable listing, owned by exactly one supplier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub payment_type: PaymentType,
    pub availability_period: AvailabilityPeriod,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn new(owner_id: Uuid, name: String, location: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            location,
            description,
            payment_type: PaymentType::default(),
            availability_period: AvailabilityPeriod::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. The owner is not part of the patch and never changes.
    pub fn apply(&mut self, patch: PropertyPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(payment_type) = patch.payment_type {
            self.payment_type = payment_type;
        }
        if let Some(period) = patch.availability_period {
            self.availability_period = period;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }
}

/// Input for creating a property.
///
/// `owner_id` is only honoured for administrators; suppliers always own what they create.
/// Omitted terms fall back to paid nightly stays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProperty {
    pub owner_id: Option<Uuid>,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub availability_period: Option<AvailabilityPeriod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub availability_period: Option<AvailabilityPeriod>,
    pub is_active: Option<bool>,
}

/// Catalog view of a property, annotated with whether it has bookings awaiting review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyView {
    #[serde(flatten)]
    pub property: Property,
    pub has_pending_bookings: bool,
}
