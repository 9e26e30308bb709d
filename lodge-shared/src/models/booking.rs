use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Approved,
        BookingStatus::Rejected,
        BookingStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Completed => "COMPLETED",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Rejected | BookingStatus::Completed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown booking status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for BookingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// A guest's request to stay at a property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub guest_id: Uuid,
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Bookings always start out pending.
    pub fn new(guest_id: Uuid, property_id: Uuid, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            guest_id,
            property_id,
            check_in,
            check_out,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, status: BookingStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn reschedule(&mut self, check_in: NaiveDate, check_out: NaiveDate) {
        self.check_in = check_in;
        self.check_out = check_out;
        self.updated_at = Utc::now();
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub property_id: Uuid,
    /// Defaults to the requesting actor.
    pub guest_id: Option<Uuid>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingPatch {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
}

impl BookingPatch {
    pub fn touches_dates(&self) -> bool {
        self.check_in.is_some() || self.check_out.is_some()
    }
}
