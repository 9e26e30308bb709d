pub mod models;
pub mod page;

pub use models::booking::{Booking, BookingPatch, BookingStatus, NewBooking, ParseStatusError};
pub use models::feedback::{Comment, CommentPatch, NewComment, NewSuggestion, Suggestion, SuggestionPatch};
pub use models::property::{
    AvailabilityPeriod, NewProperty, ParseTermError, PaymentType, Property, PropertyPatch, PropertyView,
};
pub use page::{Page, Pagination, PropertyFilter, SortField, SortOrder};
