use lodge_guard::{BookingGuard, CommentGuard, PropertyGuard, SuggestionGuard};
use lodge_store::Repositories;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub properties: PropertyGuard,
    pub bookings: BookingGuard,
    pub comments: CommentGuard,
    pub suggestions: SuggestionGuard,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(repos: Repositories, auth: AuthConfig) -> Self {
        Self {
            properties: PropertyGuard::new(repos.properties.clone(), repos.bookings.clone(), repos.accounts.clone()),
            bookings: BookingGuard::new(repos.accounts.clone(), repos.properties.clone(), repos.bookings.clone()),
            comments: CommentGuard::new(repos.comments.clone()),
            suggestions: SuggestionGuard::new(repos.suggestions, repos.properties, repos.bookings),
            auth,
        }
    }
}
