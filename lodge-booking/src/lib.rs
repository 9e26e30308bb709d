pub mod lifecycle;
pub mod visit;

pub use lifecycle::BookingLifecycle;
pub use visit::VisitGate;
