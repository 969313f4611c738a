pub mod property;

pub use property::{CandidateFilter, ListingKind, Property, STATUS_AVAILABLE};
