pub mod distance;
pub mod feature;
pub mod filter;
pub mod region;
pub mod route;

pub use distance::{distance_km, LatLng};
pub use filter::{filter, FilterOutcome, Located, Ranked};
pub use region::QueryRegion;
