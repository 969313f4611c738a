pub mod nearby;
pub mod route;

pub use nearby::{BoundsParams, NearbyParams};
pub use route::RouteRequest;
