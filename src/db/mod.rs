pub mod connection;
pub mod properties;

pub use connection::{init_db, Database};
pub use properties::{load_candidates, upsert_property};
