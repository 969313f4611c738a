use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::time::Duration;
use tracing::{error, warn};

use crate::db::connection::{with_read_deadline, Database};
use crate::domain::property::{CandidateFilter, Property, STATUS_AVAILABLE};
use crate::errors::ServerError;

const SELECT_CANDIDATES: &str = r#"
    SELECT
        id, title, address, price, bedrooms, bathrooms, area,
        property_type, listing_type, latitude, longitude, images
    FROM properties
    WHERE status = ?1
"#;

/// Loads every available listing that passes the non-spatial filters.
///
/// This is the request's snapshot of the store; spatial filtering happens in
/// memory afterwards.
pub fn load_candidates(
    db: &Database,
    filter: &CandidateFilter,
    timeout: Duration,
) -> Result<Vec<Property>, ServerError> {
    let (sql, values) = candidate_query(filter);

    db.with_conn(|conn| {
        with_read_deadline(conn, timeout, |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), property_from_row)?;
            let mut out = Vec::new();
            for r in rows {
                out.push(r?);
            }
            Ok(out)
        })
    })
    .map_err(|e| {
        error!(error = %e, "candidate read failed");
        e
    })
}

/// Builds the filtered SELECT and its positional values.
fn candidate_query(filter: &CandidateFilter) -> (String, Vec<Value>) {
    let mut sql = String::from(SELECT_CANDIDATES);
    let mut values = vec![Value::Text(STATUS_AVAILABLE.to_string())];

    if let Some(kind) = filter.listing_kind {
        values.push(Value::Text(kind.as_str().to_string()));
        sql.push_str(&format!(" AND listing_type = ?{}", values.len()));
    }

    if !filter.categories.is_empty() {
        let mut placeholders = Vec::with_capacity(filter.categories.len());
        for category in &filter.categories {
            values.push(Value::Text(category.clone()));
            placeholders.push(format!("?{}", values.len()));
        }
        sql.push_str(&format!(" AND property_type IN ({})", placeholders.join(", ")));
    }

    if let Some(max) = filter.price_max {
        values.push(Value::Real(max));
        sql.push_str(&format!(" AND price <= ?{}", values.len()));
    }

    (sql, values)
}

fn property_from_row(row: &Row<'_>) -> rusqlite::Result<Property> {
    let id: String = row.get("id")?;
    let listing_type: String = row.get("listing_type")?;
    let images_json: Option<String> = row.get("images")?;

    let images = match images_json.as_deref() {
        None | Some("") => Vec::new(),
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            warn!(%id, error = %e, "ignoring malformed images column");
            Vec::new()
        }),
    };

    Ok(Property {
        title: row.get("title")?,
        address: row.get("address")?,
        price: row.get("price")?,
        bedrooms: row.get("bedrooms")?,
        bathrooms: row.get("bathrooms")?,
        area: row.get("area")?,
        property_type: row.get("property_type")?,
        // The CHECK constraint keeps this to rent/sale.
        listing_type: listing_type.parse().unwrap_or_default(),
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        images,
        id,
    })
}

/// Inserts or replaces a listing. Used to seed the store and by tests; the
/// query services never write.
pub fn upsert_property(conn: &Connection, prop: &Property, status: &str) -> Result<(), ServerError> {
    let now = Utc::now().naive_utc();
    let images = serde_json::to_string(&prop.images)
        .map_err(|e| ServerError::DbError(format!("Encode images failed: {e}")))?;

    conn.execute(
        r#"
        INSERT INTO properties (
            id, title, address, price, bedrooms, bathrooms, area, property_type,
            listing_type, status, latitude, longitude, images, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            address = excluded.address,
            price = excluded.price,
            bedrooms = excluded.bedrooms,
            bathrooms = excluded.bathrooms,
            area = excluded.area,
            property_type = excluded.property_type,
            listing_type = excluded.listing_type,
            status = excluded.status,
            latitude = excluded.latitude,
            longitude = excluded.longitude,
            images = excluded.images,
            updated_at = excluded.updated_at
        "#,
        params![
            &prop.id,
            &prop.title,
            &prop.address,
            prop.price,
            prop.bedrooms,
            prop.bathrooms,
            prop.area,
            &prop.property_type,
            prop.listing_type.as_str(),
            status,
            prop.latitude,
            prop.longitude,
            images,
            now,
            now,
        ],
    )?;
    Ok(())
}
