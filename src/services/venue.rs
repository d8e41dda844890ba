//! Venue service — vendor onboarding, listing CRUD, and search.
//!
//! DESIGN
//! ======
//! Venues belong to vendor profiles, not directly to users, so a vendor can
//! rebrand without touching their listings. Search filters compose through
//! a `QueryBuilder`; only published venues are visible to non-owners.

use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

use crate::localization::Currency;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum VenueError {
    #[error("venue not found: {0}")]
    NotFound(Uuid),
    #[error("vendor profile not found for user {0}")]
    NotAVendor(Uuid),
    #[error("user {0} does not own this venue")]
    Forbidden(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row returned from venue queries.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct VenueRow {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub title: String,
    pub description: String,
    pub city: String,
    pub category: String,
    pub capacity: i32,
    pub hourly_rate: f64,
    pub currency: String,
    pub amenities: serde_json::Value,
    pub photo_urls: serde_json::Value,
    pub published: bool,
}

/// Aggregate review stats for a venue.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: i64,
}

/// Search filters for the public listing endpoint.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct VenueFilters {
    pub city: Option<String>,
    pub category: Option<String>,
    pub min_capacity: Option<i32>,
    pub max_hourly_rate: Option<f64>,
    /// Case-insensitive substring match on title and description.
    pub q: Option<String>,
}

/// Fields accepted when creating a venue.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewVenue {
    pub title: String,
    pub description: Option<String>,
    pub city: String,
    pub category: String,
    pub capacity: i32,
    pub hourly_rate: f64,
    pub currency: Option<Currency>,
    pub amenities: Option<Vec<String>>,
}

/// Partial update for a venue; absent fields stay unchanged.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct VenuePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub category: Option<String>,
    pub capacity: Option<i32>,
    pub hourly_rate: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub published: Option<bool>,
}

// =============================================================================
// VENDOR PROFILES
// =============================================================================

/// Register (or re-fetch) the vendor profile for a user and flip their role.
/// Registration is idempotent: an existing profile is returned as-is.
pub async fn register_vendor(
    pool: &PgPool,
    user_id: Uuid,
    display_name: &str,
    bio: &str,
) -> Result<Uuid, VenueError> {
    if let Some(existing) = vendor_id_for_user(pool, user_id).await? {
        return Ok(existing);
    }

    let id = Uuid::new_v4();
    let mut tx = pool.begin().await.map_err(VenueError::Database)?;
    sqlx::query("INSERT INTO vendors (id, user_id, display_name, bio) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(user_id)
        .bind(display_name)
        .bind(bio)
        .execute(tx.as_mut())
        .await?;
    sqlx::query("UPDATE users SET role = 'vendor' WHERE id = $1 AND role = 'customer'")
        .bind(user_id)
        .execute(tx.as_mut())
        .await?;
    tx.commit().await?;

    tracing::info!(%user_id, vendor_id = %id, "vendor profile registered");
    Ok(id)
}

/// Vendor profile id for a user, if one exists.
pub async fn vendor_id_for_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Uuid>, VenueError> {
    let row = sqlx::query_scalar::<_, Uuid>("SELECT id FROM vendors WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Vendor profile id for a user, erroring when absent.
pub async fn require_vendor(pool: &PgPool, user_id: Uuid) -> Result<Uuid, VenueError> {
    vendor_id_for_user(pool, user_id)
        .await?
        .ok_or(VenueError::NotAVendor(user_id))
}

// =============================================================================
// CRUD
// =============================================================================

const VENUE_COLUMNS: &str = "id, vendor_id, title, description, city, category, capacity, \
                             hourly_rate, currency, amenities, photo_urls, published";

/// Create a venue under the user's vendor profile. Starts unpublished.
pub async fn create_venue(pool: &PgPool, user_id: Uuid, venue: NewVenue) -> Result<VenueRow, VenueError> {
    let vendor_id = require_vendor(pool, user_id).await?;
    let id = Uuid::new_v4();
    let amenities = serde_json::json!(venue.amenities.unwrap_or_default());
    let currency = venue.currency.unwrap_or(Currency::Usd);

    let row = sqlx::query_as::<_, VenueRow>(&format!(
        "INSERT INTO venues (id, vendor_id, title, description, city, category, capacity, hourly_rate, currency, amenities)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {VENUE_COLUMNS}"
    ))
    .bind(id)
    .bind(vendor_id)
    .bind(&venue.title)
    .bind(venue.description.as_deref().unwrap_or_default())
    .bind(&venue.city)
    .bind(&venue.category)
    .bind(venue.capacity)
    .bind(venue.hourly_rate)
    .bind(currency.code())
    .bind(&amenities)
    .fetch_one(pool)
    .await?;

    tracing::info!(venue_id = %id, %vendor_id, "venue created");
    Ok(row)
}

/// Fetch one venue.
pub async fn get_venue(pool: &PgPool, venue_id: Uuid) -> Result<VenueRow, VenueError> {
    sqlx::query_as::<_, VenueRow>(&format!("SELECT {VENUE_COLUMNS} FROM venues WHERE id = $1"))
        .bind(venue_id)
        .fetch_optional(pool)
        .await?
        .ok_or(VenueError::NotFound(venue_id))
}

/// Verify the user's vendor profile owns the venue.
pub async fn ensure_owner(pool: &PgPool, venue_id: Uuid, user_id: Uuid) -> Result<VenueRow, VenueError> {
    let venue = get_venue(pool, venue_id).await?;
    let vendor_id = require_vendor(pool, user_id).await?;
    if venue.vendor_id != vendor_id {
        return Err(VenueError::Forbidden(user_id));
    }
    Ok(venue)
}

/// Apply a partial update to an owned venue.
pub async fn update_venue(
    pool: &PgPool,
    venue_id: Uuid,
    user_id: Uuid,
    patch: VenuePatch,
) -> Result<VenueRow, VenueError> {
    ensure_owner(pool, venue_id, user_id).await?;

    let mut builder = QueryBuilder::new("UPDATE venues SET updated_at = now()");
    if let Some(title) = &patch.title {
        builder.push(", title = ").push_bind(title);
    }
    if let Some(description) = &patch.description {
        builder.push(", description = ").push_bind(description);
    }
    if let Some(city) = &patch.city {
        builder.push(", city = ").push_bind(city);
    }
    if let Some(category) = &patch.category {
        builder.push(", category = ").push_bind(category);
    }
    if let Some(capacity) = patch.capacity {
        builder.push(", capacity = ").push_bind(capacity);
    }
    if let Some(rate) = patch.hourly_rate {
        builder.push(", hourly_rate = ").push_bind(rate);
    }
    if let Some(amenities) = &patch.amenities {
        builder.push(", amenities = ").push_bind(serde_json::json!(amenities));
    }
    if let Some(published) = patch.published {
        builder.push(", published = ").push_bind(published);
    }
    builder.push(" WHERE id = ").push_bind(venue_id);
    builder.push(&format!(" RETURNING {VENUE_COLUMNS}"));

    let row = builder.build_query_as::<VenueRow>().fetch_one(pool).await?;
    Ok(row)
}

/// Append a photo URL to an owned venue's gallery.
pub async fn add_photo(pool: &PgPool, venue_id: Uuid, user_id: Uuid, url: &str) -> Result<(), VenueError> {
    ensure_owner(pool, venue_id, user_id).await?;
    sqlx::query("UPDATE venues SET photo_urls = photo_urls || $2::jsonb, updated_at = now() WHERE id = $1")
        .bind(venue_id)
        .bind(serde_json::json!([url]))
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete an owned venue.
pub async fn delete_venue(pool: &PgPool, venue_id: Uuid, user_id: Uuid) -> Result<(), VenueError> {
    ensure_owner(pool, venue_id, user_id).await?;
    sqlx::query("DELETE FROM venues WHERE id = $1")
        .bind(venue_id)
        .execute(pool)
        .await?;
    tracing::info!(%venue_id, "venue deleted");
    Ok(())
}

// =============================================================================
// SEARCH
// =============================================================================

/// List published venues matching the filters, newest first.
pub async fn search_venues(pool: &PgPool, filters: &VenueFilters) -> Result<Vec<VenueRow>, VenueError> {
    let mut builder = QueryBuilder::new(format!("SELECT {VENUE_COLUMNS} FROM venues WHERE published = TRUE"));

    if let Some(city) = filters.city.as_deref().filter(|c| !c.is_empty()) {
        builder.push(" AND city ILIKE ").push_bind(city.to_owned());
    }
    if let Some(category) = filters.category.as_deref().filter(|c| !c.is_empty()) {
        builder.push(" AND category = ").push_bind(category.to_owned());
    }
    if let Some(min_capacity) = filters.min_capacity {
        builder.push(" AND capacity >= ").push_bind(min_capacity);
    }
    if let Some(max_rate) = filters.max_hourly_rate {
        builder.push(" AND hourly_rate <= ").push_bind(max_rate);
    }
    if let Some(q) = filters.q.as_deref().filter(|q| !q.is_empty()) {
        let pattern = format!("%{q}%");
        builder.push(" AND (title ILIKE ").push_bind(pattern.clone());
        builder.push(" OR description ILIKE ").push_bind(pattern);
        builder.push(")");
    }
    builder.push(" ORDER BY created_at DESC LIMIT 100");

    let rows = builder.build_query_as::<VenueRow>().fetch_all(pool).await?;
    Ok(rows)
}

/// List every venue owned by the user's vendor profile, published or not.
pub async fn list_vendor_venues(pool: &PgPool, user_id: Uuid) -> Result<Vec<VenueRow>, VenueError> {
    let vendor_id = require_vendor(pool, user_id).await?;
    let rows = sqlx::query_as::<_, VenueRow>(&format!(
        "SELECT {VENUE_COLUMNS} FROM venues WHERE vendor_id = $1 ORDER BY created_at DESC"
    ))
    .bind(vendor_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// =============================================================================
// RATINGS
// =============================================================================

/// Average rating and review count for a venue.
pub async fn rating_summary(pool: &PgPool, venue_id: Uuid) -> Result<RatingSummary, VenueError> {
    let row = sqlx::query("SELECT AVG(rating)::float8 AS average, COUNT(*) AS count FROM reviews WHERE venue_id = $1")
        .bind(venue_id)
        .fetch_one(pool)
        .await?;
    Ok(RatingSummary { average: row.get("average"), count: row.get("count") })
}
