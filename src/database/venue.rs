use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::venue::{Venue, VenueRequest};
use uuid::Uuid;

const VENUE_COLUMNS: &str = "id, name, address, place_id, latitude, longitude, photo_url, created_at";

impl PostgresRepository {
    /// Venues are deduplicated on the external place id: creating the same
    /// café twice returns the existing row.
    pub async fn create_venue(&self, request: &VenueRequest) -> Result<Venue, AppError> {
        let venue = sqlx::query_as::<_, Venue>(&format!(
            r#"
            INSERT INTO venues (name, address, place_id, latitude, longitude, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (place_id) DO UPDATE
            SET name = EXCLUDED.name,
                address = EXCLUDED.address,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                photo_url = EXCLUDED.photo_url
            RETURNING {VENUE_COLUMNS}
            "#
        ))
        .bind(&request.name)
        .bind(&request.address)
        .bind(&request.place_id)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(&request.photo_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(venue)
    }

    pub async fn get_venue_by_id(&self, id: &Uuid) -> Result<Option<Venue>, AppError> {
        let venue = sqlx::query_as::<_, Venue>(&format!(
            r#"
            SELECT {VENUE_COLUMNS}
            FROM venues
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(venue)
    }

    pub async fn list_venues(&self) -> Result<Vec<Venue>, AppError> {
        let venues = sqlx::query_as::<_, Venue>(&format!(
            r#"
            SELECT {VENUE_COLUMNS}
            FROM venues
            ORDER BY name
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(venues)
    }
}
