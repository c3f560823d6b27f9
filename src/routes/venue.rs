use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::venue::{VenueRequest, VenueResponse};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, routes};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Venues are deduplicated by place id, so posting one that already exists
/// refreshes its details instead of creating a twin.
#[rocket::post("/", data = "<payload>")]
pub async fn create_venue(
    pool: &State<PgPool>,
    _current_user: CurrentUser,
    payload: Json<VenueRequest>,
) -> Result<(Status, Json<VenueResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let venue = repo.create_venue(&payload).await?;
    Ok((Status::Created, Json(VenueResponse::from(&venue))))
}

#[rocket::get("/")]
pub async fn list_venues(pool: &State<PgPool>, _current_user: CurrentUser) -> Result<Json<Vec<VenueResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let venues = repo.list_venues().await?;
    Ok(Json(venues.iter().map(VenueResponse::from).collect()))
}

#[rocket::get("/<id>")]
pub async fn get_venue(pool: &State<PgPool>, _current_user: CurrentUser, id: &str) -> Result<Json<VenueResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid venue id", e))?;
    let venue = repo
        .get_venue_by_id(&uuid)
        .await?
        .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;
    Ok(Json(VenueResponse::from(&venue)))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![create_venue, list_venues, get_venue]
}
