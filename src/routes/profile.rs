use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::profile::{ProfileRequest, ProfileResponse};
use rocket::serde::json::Json;
use rocket::{State, routes};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[rocket::get("/me")]
pub async fn get_my_profile(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<ProfileResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let profile = repo
        .get_profile_by_user_id(&current_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(ProfileResponse::from(&profile)))
}

#[rocket::put("/me", data = "<payload>")]
pub async fn put_my_profile(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    payload: Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let profile = repo.upsert_profile(&current_user.id, &payload, current_user.is_anonymous).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

#[rocket::get("/<user_id>")]
pub async fn get_profile(pool: &State<PgPool>, _current_user: CurrentUser, user_id: &str) -> Result<Json<ProfileResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(user_id).map_err(|e| AppError::uuid("Invalid user id", e))?;
    let profile = repo
        .get_profile_by_user_id(&uuid)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(ProfileResponse::from(&profile)))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![get_my_profile, put_my_profile, get_profile]
}
