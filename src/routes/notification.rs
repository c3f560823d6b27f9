use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::notification::NotificationResponse;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, routes};
use sqlx::PgPool;
use uuid::Uuid;

#[rocket::get("/")]
pub async fn list_notifications(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let notifications = repo.list_notifications_for_user(&current_user.id).await?;
    Ok(Json(notifications.iter().map(NotificationResponse::from).collect()))
}

#[rocket::post("/<id>/read")]
pub async fn mark_read(pool: &State<PgPool>, current_user: CurrentUser, id: &str) -> Result<Status, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid notification id", e))?;

    if repo.mark_notification_read(&uuid, &current_user.id).await? {
        Ok(Status::Ok)
    } else {
        Err(AppError::NotFound("Notification not found".to_string()))
    }
}

#[rocket::post("/read-all")]
pub async fn mark_all_read(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Status, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    repo.mark_all_notifications_read(&current_user.id).await?;
    Ok(Status::Ok)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![list_notifications, mark_read, mark_all_read]
}
