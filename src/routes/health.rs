use rocket::serde::json::Json;
use rocket::{State, routes};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

#[rocket::get("/")]
pub async fn health(pool: &State<PgPool>) -> Json<HealthResponse> {
    let database = match sqlx::query("SELECT 1").execute(pool.inner()).await {
        Ok(_) => "ok",
        Err(_) => "unreachable",
    };

    Json(HealthResponse {
        status: "ok",
        database,
    })
}

pub fn routes() -> Vec<rocket::Route> {
    routes![health]
}
