use actix_web::{get, web, HttpResponse};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/stats/connections: who is connected and which teams are active.
#[get("/api/stats/connections")]
pub async fn connection_stats(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.hub.connections_info().await))
}

/// GET /api/stats/teams/{name}: one team's room snapshot. 404 for teams the
/// hub has never seen.
#[get("/api/stats/teams/{name}")]
pub async fn team_stats(
    state: web::Data<AppState>,
    name: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let stats = state.hub.team_stats(&name.into_inner()).await;
    if !stats.is_active {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::Ok().json(stats))
}
