use actix_web::{get, post, web, HttpResponse};

use crate::error::AppError;
use crate::models::CreateLeadRequest;
use crate::state::AppState;

/// POST /api/leads
/// Create a lead: route it onto a team, persist, fan the event out.
#[post("/api/leads")]
pub async fn create_lead(
    state: web::Data<AppState>,
    body: web::Json<CreateLeadRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("lead name is required".into()));
    }

    let assigned_team = state.router.assign_team(&req).await;
    let lead = state.leads.create(req, assigned_team).await;

    state.hub.broadcast_lead_created(&lead).await;

    Ok(HttpResponse::Created().json(lead))
}

/// GET /api/leads: all stored leads, newest first.
#[get("/api/leads")]
pub async fn get_leads(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(state.leads.list().await))
}
