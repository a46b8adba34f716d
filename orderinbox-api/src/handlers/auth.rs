use crate::analysis::AnalysisService;
use crate::handlers::mailbox_error_response;
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Verifies the user's IMAP credentials by opening and closing a session.
pub async fn login(
    service: web::Data<Arc<AnalysisService>>,
    request: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "message": "Email and password required"
        })));
    }

    match service.verify_credentials(&request.email, &request.password) {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Login successful"
        }))),
        Err(e) => {
            tracing::info!("Login failed for {}: {}", request.email, e);
            Ok(mailbox_error_response(&e))
        }
    }
}
