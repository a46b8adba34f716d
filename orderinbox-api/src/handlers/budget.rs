use crate::analysis::AnalysisService;
use crate::database::{budgets, Database};
use crate::handlers::{mailbox_error_response, parse_sources};
use crate::integrations::AlertDispatcher;
use crate::jobs::BudgetMonitor;
use actix_web::{web, HttpResponse, Result as ActixResult};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared_types::{BudgetConfig, SetBudgetRequest};
use std::sync::Arc;

/// Create or replace the user's budget. Input errors are rejected before
/// any mailbox or store work happens.
pub async fn set_budget(
    db: web::Data<Arc<Database>>,
    monitor: web::Data<Arc<BudgetMonitor>>,
    request: web::Json<SetBudgetRequest>,
) -> ActixResult<HttpResponse> {
    if request.budget_limit <= Decimal::ZERO {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "message": "Budget limit must be greater than zero"
        })));
    }
    let tracked_sources = match parse_sources(&request.sources) {
        Ok(sources) => sources,
        Err(message) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "message": message
            })));
        }
    };

    let config = BudgetConfig {
        user_id: request.email.clone(),
        budget_limit: request.budget_limit,
        tracked_sources,
    };

    budgets::save(db.async_connection.clone(), &config)
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    // The monitor needs the session credentials to poll the mailbox; they
    // are held in memory only.
    monitor.register(&request.email, &request.password);

    tracing::info!(
        "Budget set for {}: limit {} over {} sources",
        request.email,
        config.budget_limit,
        config.tracked_sources.len()
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Budget set and monitoring started"
    })))
}

#[derive(Deserialize)]
pub struct MonthlyExpensesRequest {
    pub email: String,
    pub password: String,
}

/// Current-month spend against the stored budget. A user without a stored
/// config gets a distinct "unset" state rather than zeros or an error.
pub async fn get_monthly_expenses(
    db: web::Data<Arc<Database>>,
    service: web::Data<Arc<AnalysisService>>,
    request: web::Json<MonthlyExpensesRequest>,
) -> ActixResult<HttpResponse> {
    let config = budgets::load(db.async_connection.clone(), &request.email)
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    let Some(config) = config else {
        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "budget": "unset"
        })));
    };

    match service.monthly_expenses(&request.email, &request.password, &config, Utc::now()) {
        Ok((expenses, _status)) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "budget": config.budget_limit,
            "total_spent": expenses.total_spent,
            "remaining": expenses.remaining,
            "percentage_spent": expenses.percentage_spent,
            "state": expenses.state,
            "expenses": expenses.expenses,
        }))),
        Err(e) => {
            tracing::warn!("Monthly expense fetch failed for {}: {}", request.email, e);
            Ok(mailbox_error_response(&e))
        }
    }
}

/// Manually trigger the budget alert for the current month. Dispatch
/// failure is non-fatal: the evaluated status is returned either way with
/// a flag for the notification outcome.
pub async fn send_budget_alert(
    db: web::Data<Arc<Database>>,
    service: web::Data<Arc<AnalysisService>>,
    dispatcher: web::Data<Arc<dyn AlertDispatcher>>,
    request: web::Json<MonthlyExpensesRequest>,
) -> ActixResult<HttpResponse> {
    let config = budgets::load(db.async_connection.clone(), &request.email)
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    let Some(config) = config else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "message": "Budget not set for this user"
        })));
    };

    let (_, status) =
        match service.monthly_expenses(&request.email, &request.password, &config, Utc::now()) {
            Ok(result) => result,
            Err(e) => return Ok(mailbox_error_response(&e)),
        };

    let notified = match dispatcher.notify(&request.email, status.percentage_used).await {
        Ok(()) => {
            let year_month = Utc::now().format("%Y-%m").to_string();
            budgets::mark_alerted(db.async_connection.clone(), &request.email, &year_month)
                .await
                .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;
            true
        }
        Err(e) => {
            tracing::warn!("Manual alert dispatch failed for {}: {}", request.email, e);
            false
        }
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "percentage_used": status.percentage_used,
        "state": status.state,
        "notified": notified,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImapConfig;
    use crate::integrations::LogDispatcher;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use tempfile::TempDir;

    fn fixtures() -> (
        TempDir,
        web::Data<Arc<Database>>,
        web::Data<Arc<AnalysisService>>,
    ) {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(Database::new(&dir.path().join("test.sqlite3")).unwrap());
        let service = Arc::new(AnalysisService::new(ImapConfig::default()));
        (dir, web::Data::new(db), web::Data::new(service))
    }

    fn request() -> web::Json<MonthlyExpensesRequest> {
        web::Json(MonthlyExpensesRequest {
            email: "user@example.com".to_string(),
            password: "app-password".to_string(),
        })
    }

    #[actix_web::test]
    async fn test_monthly_expenses_without_budget_is_unset() {
        let (_dir, db, service) = fixtures();
        // No stored config: the handler answers before any mailbox work.
        let response = get_monthly_expenses(db, service, request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["budget"], "unset");
    }

    #[actix_web::test]
    async fn test_alert_without_budget_is_not_found() {
        let (_dir, db, service) = fixtures();
        let dispatcher: Arc<dyn AlertDispatcher> = Arc::new(LogDispatcher);
        let response = send_budget_alert(db, service, web::Data::new(dispatcher), request())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
    }
}
