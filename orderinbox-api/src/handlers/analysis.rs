use crate::analysis::AnalysisService;
use crate::handlers::{mailbox_error_response, parse_sources};
use actix_web::{web, HttpResponse, Result as ActixResult};
use chrono::Utc;
use shared_types::AnalyzeRequest;
use std::sync::Arc;

/// Full spend analysis over a selected date range and source set.
pub async fn analyze(
    service: web::Data<Arc<AnalysisService>>,
    request: web::Json<AnalyzeRequest>,
) -> ActixResult<HttpResponse> {
    let sources = match parse_sources(&request.sources) {
        Ok(sources) => sources,
        Err(message) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "message": message
            })));
        }
    };

    let range = request.date_option.to_range(Utc::now());

    match service.analyze(&request.email, &request.password, &sources, &range) {
        Ok(report) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "total_spent": report.total_spent,
            "average_order": report.average_order,
            "total_orders": report.total_orders,
            "monthly_series": report.monthly_series,
            "per_source_series": report.per_source_series,
            "expenses": report.orders,
        }))),
        Err(e) => {
            tracing::warn!("Analysis failed for {}: {}", request.email, e);
            Ok(mailbox_error_response(&e))
        }
    }
}
