//! # Preview Job Status Service
//!
//! Provides `GET /api/campaigns/preview/status/{job_id}` so clients can poll a
//! job started by `POST /api/campaigns/{campaign_id}/preview`.
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: `process` receives the `job_id` returned by the preview route.
//!
//! 2.  **Lookup**: the latest status written by the job updater is read from
//!     the shared `JobsState`.
//!
//! 3.  **HTTP Response**: the `JobStatus` as JSON (`Pending`, `InProgress`,
//!     `Completed` with the rendered subjects, or `Failed`).

use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};

/// Actix web handler for the preview status route.
///
/// # Arguments
/// * `job_id` - The preview job ID, from the URL path.
/// * `state` - The shared `JobsState`.
///
/// # Returns
/// - `200 OK` with the current `JobStatus`.
/// - `404 Not Found` if the job ID is unknown.
pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    match state.status(&job_id).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().body("Job ID not found"),
    }
}
