//! # Campaign End Service
//!
//! Provides `DELETE /api/campaigns/{campaign_id}`, called once the pipeline has
//! finished sending a campaign.
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: `process` receives the `campaign_id` from the URL path.
//!
//! 2.  **Teardown**: `CampaignsState::end` removes the campaign's context, its
//!     token table and any recipient values that were never finalized. A
//!     campaign started again later re-reads the attribute directory.
//!
//! 3.  **HTTP Response**: `204 No Content`, or `404 Not Found` for an unknown ID.

use crate::campaign::state::CampaignsState;
use actix_web::{web, HttpResponse, Responder};

/// Actix web handler for `DELETE /api/campaigns/{campaign_id}`.
///
/// # Arguments
/// * `state` - The shared `CampaignsState`.
/// * `campaign_id` - The finished campaign, from the URL path.
///
/// # Returns
/// - `204 No Content` once the context is dropped.
/// - `404 Not Found` with the error message if the campaign was not running.
pub(crate) async fn process(
    state: web::Data<CampaignsState>,
    campaign_id: web::Path<String>,
) -> impl Responder {
    match state.end(&campaign_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => HttpResponse::NotFound().body(e.to_string()),
    }
}
