//! # Campaign Inspection Service
//!
//! Provides `GET /api/campaigns/{campaign_id}`, letting an operator see what the
//! start hook captured for a running campaign.
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: `process` receives the `campaign_id` from the URL path.
//!
//! 2.  **Lookup**: the campaign registry is read; nothing is fetched from the
//!     attribute store.
//!
//! 3.  **HTTP Response**: a `CampaignSummary` with the subject template and the
//!     token table. Recipient values are never part of it.

use crate::campaign::state::CampaignsState;
use actix_web::{web, HttpResponse, Responder};

/// Actix web handler for `GET /api/campaigns/{campaign_id}`.
///
/// # Arguments
/// * `state` - The shared `CampaignsState`.
/// * `campaign_id` - The campaign to describe, from the URL path.
///
/// # Returns
/// - `200 OK` with the `CampaignSummary` as JSON.
/// - `404 Not Found` if no such campaign is running.
pub(crate) async fn process(
    state: web::Data<CampaignsState>,
    campaign_id: web::Path<String>,
) -> impl Responder {
    let campaigns = state.campaigns.read().await;
    match campaigns.get(campaign_id.as_str()) {
        Some(ctx) => HttpResponse::Ok().json(ctx.summary()),
        None => HttpResponse::NotFound().body("Campaign ID not found"),
    }
}
