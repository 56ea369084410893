//! # Recipient Eligibility Hook
//!
//! Provides `POST /api/campaigns/{campaign_id}/recipients/{recipient_id}/eligible`,
//! called by the sending pipeline for each recipient before the message is built.
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: `process` receives the campaign and recipient IDs from the path.
//!
//! 2.  **Resolution**: `CampaignsState::recipient_eligible` fetches the recipient's
//!     attribute values and parks them in the campaign until finalization.
//!
//! 3.  **HTTP Response**: always `200 OK` with `{"eligible": true}`. This hook only
//!     piggybacks on the eligibility check to fetch data; an unknown campaign (for
//!     example after a restart) is logged and the recipient is still eligible.

use crate::campaign::state::CampaignsState;
use actix_web::{web, HttpResponse, Responder};
use common::requests::EligibilityResponse;

/// Actix web handler for the eligibility hook.
///
/// # Arguments
/// * `state` - The shared `CampaignsState`.
/// * `path` - `(campaign_id, recipient_id)` from the URL.
///
/// # Returns
/// `200 OK` with an `EligibilityResponse` whose `eligible` is always `true`.
pub(crate) async fn process(
    state: web::Data<CampaignsState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (campaign_id, recipient_id) = path.into_inner();
    let eligible = match state.recipient_eligible(&campaign_id, &recipient_id).await {
        Ok(eligible) => eligible,
        Err(e) => {
            log::warn!("Eligibility for {recipient_id} without placeholder values: {e}");
            true
        }
    };
    HttpResponse::Ok().json(EligibilityResponse { eligible })
}
