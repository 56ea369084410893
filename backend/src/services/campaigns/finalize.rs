//! # Message Finalization Hook
//!
//! Provides `POST /api/campaigns/{campaign_id}/finalize`, the last point before
//! transport at which the subject may change.
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: `process` receives the message as it currently stands
//!     (`recipient_id` and `subject`). The subject is rewritten as received, so
//!     changes the pipeline made after the campaign started are preserved.
//!
//! 2.  **Rewrite**: `CampaignsState::finalize` applies the recipient's parked
//!     values to the subject.
//!
//! 3.  **HTTP Response**: `200 OK` with the message. For an unknown campaign the
//!     failure is logged and the message is handed back unchanged, so sending
//!     is never held up here.

use crate::campaign::state::CampaignsState;
use actix_web::{web, HttpResponse, Responder};
use common::requests::FinalizeMessageRequest;

/// Actix web handler for the finalization hook.
///
/// # Arguments
/// * `state` - The shared `CampaignsState`.
/// * `campaign_id` - The campaign the message belongs to, from the URL path.
/// * `payload` - The message to finalize.
///
/// # Returns
/// `200 OK` with the message, its subject rewritten when the campaign is known.
pub(crate) async fn process(
    state: web::Data<CampaignsState>,
    campaign_id: web::Path<String>,
    payload: web::Json<FinalizeMessageRequest>,
) -> impl Responder {
    let mut message = payload.into_inner();
    if let Err(e) = state.finalize(&campaign_id, &mut message).await {
        log::warn!("Subject for {} sent as is: {}", message.recipient_id, e);
    }
    HttpResponse::Ok().json(message)
}
