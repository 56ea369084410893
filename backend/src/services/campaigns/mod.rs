//! # Campaign Hook Service
//!
//! HTTP surface the sending pipeline calls at the three points where subject
//! placeholders are involved, plus a few routes for operators.
//!
//! - `POST /api/campaigns/start`: campaign start hook. Takes the raw subject,
//!   reads the attribute directory and builds the token table. Returns the new
//!   `campaign_id` and the tokens that were recognised.
//! - `POST /api/campaigns/{campaign_id}/recipients/{recipient_id}/eligible`:
//!   eligibility hook. Fetches the recipient's attribute values; always answers
//!   `{"eligible": true}`.
//! - `POST /api/campaigns/{campaign_id}/finalize`: finalization hook. Takes the
//!   message (`recipient_id`, current `subject`) and returns it with the
//!   subject rewritten.
//! - `GET /api/campaigns/{campaign_id}`: the captured subject and token table.
//! - `DELETE /api/campaigns/{campaign_id}`: campaign finished, drop its state.
//! - `POST /api/campaigns/{campaign_id}/preview`: background job rendering the
//!   subject for every recipient in the store.
//! - `GET /api/campaigns/preview/status/{job_id}`: poll a preview job.

mod end;
mod finalize;
mod get;
mod preview;
mod preview_status;
mod recipient;
mod start;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/campaigns";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/start", post().to(start::process))
        .route("/preview/status/{job_id}", get().to(preview_status::process))
        .route("/{campaign_id}", get().to(get::process))
        .route("/{campaign_id}", delete().to(end::process))
        .route(
            "/{campaign_id}/recipients/{recipient_id}/eligible",
            post().to(recipient::process),
        )
        .route("/{campaign_id}/finalize", post().to(finalize::process))
        .route("/{campaign_id}/preview", post().to(preview::process))
}
