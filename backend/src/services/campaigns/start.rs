//! Campaign start hook.
//!
//! The subject template is only available here, so it is captured together
//! with the token table. The directory is read fresh for every campaign.

use crate::campaign::state::CampaignsState;
use actix_web::{web, HttpResponse, Responder};
use common::requests::{StartCampaignRequest, StartCampaignResponse};
use uuid::Uuid;

/// `POST /api/campaigns/start`
///
/// - `200 OK` with `StartCampaignResponse`.
/// - `503 Service Unavailable` if the directory could not be read and the
///   service is configured to surface that instead of failing open.
pub(crate) async fn process(
    state: web::Data<CampaignsState>,
    payload: web::Json<StartCampaignRequest>,
) -> impl Responder {
    let campaign_id = Uuid::new_v4().to_string();
    match state.start(&campaign_id, &payload.subject).await {
        Ok(placeholders) => HttpResponse::Ok().json(StartCampaignResponse {
            campaign_id,
            placeholders,
        }),
        Err(e) => {
            log::error!("Campaign start failed: {e}");
            HttpResponse::ServiceUnavailable().body(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::memory::MemoryStore;
    use crate::config::DirectoryErrorPolicy;
    use crate::services::campaigns::test_support::{campaigns, demo_store};
    use actix_web::{test, App};
    use std::sync::Arc;

    #[actix_web::test]
    async fn returns_recognised_tokens() {
        let state = campaigns(demo_store());
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(crate::services::campaigns::configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/campaigns/start")
            .set_json(StartCampaignRequest {
                subject: "Hello [NAME], welcome to [CITY!] [PROMO]".to_string(),
            })
            .to_request();
        let resp: StartCampaignResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.placeholders, vec!["[NAME]", "[CITY!]"]);
        assert!(state.campaigns.read().await.contains_key(&resp.campaign_id));
    }

    #[actix_web::test]
    async fn surfaced_directory_failure_is_503() {
        let mut store = MemoryStore::with_names(&["Name"]);
        store.directory_down = true;
        let state = web::Data::new(CampaignsState::new(Arc::new(store), DirectoryErrorPolicy::Surface));
        let app = test::init_service(
            App::new()
                .app_data(state)
                .service(crate::services::campaigns::configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/campaigns/start")
            .set_json(StartCampaignRequest {
                subject: "Hi [NAME]".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::SERVICE_UNAVAILABLE);
    }
}
