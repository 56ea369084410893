use crate::model::message::OutgoingMessage;
use crate::model::place_holder::CampaignPlaceholderSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Payload of the campaign start hook.
/// `subject` is the raw subject template, captured once for the whole campaign.
pub struct StartCampaignRequest {
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartCampaignResponse {
    pub campaign_id: String,
    /// Literal tokens that matched a known attribute, in subject order.
    pub placeholders: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResponse {
    pub eligible: bool,
}

/// Payload of the message finalization hook: the message as it currently stands.
pub type FinalizeMessageRequest = OutgoingMessage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub campaign_id: String,
    pub subject: String,
    pub placeholders: CampaignPlaceholderSet,
}
