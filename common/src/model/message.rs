use serde::{Deserialize, Serialize};

/// The part of an outgoing message this service is allowed to touch.
///
/// The sending pipeline hands one of these over at finalization time and
/// sends whatever `subject` holds afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub recipient_id: String,
    pub subject: String,
}

/// One row of a subject preview job result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewedSubject {
    pub recipient_id: String,
    pub subject: String,
}
