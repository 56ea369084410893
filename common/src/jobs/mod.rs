use serde::{Deserialize, Serialize};

/// Status of a background job as reported to polling clients.
///
/// `Completed` carries a JSON payload whose shape depends on the job
/// (the subject preview job stores a list of `PreviewedSubject`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    InProgress(u32),
    Completed(String),
    Failed(String),
}
