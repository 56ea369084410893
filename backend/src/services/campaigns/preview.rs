//! # Subject Preview Job
//!
//! `POST /api/campaigns/{campaign_id}/preview` renders the campaign subject for
//! every recipient in the attribute store, so an operator can check the
//! placeholders before the real send.
//!
//! ## Workflow
//!
//! 1. The handler snapshots the campaign's subject and token table, registers a
//!    `Pending` job and returns its `job_id` straight away.
//! 2. A Tokio task runs `preview_blocking` through `spawn_blocking`; store
//!    lookups are synchronous SQLite calls.
//! 3. `preview_blocking` resolves and rewrites each recipient on the rayon pool.
//!    Every recipient binds values into its own copy of the table, so the work
//!    shares nothing mutable.
//! 4. Progress goes out as `PreviewUpdate`s, which a listener task converts to
//!    `JobUpdate`s for the job controller, dropping counts that arrive after a
//!    higher one. The final status is sent only after
//!    the listener has drained, and carries the list of `PreviewedSubject`s as
//!    JSON in `JobStatus::Completed`.
//!
//! Nothing here touches the campaign's pending recipients.

use crate::attributes::AttributeStore;
use crate::campaign::state::CampaignsState;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::placeholders::{resolve_for_recipient, rewrite_subject};
use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::model::message::PreviewedSubject;
use common::model::place_holder::CampaignPlaceholderSet;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug)]
pub enum PreviewUpdate {
    Job(JobStatus),
    Recipient { done: usize, total: usize },
}

/// Everything the worker needs, detached from the campaign registry.
struct PreviewInput {
    subject: String,
    placeholders: CampaignPlaceholderSet,
    store: Arc<dyn AttributeStore>,
}

pub(crate) async fn process(
    campaigns: web::Data<CampaignsState>,
    jobs: web::Data<JobsState>,
    campaign_id: web::Path<String>,
) -> impl Responder {
    let input = {
        let registry = campaigns.campaigns.read().await;
        match registry.get(campaign_id.as_str()) {
            Some(ctx) => PreviewInput {
                subject: ctx.subject().to_string(),
                placeholders: ctx.placeholders().clone(),
                store: campaigns.store.clone(),
            },
            None => return HttpResponse::NotFound().body("Campaign ID not found"),
        }
    };

    let job_id = schedule_preview_job(jobs, input).await;
    HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id }))
}

async fn schedule_preview_job(jobs: web::Data<JobsState>, input: PreviewInput) -> String {
    let job_id = Uuid::new_v4().to_string();
    jobs.jobs
        .write()
        .await
        .insert(job_id.clone(), JobStatus::Pending);

    let tx = jobs.tx.clone();
    let job_id_for_task = job_id.clone();

    tokio::spawn(async move {
        let (preview_tx, mut preview_rx) = mpsc::channel::<PreviewUpdate>(100);

        let updater_tx = tx.clone();
        let job_id_for_updater = job_id_for_task.clone();
        let listener = tokio::spawn(async move {
            let mut progress = ProgressTracker::default();
            while let Some(update) = preview_rx.recv().await {
                let status = match update {
                    PreviewUpdate::Job(status) => status,
                    PreviewUpdate::Recipient { done, total } => match progress.observe(done, total) {
                        Some(pct) => JobStatus::InProgress(pct),
                        None => continue,
                    },
                };
                let _ = updater_tx
                    .send(JobUpdate {
                        job_id: job_id_for_updater.clone(),
                        status,
                    })
                    .await;
            }
        });

        let handle = tokio::task::spawn_blocking(move || preview_blocking(preview_tx, input));

        let outcome = handle.await;
        // Drain progress first so it cannot land after the final status.
        let _ = listener.await;

        let status = match outcome {
            Ok(Ok(subjects)) => match serde_json::to_string(&subjects) {
                Ok(json) => JobStatus::Completed(json),
                Err(e) => JobStatus::Failed(e.to_string()),
            },
            Ok(Err(e)) => JobStatus::Failed(e),
            Err(e) => JobStatus::Failed(format!("Task join error: {}", e)),
        };
        let _ = tx
            .send(JobUpdate {
                job_id: job_id_for_task,
                status,
            })
            .await;
    });

    job_id
}

/// Recipient counts arrive from several rayon threads in any order; only
/// counts above the highest seen so far are reported, so progress never
/// goes backwards.
#[derive(Default)]
struct ProgressTracker {
    highest: usize,
}

impl ProgressTracker {
    fn observe(&mut self, done: usize, total: usize) -> Option<u32> {
        if done <= self.highest {
            return None;
        }
        self.highest = done;
        Some(percent(done, total))
    }
}

fn percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    (done * 100 / total) as u32
}

fn preview_blocking(
    tx: mpsc::Sender<PreviewUpdate>,
    input: PreviewInput,
) -> Result<Vec<PreviewedSubject>, String> {
    let _ = tx.blocking_send(PreviewUpdate::Job(JobStatus::InProgress(0)));

    let recipients = input
        .store
        .fetch_recipient_ids()
        .map_err(|e| format!("Could not list recipients: {}", e))?;
    let total = recipients.len();
    let done = AtomicUsize::new(0);

    let subjects = recipients
        .into_par_iter()
        .map(|recipient_id| {
            let bound = resolve_for_recipient(&input.placeholders, input.store.as_ref(), &recipient_id);
            let subject = rewrite_subject(&bound, &input.subject);
            let done = done.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = tx.blocking_send(PreviewUpdate::Recipient { done, total });
            PreviewedSubject { recipient_id, subject }
        })
        .collect();

    Ok(subjects)
}
