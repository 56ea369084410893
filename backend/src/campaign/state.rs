//! Shared registry of running campaigns.
//!
//! `CampaignsState` is created in `main.rs` and handed to every handler as
//! `web::Data`. Each entry is the `CampaignContext` built by the start hook;
//! it is removed when the pipeline reports the campaign as ended.

use crate::attributes::AttributeStore;
use crate::campaign::context::{CampaignContext, CampaignError};
use crate::config::DirectoryErrorPolicy;
use crate::placeholders::resolve_for_recipient;
use common::model::message::OutgoingMessage;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct CampaignsState {
    /// Campaign ID -> its context.
    pub campaigns: Arc<RwLock<HashMap<String, CampaignContext>>>,
    /// Subscriber attribute data, shared by all campaigns.
    pub store: Arc<dyn AttributeStore>,
    pub policy: DirectoryErrorPolicy,
}

impl CampaignsState {
    pub fn new(store: Arc<dyn AttributeStore>, policy: DirectoryErrorPolicy) -> Self {
        Self {
            campaigns: Arc::new(RwLock::new(HashMap::new())),
            store,
            policy,
        }
    }

    /// Starts a campaign and registers its context under `campaign_id`.
    /// Restarting an ID replaces the old context, so the directory is re-read.
    pub async fn start(&self, campaign_id: &str, subject: &str) -> Result<Vec<String>, CampaignError> {
        let ctx = CampaignContext::start(campaign_id, subject, self.store.as_ref(), self.policy)?;
        let tokens = ctx.placeholders().tokens();
        self.campaigns
            .write()
            .await
            .insert(campaign_id.to_string(), ctx);
        Ok(tokens)
    }

    /// Eligibility hook: binds the recipient's values for the upcoming
    /// finalization and always answers `true` for a known campaign.
    ///
    /// The token table is cloned under a read lock and the store lookup runs
    /// on the blocking pool with no lock held; the write lock is only taken
    /// to park the result.
    pub async fn recipient_eligible(&self, campaign_id: &str, recipient_id: &str) -> Result<bool, CampaignError> {
        let placeholders = {
            let campaigns = self.campaigns.read().await;
            campaigns
                .get(campaign_id)
                .ok_or_else(|| CampaignError::NotFound(campaign_id.to_string()))?
                .placeholders()
                .clone()
        };
        if placeholders.is_empty() {
            return Ok(true);
        }

        let store = self.store.clone();
        let recipient = recipient_id.to_string();
        let bound = match tokio::task::spawn_blocking(move || {
            resolve_for_recipient(&placeholders, store.as_ref(), &recipient)
        })
        .await
        {
            Ok(bound) => bound,
            Err(e) => {
                log::warn!("Campaign {campaign_id}: resolving {recipient_id} failed: {e}");
                return Ok(true);
            }
        };

        match self.campaigns.write().await.get_mut(campaign_id) {
            Some(ctx) => ctx.park_bound(recipient_id, bound),
            None => log::warn!("Campaign {campaign_id} ended while {recipient_id} was being resolved"),
        }
        Ok(true)
    }

    /// Finalization hook: rewrites `message.subject` with the recipient's
    /// parked values.
    pub async fn finalize(&self, campaign_id: &str, message: &mut OutgoingMessage) -> Result<(), CampaignError> {
        let mut campaigns = self.campaigns.write().await;
        let ctx = campaigns
            .get_mut(campaign_id)
            .ok_or_else(|| CampaignError::NotFound(campaign_id.to_string()))?;
        ctx.finalize_message(message);
        Ok(())
    }

    pub async fn end(&self, campaign_id: &str) -> Result<(), CampaignError> {
        match self.campaigns.write().await.remove(campaign_id) {
            Some(ctx) => {
                if ctx.pending_recipients() > 0 {
                    log::warn!(
                        "Campaign {} ended with {} recipient(s) never finalized",
                        ctx.id(),
                        ctx.pending_recipients()
                    );
                } else {
                    log::info!("Campaign {} ended", ctx.id());
                }
                Ok(())
            }
            None => Err(CampaignError::NotFound(campaign_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{RecipientValues, StoreError};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::OnceLock;

    type Registry = Arc<RwLock<HashMap<String, CampaignContext>>>;

    /// Records whether the campaign registry could be locked for writing
    /// while a recipient lookup was in progress.
    #[derive(Default)]
    struct RegistryWatchStore {
        registry: OnceLock<Registry>,
        lookups: AtomicUsize,
        registry_free_during_lookup: AtomicBool,
    }

    impl AttributeStore for RegistryWatchStore {
        fn fetch_attribute_names(&self) -> Result<Vec<String>, StoreError> {
            Ok(vec!["Name".to_string()])
        }

        fn fetch_recipient_values(&self, _recipient_id: &str) -> Result<RecipientValues, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            let free = self
                .registry
                .get()
                .map(|registry| registry.try_write().is_ok())
                .unwrap_or(false);
            self.registry_free_during_lookup.store(free, Ordering::SeqCst);
            Ok([("Name".to_string(), Some("Ann".to_string()))].into_iter().collect())
        }

        fn fetch_recipient_ids(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn message(recipient_id: &str, subject: &str) -> OutgoingMessage {
        OutgoingMessage {
            recipient_id: recipient_id.to_string(),
            subject: subject.to_string(),
        }
    }

    #[actix_web::test]
    async fn lookup_runs_without_holding_the_registry() {
        let store = Arc::new(RegistryWatchStore::default());
        let state = CampaignsState::new(store.clone(), DirectoryErrorPolicy::FailOpen);
        let _ = store.registry.set(state.campaigns.clone());

        state.start("c1", "Hi [NAME]").await.unwrap();
        assert!(state.recipient_eligible("c1", "ann").await.unwrap());
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
        assert!(store.registry_free_during_lookup.load(Ordering::SeqCst));

        let mut msg = message("ann", "Hi [NAME]");
        state.finalize("c1", &mut msg).await.unwrap();
        assert_eq!(msg.subject, "Hi Ann");
    }

    #[actix_web::test]
    async fn unknown_campaign_is_reported_to_the_caller() {
        let state = CampaignsState::new(Arc::new(RegistryWatchStore::default()), DirectoryErrorPolicy::FailOpen);
        assert!(matches!(
            state.recipient_eligible("gone", "ann").await,
            Err(CampaignError::NotFound(_))
        ));
        let mut msg = message("ann", "Hi [NAME]");
        assert!(matches!(
            state.finalize("gone", &mut msg).await,
            Err(CampaignError::NotFound(_))
        ));
        assert_eq!(msg.subject, "Hi [NAME]");
    }

    #[actix_web::test]
    async fn campaign_without_tokens_skips_the_store() {
        let store = Arc::new(RegistryWatchStore::default());
        let state = CampaignsState::new(store.clone(), DirectoryErrorPolicy::FailOpen);
        state.start("c1", "Plain subject").await.unwrap();
        assert!(state.recipient_eligible("c1", "ann").await.unwrap());
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }
}
