//! Per-campaign placeholder state and the three sending-pipeline hooks.
//!
//! A `CampaignContext` is created when a campaign starts and dropped when it
//! ends. Nothing about one campaign's placeholders outlives it or is visible
//! to another campaign.

use crate::attributes::{AttributeStore, StoreError};
use crate::config::DirectoryErrorPolicy;
use crate::placeholders::{parse_subject, rewrite_subject};
use common::model::message::OutgoingMessage;
use common::model::place_holder::CampaignPlaceholderSet;
use common::requests::CampaignSummary;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("could not read the attribute directory: {0}")]
    Directory(#[source] StoreError),

    #[error("campaign {0} not found")]
    NotFound(String),
}

#[derive(Debug)]
pub struct CampaignContext {
    id: String,
    subject: String,
    placeholders: CampaignPlaceholderSet,
    /// Bound tables waiting for their message to be finalized, by recipient.
    pending: HashMap<String, CampaignPlaceholderSet>,
}

impl CampaignContext {
    /// Campaign start hook: captures the subject and builds the token table
    /// against a freshly fetched attribute directory.
    ///
    /// With `DirectoryErrorPolicy::FailOpen` a directory failure yields a
    /// context with no placeholders; the subject is sent as written.
    pub fn start(
        id: impl Into<String>,
        subject: impl Into<String>,
        store: &dyn AttributeStore,
        policy: DirectoryErrorPolicy,
    ) -> Result<Self, CampaignError> {
        let id = id.into();
        let subject = subject.into();

        let known_names = match store.fetch_attribute_names() {
            Ok(names) => names,
            Err(e) if policy == DirectoryErrorPolicy::FailOpen => {
                log::warn!("Campaign {id}: attribute directory unavailable, subject left as is: {e}");
                Vec::new()
            }
            Err(e) => return Err(CampaignError::Directory(e)),
        };

        let placeholders = parse_subject(&subject, &known_names);
        log::info!(
            "Campaign {id} started with {} subject placeholder(s) from {} known attribute(s)",
            placeholders.len(),
            known_names.len()
        );

        Ok(Self {
            id,
            subject,
            placeholders,
            pending: HashMap::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn placeholders(&self) -> &CampaignPlaceholderSet {
        &self.placeholders
    }

    /// Keeps a recipient's bound table until their message is finalized.
    /// The table is resolved by the caller from a clone of `placeholders()`,
    /// so the store is never queried while the campaign is borrowed.
    pub fn park_bound(&mut self, recipient_id: &str, bound: CampaignPlaceholderSet) {
        self.pending.insert(recipient_id.to_string(), bound);
    }

    /// Message finalization hook: rewrites `message.subject` in place.
    ///
    /// The recipient's bound table is consumed. A recipient that never went
    /// through the eligibility hook gets the unbound table, i.e. fallbacks
    /// or empty strings.
    pub fn finalize_message(&mut self, message: &mut OutgoingMessage) {
        if self.placeholders.is_empty() {
            return;
        }
        let bound = self.pending.remove(&message.recipient_id).unwrap_or_else(|| {
            log::warn!(
                "Campaign {}: finalizing {} without resolved values",
                self.id,
                message.recipient_id
            );
            self.placeholders.clone()
        });
        message.subject = rewrite_subject(&bound, &message.subject);
    }

    pub fn pending_recipients(&self) -> usize {
        self.pending.len()
    }

    pub fn summary(&self) -> CampaignSummary {
        CampaignSummary {
            campaign_id: self.id.clone(),
            subject: self.subject.clone(),
            placeholders: self.placeholders.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::memory::MemoryStore;
    use crate::placeholders::resolve_for_recipient;

    fn eligible(ctx: &mut CampaignContext, store: &MemoryStore, recipient_id: &str) {
        let bound = resolve_for_recipient(ctx.placeholders(), store, recipient_id);
        ctx.park_bound(recipient_id, bound);
    }

    fn message(recipient_id: &str, subject: &str) -> OutgoingMessage {
        OutgoingMessage {
            recipient_id: recipient_id.to_string(),
            subject: subject.to_string(),
        }
    }

    fn send(ctx: &mut CampaignContext, store: &MemoryStore, recipient_id: &str) -> String {
        eligible(ctx, store, recipient_id);
        let mut msg = message(recipient_id, ctx.subject());
        ctx.finalize_message(&mut msg);
        msg.subject
    }

    #[test]
    fn misplaced_marker_is_left_verbatim() {
        let store = MemoryStore::with_names(&["Name", "City"])
            .recipient("ann", &[("Name", "Ann"), ("City", "dallas")])
            .recipient("bob", &[("Name", "Bob")]);
        let mut ctx = CampaignContext::start(
            "c1",
            "Hello [NAME], welcome to [CITY!?your town]",
            &store,
            DirectoryErrorPolicy::FailOpen,
        )
        .unwrap();

        // `[CITY!?your town]` is not a valid form; only [NAME] is bound.
        assert_eq!(ctx.placeholders().tokens(), vec!["[NAME]"]);
        assert_eq!(send(&mut ctx, &store, "ann"), "Hello Ann, welcome to [CITY!?your town]");
        assert_eq!(ctx.pending_recipients(), 0);
    }

    #[test]
    fn isolation_between_recipients() {
        let store = MemoryStore::with_names(&["Name", "City"])
            .recipient("ann", &[("Name", "Ann"), ("City", "dallas")])
            .recipient("bob", &[("Name", "Bob")]);
        let mut ctx = CampaignContext::start(
            "c1",
            "Hello [NAME], welcome to [CITY?your town!]",
            &store,
            DirectoryErrorPolicy::FailOpen,
        )
        .unwrap();

        assert_eq!(send(&mut ctx, &store, "ann"), "Hello Ann, welcome to DALLAS");
        assert_eq!(send(&mut ctx, &store, "bob"), "Hello Bob, welcome to YOUR TOWN");
    }

    #[test]
    fn eligibility_before_finalize_for_interleaved_recipients() {
        let store = MemoryStore::with_names(&["Name"])
            .recipient("ann", &[("Name", "Ann")])
            .recipient("bob", &[("Name", "Bob")]);
        let mut ctx =
            CampaignContext::start("c1", "For [name]", &store, DirectoryErrorPolicy::FailOpen).unwrap();

        eligible(&mut ctx, &store, "ann");
        eligible(&mut ctx, &store, "bob");
        let mut bob = message("bob", "For [name]");
        let mut ann = message("ann", "For [name]");
        ctx.finalize_message(&mut bob);
        ctx.finalize_message(&mut ann);
        assert_eq!(bob.subject, "For Bob");
        assert_eq!(ann.subject, "For Ann");
    }

    #[test]
    fn directory_failure_fails_open() {
        let mut store = MemoryStore::with_names(&["Name"]).recipient("ann", &[("Name", "Ann")]);
        store.directory_down = true;
        let mut ctx =
            CampaignContext::start("c1", "Hi [NAME]", &store, DirectoryErrorPolicy::FailOpen).unwrap();

        assert!(ctx.placeholders().is_empty());
        assert_eq!(send(&mut ctx, &store, "ann"), "Hi [NAME]");
        assert_eq!(store.lookups(), 0);
    }

    #[test]
    fn directory_failure_can_be_surfaced() {
        let mut store = MemoryStore::with_names(&["Name"]);
        store.directory_down = true;
        let err = CampaignContext::start("c1", "Hi [NAME]", &store, DirectoryErrorPolicy::Surface)
            .unwrap_err();
        assert!(matches!(err, CampaignError::Directory(_)));
    }

    #[test]
    fn finalize_without_eligibility_uses_fallback() {
        let store = MemoryStore::with_names(&["Name"]).recipient("ann", &[("Name", "Ann")]);
        let mut ctx =
            CampaignContext::start("c1", "[NAME?Subscriber] update", &store, DirectoryErrorPolicy::FailOpen)
                .unwrap();
        let mut msg = message("ann", "[NAME?Subscriber] update");
        ctx.finalize_message(&mut msg);
        assert_eq!(msg.subject, "Subscriber update");
    }

    #[test]
    fn finalize_rewrites_the_current_subject() {
        let store = MemoryStore::with_names(&["Name"]).recipient("ann", &[("Name", "Ann")]);
        let mut ctx =
            CampaignContext::start("c1", "Hi [NAME]", &store, DirectoryErrorPolicy::FailOpen).unwrap();
        eligible(&mut ctx, &store, "ann");
        let mut msg = message("ann", "[list] Hi [NAME]");
        ctx.finalize_message(&mut msg);
        assert_eq!(msg.subject, "[list] Hi Ann");
    }
}
