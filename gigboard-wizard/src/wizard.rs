//! Listing wizard state machine
//!
//! Three linear steps: details → requirements → review. The cursor moves by
//! exactly one per transition. Moving forward requires the current step's
//! predicate to hold at the moment of the request; moving back never does.
//! Going back from the first step leaves the wizard instead of underflowing.
//!
//! Every accepted mutation (field edit or step change) is written to the
//! [`DraftStore`] before it becomes visible in memory, so a reload always
//! rehydrates the last state the user saw.

use chrono::Utc;
use gigboard_common::events::{EventBus, WizardEvent};
use gigboard_common::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::advisor::{self, Hint};
use crate::models::{Actor, DraftRecord, FieldUpdate, ListingId, WizardStep};
use crate::publish::{PublishCoordinator, PublishError};
use crate::store::DraftStore;

/// Outcome of a `next` / `back` request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "step", rename_all = "camelCase")]
pub enum Transition {
    /// Moved forward to this step
    Advanced(WizardStep),
    /// Moved back to this step
    Retreated(WizardStep),
    /// Current step's predicate failed; cursor unchanged
    Blocked(WizardStep),
    /// Already on the last step; cursor unchanged
    Unchanged(WizardStep),
    /// Back from the first step: the user left the wizard
    Exited,
}

/// Session status alongside the step cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "listingId", rename_all = "camelCase")]
pub enum WizardStatus {
    Editing,
    /// A publish is in flight; re-submission is refused
    Publishing,
    /// Terminal success; the draft has been discarded
    Published(ListingId),
    /// The user backed out of the first step
    Exited,
}

/// One wizard session over one durable draft slot
pub struct ListingWizard {
    record: DraftRecord,
    store: DraftStore,
    status: WizardStatus,
    event_bus: Option<EventBus>,
}

impl ListingWizard {
    /// Rehydrate the stored draft, or start from an empty one
    pub async fn open(store: DraftStore) -> Result<Self> {
        let record = match store.load().await? {
            Some(record) => {
                info!(step = record.step.number(), "Resuming stored listing draft");
                record
            }
            None => DraftRecord::default(),
        };

        Ok(Self {
            record,
            store,
            status: WizardStatus::Editing,
            event_bus: None,
        })
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn record(&self) -> &DraftRecord {
        &self.record
    }

    pub fn step(&self) -> WizardStep {
        self.record.step
    }

    pub fn status(&self) -> &WizardStatus {
        &self.status
    }

    pub fn is_publishing(&self) -> bool {
        self.status == WizardStatus::Publishing
    }

    /// Predicate for `step`, evaluated on the current field values
    pub fn is_valid(&self, step: WizardStep) -> bool {
        self.record.is_step_valid(step)
    }

    /// Whether `next` would advance right now
    pub fn can_advance(&self) -> bool {
        self.step().next().is_some() && self.is_valid(self.step())
    }

    /// Replace one field and persist the draft
    pub async fn update_field(&mut self, update: FieldUpdate) -> Result<()> {
        let field = update.field_name();
        let mut next = self.record.clone();
        next.apply(update)?;

        self.commit(next).await?;
        self.resume_editing();
        debug!(field, step = self.step().number(), "Draft field updated");
        Ok(())
    }

    /// Advance one step if the current step is valid
    pub async fn next(&mut self) -> Result<Transition> {
        let from = self.step();
        let Some(to) = from.next() else {
            return Ok(Transition::Unchanged(from));
        };

        if !self.is_valid(from) {
            debug!(step = from.number(), "Advance blocked by step validation");
            return Ok(Transition::Blocked(from));
        }

        self.move_to(to).await?;
        Ok(Transition::Advanced(to))
    }

    /// Go back one step, or exit from the first step
    pub async fn back(&mut self) -> Result<Transition> {
        let from = self.step();
        let Some(to) = from.previous() else {
            if !self.is_publishing() {
                self.status = WizardStatus::Exited;
            }
            info!("Listing wizard exited from the first step");
            self.emit(WizardEvent::WizardExited {
                timestamp: Utc::now(),
            });
            return Ok(Transition::Exited);
        };

        self.move_to(to).await?;
        Ok(Transition::Retreated(to))
    }

    /// Hint for the current step
    pub fn advice(&self) -> Hint {
        advisor::advise(self.step(), &self.record)
    }

    /// Apply the current hint's action, if it has one
    ///
    /// Returns whether the draft changed.
    pub async fn apply_advice(&mut self) -> Result<bool> {
        let Some(action) = self.advice().action else {
            return Ok(false);
        };

        let mut preview = self.record.clone();
        preview.apply(action.clone())?;
        if preview == self.record {
            return Ok(false);
        }

        self.update_field(action).await?;
        Ok(true)
    }

    /// Mark a publish as started and snapshot the draft to commit
    ///
    /// Refused while another publish is in flight or before the review step.
    pub fn begin_publish(&mut self) -> std::result::Result<DraftRecord, PublishError> {
        if self.is_publishing() {
            return Err(PublishError::PublishInFlight);
        }
        if self.step() != WizardStep::Review {
            return Err(PublishError::NotOnReview(self.step()));
        }

        self.status = WizardStatus::Publishing;
        Ok(self.record.clone())
    }

    /// Record the outcome of the publish started by [`begin_publish`](Self::begin_publish)
    ///
    /// On success the in-memory draft is reset and the stored slot is cleared
    /// again, discarding any edit made while the publish was in flight. On
    /// failure the draft is left as it is, including a cursor the user moved
    /// during the publish.
    pub async fn finish_publish(&mut self, result: &std::result::Result<ListingId, PublishError>) {
        match result {
            Ok(listing_id) => {
                if let Err(e) = self.store.clear().await {
                    warn!(listing_id = %listing_id, error = %e, "Published draft could not be cleared");
                }
                self.record = DraftRecord::default();
                self.status = WizardStatus::Published(listing_id.clone());
            }
            Err(_) => {
                self.status = WizardStatus::Editing;
            }
        }
    }

    /// Publish the current draft through `coordinator`
    ///
    /// For callers that own the wizard exclusively for the whole publish.
    pub async fn publish(
        &mut self,
        coordinator: &PublishCoordinator,
        actor: Option<&Actor>,
    ) -> std::result::Result<ListingId, PublishError> {
        let snapshot = self.begin_publish()?;
        let result = coordinator.publish(&snapshot, actor).await;
        self.finish_publish(&result).await;
        result
    }

    async fn move_to(&mut self, to: WizardStep) -> Result<()> {
        let from = self.step();
        let mut next = self.record.clone();
        next.step = to;

        self.commit(next).await?;
        self.resume_editing();
        info!(from = from.number(), to = to.number(), "Wizard step changed");
        self.emit(WizardEvent::StepChanged {
            from: from.number(),
            to: to.number(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Persist first, then expose in memory
    async fn commit(&mut self, next: DraftRecord) -> Result<()> {
        self.store.save(&next).await?;
        self.record = next;
        self.emit(WizardEvent::DraftSaved {
            step: self.record.step.number(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    fn resume_editing(&mut self) {
        if matches!(self.status, WizardStatus::Exited | WizardStatus::Published(_)) {
            self.status = WizardStatus::Editing;
        }
    }

    fn emit(&self, event: WizardEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(event);
        }
    }
}
