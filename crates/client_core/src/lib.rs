//! Client-side view of the lead collection.
//!
//! [`LeadsController`] owns the lead snapshot, the request status and the
//! state of the edit modal and delete dialog. The remote collection is the
//! source of truth: every successful mutation is followed by a full refetch,
//! and nothing is inserted, patched or removed locally. The snapshot may
//! therefore lag the server by one round trip.
//!
//! Refreshes are not cancelled. If two refreshes overlap, the one that
//! completes last is the one left on screen, even if it was issued first.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use shared::{
    domain::{LeadId, OrganisationId},
    protocol::{CreateLeadData, Lead, UpdateLeadData},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub mod config;
pub mod form;
pub mod http;
pub mod modal;
pub mod repository;

pub use form::LeadForm;
pub use http::HttpLeadRepository;
pub use modal::{ConfirmDialogState, EditModalState};
pub use repository::{InMemoryLeadRepository, LeadRepository, RepositoryError};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch leads.";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save lead.";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete lead.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LeadsStatus {
    #[default]
    Idle,
    Loading,
    Error(String),
}

impl LeadsStatus {
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Read-only copy of everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadsSnapshot {
    pub leads: Vec<Lead>,
    pub status: LeadsStatus,
    pub edit_modal: EditModalState,
    pub confirm_dialog: ConfirmDialogState,
}

#[derive(Debug, Clone)]
pub enum LeadsEvent {
    StateChanged(LeadsSnapshot),
}

#[derive(Default)]
struct LeadsState {
    view: LeadsSnapshot,
    last_applied_refresh: u64,
}

enum Submission {
    Create(CreateLeadData),
    Update(LeadId, UpdateLeadData),
}

pub struct LeadsController {
    repository: Arc<dyn LeadRepository>,
    default_organisation: OrganisationId,
    inner: Mutex<LeadsState>,
    mounted: AtomicBool,
    refresh_seq: AtomicU64,
    events: broadcast::Sender<LeadsEvent>,
}

impl LeadsController {
    pub fn new(repository: Arc<dyn LeadRepository>) -> Arc<Self> {
        Self::new_with_organisation(repository, OrganisationId(0))
    }

    pub fn new_with_organisation(
        repository: Arc<dyn LeadRepository>,
        default_organisation: OrganisationId,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            repository,
            default_organisation,
            inner: Mutex::new(LeadsState::default()),
            mounted: AtomicBool::new(false),
            refresh_seq: AtomicU64::new(0),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<LeadsEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> LeadsSnapshot {
        self.inner.lock().await.view.clone()
    }

    /// Applies `change` under the state lock and notifies subscribers.
    async fn update_state<R>(&self, change: impl FnOnce(&mut LeadsState) -> R) -> R {
        let mut guard = self.inner.lock().await;
        let result = change(&mut guard);
        let _ = self
            .events
            .send(LeadsEvent::StateChanged(guard.view.clone()));
        result
    }

    async fn set_error(&self, message: &str) {
        self.update_state(|state| state.view.status = LeadsStatus::Error(message.to_string()))
            .await;
    }

    /// Initial load. Only the first call fetches.
    pub async fn mount(&self) {
        if self.mounted.swap(true, Ordering::SeqCst) {
            debug!("leads view already mounted");
            return;
        }
        self.refresh().await;
    }

    pub async fn refresh(&self) {
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.update_state(|state| state.view.status = LeadsStatus::Loading)
            .await;

        match self.repository.list().await {
            Ok(leads) => {
                let count = leads.len();
                self.update_state(|state| {
                    if seq < state.last_applied_refresh {
                        warn!(
                            seq,
                            newest = state.last_applied_refresh,
                            "refresh landed out of order; applying older snapshot"
                        );
                    }
                    state.last_applied_refresh = state.last_applied_refresh.max(seq);
                    state.view.leads = leads;
                    state.view.status = LeadsStatus::Idle;
                })
                .await;
                debug!(seq, count, "lead list refreshed");
            }
            Err(err) => {
                warn!(seq, error = %err, "lead list refresh failed");
                self.set_error(FETCH_FAILED_MESSAGE).await;
            }
        }
    }

    pub async fn create(&self, data: CreateLeadData) {
        match self.repository.create(data).await {
            Ok(lead) => {
                info!(lead_id = %lead.id, "lead created");
                self.settle_save().await;
            }
            Err(err) => {
                warn!(error = %err, "lead create failed");
                self.set_error(SAVE_FAILED_MESSAGE).await;
            }
        }
    }

    pub async fn update(&self, id: LeadId, data: UpdateLeadData) {
        match self.repository.update(id, data).await {
            Ok(lead) => {
                info!(lead_id = %lead.id, "lead updated");
                self.settle_save().await;
            }
            Err(err) => {
                warn!(lead_id = %id, error = %err, "lead update failed");
                self.set_error(SAVE_FAILED_MESSAGE).await;
            }
        }
    }

    async fn settle_save(&self) {
        self.refresh().await;
        self.update_state(|state| state.view.edit_modal = EditModalState::Closed)
            .await;
    }

    /// Row-level delete action. Only asks for confirmation; see
    /// [`LeadsController::confirm`].
    pub async fn remove(&self, id: LeadId) {
        self.request_delete(id).await;
    }

    pub async fn request_delete(&self, id: LeadId) {
        debug!(lead_id = %id, "delete requested");
        self.update_state(|state| {
            state.view.confirm_dialog = ConfirmDialogState::OpenPendingDelete(id)
        })
        .await;
    }

    pub async fn cancel(&self) {
        self.update_state(|state| state.view.confirm_dialog = ConfirmDialogState::Closed)
            .await;
    }

    /// Deletes the pending target, refreshes on success and closes the
    /// dialog whatever the outcome.
    pub async fn confirm(&self) {
        let pending = self.inner.lock().await.view.confirm_dialog.pending_delete();
        let Some(id) = pending else {
            debug!("confirm without a pending delete");
            return;
        };

        match self.repository.delete(id).await {
            Ok(()) => {
                info!(lead_id = %id, "lead deleted");
                self.refresh().await;
                self.update_state(|state| {
                    state.view.confirm_dialog = ConfirmDialogState::Closed
                })
                .await;
            }
            Err(err) => {
                warn!(lead_id = %id, error = %err, "lead delete failed");
                self.update_state(|state| {
                    state.view.status = LeadsStatus::Error(DELETE_FAILED_MESSAGE.to_string());
                    state.view.confirm_dialog = ConfirmDialogState::Closed;
                })
                .await;
            }
        }
    }

    pub async fn open_create(&self) {
        let form = LeadForm::blank(self.default_organisation);
        self.update_state(|state| state.view.edit_modal = EditModalState::OpenForCreate { form })
            .await;
    }

    pub async fn open_edit(&self, lead: Lead) {
        let form = LeadForm::from_lead(&lead);
        self.update_state(|state| {
            state.view.edit_modal = EditModalState::OpenForEdit { lead, form }
        })
        .await;
    }

    /// Mutates the open form's draft. Returns `false` when no modal is open.
    pub async fn edit_form(&self, edit: impl FnOnce(&mut LeadForm)) -> bool {
        self.update_state(|state| match state.view.edit_modal.form_mut() {
            Some(form) => {
                edit(form);
                true
            }
            None => false,
        })
        .await
    }

    /// Closes the modal, dropping any unsaved draft.
    pub async fn close(&self) {
        self.update_state(|state| state.view.edit_modal = EditModalState::Closed)
            .await;
    }

    /// Converts the open draft into a create or update and runs it. The draft
    /// is sent as-is; a rejection from the API is a save failure.
    pub async fn submit(&self) {
        let submission = {
            let guard = self.inner.lock().await;
            match &guard.view.edit_modal {
                EditModalState::Closed => None,
                EditModalState::OpenForCreate { form } => {
                    Some(Submission::Create(form.to_create_data()))
                }
                EditModalState::OpenForEdit { lead, form } => {
                    Some(Submission::Update(lead.id, form.diff_against(lead)))
                }
            }
        };

        match submission {
            None => debug!("submit without an open modal"),
            Some(Submission::Create(data)) => self.create(data).await,
            Some(Submission::Update(id, patch)) => self.update(id, patch).await,
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
