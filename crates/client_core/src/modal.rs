//! Secondary surfaces of the leads screen: the create/edit modal and the
//! delete confirmation dialog. They are tracked independently.

use shared::{domain::LeadId, protocol::Lead};

use crate::form::LeadForm;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditModalState {
    #[default]
    Closed,
    OpenForCreate {
        form: LeadForm,
    },
    OpenForEdit {
        lead: Lead,
        form: LeadForm,
    },
}

impl EditModalState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn form(&self) -> Option<&LeadForm> {
        match self {
            Self::Closed => None,
            Self::OpenForCreate { form } | Self::OpenForEdit { form, .. } => Some(form),
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut LeadForm> {
        match self {
            Self::Closed => None,
            Self::OpenForCreate { form } | Self::OpenForEdit { form, .. } => Some(form),
        }
    }

    pub fn editing(&self) -> Option<&Lead> {
        match self {
            Self::OpenForEdit { lead, .. } => Some(lead),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfirmDialogState {
    #[default]
    Closed,
    OpenPendingDelete(LeadId),
}

impl ConfirmDialogState {
    pub fn pending_delete(&self) -> Option<LeadId> {
        match self {
            Self::Closed => None,
            Self::OpenPendingDelete(id) => Some(*id),
        }
    }
}
