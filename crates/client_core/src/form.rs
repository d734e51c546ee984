use chrono::{Local, NaiveDateTime, NaiveTime};
use shared::{
    domain::OrganisationId,
    protocol::{CreateLeadData, Lead, UpdateLeadData},
};
/// Editable draft behind the lead modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadForm {
    pub organisation_id: OrganisationId,
    pub full_name: String,
    pub position: String,
    pub company: String,
    pub location: String,
    pub profile_url: String,
    pub followers: u64,
    pub connections: u64,
    pub education: String,
    pub personal_message: String,
    pub message_length: u64,
    pub generated_at: NaiveDateTime,
    pub total_leads: u64,
}

impl LeadForm {
    /// Empty draft for a new lead: text blank, counters zero, generated
    /// today.
    pub fn blank(organisation_id: OrganisationId) -> Self {
        Self::blank_at(
            organisation_id,
            Local::now().date_naive().and_time(NaiveTime::MIN),
        )
    }

    pub fn blank_at(organisation_id: OrganisationId, generated_at: NaiveDateTime) -> Self {
        Self {
            organisation_id,
            full_name: String::new(),
            position: String::new(),
            company: String::new(),
            location: String::new(),
            profile_url: String::new(),
            followers: 0,
            connections: 0,
            education: String::new(),
            personal_message: String::new(),
            message_length: 0,
            generated_at,
            total_leads: 0,
        }
    }

    pub fn from_lead(lead: &Lead) -> Self {
        Self {
            organisation_id: lead.organisation_id,
            full_name: lead.full_name.clone(),
            position: lead.position.clone(),
            company: lead.company.clone(),
            location: lead.location.clone(),
            profile_url: lead.profile_url.clone(),
            followers: lead.followers,
            connections: lead.connections,
            education: lead.education.clone(),
            personal_message: lead.personal_message.clone(),
            message_length: lead.message_length,
            generated_at: lead.generated_at,
            total_leads: lead.total_leads,
        }
    }

    /// Field-for-field copy of the draft. Nothing is checked here; the API
    /// decides what it accepts.
    pub fn to_create_data(&self) -> CreateLeadData {
        CreateLeadData {
            organisation_id: self.organisation_id,
            full_name: self.full_name.clone(),
            position: self.position.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            profile_url: self.profile_url.clone(),
            followers: self.followers,
            connections: self.connections,
            education: self.education.clone(),
            personal_message: self.personal_message.clone(),
            message_length: self.message_length,
            generated_at: self.generated_at,
            total_leads: self.total_leads,
        }
    }

    /// Only the fields that differ from `lead` end up in the patch.
    pub fn diff_against(&self, lead: &Lead) -> UpdateLeadData {
        UpdateLeadData {
            organisation_id: changed(&self.organisation_id, &lead.organisation_id),
            full_name: changed(&self.full_name, &lead.full_name),
            position: changed(&self.position, &lead.position),
            company: changed(&self.company, &lead.company),
            location: changed(&self.location, &lead.location),
            profile_url: changed(&self.profile_url, &lead.profile_url),
            followers: changed(&self.followers, &lead.followers),
            connections: changed(&self.connections, &lead.connections),
            education: changed(&self.education, &lead.education),
            personal_message: changed(&self.personal_message, &lead.personal_message),
            message_length: changed(&self.message_length, &lead.message_length),
            generated_at: changed(&self.generated_at, &lead.generated_at),
            total_leads: changed(&self.total_leads, &lead.total_leads),
        }
    }
}

fn changed<T: PartialEq + Clone>(draft: &T, current: &T) -> Option<T> {
    (draft != current).then(|| draft.clone())
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
