use chrono::NaiveDate;

use super::*;
use crate::repository::sample_leads;

fn first_sample() -> Lead {
    sample_leads().remove(0)
}

#[test]
fn blank_form_zeroes_counters() {
    let generated_at = NaiveDate::from_ymd_opt(2026, 10, 18)
        .expect("date")
        .and_time(NaiveTime::MIN);
    let form = LeadForm::blank_at(OrganisationId(9), generated_at);

    assert_eq!(form.followers, 0);
    assert_eq!(form.connections, 0);
    assert_eq!(form.message_length, 0);
    assert_eq!(form.total_leads, 0);
    assert_eq!(form.generated_at, generated_at);
    assert!(form.full_name.is_empty());
}

#[test]
fn create_data_copies_the_draft() {
    let mut form = LeadForm::blank(OrganisationId(9));
    form.full_name = "Ada Lovelace".to_string();
    form.company = "Analytical Engines".to_string();

    let data = form.to_create_data();

    assert_eq!(data.full_name, "Ada Lovelace");
    assert_eq!(data.company, "Analytical Engines");
    assert_eq!(data.organisation_id, OrganisationId(9));
    assert_eq!(data.generated_at, form.generated_at);
}

#[test]
fn blank_name_is_passed_through_unchecked() {
    let mut form = LeadForm::blank(OrganisationId(9));
    form.full_name = "   ".to_string();

    assert_eq!(form.to_create_data().full_name, "   ");
}

#[test]
fn untouched_edit_form_produces_empty_patch() {
    let lead = first_sample();
    let patch = LeadForm::from_lead(&lead).diff_against(&lead);
    assert!(patch.is_empty());
}

#[test]
fn edit_form_patch_carries_only_changes() {
    let lead = first_sample();
    let mut form = LeadForm::from_lead(&lead);
    form.position = "Staff Engineer".to_string();
    form.followers = 1600;

    let patch = form.diff_against(&lead);

    assert_eq!(
        patch,
        UpdateLeadData {
            position: Some("Staff Engineer".to_string()),
            followers: Some(1600),
            ..UpdateLeadData::default()
        }
    );
}

#[test]
fn message_length_is_not_recomputed() {
    let lead = first_sample();
    let mut form = LeadForm::from_lead(&lead);
    form.personal_message = "Short".to_string();

    let patch = form.diff_against(&lead);

    assert_eq!(patch.personal_message.as_deref(), Some("Short"));
    assert_eq!(patch.message_length, None);
}
