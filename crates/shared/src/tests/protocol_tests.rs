use super::*;

const SAMPLE_LEAD: &str = r#"{
    "id": 2,
    "organisation_id": 9,
    "full_name": "John doe Doe",
    "position": "Senior 22Software Engineer",
    "company": "TechCorp International",
    "location": "Paris, France",
    "profile_url": "https://www.linkedin.com/in/johndoe",
    "followers": 1500,
    "connections": 500,
    "education": "Master in Computer Science",
    "personal_message": "Hello, nice to connect! Updated message",
    "message_length": 35,
    "generated_at": "2025-01-31 00:00:00",
    "total_leads": 1,
    "created_at": "2025-12-02T21:38:57.000000Z",
    "updated_at": "2025-12-02T21:39:50.000000Z"
}"#;

#[test]
fn decodes_api_lead_payload() {
    let lead: Lead = serde_json::from_str(SAMPLE_LEAD).expect("lead");
    assert_eq!(lead.id, LeadId(2));
    assert_eq!(lead.organisation_id, OrganisationId(9));
    assert_eq!(lead.full_name, "John doe Doe");
    assert_eq!(lead.followers, 1500);
    assert_eq!(
        lead.generated_at.format("%Y-%m-%d").to_string(),
        "2025-01-31"
    );
    assert_eq!(
        lead.created_at.to_rfc3339(),
        "2025-12-02T21:38:57+00:00"
    );
}

#[test]
fn message_length_is_passed_through_even_when_inconsistent() {
    let lead: Lead = serde_json::from_str(SAMPLE_LEAD).expect("lead");
    assert_ne!(lead.personal_message.chars().count() as u64, lead.message_length);
    assert_eq!(lead.message_length, 35);
}

#[test]
fn generated_at_accepts_date_only_and_rfc3339() {
    let date_only = generated_at_format::parse("2025-02-15").expect("date only");
    assert_eq!(date_only.to_string(), "2025-02-15 00:00:00");

    let rfc = generated_at_format::parse("2025-02-15T08:30:00Z").expect("rfc3339");
    assert_eq!(rfc.to_string(), "2025-02-15 08:30:00");

    assert!(generated_at_format::parse("15/02/2025").is_none());
}

#[test]
fn generated_at_serializes_in_api_format() {
    let lead: Lead = serde_json::from_str(SAMPLE_LEAD).expect("lead");
    let value = serde_json::to_value(&lead).expect("encode");
    assert_eq!(value["generated_at"], "2025-01-31 00:00:00");
}

#[test]
fn update_payload_only_carries_present_fields() {
    let update = UpdateLeadData {
        position: Some("Staff Engineer".to_string()),
        ..UpdateLeadData::default()
    };
    let value = serde_json::to_value(&update).expect("encode");
    assert_eq!(value, serde_json::json!({ "position": "Staff Engineer" }));
    assert!(!update.is_empty());
    assert!(UpdateLeadData::default().is_empty());
}

#[test]
fn apply_to_leaves_server_owned_fields_alone() {
    let mut lead: Lead = serde_json::from_str(SAMPLE_LEAD).expect("lead");
    let before = lead.clone();
    UpdateLeadData {
        position: Some("Staff Engineer".to_string()),
        followers: Some(1600),
        ..UpdateLeadData::default()
    }
    .apply_to(&mut lead);

    assert_eq!(lead.position, "Staff Engineer");
    assert_eq!(lead.followers, 1600);
    assert_eq!(lead.id, before.id);
    assert_eq!(lead.created_at, before.created_at);
    assert_eq!(lead.updated_at, before.updated_at);
    assert_eq!(lead.company, before.company);
}

#[test]
fn envelope_accepts_wrapped_and_bare_lists() {
    let bare: DataEnvelope<Vec<Lead>> =
        serde_json::from_str(&format!("[{SAMPLE_LEAD}]")).expect("bare");
    assert_eq!(bare.into_inner().len(), 1);

    let wrapped: DataEnvelope<Vec<Lead>> =
        serde_json::from_str(&format!(r#"{{"data": [{SAMPLE_LEAD}]}}"#)).expect("wrapped");
    assert_eq!(wrapped.into_inner()[0].id, LeadId(2));

    let single: DataEnvelope<Lead> = serde_json::from_str(SAMPLE_LEAD).expect("single");
    assert_eq!(single.into_inner().company, "TechCorp International");
}

#[test]
fn null_optional_columns_decode_as_defaults() {
    let mut value: serde_json::Value = serde_json::from_str(SAMPLE_LEAD).expect("json");
    value["education"] = serde_json::Value::Null;
    value["followers"] = serde_json::Value::Null;

    let leads: DataEnvelope<Vec<Lead>> =
        serde_json::from_value(serde_json::json!({ "data": [value] })).expect("list");
    let lead = &leads.into_inner()[0];

    assert_eq!(lead.education, "");
    assert_eq!(lead.followers, 0);
    assert_eq!(lead.company, "TechCorp International");
}

#[test]
fn envelope_decode_error_names_the_bad_field() {
    let mut value: serde_json::Value = serde_json::from_str(SAMPLE_LEAD).expect("json");
    value["generated_at"] = serde_json::json!("yesterday");

    let err = serde_json::from_value::<DataEnvelope<Vec<Lead>>>(serde_json::json!({
        "data": [value]
    }))
    .expect_err("bad generated_at");

    assert!(err.to_string().contains("invalid generated_at: yesterday"));
}
