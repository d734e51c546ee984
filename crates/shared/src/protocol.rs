use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, de::Error as _, Deserialize, Deserializer, Serialize};

use crate::domain::{LeadId, OrganisationId};

/// A prospect contact as stored by the leads API.
///
/// `id`, `created_at` and `updated_at` are owned by the server and passed
/// through untouched. `message_length` is whatever the server reports; it is
/// not recomputed from `personal_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub organisation_id: OrganisationId,
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profile_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub followers: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub personal_message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message_length: u64,
    #[serde(with = "generated_at_format")]
    pub generated_at: NaiveDateTime,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_leads: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLeadData {
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
    #[serde(with = "generated_at_format")]
    pub generated_at: NaiveDateTime,
    pub total_leads: u64,
}

/// Partial update of a lead. The target id travels in the request path,
/// never in this body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLeadData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation_id: Option<OrganisationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_length: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_generated_at_format"
    )]
    pub generated_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_leads: Option<u64>,
}

impl UpdateLeadData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the present fields onto `lead`, leaving server-owned fields
    /// alone.
    pub fn apply_to(&self, lead: &mut Lead) {
        if let Some(v) = self.organisation_id {
            lead.organisation_id = v;
        }
        if let Some(v) = &self.full_name {
            lead.full_name = v.clone();
        }
        if let Some(v) = &self.position {
            lead.position = v.clone();
        }
        if let Some(v) = &self.company {
            lead.company = v.clone();
        }
        if let Some(v) = &self.location {
            lead.location = v.clone();
        }
        if let Some(v) = &self.profile_url {
            lead.profile_url = v.clone();
        }
        if let Some(v) = self.followers {
            lead.followers = v;
        }
        if let Some(v) = self.connections {
            lead.connections = v;
        }
        if let Some(v) = &self.education {
            lead.education = v.clone();
        }
        if let Some(v) = &self.personal_message {
            lead.personal_message = v.clone();
        }
        if let Some(v) = self.message_length {
            lead.message_length = v;
        }
        if let Some(v) = self.generated_at {
            lead.generated_at = v;
        }
        if let Some(v) = self.total_leads {
            lead.total_leads = v;
        }
    }
}

/// Nullable columns come back as `null`; treat them like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Some deployments wrap payloads as `{"data": ...}`, others return them bare.
#[derive(Debug, Clone)]
pub enum DataEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> DataEnvelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(data) => data,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for DataEnvelope<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Decoding the chosen shape directly keeps the field-level error.
        let mut value = serde_json::Value::deserialize(deserializer)?;
        let wrapped = value.as_object_mut().and_then(|map| map.remove("data"));
        match wrapped {
            Some(data) => serde_json::from_value(data)
                .map(|data| Self::Wrapped { data })
                .map_err(D::Error::custom),
            None => serde_json::from_value(value)
                .map(Self::Bare)
                .map_err(D::Error::custom),
        }
    }
}

pub mod generated_at_format {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|value| value.naive_utc())
            })
    }

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid generated_at: {raw}")))
    }
}

mod optional_generated_at_format {
    use chrono::NaiveDateTime;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use super::generated_at_format;

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => generated_at_format::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|raw| {
            generated_at_format::parse(&raw)
                .ok_or_else(|| D::Error::custom(format!("invalid generated_at: {raw}")))
        })
        .transpose()
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
