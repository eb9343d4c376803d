use crate::types::{VoteDirection, VoterId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while decoding a stored vote document.
#[derive(Debug, Error)]
pub enum VoteRecordError {
    #[error("Vote record for voter {0} has neither a vote type nor a signed value")]
    MissingDirection(String),

    #[error("Unknown vote type: {0}")]
    UnknownVoteType(String),

    #[error("Malformed vote record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A voter's vote on a single item, normalized to the direction-label form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub voter_id: VoterId,
    #[serde(rename = "voteType")]
    pub direction: VoteDirection,
    pub created_at: Option<DateTime<Utc>>,
}

impl VoteRecord {
    pub fn new(voter_id: VoterId, direction: VoteDirection, created_at: DateTime<Utc>) -> Self {
        Self {
            voter_id,
            direction,
            created_at: Some(created_at),
        }
    }

    /// Encodes the record as a stored document. Always emits the label encoding.
    pub fn to_document(&self) -> Value {
        let mut fields = serde_json::Map::new();
        fields.insert("voterId".into(), Value::String(self.voter_id.to_string()));
        fields.insert("voteType".into(), Value::String(self.direction.as_str().into()));
        if let Some(created_at) = self.created_at {
            fields.insert("createdAt".into(), Value::String(created_at.to_rfc3339()));
        }
        Value::Object(fields)
    }

    /// Decodes a stored document, accepting both the label and the legacy numeric encoding.
    ///
    /// `voter_id` is the key the document was stored under and is used when the
    /// document itself does not carry one.
    pub fn from_document(document: Value, voter_id: &VoterId) -> Result<Self, VoteRecordError> {
        let stored: StoredVote = serde_json::from_value(document)?;
        stored.normalize(voter_id)
    }
}

/// Raw shape of a vote document as found in the store.
///
/// Older records carry `value: 1 | -1` instead of `voteType`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredVote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Number>,
    /// Unreadable timestamps decode as `None` and are rewritten on the next vote.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl StoredVote {
    pub fn normalize(self, key: &VoterId) -> Result<VoteRecord, VoteRecordError> {
        let voter_id = self.voter_id.map(VoterId::from).unwrap_or_else(|| key.clone());

        let direction = match (self.vote_type, self.value) {
            (Some(label), _) => label
                .parse::<VoteDirection>()
                .map_err(VoteRecordError::UnknownVoteType)?,
            (None, Some(value)) => signed_direction(&value)
                .ok_or_else(|| VoteRecordError::MissingDirection(voter_id.to_string()))?,
            (None, None) => return Err(VoteRecordError::MissingDirection(voter_id.to_string())),
        };

        Ok(VoteRecord {
            voter_id,
            direction,
            created_at: self.created_at,
        })
    }
}

/// Accepts RFC 3339 strings, `{seconds|_seconds, nanoseconds|_nanoseconds}`
/// objects and epoch milliseconds.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(timestamp_from_value))
}

fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        Value::Object(fields) => {
            let field = |a: &str, b: &str| fields.get(a).or_else(|| fields.get(b)).and_then(Value::as_i64);
            let seconds = field("_seconds", "seconds")?;
            let nanos = field("_nanoseconds", "nanoseconds").unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        _ => None,
    }
}

fn signed_direction(value: &serde_json::Number) -> Option<VoteDirection> {
    if let Some(int) = value.as_i64() {
        return VoteDirection::from_signed(int);
    }
    match value.as_f64() {
        Some(float) if float > 0.0 => Some(VoteDirection::Up),
        Some(float) if float < 0.0 => Some(VoteDirection::Down),
        _ => None,
    }
}
