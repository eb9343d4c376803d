use crate::types::{VoteDirection, VoteTransition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field naming used by an item to store its aggregate tally.
///
/// Both conventions exist on live data; an item keeps whichever one it already has.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TallyNaming {
    /// `upvotes` / `downvotes`
    #[default]
    Plain,
    /// `upvoteCount` / `downvoteCount`
    Counted,
}

impl TallyNaming {
    pub fn upvotes_field(&self) -> &'static str {
        match self {
            TallyNaming::Plain => "upvotes",
            TallyNaming::Counted => "upvoteCount",
        }
    }

    pub fn downvotes_field(&self) -> &'static str {
        match self {
            TallyNaming::Plain => "downvotes",
            TallyNaming::Counted => "downvoteCount",
        }
    }

    /// Detects the naming used by an item document.
    ///
    /// Documents carrying neither convention default to `Plain`.
    pub fn detect(fields: &Map<String, Value>) -> Self {
        let counted = TallyNaming::Counted;
        if fields.contains_key(counted.upvotes_field()) || fields.contains_key(counted.downvotes_field()) {
            TallyNaming::Counted
        } else {
            TallyNaming::Plain
        }
    }
}

/// Aggregated up/down counts of an item together with the naming they were read with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ItemTally {
    pub upvotes: i64,
    pub downvotes: i64,
    pub naming: TallyNaming,
}

impl ItemTally {
    pub fn new(upvotes: i64, downvotes: i64, naming: TallyNaming) -> Self {
        Self {
            upvotes,
            downvotes,
            naming,
        }
    }

    /// Reads the tally from an item document. Missing, negative or non-integer counts read as zero.
    pub fn read_from(fields: &Map<String, Value>) -> Self {
        let naming = TallyNaming::detect(fields);
        Self {
            upvotes: read_count(fields, naming.upvotes_field()),
            downvotes: read_count(fields, naming.downvotes_field()),
            naming,
        }
    }

    /// Writes both counts back under the detected naming, leaving every other field untouched.
    pub fn write_into(&self, fields: &mut Map<String, Value>) {
        fields.insert(self.naming.upvotes_field().into(), Value::from(self.upvotes));
        fields.insert(self.naming.downvotes_field().into(), Value::from(self.downvotes));
    }

    pub fn score(&self) -> i64 {
        self.upvotes.saturating_sub(self.downvotes)
    }

    /// Applies a vote transition. Counts stay within `0..=i64::MAX`.
    pub fn apply(&mut self, transition: &VoteTransition) {
        if let Some(removed) = transition.removed {
            let count = self.count_mut(removed);
            *count = count.saturating_sub(1).max(0);
        }
        if let Some(added) = transition.added {
            let count = self.count_mut(added);
            *count = count.saturating_add(1);
        }
    }

    fn count_mut(&mut self, direction: VoteDirection) -> &mut i64 {
        match direction {
            VoteDirection::Up => &mut self.upvotes,
            VoteDirection::Down => &mut self.downvotes,
        }
    }
}

fn read_count(fields: &Map<String, Value>, name: &str) -> i64 {
    match fields.get(name) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .unwrap_or(0)
            .max(0),
        _ => 0,
    }
}

/// Reason recorded on items hidden by the downvote threshold.
pub const AUTO_HIDE_REASON: &str = "auto_downvotes";

/// An externally owned item as stored: an open set of fields of which the
/// ledger only interprets the tally and the moderation flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ItemDocument {
    pub fields: Map<String, Value>,
}

impl ItemDocument {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builds a document from a JSON value. Non-object values produce an empty document.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    pub fn tally(&self) -> ItemTally {
        ItemTally::read_from(&self.fields)
    }

    pub fn set_tally(&mut self, tally: &ItemTally) {
        tally.write_into(&mut self.fields);
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self.fields.get("isHidden"), Some(Value::Bool(true)))
    }

    /// Marks the item hidden. Returns `false` if it already was.
    pub fn mark_hidden(&mut self, reason: &str, at: DateTime<Utc>) -> bool {
        if self.is_hidden() {
            return false;
        }
        self.fields.insert("isHidden".into(), Value::Bool(true));
        self.fields.insert("hiddenAt".into(), Value::String(at.to_rfc3339()));
        self.fields.insert("hiddenReason".into(), Value::String(reason.into()));
        true
    }
}
