use crate::types::VoteDirection;

/// Effect of a single `vote` call on one voter's vote and on the item tally.
///
/// Casting the direction already held toggles the vote off; casting the other
/// direction switches it; casting from no vote adds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    /// Direction whose count loses one.
    pub removed: Option<VoteDirection>,
    /// Direction whose count gains one.
    pub added: Option<VoteDirection>,
}

impl VoteTransition {
    pub fn compute(existing: Option<VoteDirection>, requested: VoteDirection) -> Self {
        let (removed, added) = match (existing, requested) {
            (Some(current), requested) if current == requested => (Some(current), None),
            (Some(current), requested) => (Some(current), Some(requested)),
            (None, requested) => (None, Some(requested)),
        };
        Self { removed, added }
    }

    /// The voter's vote once the transition is applied. `None` means the record is deleted.
    pub fn resulting_vote(&self) -> Option<VoteDirection> {
        self.added
    }

    pub fn is_toggle_off(&self) -> bool {
        self.removed.is_some() && self.added.is_none()
    }
}
