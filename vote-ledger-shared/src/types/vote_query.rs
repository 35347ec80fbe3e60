use serde::{Deserialize, Serialize};

use crate::types::{Direction, EntityRef, TimeWindow, Vote, VoteFilter, VotePair};

/// Criteria selecting a subset of the ledger.
///
/// Every field narrows the selection; the default query matches every vote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteQuery {
    pub voter: Option<EntityRef>,
    pub voteable: Option<EntityRef>,
    pub voteable_kind: Option<String>,
    pub direction: Option<Direction>,
    pub window: TimeWindow,
}

impl VoteQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_voter(voter: &EntityRef) -> Self {
        Self {
            voter: Some(voter.clone()),
            ..Self::default()
        }
    }

    pub fn on_voteable(voteable: &EntityRef) -> Self {
        Self {
            voteable: Some(voteable.clone()),
            ..Self::default()
        }
    }

    pub fn for_pair(pair: &VotePair) -> Self {
        Self {
            voter: Some(pair.voter.clone()),
            voteable: Some(pair.voteable.clone()),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: VoteFilter) -> Self {
        self.direction = filter.direction();
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn of_kind(mut self, kind: Option<&str>) -> Self {
        self.voteable_kind = kind.map(str::to_string);
        self
    }

    pub fn within(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Returns true if `vote` satisfies every criterion of this query.
    pub fn matches(&self, vote: &Vote) -> bool {
        self.voter.as_ref().is_none_or(|voter| &vote.voter == voter)
            && self.voteable.as_ref().is_none_or(|voteable| &vote.voteable == voteable)
            && self
                .voteable_kind
                .as_deref()
                .is_none_or(|kind| vote.voteable.is_kind(kind))
            && self.direction.is_none_or(|direction| vote.direction == direction)
            && self.window.contains(vote.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn make_vote(direction: Direction) -> Vote {
        let now = Utc::now();
        Vote {
            id: 1,
            voter: EntityRef::new("User", 1),
            voteable: EntityRef::new("Item", 1),
            direction,
            points: direction.signed_points(1),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_default_matches_everything() {
        assert!(VoteQuery::all().matches(&make_vote(Direction::Up)));
        assert!(VoteQuery::all().matches(&make_vote(Direction::Down)));
    }

    #[test]
    fn test_filters_narrow() {
        let vote = make_vote(Direction::Up);
        let pair = VotePair::new(vote.voter.clone(), vote.voteable.clone());

        assert!(VoteQuery::for_pair(&pair).matches(&vote));
        assert!(!VoteQuery::by_voter(&EntityRef::new("User", 2)).matches(&vote));
        assert!(!VoteQuery::all().with_filter(VoteFilter::Down).matches(&vote));
        assert!(VoteQuery::all().of_kind(Some("Item")).matches(&vote));
        assert!(!VoteQuery::all().of_kind(Some("PcItem")).matches(&vote));
        assert!(
            !VoteQuery::all()
                .within(TimeWindow::since(Utc::now() + Duration::days(1)))
                .matches(&vote)
        );
    }
}
