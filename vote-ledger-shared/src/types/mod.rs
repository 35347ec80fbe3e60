mod changeset;
mod direction;
mod entity_ref;
mod tally;
mod vote;
mod vote_query;
mod window;

pub use changeset::{Changeset, ChangesetOutcome};
pub use direction::{Direction, ParseDirectionError, VoteFilter};
pub use entity_ref::EntityRef;
pub use tally::{TallyEntry, TallyQuery};
pub use vote::{NewVote, Vote, VoteId, VotePair};
pub use vote_query::VoteQuery;
pub use window::TimeWindow;
