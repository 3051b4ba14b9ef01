//! The canonical sales stage set.
//!
//! Canonical stages are tenant-independent. Tenants map their own CRM
//! pipeline stages onto this set via [`StageMapping`](crate::pipeline::StageMapping);
//! everything downstream (playbooks, enforcement, audit) speaks only
//! canonical stages.

use serde::{Deserialize, Serialize};

/// A tenant-independent point in the sales process graph.
///
/// `ClosedWon` and `ClosedLost` are terminal: no transition leaves
/// them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalStage {
    ProspectIdentified,
    InitialContact,
    Qualified,
    MeetingScheduled,
    ProposalSent,
    Negotiation,
    VerbalCommit,
    ClosedWon,
    ClosedLost,
}

impl CanonicalStage {
    /// All canonical stages, in process order.
    pub fn all() -> [CanonicalStage; 9] {
        [
            Self::ProspectIdentified,
            Self::InitialContact,
            Self::Qualified,
            Self::MeetingScheduled,
            Self::ProposalSent,
            Self::Negotiation,
            Self::VerbalCommit,
            Self::ClosedWon,
            Self::ClosedLost,
        ]
    }

    /// Terminal stages have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ClosedWon | Self::ClosedLost)
    }

    pub fn is_won(&self) -> bool {
        matches!(self, Self::ClosedWon)
    }

    pub fn is_lost(&self) -> bool {
        matches!(self, Self::ClosedLost)
    }

    /// The snake_case wire name used in external CRM payloads and
    /// audit records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProspectIdentified => "prospect_identified",
            Self::InitialContact => "initial_contact",
            Self::Qualified => "qualified",
            Self::MeetingScheduled => "meeting_scheduled",
            Self::ProposalSent => "proposal_sent",
            Self::Negotiation => "negotiation",
            Self::VerbalCommit => "verbal_commit",
            Self::ClosedWon => "closed_won",
            Self::ClosedLost => "closed_lost",
        }
    }

    /// Parse a canonical stage from its wire name.
    pub fn parse(s: &str) -> Option<CanonicalStage> {
        Self::all().into_iter().find(|stage| stage.as_str() == s)
    }
}

impl std::fmt::Display for CanonicalStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
