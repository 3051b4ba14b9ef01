//! Stage transition validation against a pipeline's allowed graph.
//!
//! The validator takes no action — it returns a check the caller acts
//! on. On rejection the check carries the full list of legal next
//! stages so callers can self-correct.

use dealgate_types::CanonicalStage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The outcome of validating one requested transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionCheck {
    pub valid: bool,
    pub from: CanonicalStage,
    pub to: CanonicalStage,
    /// The legal next stages from `from` — populated on both valid
    /// and invalid results
    pub next_allowed: Vec<CanonicalStage>,
}

impl TransitionCheck {
    /// Human-readable denial text; empty for valid checks.
    pub fn reason(&self) -> String {
        if self.valid {
            return String::new();
        }
        if self.next_allowed.is_empty() {
            format!("stage '{}' is terminal or unknown, no transitions allowed", self.from)
        } else {
            format!(
                "transition '{}' -> '{}' is not in the pipeline graph; allowed: {}",
                self.from,
                self.to,
                self.next_allowed
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }
    }
}

/// Check a requested `(from, to)` transition against the allowed
/// graph. Valid iff `to` appears in `allowed_transitions[from]`.
/// Terminal stages (empty lists) and stages absent from the map fail
/// every attempt.
pub fn validate_transition(
    from: CanonicalStage,
    to: CanonicalStage,
    allowed_transitions: &HashMap<CanonicalStage, Vec<CanonicalStage>>,
) -> TransitionCheck {
    let next_allowed = allowed_transitions.get(&from).cloned().unwrap_or_default();
    let valid = next_allowed.contains(&to);

    TransitionCheck {
        valid,
        from,
        to,
        next_allowed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealgate_types::{PipelineConfiguration, PipelineId, TenantId};

    fn default_graph() -> HashMap<CanonicalStage, Vec<CanonicalStage>> {
        PipelineConfiguration::default_nine_stage(
            TenantId::new("t"),
            PipelineId::new("p"),
        )
        .allowed_transitions
    }

    #[test]
    fn test_valid_transition() {
        let check = validate_transition(
            CanonicalStage::Qualified,
            CanonicalStage::MeetingScheduled,
            &default_graph(),
        );
        assert!(check.valid);
        assert!(check.reason().is_empty());
    }

    #[test]
    fn test_invalid_transition_carries_legal_list() {
        let graph = default_graph();
        let check = validate_transition(
            CanonicalStage::Qualified,
            CanonicalStage::ClosedWon,
            &graph,
        );
        assert!(!check.valid);
        assert_eq!(check.next_allowed, graph[&CanonicalStage::Qualified]);
        assert!(check.reason().contains("meeting_scheduled"));
    }

    #[test]
    fn test_terminal_stage_rejects_everything() {
        let graph = default_graph();
        for to in CanonicalStage::all() {
            let check = validate_transition(CanonicalStage::ClosedWon, to, &graph);
            assert!(!check.valid);
            assert!(check.next_allowed.is_empty());
        }
    }

    #[test]
    fn test_unknown_from_stage_rejects() {
        let mut graph = default_graph();
        graph.remove(&CanonicalStage::Negotiation);

        let check = validate_transition(
            CanonicalStage::Negotiation,
            CanonicalStage::VerbalCommit,
            &graph,
        );
        assert!(!check.valid);
        assert!(check.next_allowed.is_empty());
        assert!(check.reason().contains("terminal or unknown"));
    }

    #[test]
    fn test_every_disallowed_pair_rejected() {
        let graph = default_graph();
        for from in CanonicalStage::all() {
            for to in CanonicalStage::all() {
                let check = validate_transition(from, to, &graph);
                let legal = graph.get(&from).cloned().unwrap_or_default();
                assert_eq!(check.valid, legal.contains(&to), "{} -> {}", from, to);
                // Rejections carry the full legal list for self-correction
                assert_eq!(check.next_allowed, legal);
            }
        }
    }
}
