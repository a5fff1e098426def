use serde::{Deserialize, Serialize};

/// The coarse architectural role assigned to a class by the stereotype
/// detector (§4.6). `Unknown` is the only variant the detector may assign
/// below the 0.5 confidence threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Stereotype {
    Controller,
    Service,
    Repository,
    Entity,
    Dto,
    Configuration,
    Utility,
    Factory,
    Builder,
    Middleware,
    Guard,
    Filter,
    Validator,
    Mapper,
    Client,
    Handler,
    Provider,
    Module,
    Unknown,
}

impl Stereotype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stereotype::Controller => "Controller",
            Stereotype::Service => "Service",
            Stereotype::Repository => "Repository",
            Stereotype::Entity => "Entity",
            Stereotype::Dto => "DTO",
            Stereotype::Configuration => "Configuration",
            Stereotype::Utility => "Utility",
            Stereotype::Factory => "Factory",
            Stereotype::Builder => "Builder",
            Stereotype::Middleware => "Middleware",
            Stereotype::Guard => "Guard",
            Stereotype::Filter => "Filter",
            Stereotype::Validator => "Validator",
            Stereotype::Mapper => "Mapper",
            Stereotype::Client => "Client",
            Stereotype::Handler => "Handler",
            Stereotype::Provider => "Provider",
            Stereotype::Module => "Module",
            Stereotype::Unknown => "Unknown",
        }
    }

    pub fn all() -> &'static [Stereotype] {
        &[
            Stereotype::Controller,
            Stereotype::Service,
            Stereotype::Repository,
            Stereotype::Entity,
            Stereotype::Dto,
            Stereotype::Configuration,
            Stereotype::Utility,
            Stereotype::Factory,
            Stereotype::Builder,
            Stereotype::Middleware,
            Stereotype::Guard,
            Stereotype::Filter,
            Stereotype::Validator,
            Stereotype::Mapper,
            Stereotype::Client,
            Stereotype::Handler,
            Stereotype::Provider,
            Stereotype::Module,
        ]
    }
}

/// One scored candidate from the stereotype detector's signal pass. The
/// detector keeps the highest-scoring candidate with `score >= MIN_CONFIDENCE`,
/// breaking ties by score order (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StereotypeScore {
    pub stereotype: Stereotype,
    pub score: f64,
    pub signals: Vec<String>,
}

pub const MIN_STEREOTYPE_CONFIDENCE: f64 = 0.5;

/// Picks the best-scoring stereotype, defaulting to `Unknown` when nothing
/// clears the confidence threshold or the candidate list is empty.
pub fn best_stereotype(mut candidates: Vec<StereotypeScore>) -> StereotypeScore {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    match candidates.into_iter().next() {
        Some(top) if top.score >= MIN_STEREOTYPE_CONFIDENCE => top,
        _ => StereotypeScore {
            stereotype: Stereotype::Unknown,
            score: 0.0,
            signals: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_highest_scoring_candidate_above_threshold() {
        let candidates = vec![
            StereotypeScore {
                stereotype: Stereotype::Utility,
                score: 0.4,
                signals: vec!["naming".to_string()],
            },
            StereotypeScore {
                stereotype: Stereotype::Service,
                score: 0.8,
                signals: vec!["annotation".to_string()],
            },
        ];
        let best = best_stereotype(candidates);
        assert_eq!(best.stereotype, Stereotype::Service);
    }

    #[test]
    fn falls_back_to_unknown_below_threshold() {
        let candidates = vec![StereotypeScore {
            stereotype: Stereotype::Utility,
            score: 0.2,
            signals: vec![],
        }];
        let best = best_stereotype(candidates);
        assert_eq!(best.stereotype, Stereotype::Unknown);
    }

    #[test]
    fn empty_candidates_defaults_to_unknown() {
        let best = best_stereotype(vec![]);
        assert_eq!(best.stereotype, Stereotype::Unknown);
    }
}
