//! Confidence scorer: selects exactly one extracted value per field.

use crate::locate::{Candidate, Strategy};
use crate::page::NormalizedText;
use crate::record::{ExtractedValue, SourceSpan};
use crate::schema::{FieldSpec, ValueKind};
use crate::value::{self, MetricValue, Parsed};
use serde::Serialize;
use tracing::debug;

/// Categorical trust tier attached to an extracted value.
///
/// Used by downstream review, not a numeric probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Explicit label-value pairing matched.
    High,
    /// Value found near a label within one sentence or row.
    Medium,
    /// Presence-only evidence, or absence of mention for a flag.
    Low,
    /// Nothing matched; the value is the schema default.
    None,
}

impl Confidence {
    pub(crate) const fn from_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Labeled => Self::High,
            Strategy::Proximity => Self::Medium,
            Strategy::Presence => Self::Low,
        }
    }

    /// Ordering rank; higher means more trusted.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::None => 0,
        }
    }
}

/// Resolves a field's candidates into one value.
///
/// Strategy tiers are tried best-first; within a tier the first unambiguous
/// parse in document order wins, then the first ambiguous one. A candidate
/// that fails parsing is discarded and the next-best takes its place. With no
/// surviving candidate, booleans default to `false`/low (absence of mention
/// is weak evidence, not proof of absence) and everything else to the schema
/// default with `none` confidence.
pub(crate) fn select(
    spec: &FieldSpec,
    candidates: &[Candidate],
    text: &NormalizedText,
) -> ExtractedValue {
    for strategy in [Strategy::Labeled, Strategy::Proximity, Strategy::Presence] {
        let mut fallback: Option<(&Candidate, Parsed)> = None;
        for candidate in candidates.iter().filter(|c| c.strategy == strategy) {
            match value::parse(&candidate.raw, spec) {
                Ok(parsed) if !parsed.ambiguous => {
                    return winner(candidate, parsed, text);
                }
                Ok(parsed) => {
                    if fallback.is_none() {
                        fallback = Some((candidate, parsed));
                    }
                }
                Err(err) => {
                    debug!(field = %spec.key(), raw = %candidate.raw, %err, "candidate discarded");
                }
            }
        }
        if let Some((candidate, parsed)) = fallback {
            return winner(candidate, parsed, text);
        }
    }

    if spec.kind() == ValueKind::Boolean {
        return ExtractedValue {
            value: MetricValue::Flag(false),
            confidence: Confidence::Low,
            span: None,
        };
    }
    ExtractedValue {
        value: spec.default_value(),
        confidence: Confidence::None,
        span: None,
    }
}

fn winner(candidate: &Candidate, parsed: Parsed, text: &NormalizedText) -> ExtractedValue {
    ExtractedValue {
        value: parsed.value,
        confidence: Confidence::from_strategy(candidate.strategy),
        span: Some(SourceSpan {
            start: candidate.start,
            end: candidate.end,
            html_offset: text.source_offset(candidate.start),
            matched: candidate.raw.clone(),
        }),
    }
}
