//! Field locator: ordered pattern strategies producing value candidates.

use crate::page::NormalizedText;
use crate::schema::{FieldSpec, ValueKind};
use serde::Serialize;

/// Matching strategy, in fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Label synonym directly followed by a value-shaped token.
    Labeled,
    /// Nearest value-shaped token to a synonym within a sentence or row.
    Proximity,
    /// Bare synonym occurrence; boolean fields only.
    Presence,
}

/// An unconfirmed text span proposed as the value of one field.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Start offset in the normalized text.
    pub start: usize,
    /// End offset in the normalized text, exclusive.
    pub end: usize,
    /// Strategy that proposed the span.
    pub strategy: Strategy,
    /// Raw captured value text.
    pub raw: String,
}

/// Runs the strategies in priority order for one field.
///
/// The first strategy producing any candidate wins; with `accumulate` every
/// strategy contributes, which lets the scorer fall through tiers when a
/// higher-tier candidate fails parsing.
pub(crate) fn locate(text: &NormalizedText, spec: &FieldSpec, accumulate: bool) -> Vec<Candidate> {
    let body = text.text();
    let mut candidates = labeled(body, spec);
    if candidates.is_empty() || accumulate {
        candidates.extend(proximity(body, spec));
    }
    if (candidates.is_empty() || accumulate) && spec.kind() == ValueKind::Boolean {
        candidates.extend(presence(body, spec));
    }
    candidates.sort_by_key(|c| (c.strategy, c.start, c.end));
    candidates.dedup_by_key(|c| (c.strategy, c.start, c.end));
    candidates
}

fn labeled(body: &str, spec: &FieldSpec) -> Vec<Candidate> {
    let mut out = Vec::new();
    for re in spec.labeled() {
        for caps in re.captures_iter(body) {
            if let Some(m) = caps.get(1) {
                let raw = m.as_str().trim();
                if raw.is_empty() {
                    continue;
                }
                out.push(Candidate {
                    start: m.start(),
                    end: m.end(),
                    strategy: Strategy::Labeled,
                    raw: raw.to_string(),
                });
            }
        }
    }
    out
}

fn proximity(body: &str, spec: &FieldSpec) -> Vec<Candidate> {
    let Some(shape) = spec.value_shape() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for (seg_start, seg) in segments(body) {
        let mut tokens: Option<Vec<(usize, usize, &str)>> = None;
        for syn in spec.synonym_res() {
            for label in syn.find_iter(seg) {
                let tokens =
                    tokens.get_or_insert_with(|| collect_tokens(seg, spec, shape));
                // Nearest token by character distance; ties go to the earlier
                // token in reading order.
                let mut best: Option<(usize, usize, usize, &str)> = None;
                for &(ts, te, raw) in tokens.iter() {
                    if ts < label.end() && te > label.start() {
                        continue;
                    }
                    let dist = if ts >= label.end() {
                        ts - label.end()
                    } else {
                        label.start() - te
                    };
                    let better = match best {
                        None => true,
                        Some((bd, bs, ..)) => dist < bd || (dist == bd && ts < bs),
                    };
                    if better {
                        best = Some((dist, ts, te, raw));
                    }
                }
                if let Some((_, ts, te, raw)) = best {
                    out.push(Candidate {
                        start: seg_start + ts,
                        end: seg_start + te,
                        strategy: Strategy::Proximity,
                        raw: raw.trim().to_string(),
                    });
                }
            }
        }
    }
    out
}

fn presence(body: &str, spec: &FieldSpec) -> Vec<Candidate> {
    let mut out = Vec::new();
    for re in spec.synonym_res() {
        for m in re.find_iter(body) {
            out.push(Candidate {
                start: m.start(),
                end: m.end(),
                strategy: Strategy::Presence,
                raw: m.as_str().to_string(),
            });
        }
    }
    out
}

/// Value-shaped tokens of one segment, with spans relative to the segment.
fn collect_tokens<'s>(
    seg: &'s str,
    spec: &FieldSpec,
    shape: &regex::Regex,
) -> Vec<(usize, usize, &'s str)> {
    shape
        .find_iter(seg)
        .filter_map(|m| {
            if spec.kind() == ValueKind::Integer {
                // A digit run glued to %, an ordinal suffix or a currency
                // symbol belongs to some other kind, not to a bare count.
                let after = seg[m.end()..].chars().next();
                if after.is_some_and(|c| c == '%' || c.is_alphanumeric()) {
                    return None;
                }
                let before = seg[..m.start()].chars().next_back();
                if matches!(before, Some('₹' | '$')) {
                    return None;
                }
            }
            Some((m.start(), m.end(), m.as_str()))
        })
        .collect()
}

/// Splits normalized text into sentence/row segments with absolute offsets.
fn segments(body: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut line_start = 0;
    for line in body.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        split_sentences(line_start, content, &mut out);
        line_start += line.len();
    }
    out
}

fn split_sentences<'s>(base: usize, line: &'s str, out: &mut Vec<(usize, &'s str)>) {
    let mut start = 0;
    for (i, ch) in line.char_indices() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        // Split only before whitespace-then-uppercase, so "Rs. 4.5" and
        // decimal points stay inside one sentence.
        let rest = &line[i + ch.len_utf8()..];
        let follows_space = rest.chars().next().is_some_and(char::is_whitespace);
        let next_upper = rest.trim_start().chars().next().is_some_and(char::is_uppercase);
        if follows_space && next_upper {
            let end = i + ch.len_utf8();
            push_segment(base, start, &line[start..end], out);
            start = end;
        }
    }
    push_segment(base, start, &line[start..], out);
}

fn push_segment<'s>(base: usize, seg_start: usize, seg: &'s str, out: &mut Vec<(usize, &'s str)>) {
    let trimmed = seg.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = seg.len() - seg.trim_start().len();
    out.push((base + seg_start + lead, trimmed));
}
