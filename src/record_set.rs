//! Sets of per-page records for one institution and their merge.

use crate::confidence::Confidence;
use crate::page::RawPage;
use crate::record::ExtractionRecord;
use crate::schema::MetricSchema;

/// Records extracted from several pages of the same institution.
///
/// Institutions scatter their disclosures over subpages; merging the per-page
/// records recovers one best-evidence record.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    /// Collected per-page records.
    pub records: Vec<ExtractionRecord>,
}

impl RecordSet {
    /// Creates an empty set.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Extracts every page with default options and collects the records.
    #[must_use]
    pub fn from_pages(schema: &MetricSchema, pages: &[RawPage]) -> Self {
        Self {
            records: pages
                .iter()
                .map(|page| ExtractionRecord::extract(schema, page))
                .collect(),
        }
    }

    /// Adds one record to the set.
    #[inline]
    pub fn push(&mut self, record: ExtractionRecord) {
        self.records.push(record);
    }

    /// Number of collected records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Folds the set into one record, the best confidence winning per field.
    ///
    /// Ties keep the earliest record's value. The merged record carries the
    /// first record's URL, the latest timestamp, and a recomputed coverage
    /// ratio. Returns `None` for an empty set.
    #[must_use]
    pub fn merge_best(&self) -> Option<ExtractionRecord> {
        let first = self.records.first()?;
        let mut fields = first.fields.clone();
        let mut extracted_at = first.extracted_at;
        for record in &self.records[1..] {
            extracted_at = extracted_at.max(record.extracted_at);
            for (key, value) in &record.fields {
                match fields.get_mut(key) {
                    Some(best) => {
                        if value.confidence.rank() > best.confidence.rank() {
                            *best = value.clone();
                        }
                    }
                    // Key only present in a later record: keep completeness.
                    None => {
                        fields.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        let matched = fields
            .values()
            .filter(|v| v.confidence != Confidence::None)
            .count();
        let coverage_ratio = matched as f64 / fields.len() as f64;
        Some(ExtractionRecord {
            source_url: first.source_url.clone(),
            extracted_at,
            fields,
            coverage_ratio,
        })
    }
}
