use chrono::{TimeZone, Utc};
use nirf_extract::{
    Confidence, ExtractionBuilder, ExtractionRecord, MetricSchema, MetricValue, RawPage,
    RecordSet, Weights, extract, score_record,
};
use rust_decimal::Decimal;

fn fixture_page(name: &str) -> RawPage {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let html = std::fs::read_to_string(path).expect("read fixture");
    RawPage::new(format!("https://example.ac.in/{name}"), html)
}

fn assert_field(record: &ExtractionRecord, key: &str, value: MetricValue, confidence: Confidence) {
    let got = record.get(key).expect(key);
    assert_eq!(got.value, value, "value of {key}");
    assert_eq!(got.confidence, confidence, "confidence of {key}");
}

#[test]
fn extracts_profile_fixture() {
    let schema = MetricSchema::nirf();
    let page = fixture_page("institute_profile.html");
    let record = ExtractionRecord::extract(&schema, &page);

    // Table rows pair labels and values on one line.
    assert_field(
        &record,
        "faculty_count",
        MetricValue::Count(250),
        Confidence::High,
    );
    assert_field(
        &record,
        "phd_faculty_count",
        MetricValue::Count(180),
        Confidence::High,
    );
    assert_field(
        &record,
        "student_count",
        MetricValue::Count(4_500),
        Confidence::High,
    );
    assert_field(
        &record,
        "placement_rate",
        MetricValue::Percent(Decimal::from(92)),
        Confidence::High,
    );
    assert_field(
        &record,
        "median_salary",
        MetricValue::Amount(Decimal::new(65, 1)),
        Confidence::High,
    );

    // Prose values sit near their labels, not behind them.
    assert_field(
        &record,
        "publications",
        MetricValue::Count(620),
        Confidence::Medium,
    );
    assert_field(
        &record,
        "citations",
        MetricValue::Count(4_150),
        Confidence::Medium,
    );
    assert_field(
        &record,
        "patents_granted",
        MetricValue::Count(12),
        Confidence::Medium,
    );
    assert_field(&record, "h_index", MetricValue::Count(28), Confidence::High);

    // Currency amounts normalize into each field's canonical unit.
    assert_field(
        &record,
        "sponsored_research_funding",
        MetricValue::Amount(Decimal::from(200)),
        Confidence::High,
    );
    assert_field(
        &record,
        "library_expenditure_physical",
        MetricValue::Amount(Decimal::from(15)),
        Confidence::High,
    );
    assert_field(
        &record,
        "library_expenditure_digital",
        MetricValue::Amount(Decimal::new(85, 1)),
        Confidence::High,
    );
    assert_field(
        &record,
        "laboratory_expenditure",
        MetricValue::Amount(Decimal::from(22)),
        Confidence::High,
    );

    // Presence flags.
    assert_field(
        &record,
        "playground_available",
        MetricValue::Flag(true),
        Confidence::Low,
    );
    assert_field(
        &record,
        "ramps_available",
        MetricValue::Flag(true),
        Confidence::Low,
    );
    assert_field(
        &record,
        "lifts_available",
        MetricValue::Flag(true),
        Confidence::Low,
    );
    assert_field(
        &record,
        "accessible_toilets",
        MetricValue::Flag(false),
        Confidence::Low,
    );

    // Unmentioned numeric fields default with none confidence.
    assert_field(
        &record,
        "higher_studies_rate",
        MetricValue::Percent(Decimal::ZERO),
        Confidence::None,
    );
    let flagged: Vec<&str> = record.needs_review().collect();
    assert!(flagged.contains(&"sc_percentage"));
    assert!(!flagged.contains(&"faculty_count"));
    assert!(record.coverage_ratio > 0.4);
}

#[test]
fn script_content_never_surfaces() {
    let schema = MetricSchema::nirf();
    let page = fixture_page("institute_profile.html");
    let record = ExtractionRecord::extract(&schema, &page);
    // The tracking script advertises 999 before the real table value.
    assert_eq!(
        record.value("faculty_count"),
        Some(&MetricValue::Count(250))
    );
}

#[test]
fn span_traces_back_to_source_html() {
    let schema = MetricSchema::nirf();
    let page = fixture_page("institute_profile.html");
    let record = ExtractionRecord::extract(&schema, &page);
    let span = record
        .get("faculty_count")
        .and_then(|v| v.span.as_ref())
        .expect("faculty span");
    assert_eq!(span.matched, "250");
    let offset = span.html_offset.expect("html offset");
    assert!(page.html[offset..].starts_with("250"));
}

#[test]
fn prose_fixture_scores_medium() {
    let schema = MetricSchema::nirf();
    let page = fixture_page("sparse_notice.html");
    let record = ExtractionRecord::extract(&schema, &page);
    assert_field(
        &record,
        "placement_rate",
        MetricValue::Percent(Decimal::from(85)),
        Confidence::Medium,
    );
    assert_field(
        &record,
        "female_student_percentage",
        MetricValue::Percent(Decimal::from(40)),
        Confidence::Medium,
    );
    // Absence of mention is weak evidence of absence, not a missing field.
    assert_field(
        &record,
        "ramps_available",
        MetricValue::Flag(false),
        Confidence::Low,
    );
    assert_field(
        &record,
        "faculty_count",
        MetricValue::Count(0),
        Confidence::None,
    );
}

#[test]
fn empty_input_yields_complete_defaulted_record() {
    let schema = MetricSchema::nirf();
    let record = extract(&schema, "", "https://example.ac.in/empty");
    assert_eq!(record.fields.len(), schema.len());
    for spec in schema.fields() {
        let value = record.get(spec.key()).expect("field present");
        match value.value {
            MetricValue::Flag(flag) => {
                assert!(!flag);
                assert_eq!(value.confidence, Confidence::Low);
            }
            _ => assert_eq!(value.confidence, Confidence::None),
        }
    }
    let booleans = record
        .fields
        .values()
        .filter(|v| matches!(v.value, MetricValue::Flag(_)))
        .count();
    let expected = booleans as f64 / schema.len() as f64;
    assert!((record.coverage_ratio - expected).abs() < 1e-9);
}

#[test]
fn extraction_is_idempotent() {
    let schema = MetricSchema::nirf();
    let page = fixture_page("institute_profile.html");
    let at = Utc.with_ymd_and_hms(2026, 1, 15, 8, 30, 0).unwrap();
    let first = ExtractionBuilder::new(&schema, &page).at(at).extract();
    let second = ExtractionBuilder::new(&schema, &page).at(at).extract();
    assert_eq!(first, second);
    let first_json = serde_json::to_string(&first).expect("serialize");
    let second_json = serde_json::to_string(&second).expect("serialize");
    assert_eq!(first_json, second_json);
}

#[test]
fn coverage_grows_with_more_labeled_fields() {
    let schema = MetricSchema::nirf();
    let base = "Faculty Count: 250";
    let extended = "Faculty Count: 250\nPlacement Rate: 90%";
    let smaller = extract(&schema, base, "https://example.ac.in/a");
    let larger = extract(&schema, extended, "https://example.ac.in/b");
    assert!(larger.coverage_ratio >= smaller.coverage_ratio);
}

#[test]
fn record_set_merges_best_confidence() {
    let schema = MetricSchema::nirf();
    let pages = [
        RawPage::new("https://example.ac.in/about", "Faculty Count: 250"),
        RawPage::new("https://example.ac.in/research", "Publications: 620"),
    ];
    let set = RecordSet::from_pages(&schema, &pages);
    let merged = set.merge_best().expect("non-empty set");
    assert_eq!(merged.source_url, "https://example.ac.in/about");
    assert_eq!(merged.value("faculty_count"), Some(&MetricValue::Count(250)));
    assert_eq!(merged.value("publications"), Some(&MetricValue::Count(620)));
    for record in &set.records {
        assert!(merged.coverage_ratio >= record.coverage_ratio);
    }
}

#[test]
fn merge_keeps_earliest_on_tie() {
    let schema = MetricSchema::nirf();
    let pages = [
        RawPage::new("https://example.ac.in/a", "Citations: 100"),
        RawPage::new("https://example.ac.in/b", "Citations: 200"),
    ];
    let merged = RecordSet::from_pages(&schema, &pages)
        .merge_best()
        .expect("non-empty set");
    assert_eq!(merged.value("citations"), Some(&MetricValue::Count(100)));
}

#[test]
fn scores_profile_fixture() {
    let schema = MetricSchema::nirf();
    let page = fixture_page("institute_profile.html");
    let record = ExtractionRecord::extract(&schema, &page);
    let card = score_record(&schema, &record, &Weights::default());
    // (250 * 0.3 + 180 * 0.5 + 4500 * 0.2) / 100
    assert_eq!(
        card.categories[&nirf_extract::Category::Faculty],
        Decimal::new(1065, 2)
    );
    // ramps 40 + lifts 30, toilets absent.
    assert_eq!(
        card.categories[&nirf_extract::Category::Accessibility],
        Decimal::from(70)
    );
    assert!(card.total > Decimal::ZERO);
}
