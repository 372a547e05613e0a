use orgdiff::metric::{parse, reconcile, validate, MetricError};
use orgdiff::schema::{FieldMetadata, FieldType, ObjectSchema};

fn schema(fields: &[(&str, FieldType)]) -> ObjectSchema {
    ObjectSchema {
        name: "Opportunity".to_string(),
        fields: fields
            .iter()
            .map(|(name, field_type)| FieldMetadata {
                name: name.to_string(),
                label: None,
                field_type: *field_type,
                aggregatable: true,
                filterable: true,
            })
            .collect(),
    }
}

fn standard() -> ObjectSchema {
    schema(&[
        ("Id", FieldType::Id),
        ("Amount", FieldType::Currency),
        ("CloseDate", FieldType::Date),
        ("StageName", FieldType::Picklist),
    ])
}

#[test]
fn test_identical_resolutions_reconcile_to_source_set() {
    let parsed = parse(&["count", "sum:Amount", "ratio:sum:Amount/avg:Amount"]).unwrap();
    let source = validate(&parsed, &standard(), "source").unwrap();
    let target = validate(&parsed, &standard(), "target").unwrap();

    let reconciled = reconcile(&source, &target).unwrap();
    assert_eq!(reconciled, source);
}

#[test]
fn test_length_mismatch_is_an_internal_error() {
    let parsed = parse(&["count", "sum:Amount"]).unwrap();
    let source = validate(&parsed, &standard(), "source").unwrap();
    let target = validate(&parsed[..1], &standard(), "target").unwrap();

    let err = reconcile(&source, &target).unwrap_err();
    assert!(matches!(err, MetricError::ValidationMismatch(_)));
}

#[test]
fn test_divergent_field_casing_still_reconciles() {
    // Same field, different canonical casing per org.
    let parsed = parse(&["sum:Amount"]).unwrap();
    let source = validate(&parsed, &standard(), "source").unwrap();
    let target_schema = schema(&[("AMOUNT", FieldType::Currency)]);
    let target = validate(&parsed, &target_schema, "target").unwrap();

    assert!(reconcile(&source, &target).is_ok());
}

#[test]
fn test_condition_text_must_match_exactly() {
    let source_parsed = parse(&["count-if:StageName = 'Closed Won'"]).unwrap();
    let target_parsed = parse(&["count-if:StageName = 'Closed Lost'"]).unwrap();
    let source = validate(&source_parsed, &standard(), "source").unwrap();
    let target = validate(&target_parsed, &standard(), "target").unwrap();

    let err = reconcile(&source, &target).unwrap_err();
    assert!(matches!(err, MetricError::ValidationMismatch(_)));
}

#[test]
fn test_kind_mismatch_is_reported() {
    let source = validate(&parse(&["count"]).unwrap(), &standard(), "source").unwrap();
    let target = validate(&parse(&["sum:Amount"]).unwrap(), &standard(), "target").unwrap();

    let err = reconcile(&source, &target).unwrap_err();
    match err {
        MetricError::ValidationMismatch(detail) => {
            assert!(detail.contains("kind"), "detail: {}", detail);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_reconciliation_is_symmetric() {
    let parsed = parse(&["count", "sum:Amount", "min:CloseDate"]).unwrap();
    let a = validate(&parsed, &standard(), "source").unwrap();
    let b = validate(&parsed, &standard(), "target").unwrap();
    assert_eq!(reconcile(&a, &b).is_ok(), reconcile(&b, &a).is_ok());

    // And for a failing pair.
    let c = validate(&parse(&["sum:Amount"]).unwrap(), &standard(), "source").unwrap();
    let d = validate(&parse(&["avg:Amount"]).unwrap(), &standard(), "target").unwrap();
    assert_eq!(reconcile(&c, &d).is_ok(), reconcile(&d, &c).is_ok());
}
