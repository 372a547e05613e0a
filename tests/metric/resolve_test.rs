use orgdiff::metric::{parse, validate, MetricError, ResolvedKind, ValueType};
use orgdiff::schema::{FieldMetadata, FieldType, ObjectSchema};

fn field(name: &str, field_type: FieldType, aggregatable: bool) -> FieldMetadata {
    FieldMetadata {
        name: name.to_string(),
        label: Some(name.to_string()),
        field_type,
        aggregatable,
        filterable: true,
    }
}

fn opportunity() -> ObjectSchema {
    ObjectSchema {
        name: "Opportunity".to_string(),
        fields: vec![
            field("Id", FieldType::Id, true),
            field("Amount", FieldType::Currency, true),
            field("Probability", FieldType::Percent, true),
            field("StageName", FieldType::Picklist, true),
            field("CloseDate", FieldType::Date, true),
            field("LastActivityDate", FieldType::Date, true),
            field("Description", FieldType::Textarea, false),
        ],
    }
}

#[test]
fn test_lookup_is_case_insensitive_and_canonicalizes() {
    let parsed = parse(&["sum:amount"]).unwrap();
    let resolved = validate(&parsed, &opportunity(), "source").unwrap();
    match &resolved[0].kind {
        ResolvedKind::FieldAggregate { field, .. } => {
            assert_eq!(field.name, "Amount");
            assert_eq!(field.field_type, FieldType::Currency);
        }
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_missing_field_names_object_and_environment() {
    let parsed = parse(&["sum:AnnualRevenue"]).unwrap();
    let err = validate(&parsed, &opportunity(), "target").unwrap_err();
    match err {
        MetricError::FieldNotFound {
            object,
            field,
            environment,
        } => {
            assert_eq!(object, "Opportunity");
            assert_eq!(field, "AnnualRevenue");
            assert_eq!(environment, "target");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_non_aggregatable_field_is_rejected() {
    let parsed = parse(&["count-distinct:Description"]).unwrap();
    let err = validate(&parsed, &opportunity(), "source").unwrap_err();
    assert!(matches!(err, MetricError::NonAggregatableField { .. }));
}

#[test]
fn test_avg_over_date_field_is_unsupported() {
    let parsed = parse(&["avg:LastActivityDate"]).unwrap();
    let err = validate(&parsed, &opportunity(), "source").unwrap_err();
    match err {
        MetricError::UnsupportedFieldType { required, field, .. } => {
            assert_eq!(required, "numeric");
            assert_eq!(field, "LastActivityDate");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_sum_over_picklist_is_unsupported() {
    let parsed = parse(&["sum:StageName"]).unwrap();
    let err = validate(&parsed, &opportunity(), "source").unwrap_err();
    assert!(matches!(err, MetricError::UnsupportedFieldType { .. }));
}

#[test]
fn test_min_max_accept_dates_and_type_as_date() {
    let parsed = parse(&["min:CloseDate", "max:Amount"]).unwrap();
    let resolved = validate(&parsed, &opportunity(), "source").unwrap();
    assert_eq!(resolved[0].value_type, ValueType::Date);
    assert_eq!(resolved[1].value_type, ValueType::Number);
}

#[test]
fn test_min_rejects_picklist() {
    let parsed = parse(&["min:StageName"]).unwrap();
    let err = validate(&parsed, &opportunity(), "source").unwrap_err();
    match err {
        MetricError::UnsupportedFieldType { required, .. } => {
            assert_eq!(required, "numeric or date");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_count_distinct_has_no_type_gate() {
    let parsed = parse(&["count-distinct:StageName"]).unwrap();
    let resolved = validate(&parsed, &opportunity(), "source").unwrap();
    assert_eq!(resolved[0].value_type, ValueType::Number);
}

#[test]
fn test_count_if_requires_no_field_lookup() {
    let parsed = parse(&["count-if:NoSuchField = 1"]).unwrap();
    let resolved = validate(&parsed, &opportunity(), "source").unwrap();
    assert!(matches!(resolved[0].kind, ResolvedKind::CountIf { .. }));
}

#[test]
fn test_sum_if_requires_numeric_field() {
    let parsed = parse(&["sum-if:StageName:Amount > 0"]).unwrap();
    let err = validate(&parsed, &opportunity(), "source").unwrap_err();
    assert!(matches!(err, MetricError::UnsupportedFieldType { .. }));

    let parsed = parse(&["sum-if:Amount:StageName = 'Closed Won'"]).unwrap();
    let resolved = validate(&parsed, &opportunity(), "source").unwrap();
    assert_eq!(resolved[0].value_type, ValueType::Number);
}

#[test]
fn test_ratio_validates_both_legs() {
    let parsed = parse(&["ratio:sum:Amount/avg:CloseDate"]).unwrap();
    let err = validate(&parsed, &opportunity(), "source").unwrap_err();
    assert!(matches!(err, MetricError::UnsupportedFieldType { .. }));

    let parsed = parse(&["ratio:sum:Amount/avg:Probability"]).unwrap();
    let resolved = validate(&parsed, &opportunity(), "source").unwrap();
    assert_eq!(resolved[0].value_type, ValueType::Number);
}
