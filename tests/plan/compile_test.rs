use std::collections::HashSet;

use orgdiff::metric::{parse, validate};
use orgdiff::plan::{compile, Binding, PlanError};
use orgdiff::schema::{FieldMetadata, FieldType, ObjectSchema};

fn opportunity() -> ObjectSchema {
    let field = |name: &str, field_type: FieldType| FieldMetadata {
        name: name.to_string(),
        label: None,
        field_type,
        aggregatable: true,
        filterable: true,
    };
    ObjectSchema {
        name: "Opportunity".to_string(),
        fields: vec![
            field("Id", FieldType::Id),
            field("Amount", FieldType::Currency),
            field("Probability", FieldType::Percent),
            field("StageName", FieldType::Picklist),
            field("CloseDate", FieldType::Date),
        ],
    }
}

fn plan_for(tokens: &[&str], filter: Option<&str>) -> orgdiff::plan::AggregatePlan {
    let parsed = parse(tokens).unwrap();
    let resolved = validate(&parsed, &opportunity(), "source").unwrap();
    compile("Opportunity", &resolved, filter).unwrap()
}

#[test]
fn test_shared_query_shape() {
    let plan = plan_for(&["count", "sum:Amount"], None);
    assert_eq!(
        plan.base_query.as_deref(),
        Some("SELECT COUNT(Id) count__all, SUM(Amount) sum__amount FROM Opportunity")
    );
    assert!(plan.conditional.is_empty());
}

#[test]
fn test_base_filter_is_appended() {
    let plan = plan_for(&["count"], Some(" FiscalYear = 2024 "));
    assert_eq!(
        plan.base_query.as_deref(),
        Some("SELECT COUNT(Id) count__all FROM Opportunity WHERE FiscalYear = 2024")
    );
    // Blank filter means no filter.
    let plan = plan_for(&["count"], Some("   "));
    assert_eq!(plan.base_filter, None);
}

#[test]
fn test_identical_expressions_are_deduplicated() {
    let plan = plan_for(&["sum:Amount", "sum:Amount"], None);
    assert_eq!(plan.expressions.len(), 1);
    assert_eq!(plan.bindings.len(), 2);
    for binding in &plan.bindings {
        match &binding.binding {
            Binding::Direct { alias } => assert_eq!(alias, "sum__amount"),
            other => panic!("unexpected binding {:?}", other),
        }
    }
}

#[test]
fn test_ratio_legs_share_expressions_with_direct_metrics() {
    let plan = plan_for(&["sum:Amount", "ratio:sum:Amount/avg:Amount"], None);
    // sum__amount is shared between the direct metric and the numerator.
    assert_eq!(plan.expressions.len(), 2);

    match &plan.bindings[1].binding {
        Binding::Ratio {
            alias,
            numerator,
            denominator,
        } => {
            assert_eq!(numerator, "sum__amount");
            assert_eq!(denominator, "avg__amount");
            assert_eq!(alias, "ratio__sum_amount__avg_amount");
        }
        other => panic!("unexpected binding {:?}", other),
    }
}

#[test]
fn test_conditional_metric_gets_standalone_query() {
    let plan = plan_for(
        &["sum-if:Amount:StageName = 'Closed Won'"],
        Some("FiscalYear = 2024"),
    );

    assert_eq!(plan.conditional.len(), 1);
    let cond = &plan.conditional[0];
    assert_eq!(
        cond.query,
        format!(
            "SELECT SUM(Amount) {} FROM Opportunity WHERE (FiscalYear = 2024) AND (StageName = 'Closed Won')",
            cond.alias
        )
    );
}

#[test]
fn test_all_conditional_means_no_shared_query() {
    let plan = plan_for(&["count-if:Amount > 0", "count-if:Amount > 100"], None);
    assert!(plan.base_query.is_none());
    assert_eq!(plan.conditional.len(), 2);
    assert_eq!(plan.conditional[0].alias, "count_if");
    assert_eq!(plan.conditional[1].alias, "count_if_1");
}

#[test]
fn test_aliases_are_unique_within_each_namespace() {
    let plan = plan_for(
        &[
            "count",
            "sum:Amount",
            "sum:Amount",
            "ratio:sum:Amount/avg:Amount",
            "ratio:sum:Amount/avg:Probability",
            "count-if:Amount > 0",
            "count-if:Amount > 1",
            "sum-if:Amount:Amount > 2",
        ],
        None,
    );

    let expression_aliases: Vec<&str> =
        plan.expressions.iter().map(|e| e.alias.as_str()).collect();
    let unique: HashSet<&str> = expression_aliases.iter().copied().collect();
    assert_eq!(unique.len(), expression_aliases.len());

    let conditional_aliases: Vec<&str> =
        plan.conditional.iter().map(|c| c.alias.as_str()).collect();
    let unique: HashSet<&str> = conditional_aliases.iter().copied().collect();
    assert_eq!(unique.len(), conditional_aliases.len());

    // A ratio's own alias never shadows one of its legs.
    for binding in &plan.bindings {
        if let Binding::Ratio {
            alias,
            numerator,
            denominator,
        } = &binding.binding
        {
            assert_ne!(alias, numerator);
            assert_ne!(alias, denominator);
        }
    }
}

#[test]
fn test_sample_fields_and_query() {
    let plan = plan_for(
        &[
            "count",
            "sum:Amount",
            "ratio:sum:Amount/avg:Probability",
            "sum-if:Amount:StageName = 'Closed Won'",
        ],
        Some("FiscalYear = 2024"),
    );

    assert_eq!(plan.sample_fields, vec!["Amount", "Probability"]);
    assert_eq!(
        plan.sample_query(5),
        "SELECT Id, Amount, Probability FROM Opportunity WHERE FiscalYear = 2024 ORDER BY Id LIMIT 5"
    );
}

#[test]
fn test_sample_query_skips_duplicate_id() {
    let plan = plan_for(&["count-distinct:Id"], None);
    assert_eq!(
        plan.sample_query(3),
        "SELECT Id FROM Opportunity ORDER BY Id LIMIT 3"
    );
}

#[test]
fn test_empty_metric_list_is_rejected() {
    let err = compile("Opportunity", &[], None).unwrap_err();
    assert!(matches!(err, PlanError::NoMetrics));
}

#[test]
fn test_aggregate_queries_order() {
    let plan = plan_for(&["count", "count-if:Amount > 0"], None);
    let queries = plan.aggregate_queries();
    assert_eq!(queries.len(), 2);
    assert!(queries[0].starts_with("SELECT COUNT(Id) count__all"));
    assert!(queries[1].contains("WHERE Amount > 0"));
}
