use orgdiff::metric::{parse, AggregateFunction, MetricError, ParsedMetric};

#[test]
fn test_empty_tokens_default_to_count() {
    let empty: Vec<String> = vec![];
    assert_eq!(parse(&empty).unwrap(), vec![ParsedMetric::Count]);

    // Whitespace and empty fragments also collapse to the default.
    assert_eq!(parse(&[" ", ",,"]).unwrap(), vec![ParsedMetric::Count]);
}

#[test]
fn test_comma_joined_tokens_are_flattened() {
    let metrics = parse(&["count, sum:Amount", "avg:Amount"]).unwrap();
    assert_eq!(metrics.len(), 3);
    assert_eq!(metrics[0], ParsedMetric::Count);
    assert_eq!(
        metrics[1],
        ParsedMetric::FieldAggregate {
            function: AggregateFunction::Sum,
            field: "Amount".to_string(),
        }
    );
    assert_eq!(
        metrics[2],
        ParsedMetric::FieldAggregate {
            function: AggregateFunction::Avg,
            field: "Amount".to_string(),
        }
    );
}

#[test]
fn test_keywords_are_case_insensitive_fields_are_not() {
    let metrics = parse(&["COUNT", "Sum:Amount", "Count-Distinct:Email"]).unwrap();
    assert_eq!(metrics[0], ParsedMetric::Count);
    assert_eq!(
        metrics[1],
        ParsedMetric::FieldAggregate {
            function: AggregateFunction::Sum,
            field: "Amount".to_string(),
        }
    );
    assert_eq!(
        metrics[2],
        ParsedMetric::CountDistinct {
            field: "Email".to_string(),
        }
    );
}

#[test]
fn test_every_aggregate_function() {
    for (token, function) in [
        ("sum:X", AggregateFunction::Sum),
        ("avg:X", AggregateFunction::Avg),
        ("min:X", AggregateFunction::Min),
        ("max:X", AggregateFunction::Max),
        ("median:X", AggregateFunction::Median),
        ("stddev:X", AggregateFunction::Stddev),
        ("variance:X", AggregateFunction::Variance),
    ] {
        let metrics = parse(&[token]).unwrap();
        assert_eq!(
            metrics[0],
            ParsedMetric::FieldAggregate {
                function,
                field: "X".to_string(),
            },
            "token {}",
            token
        );
    }
}

#[test]
fn test_ratio_splits_on_first_slash() {
    let metrics = parse(&["ratio:sum:Amount/avg:Amount"]).unwrap();
    match &metrics[0] {
        ParsedMetric::Ratio {
            numerator,
            denominator,
        } => {
            assert_eq!(numerator.function, AggregateFunction::Sum);
            assert_eq!(numerator.field, "Amount");
            assert_eq!(denominator.function, AggregateFunction::Avg);
            assert_eq!(denominator.field, "Amount");
        }
        other => panic!("expected ratio, got {:?}", other),
    }
}

#[test]
fn test_sum_if_splits_field_from_condition_on_first_colon() {
    let metrics = parse(&["sum-if:Amount:StageName = 'Closed Won'"]).unwrap();
    assert_eq!(
        metrics[0],
        ParsedMetric::SumIf {
            field: "Amount".to_string(),
            condition: "StageName = 'Closed Won'".to_string(),
        }
    );
}

#[test]
fn test_invalid_tokens_abort_the_whole_parse() {
    for bad in [
        "bogus",
        "sum:",
        "count-distinct:",
        "count-if:",
        "sum-if:Amount",
        "sum-if::cond",
        "ratio:sum:Amount",
        "ratio:frob:A/sum:B",
        "mode:Amount",
    ] {
        let result = parse(&["count", bad]);
        match result {
            Err(MetricError::InvalidMetric { token, .. }) => {
                assert_eq!(token, bad, "error should name the offending token");
            }
            other => panic!("expected InvalidMetric for {:?}, got {:?}", bad, other),
        }
    }
}

#[test]
fn test_parse_round_trips_through_display() {
    let tokens = [
        "count",
        "sum:Amount",
        "count-distinct:Email",
        "ratio:sum:Amount/avg:Amount",
        "count-if:StageName = 'Closed Won'",
        "sum-if:Amount:FiscalYear = 2024",
    ];
    let first = parse(&tokens).unwrap();
    let reserialized: Vec<String> = first.iter().map(|m| m.to_string()).collect();
    let second = parse(&reserialized).unwrap();
    assert_eq!(first, second);
}
