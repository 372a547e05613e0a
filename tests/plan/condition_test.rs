use orgdiff::plan::normalize_condition;

#[test]
fn test_unquoted_picklist_value_gains_quotes() {
    assert_eq!(
        normalize_condition("  StageName = Prospecting "),
        "StageName = 'Prospecting'"
    );
}

#[test]
fn test_all_operators_are_recognized() {
    for op in ["=", "!=", "<>", "<", "<=", ">", ">="] {
        let input = format!("StageName {} Won", op);
        let expected = format!("StageName {} 'Won'", op);
        assert_eq!(normalize_condition(&input), expected, "operator {}", op);
    }
}

#[test]
fn test_numbers_booleans_null_and_dates_stay_bare() {
    for cond in [
        "Amount > 1000",
        "Amount <= 99.5",
        "Amount >= -3",
        "IsWon = true",
        "IsWon != FALSE",
        "Amount = null",
        "CloseDate >= 2024-01-01",
        "CreatedDate < 2024-06-01T12:00:00Z",
        "CreatedDate < 2024-06-01T12:00:00.000+02:00",
        "CloseDate = TODAY",
        "CloseDate >= last_n_days:90",
    ] {
        // Spacing is canonicalized; the value itself must be untouched.
        let normalized = normalize_condition(cond);
        let value = cond.split_whitespace().last().unwrap();
        assert!(
            normalized.ends_with(value),
            "value was rewritten: {:?} -> {:?}",
            cond,
            normalized
        );
        assert!(!normalized.contains('\''), "quoted: {:?}", normalized);
    }
}

#[test]
fn test_embedded_quote_and_backslash_are_escaped() {
    assert_eq!(normalize_condition("Name = O'Brien"), "Name = 'O\\'Brien'");
    assert_eq!(
        normalize_condition(r"Path = C:\temp"),
        r"Path = 'C:\\temp'"
    );
}

#[test]
fn test_compound_conditions_pass_through_untouched() {
    for cond in [
        "StageName = 'Won' AND Amount > 0",
        "Amount > 0 OR Amount = null",
        "NOT IsDeleted",
    ] {
        assert_eq!(normalize_condition(cond), cond);
    }
}

#[test]
fn test_unrecognized_shapes_pass_through_trimmed() {
    assert_eq!(normalize_condition("  Amount IN (1, 2)  "), "Amount IN (1, 2)");
    assert_eq!(normalize_condition("1 = 1"), "1 = 1");
}
