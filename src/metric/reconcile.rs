//! Cross-environment reconciliation of resolved metric sets.
//!
//! Both sets were derived from the same token list, so a length or kind
//! mismatch indicates an internal bug; a field/function/condition mismatch
//! means the two environments interpret the same token differently (e.g.
//! one org's field is a picklist, the other's numeric) and the values would
//! not be comparable.

use super::error::{MetricError, MetricResult};
use super::resolve::{ResolvedKind, ResolvedLeg, ResolvedMetric};

/// Verify that two independently resolved metric sets are structurally
/// equivalent, returning the source set as canonical.
pub fn reconcile(
    source: &[ResolvedMetric],
    target: &[ResolvedMetric],
) -> MetricResult<Vec<ResolvedMetric>> {
    if source.len() != target.len() {
        return Err(MetricError::ValidationMismatch(format!(
            "source resolved {} metrics, target resolved {}",
            source.len(),
            target.len()
        )));
    }

    for (i, (s, t)) in source.iter().zip(target.iter()).enumerate() {
        check_pair(i, s, t)?;
    }

    Ok(source.to_vec())
}

fn check_pair(index: usize, source: &ResolvedMetric, target: &ResolvedMetric) -> MetricResult<()> {
    let mismatch = |detail: String| {
        Err(MetricError::ValidationMismatch(format!(
            "metric {} ('{}'): {}",
            index + 1,
            source,
            detail
        )))
    };

    match (&source.kind, &target.kind) {
        (ResolvedKind::Count, ResolvedKind::Count) => Ok(()),

        (
            ResolvedKind::FieldAggregate {
                function: sf,
                field: s,
            },
            ResolvedKind::FieldAggregate {
                function: tf,
                field: t,
            },
        ) => {
            if sf != tf {
                return mismatch(format!("function differs ({} vs {})", sf, tf));
            }
            if !s.name.eq_ignore_ascii_case(&t.name) {
                return mismatch(format!("field differs ({} vs {})", s.name, t.name));
            }
            Ok(())
        }

        (ResolvedKind::CountDistinct { field: s }, ResolvedKind::CountDistinct { field: t }) => {
            if !s.name.eq_ignore_ascii_case(&t.name) {
                return mismatch(format!("field differs ({} vs {})", s.name, t.name));
            }
            Ok(())
        }

        (
            ResolvedKind::Ratio {
                numerator: sn,
                denominator: sd,
            },
            ResolvedKind::Ratio {
                numerator: tn,
                denominator: td,
            },
        ) => {
            if let Some(detail) = leg_mismatch("numerator", sn, tn) {
                return mismatch(detail);
            }
            if let Some(detail) = leg_mismatch("denominator", sd, td) {
                return mismatch(detail);
            }
            Ok(())
        }

        (ResolvedKind::CountIf { condition: s }, ResolvedKind::CountIf { condition: t }) => {
            if s != t {
                return mismatch("condition text differs".to_string());
            }
            Ok(())
        }

        (
            ResolvedKind::SumIf {
                field: sf,
                condition: sc,
            },
            ResolvedKind::SumIf {
                field: tf,
                condition: tc,
            },
        ) => {
            if !sf.name.eq_ignore_ascii_case(&tf.name) {
                return mismatch(format!("field differs ({} vs {})", sf.name, tf.name));
            }
            if sc != tc {
                return mismatch("condition text differs".to_string());
            }
            Ok(())
        }

        _ => mismatch(format!(
            "kind differs ({} vs {})",
            source.kind_name(),
            target.kind_name()
        )),
    }
}

fn leg_mismatch(side: &str, source: &ResolvedLeg, target: &ResolvedLeg) -> Option<String> {
    if source.function != target.function {
        return Some(format!(
            "{} function differs ({} vs {})",
            side, source.function, target.function
        ));
    }
    if !source.field.name.eq_ignore_ascii_case(&target.field.name) {
        return Some(format!(
            "{} field differs ({} vs {})",
            side, source.field.name, target.field.name
        ));
    }
    None
}
