//! Condition evaluation: deriving required/hidden state from the record.
//!
//! An attribute's `conditions` rule holds a list of queries, all of which
//! must hold (logical AND) against the current record for the `true`
//! outcome branch to apply; otherwise the `false` branch applies. The
//! selected branch's keywords are folded into a [`ConditionOverride`],
//! where `None` means "no conditional override, fall back to the static
//! attribute flags".

use crate::path;
use crate::schema::{Attribute, Comparator, ConditionQuery, Conditions, OutcomeKeyword};
use serde_json::Value;

/// Whether the form is creating a new record or editing an existing one.
/// `hiddenCreate` applies only in [`Mode::Create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Create,
    #[default]
    Edit,
}

/// Conditional overrides for one attribute. `None` fields leave the static
/// flags in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConditionOverride {
    pub required: Option<bool>,
    pub hidden: Option<bool>,
}

/// Empty semantics shared by conditions and required-value validation:
/// missing, null, empty string, or empty array.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

fn query_holds(query: &ConditionQuery, record: &Value) -> bool {
    let value = path::get(record, &query.attribute);
    match query.comparator {
        Comparator::Empty => is_empty_value(value),
        Comparator::NotEmpty => !is_empty_value(value),
        Comparator::Equal => {
            value.map(path::value_text).as_deref() == query.value.as_deref()
        }
        Comparator::NotEqual => {
            value.map(path::value_text).as_deref() != query.value.as_deref()
        }
    }
}

/// Evaluate a condition rule against the record.
pub fn evaluate(conditions: Option<&Conditions>, record: &Value) -> ConditionOverride {
    let Some(conditions) = conditions else {
        return ConditionOverride::default();
    };
    let all_hold = conditions.queries.iter().all(|q| query_holds(q, record));
    let branch = if all_hold {
        &conditions.outcomes.when_true
    } else {
        &conditions.outcomes.when_false
    };

    let mut out = ConditionOverride::default();
    for keyword in branch {
        match keyword {
            OutcomeKeyword::Required => out.required = Some(true),
            OutcomeKeyword::NotRequired => out.required = Some(false),
            OutcomeKeyword::Hidden => out.hidden = Some(true),
            OutcomeKeyword::NotHidden => out.hidden = Some(false),
        }
    }
    out
}

/// Effective visibility: hidden when the static flags say so and no
/// condition forces `not_hidden`, or when the condition itself resolves
/// to hidden.
pub fn effective_hidden(attribute: &Attribute, record: &Value, mode: Mode) -> bool {
    let statically_hidden =
        attribute.hidden || (mode == Mode::Create && attribute.hidden_create);
    match evaluate(attribute.conditions.as_ref(), record).hidden {
        Some(forced) => forced,
        None => statically_hidden,
    }
}

/// Effective required state: the static flag OR a conditional `required`.
pub fn effective_required(attribute: &Attribute, record: &Value) -> bool {
    attribute.required
        || evaluate(attribute.conditions.as_ref(), record).required == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ConditionOutcomes, Conditions};
    use serde_json::json;

    fn not_empty_rule(attribute: &str, outcomes: ConditionOutcomes) -> Conditions {
        Conditions {
            queries: vec![ConditionQuery {
                attribute: attribute.to_string(),
                comparator: Comparator::NotEmpty,
                value: None,
            }],
            outcomes,
        }
    }

    #[test]
    fn test_not_empty_selects_true_branch() {
        let rule = not_empty_rule(
            "x",
            ConditionOutcomes {
                when_true: vec![OutcomeKeyword::Hidden],
                when_false: vec![OutcomeKeyword::NotHidden],
            },
        );
        let result = evaluate(Some(&rule), &json!({"x": "a"}));
        assert_eq!(result.hidden, Some(true));
    }

    #[test]
    fn test_empty_values_select_false_branch() {
        let rule = not_empty_rule(
            "x",
            ConditionOutcomes {
                when_true: vec![OutcomeKeyword::Hidden],
                when_false: vec![OutcomeKeyword::NotHidden],
            },
        );
        for record in [json!({}), json!({"x": ""}), json!({"x": []}), json!({"x": null})] {
            let result = evaluate(Some(&rule), &record);
            assert_eq!(result.hidden, Some(false), "record: {record}");
        }
    }

    #[test]
    fn test_queries_are_and_ed() {
        let rule = Conditions {
            queries: vec![
                ConditionQuery {
                    attribute: "a".to_string(),
                    comparator: Comparator::Equal,
                    value: Some("1".to_string()),
                },
                ConditionQuery {
                    attribute: "b".to_string(),
                    comparator: Comparator::NotEmpty,
                    value: None,
                },
            ],
            outcomes: ConditionOutcomes {
                when_true: vec![OutcomeKeyword::Required],
                when_false: vec![],
            },
        };
        assert_eq!(
            evaluate(Some(&rule), &json!({"a": "1", "b": "set"})).required,
            Some(true)
        );
        assert_eq!(evaluate(Some(&rule), &json!({"a": "1"})).required, None);
        assert_eq!(
            evaluate(Some(&rule), &json!({"a": "2", "b": "set"})).required,
            None
        );
    }

    #[test]
    fn test_equality_is_exact_string_compare() {
        let rule = Conditions {
            queries: vec![ConditionQuery {
                attribute: "kind".to_string(),
                comparator: Comparator::Equal,
                value: Some("Linux".to_string()),
            }],
            outcomes: ConditionOutcomes {
                when_true: vec![OutcomeKeyword::Required],
                when_false: vec![OutcomeKeyword::NotRequired],
            },
        };
        assert_eq!(
            evaluate(Some(&rule), &json!({"kind": "Linux"})).required,
            Some(true)
        );
        // Case and whitespace are significant
        assert_eq!(
            evaluate(Some(&rule), &json!({"kind": "linux"})).required,
            Some(false)
        );
        assert_eq!(
            evaluate(Some(&rule), &json!({"kind": "Linux "})).required,
            Some(false)
        );
        // Numbers compare through their text form
        let numeric = Conditions {
            queries: vec![ConditionQuery {
                attribute: "count".to_string(),
                comparator: Comparator::Equal,
                value: Some("5".to_string()),
            }],
            outcomes: ConditionOutcomes {
                when_true: vec![OutcomeKeyword::Hidden],
                when_false: vec![],
            },
        };
        assert_eq!(
            evaluate(Some(&numeric), &json!({"count": 5})).hidden,
            Some(true)
        );
    }

    #[test]
    fn test_no_conditions_means_no_override() {
        let result = evaluate(None, &json!({"x": "a"}));
        assert_eq!(result, ConditionOverride::default());
    }

    #[test]
    fn test_effective_hidden_rules() {
        let mut attr = Attribute {
            name: "subnet_IDs".to_string(),
            hidden: true,
            ..Default::default()
        };
        let record = json!({});
        assert!(effective_hidden(&attr, &record, Mode::Edit));

        // A condition forcing not_hidden wins over the static flag
        attr.conditions = Some(not_empty_rule(
            "network_interface_id",
            ConditionOutcomes {
                when_true: vec![OutcomeKeyword::Hidden],
                when_false: vec![OutcomeKeyword::NotHidden],
            },
        ));
        assert!(!effective_hidden(&attr, &record, Mode::Edit));
        assert!(effective_hidden(
            &attr,
            &json!({"network_interface_id": "eni-123"}),
            Mode::Edit
        ));
    }

    #[test]
    fn test_hidden_create_applies_on_create_only() {
        let attr = Attribute {
            name: "server_id".to_string(),
            hidden_create: true,
            ..Default::default()
        };
        assert!(effective_hidden(&attr, &json!({}), Mode::Create));
        assert!(!effective_hidden(&attr, &json!({}), Mode::Edit));
    }

    #[test]
    fn test_effective_required_is_static_or_conditional() {
        let statically = Attribute {
            name: "a".to_string(),
            required: true,
            ..Default::default()
        };
        assert!(effective_required(&statically, &json!({})));

        let conditionally = Attribute {
            name: "b".to_string(),
            conditions: Some(not_empty_rule(
                "trigger",
                ConditionOutcomes {
                    when_true: vec![OutcomeKeyword::Required],
                    when_false: vec![OutcomeKeyword::NotRequired],
                },
            )),
            ..Default::default()
        };
        assert!(effective_required(&conditionally, &json!({"trigger": "x"})));
        assert!(!effective_required(&conditionally, &json!({})));
    }
}
