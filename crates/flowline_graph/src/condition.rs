//! Condition and branch resolution.
//!
//! A [`ConditionSet`] is a flat list of [`ConditionRule`]s joined by one
//! shared [`LogicalOperator`]. It is evaluated against a data row and decides
//! which of the two tagged outputs (`"true"` / `"false"`) receives data.
//!
//! The [`ProcessingMode`] controls the routing volume:
//! - [`PerRow`](ProcessingMode::PerRow) evaluates every row of an array and
//!   partitions the rows between the two outputs.
//! - [`Batch`](ProcessingMode::Batch) evaluates the first row only and routes
//!   the whole input to one output, leaving the other one empty.
//!
//! Evaluation never fails: a value that cannot be coerced for an operator
//! makes that rule false.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Output tag that receives rows satisfying the condition.
pub const TRUE_BRANCH: &str = "true";
/// Output tag that receives rows failing the condition.
pub const FALSE_BRANCH: &str = "false";

/// Comparison applied by a single rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    /// Text equality.
    #[default]
    Equals,
    /// Text inequality.
    NotEquals,
    /// Case-sensitive substring check.
    Contains,
    /// Negation of [`Contains`](Operator::Contains).
    NotContains,
    /// Numeric `>`.
    GreaterThan,
    /// Numeric `<`.
    LessThan,
    /// Numeric `>=`.
    GreaterOrEqual,
    /// Numeric `<=`.
    LessOrEqual,
    /// Case-sensitive prefix check.
    StartsWith,
    /// Case-sensitive suffix check.
    EndsWith,
    /// Null, missing, or the empty string. Ignores the rule value.
    IsEmpty,
    /// Negation of [`IsEmpty`](Operator::IsEmpty). Ignores the rule value.
    IsNotEmpty,
}

impl Operator {
    /// Returns the camelCase wire name of the operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::Contains => "contains",
            Operator::NotContains => "notContains",
            Operator::GreaterThan => "greaterThan",
            Operator::LessThan => "lessThan",
            Operator::GreaterOrEqual => "greaterOrEqual",
            Operator::LessOrEqual => "lessOrEqual",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::IsEmpty => "isEmpty",
            Operator::IsNotEmpty => "isNotEmpty",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "equals" => Operator::Equals,
            "notEquals" => Operator::NotEquals,
            "contains" => Operator::Contains,
            "notContains" => Operator::NotContains,
            "greaterThan" => Operator::GreaterThan,
            "lessThan" => Operator::LessThan,
            "greaterOrEqual" => Operator::GreaterOrEqual,
            "lessOrEqual" => Operator::LessOrEqual,
            "startsWith" => Operator::StartsWith,
            "endsWith" => Operator::EndsWith,
            "isEmpty" => Operator::IsEmpty,
            "isNotEmpty" => Operator::IsNotEmpty,
            _ => return None,
        })
    }

    /// Applies the operator to a resolved field value and a rule value.
    ///
    /// `actual` is `None` when the row has no such field.
    #[must_use]
    pub fn apply(self, actual: Option<&Value>, expected: &Value) -> bool {
        match self {
            Operator::Equals => as_text(actual) == as_text(Some(expected)),
            Operator::NotEquals => as_text(actual) != as_text(Some(expected)),
            Operator::Contains => text_check(actual, expected, |a, e| a.contains(e)),
            Operator::NotContains => !text_check(actual, expected, |a, e| a.contains(e)),
            Operator::StartsWith => text_check(actual, expected, |a, e| a.starts_with(e)),
            Operator::EndsWith => text_check(actual, expected, |a, e| a.ends_with(e)),
            Operator::GreaterThan => numeric_check(actual, expected, |a, e| a > e),
            Operator::LessThan => numeric_check(actual, expected, |a, e| a < e),
            Operator::GreaterOrEqual => numeric_check(actual, expected, |a, e| a >= e),
            Operator::LessOrEqual => numeric_check(actual, expected, |a, e| a <= e),
            Operator::IsEmpty => is_empty(actual),
            Operator::IsNotEmpty => !is_empty(actual),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String coercion: null and missing values have no text form.
fn as_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_check(actual: Option<&Value>, expected: &Value, check: impl Fn(&str, &str) -> bool) -> bool {
    match (as_text(actual), as_text(Some(expected))) {
        (Some(actual), Some(expected)) => check(&actual, &expected),
        _ => false,
    }
}

fn numeric_check(actual: Option<&Value>, expected: &Value, check: impl Fn(f64, f64) -> bool) -> bool {
    match (as_number(actual), as_number(Some(expected))) {
        (Some(actual), Some(expected)) => check(actual, expected),
        _ => false,
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// How the rules of a set are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperator {
    /// Every rule must hold.
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    /// At least one rule must hold.
    #[serde(rename = "OR", alias = "or")]
    Or,
}

/// Node-level routing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcessingMode {
    /// Partition an array input row by row.
    PerRow,
    /// Decide on the first row and route the whole input.
    #[default]
    Batch,
}

/// A single `field operator value` check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRule {
    /// Top-level field of the row to inspect.
    pub field: String,
    /// The comparison to apply.
    #[serde(default)]
    pub operator: Operator,
    /// The value to compare against. Ignored by the emptiness operators.
    #[serde(default)]
    pub value: Value,
}

impl ConditionRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluates the rule against a row. Non-object rows have no fields.
    #[must_use]
    pub fn evaluate(&self, row: &Value) -> bool {
        self.operator.apply(row.get(&self.field), &self.value)
    }
}

/// Errors raised while reading a condition node's configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    /// The operator name is not one of the supported operators.
    #[error("unknown condition operator: {0}")]
    UnknownOperator(String),
    /// Neither a rule list nor a condition field is configured.
    #[error("condition has no rules and no conditionField")]
    MissingField,
    /// The configuration does not have the expected shape.
    #[error("invalid condition config: {0}")]
    Invalid(String),
}

/// The rules of one condition node plus how they combine and route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSet {
    /// Rules, all combined with `logical_operator`.
    #[serde(default)]
    pub rules: Vec<ConditionRule>,
    /// The one operator joining every rule.
    #[serde(default)]
    pub logical_operator: LogicalOperator,
    /// Routing mode.
    #[serde(default)]
    pub processing_mode: ProcessingMode,
}

/// Result of routing one input through a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Routing {
    /// Whether any data satisfied the condition.
    pub outcome: bool,
    /// Data for the `"true"` output.
    pub on_true: Value,
    /// Data for the `"false"` output.
    pub on_false: Value,
}

impl Routing {
    /// Returns the data for a branch tag, if the tag is a condition branch.
    #[must_use]
    pub fn branch(&self, tag: &str) -> Option<&Value> {
        match tag {
            TRUE_BRANCH => Some(&self.on_true),
            FALSE_BRANCH => Some(&self.on_false),
            _ => None,
        }
    }
}

impl ConditionSet {
    /// Creates an empty set combined with `AND` in batch mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: ConditionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Sets the combining operator.
    #[must_use]
    pub fn with_logical_operator(mut self, op: LogicalOperator) -> Self {
        self.logical_operator = op;
        self
    }

    /// Sets the processing mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ProcessingMode) -> Self {
        self.processing_mode = mode;
        self
    }

    /// Reads a condition from a node configuration.
    ///
    /// Two shapes are accepted:
    /// - `{ rules: [{ field, operator, value }], logicalOperator, processingMode }`
    /// - `{ conditionField, conditionOperator, conditionValue, processingMode }`
    ///
    /// A missing operator means `equals`; a missing mode means `batch`.
    /// Keys set to `null` count as missing in both shapes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConditionError`] for unknown operators or when no rule can
    /// be built.
    pub fn from_config(config: &Value) -> Result<Self, ConditionError> {
        let Some(map) = config.as_object() else {
            return Err(ConditionError::Invalid("expected an object".to_owned()));
        };

        if map.get("rules").is_some_and(|rules| !rules.is_null()) {
            return Self::from_rules(map);
        }

        let field = map
            .get("conditionField")
            .and_then(Value::as_str)
            .filter(|field| !field.is_empty())
            .ok_or(ConditionError::MissingField)?;
        let operator = match map.get("conditionOperator").and_then(Value::as_str) {
            Some(name) => {
                Operator::parse(name).ok_or_else(|| ConditionError::UnknownOperator(name.to_owned()))?
            }
            None => Operator::Equals,
        };
        let value = map.get("conditionValue").cloned().unwrap_or(Value::Null);

        Ok(Self {
            rules: vec![ConditionRule::new(field, operator, value)],
            logical_operator: LogicalOperator::And,
            processing_mode: read_mode(map)?,
        })
    }

    fn from_rules(map: &Map<String, Value>) -> Result<Self, ConditionError> {
        if let Some(name) = map
            .get("rules")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|rule| rule.get("operator").and_then(Value::as_str))
            .find(|name| Operator::parse(name).is_none())
        {
            return Err(ConditionError::UnknownOperator(name.to_owned()));
        }

        let mut set: Self = serde_json::from_value(without_nulls(map))
            .map_err(|err| ConditionError::Invalid(err.to_string()))?;
        set.processing_mode = read_mode(map)?;
        Ok(set)
    }

    /// Evaluates the combined rules against one row.
    ///
    /// An empty rule set is the identity of its operator: `AND` holds,
    /// `OR` does not.
    #[must_use]
    pub fn evaluate(&self, row: &Value) -> bool {
        match self.logical_operator {
            LogicalOperator::And => self.rules.iter().all(|rule| rule.evaluate(row)),
            LogicalOperator::Or => self.rules.iter().any(|rule| rule.evaluate(row)),
        }
    }

    /// Routes an input to the two branch outputs according to the mode.
    ///
    /// Per-row mode on a non-array input behaves like batch mode.
    #[must_use]
    pub fn route(&self, input: &Value) -> Routing {
        match (self.processing_mode, input) {
            (ProcessingMode::PerRow, Value::Array(rows)) => {
                let (on_true, on_false): (Vec<Value>, Vec<Value>) =
                    rows.iter().cloned().partition(|row| self.evaluate(row));
                Routing {
                    outcome: !on_true.is_empty(),
                    on_true: Value::Array(on_true),
                    on_false: Value::Array(on_false),
                }
            }
            _ => {
                let outcome = self.evaluate(batch_row(input));
                let (on_true, on_false) = if outcome {
                    (input.clone(), Value::Array(Vec::new()))
                } else {
                    (Value::Array(Vec::new()), input.clone())
                };
                Routing {
                    outcome,
                    on_true,
                    on_false,
                }
            }
        }
    }

    /// Short human-readable description of the outcome.
    #[must_use]
    pub fn summarize(&self, routing: &Routing) -> String {
        match self.processing_mode {
            ProcessingMode::PerRow
                if routing.on_true.is_array() && routing.on_false.is_array() =>
            {
                format!(
                    "Filtered: {} true, {} false",
                    row_count(&routing.on_true),
                    row_count(&routing.on_false)
                )
            }
            _ => {
                let rules: Vec<String> = self
                    .rules
                    .iter()
                    .map(|rule| format!("{} {} {}", rule.field, rule.operator, rule.value))
                    .collect();
                let joiner = match self.logical_operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };
                format!("Condition: {} = {}", rules.join(joiner), routing.outcome)
            }
        }
    }
}

fn read_mode(map: &Map<String, Value>) -> Result<ProcessingMode, ConditionError> {
    match map.get("processingMode") {
        None | Some(Value::Null) => Ok(ProcessingMode::Batch),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|err| ConditionError::Invalid(err.to_string())),
    }
}

/// Copies a rule-list config, dropping `null` keys at the top level and
/// inside each rule so serde falls back to the field defaults.
fn without_nulls(map: &Map<String, Value>) -> Value {
    fn strip(map: &Map<String, Value>) -> Map<String, Value> {
        map.iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    let mut config = strip(map);
    if let Some(Value::Array(rules)) = config.get_mut("rules") {
        for rule in rules.iter_mut() {
            if let Value::Object(fields) = rule {
                *fields = strip(fields);
            }
        }
    }
    Value::Object(config)
}

static MISSING_ROW: Value = Value::Null;

/// The row standing in for the whole batch: the first element of an array,
/// or the input itself.
fn batch_row(input: &Value) -> &Value {
    match input {
        Value::Array(rows) => rows.first().unwrap_or(&MISSING_ROW),
        other => other,
    }
}

fn row_count(value: &Value) -> usize {
    value.as_array().map_or(0, Vec::len)
}
