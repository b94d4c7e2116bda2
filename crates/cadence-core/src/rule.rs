//! Rule actions invoked by an external rule engine.
//!
//! A [`RuleAction`] declares the parameters it expects. The
//! [`RuleActionAdapter`] extracts and validates them before any domain logic
//! runs; invalid input is an expected outcome and yields a rejected result
//! rather than an error. Derived facts are handed back to the caller, which
//! owns insertion into the engine's working memory.

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::context::ActionContext;
use crate::error::{CoreError, ErrorCategory};
use crate::observer::{ExecutionObserver, NoopObserver};
use crate::types::Fact;
use crate::{DATA_TARGET, LOGIC_TARGET};

/// Expected type of a rule parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Decimal number; JSON numbers and numeric strings are accepted
    Decimal,
    /// Whole number
    Integer,
    /// String
    Text,
    /// Boolean
    Flag,
}

/// Domain check applied after type conversion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Strictly greater than zero
    Positive,
    /// Zero or greater
    NonNegative,
    /// Text with at least one non-whitespace character
    NonEmpty,
    /// Inclusive numeric range
    Range {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
}

/// Declaration of one parameter a rule action reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name as resolved by the rule engine
    pub name: String,
    /// Expected type
    pub kind: ParamKind,
    /// Whether absence rejects the action
    pub required: bool,
    /// Optional domain check
    pub constraint: Option<Constraint>,
}

impl ParameterSpec {
    fn new(name: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            constraint: None,
        }
    }

    /// Required decimal parameter
    pub fn decimal(name: &str) -> Self {
        Self::new(name, ParamKind::Decimal)
    }

    /// Required integer parameter
    pub fn integer(name: &str) -> Self {
        Self::new(name, ParamKind::Integer)
    }

    /// Required text parameter
    pub fn text(name: &str) -> Self {
        Self::new(name, ParamKind::Text)
    }

    /// Required boolean parameter
    pub fn flag(name: &str) -> Self {
        Self::new(name, ParamKind::Flag)
    }

    /// Make the parameter optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Require a strictly positive value
    pub fn positive(self) -> Self {
        self.with_constraint(Constraint::Positive)
    }

    /// Require a value of zero or more
    pub fn non_negative(self) -> Self {
        self.with_constraint(Constraint::NonNegative)
    }

    /// Require non-blank text
    pub fn non_empty(self) -> Self {
        self.with_constraint(Constraint::NonEmpty)
    }

    /// Require a value within `[min, max]`
    pub fn range(self, min: f64, max: f64) -> Self {
        self.with_constraint(Constraint::Range { min, max })
    }

    fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Read, convert and check this parameter from a context.
    ///
    /// Returns `Ok(None)` for an absent optional parameter.
    pub fn extract(&self, ctx: &dyn ActionContext) -> Result<Option<ParamValue>, CoreError> {
        let raw = match ctx.parameter(&self.name) {
            None | Some(serde_json::Value::Null) => {
                return if self.required {
                    Err(CoreError::MissingParameter(self.name.clone()))
                } else {
                    Ok(None)
                };
            }
            Some(raw) => raw,
        };

        let value = self.convert(raw)?;
        if let Some(constraint) = &self.constraint {
            self.check(constraint, &value)?;
        }
        Ok(Some(value))
    }

    fn convert(&self, raw: &serde_json::Value) -> Result<ParamValue, CoreError> {
        let converted = match self.kind {
            ParamKind::Decimal => raw
                .as_f64()
                .or_else(|| raw.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
                .filter(|n| n.is_finite())
                .map(ParamValue::Decimal),
            ParamKind::Integer => raw.as_i64().map(ParamValue::Integer),
            ParamKind::Text => raw.as_str().map(|s| ParamValue::Text(s.to_string())),
            ParamKind::Flag => raw.as_bool().map(ParamValue::Flag),
        };

        converted.ok_or_else(|| {
            CoreError::invalid_parameter(
                &self.name,
                format!("expected {:?}, got {}", self.kind, raw),
            )
        })
    }

    fn check(&self, constraint: &Constraint, value: &ParamValue) -> Result<(), CoreError> {
        let number = value.as_number();
        let satisfied = match constraint {
            Constraint::NonEmpty => matches!(value, ParamValue::Text(s) if !s.trim().is_empty()),
            Constraint::Positive => number.is_some_and(|n| n > 0.0),
            Constraint::NonNegative => number.is_some_and(|n| n >= 0.0),
            Constraint::Range { min, max } => number.is_some_and(|n| n >= *min && n <= *max),
        };

        if satisfied {
            Ok(())
        } else {
            Err(CoreError::invalid_parameter(
                &self.name,
                format!("{} violates {:?}", value, constraint),
            ))
        }
    }
}

/// A converted parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Decimal number
    Decimal(f64),
    /// Whole number
    Integer(i64),
    /// String
    Text(String),
    /// Boolean
    Flag(bool),
}

impl ParamValue {
    /// Numeric view of a decimal or integer value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Decimal(n) => Some(*n),
            ParamValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Decimal(n) => write!(f, "{}", n),
            ParamValue::Integer(n) => write!(f, "{}", n),
            ParamValue::Text(s) => write!(f, "{:?}", s),
            ParamValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

/// Validated parameters handed to a rule action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: HashMap<String, ParamValue>,
}

impl Parameters {
    /// Raw value lookup
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Numeric value of a decimal or integer parameter
    pub fn decimal(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_number)
    }

    /// Integer parameter
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(ParamValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// Text parameter
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(ParamValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Boolean parameter
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(ParamValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    /// Number of present parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no parameter is present
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Outcome of one rule action invocation.
///
/// Facts can only be attached to an applied result, so a rejected result
/// never carries facts. Deserialization enforces the same rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRuleActionResult")]
pub struct RuleActionResult {
    applied: bool,
    facts: Vec<Fact>,
}

#[derive(Deserialize)]
struct RawRuleActionResult {
    applied: bool,
    #[serde(default)]
    facts: Vec<Fact>,
}

impl TryFrom<RawRuleActionResult> for RuleActionResult {
    type Error = CoreError;

    fn try_from(raw: RawRuleActionResult) -> Result<Self, Self::Error> {
        if raw.applied {
            Ok(Self::applied(raw.facts))
        } else if raw.facts.is_empty() {
            Ok(Self::rejected())
        } else {
            Err(CoreError::Serialization(
                "a rejected rule result cannot carry facts".to_string(),
            ))
        }
    }
}

impl RuleActionResult {
    /// The action took effect and derived these facts
    pub fn applied(facts: Vec<Fact>) -> Self {
        Self {
            applied: true,
            facts,
        }
    }

    /// The action was rejected
    pub fn rejected() -> Self {
        Self {
            applied: false,
            facts: Vec::new(),
        }
    }

    /// Whether the action took effect
    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Facts for the rule engine's working memory
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Take the facts
    pub fn into_facts(self) -> Vec<Fact> {
        self.facts
    }
}

/// Reward or effect triggered by a matched rule.
#[async_trait]
pub trait RuleAction: Send + Sync {
    /// Registered name, used in logs and metrics
    fn name(&self) -> &str;

    /// Parameters this action reads
    fn parameters(&self) -> Vec<ParameterSpec>;

    /// Cross-parameter validation run after every declared parameter passed
    /// its own checks. Return an input error to reject silently.
    fn validate(&self, _params: &Parameters) -> Result<(), CoreError> {
        Ok(())
    }

    /// Apply the action and return the derived facts
    async fn apply(&self, params: &Parameters, ctx: &dyn ActionContext)
        -> Result<Vec<Fact>, CoreError>;
}

/// Runs one rule action per call and always yields a [`RuleActionResult`].
pub struct RuleActionAdapter {
    action: Arc<dyn RuleAction>,
    specs: Vec<ParameterSpec>,
    observer: Arc<dyn ExecutionObserver>,
}

impl RuleActionAdapter {
    /// Create an adapter for the given action
    pub fn new(action: Arc<dyn RuleAction>) -> Self {
        let specs = action.parameters();
        Self {
            action,
            specs,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Report outcomes to the given observer
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Name of the wrapped action
    pub fn action_name(&self) -> &str {
        self.action.name()
    }

    /// Declared parameters of the wrapped action
    pub fn parameter_specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    /// Extract every declared parameter from the context
    pub fn extract(&self, ctx: &dyn ActionContext) -> Result<Parameters, CoreError> {
        let mut values = HashMap::with_capacity(self.specs.len());
        for spec in &self.specs {
            if let Some(value) = spec.extract(ctx)? {
                values.insert(spec.name.clone(), value);
            }
        }
        Ok(Parameters { values })
    }

    /// Apply the action against a context.
    pub async fn apply(&self, ctx: &dyn ActionContext) -> RuleActionResult {
        let action = self.action.name();

        let params = match self.extract(ctx) {
            Ok(params) => params,
            Err(e) => return self.reject(ctx, e),
        };

        debug!(
            action = %action,
            invocation = %ctx.invocation_id(),
            parameters = params.len(),
            "Applying rule action"
        );

        let outcome = AssertUnwindSafe(async {
            self.action.validate(&params)?;
            self.action.apply(&params, ctx).await
        })
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(CoreError::from_panic(payload)));

        match outcome {
            Ok(facts) => {
                info!(
                    action = %action,
                    invocation = %ctx.invocation_id(),
                    facts = facts.len(),
                    "Rule action applied"
                );
                self.finish(RuleActionResult::applied(facts))
            }
            Err(e) => self.reject(ctx, e),
        }
    }

    fn reject(&self, ctx: &dyn ActionContext, e: CoreError) -> RuleActionResult {
        let action = self.action.name();
        let category = e.category();
        if category == ErrorCategory::Input {
            warn!(
                target: DATA_TARGET,
                action = %action,
                invocation = %ctx.invocation_id(),
                error = %e,
                "Rule action parameters rejected"
            );
        } else {
            error!(
                target: LOGIC_TARGET,
                action = %action,
                invocation = %ctx.invocation_id(),
                error = %e,
                "Rule action failed"
            );
        }
        self.observer.on_contained_failure(action, category);
        self.finish(RuleActionResult::rejected())
    }

    fn finish(&self, result: RuleActionResult) -> RuleActionResult {
        self.observer
            .on_rule_result(self.action.name(), result.is_applied(), result.facts().len());
        result
    }
}

impl fmt::Debug for RuleActionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleActionAdapter")
            .field("action", &self.action.name())
            .field("specs", &self.specs)
            .finish()
    }
}
