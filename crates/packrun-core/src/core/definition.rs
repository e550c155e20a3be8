// crates/packrun-core/src/core/definition.rs
// ============================================================================
// Module: Packrun Definition Model
// Description: Automation pack definitions with inputs, steps, and outcomes.
// Purpose: Provide the declarative workflow model consumed by the runtime.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! An automation pack is a declarative, versioned workflow of ordered steps
//! with typed inputs, expected outcomes, approval requirements, and optional
//! rollback hooks. Definitions arrive from an external store and are treated
//! as untrusted until the validator has normalized and checked them; string
//! fields therefore default to empty rather than failing deserialization, so
//! the validator can report every issue in one aggregate pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Metadata
// ============================================================================

/// Identity and versioning metadata for an automation pack.
///
/// # Invariants
/// - `id` is lowercase and matches `^[a-z0-9][a-z0-9._-]{1,127}$` after
///   validation.
/// - `version` matches `MAJOR.MINOR.PATCH` with an optional `-`/`+` suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackMetadata {
    /// Pack identifier, unique within the definition store.
    #[serde(default)]
    pub id: String,
    /// Human-readable pack name.
    #[serde(default)]
    pub name: String,
    /// Pack version.
    #[serde(default)]
    pub version: String,
    /// Optional pack description.
    pub description: Option<String>,
}

// ============================================================================
// SECTION: Inputs
// ============================================================================

/// Declared type of an automation pack input.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// UTF-8 string value.
    String,
    /// Numeric value, integral or fractional.
    Number,
    /// Numeric value with no fractional part.
    Integer,
    /// Boolean value.
    Boolean,
    /// Ordered list of values.
    Array,
    /// String-keyed map of values.
    Object,
}

impl InputType {
    /// Returns a stable label for the input type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Returns the type label with its indefinite article, for messages.
    #[must_use]
    pub const fn with_article(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Number => "a number",
            Self::Integer => "an integer",
            Self::Boolean => "a boolean",
            Self::Array => "an array",
            Self::Object => "an object",
        }
    }

    /// Returns true when the value conforms to the declared type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => match value {
                Value::Number(number) => crate::core::value::number_is_integral(number),
                _ => false,
            },
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// Constraints applied to a resolved input value.
///
/// # Invariants
/// - Constraint legality is type-dependent and checked by the validator:
///   length and pattern constraints apply to strings, bounds to numerics,
///   item counts to arrays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputConstraints {
    /// Minimum string length in characters.
    pub min_length: Option<usize>,
    /// Maximum string length in characters.
    pub max_length: Option<usize>,
    /// Regular expression the string must match.
    pub pattern: Option<String>,
    /// Inclusive numeric lower bound.
    pub minimum: Option<f64>,
    /// Inclusive numeric upper bound.
    pub maximum: Option<f64>,
    /// Closed set of allowed values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    /// Minimum number of array items.
    pub min_items: Option<usize>,
    /// Maximum number of array items.
    pub max_items: Option<usize>,
}

/// Declared input of an automation pack.
///
/// # Invariants
/// - `name` is unique within the pack after validation.
/// - `default`, when present, conforms to `input_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Input name referenced by `{{ inputs.NAME }}` templates.
    #[serde(default)]
    pub name: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub input_type: InputType,
    /// Whether the caller must supply a value when no default exists.
    #[serde(default)]
    pub required: bool,
    /// Default value used when the caller omits the input.
    pub default: Option<Value>,
    /// Constraints applied to the resolved value.
    #[serde(default)]
    pub constraints: InputConstraints,
}

// ============================================================================
// SECTION: Approvals
// ============================================================================

/// Approval requirement at workflow or step scope.
///
/// # Invariants
/// - When `required` is true, the effective approver minimum is at least 1.
/// - When `approver_roles` is non-empty, `minimum_approvers` does not exceed
///   the role count.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApprovalSpec {
    /// Whether this scope requires approval before mutating steps run.
    #[serde(default)]
    pub required: bool,
    /// Declared minimum number of approvers.
    #[serde(default)]
    pub minimum_approvers: u32,
    /// Roles allowed to approve at this scope.
    #[serde(default)]
    pub approver_roles: Vec<String>,
}

// ============================================================================
// SECTION: Steps
// ============================================================================

/// Rollback hook attached to a step.
///
/// # Invariants
/// - `action` is non-empty after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackSpec {
    /// Action verb invoked to undo the step.
    #[serde(default)]
    pub action: String,
    /// Parameters passed to the rollback action; templates resolve against
    /// the same inputs as the forward step.
    pub parameters: Option<Map<String, Value>>,
    /// Per-invocation timeout in seconds; 0 selects the runtime default.
    #[serde(default)]
    pub timeout_seconds: u64,
}

/// One unit of work within an automation pack.
///
/// # Invariants
/// - `id` is non-empty and unique within the pack after validation.
/// - `action` is non-empty after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Step identifier, unique within the pack.
    #[serde(default)]
    pub id: String,
    /// Optional human-readable step name.
    pub name: Option<String>,
    /// Action verb interpreted by the action runner.
    #[serde(default)]
    pub action: String,
    /// Parameter tree passed to the runner after template resolution.
    pub parameters: Option<Map<String, Value>>,
    /// Explicit mutation override; `None` defers to classification.
    pub mutating: Option<bool>,
    /// Per-attempt timeout in seconds; 0 selects the runtime default.
    #[serde(default)]
    pub timeout_seconds: u64,
    /// Number of retries after the first attempt.
    #[serde(default)]
    pub max_retries: u32,
    /// Step-scoped approval requirement.
    pub approval: Option<ApprovalSpec>,
    /// Rollback hook invoked in reverse order on terminal failure or block.
    pub rollback: Option<RollbackSpec>,
    /// Step-scoped expected outcomes.
    #[serde(default)]
    pub expected_outcomes: Vec<OutcomeSpec>,
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Expected outcome declared at workflow or step scope.
///
/// # Invariants
/// - `description` and `success_criteria` are non-empty after validation.
/// - `step_id`, when present, references an existing step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSpec {
    /// What the outcome asserts about the run.
    #[serde(default)]
    pub description: String,
    /// How an operator verifies the outcome.
    #[serde(default)]
    pub success_criteria: String,
    /// Optional step the outcome is scoped to.
    pub step_id: Option<String>,
}

// ============================================================================
// SECTION: Pack Definition
// ============================================================================

/// Complete automation pack definition.
///
/// # Invariants
/// - `steps` is non-empty after validation.
/// - At least one outcome exists across workflow and step scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackDefinition {
    /// Pack identity and versioning metadata.
    pub metadata: PackMetadata,
    /// Declared inputs.
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    /// Workflow-scoped approval requirement applied to every mutating step.
    pub approval: Option<ApprovalSpec>,
    /// Ordered steps executed strictly sequentially.
    #[serde(default)]
    pub steps: Vec<StepSpec>,
    /// Workflow-scoped expected outcomes.
    #[serde(default)]
    pub expected_outcomes: Vec<OutcomeSpec>,
}

impl PackDefinition {
    /// Returns the total number of declared outcomes across both scopes.
    #[must_use]
    pub fn outcome_count(&self) -> usize {
        self.expected_outcomes.len()
            + self
                .steps
                .iter()
                .map(|step| step.expected_outcomes.len())
                .sum::<usize>()
    }
}
