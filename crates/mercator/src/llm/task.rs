//! Generation requests passed to providers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enhance::ResearchContext;
use crate::input::ContextHints;
use crate::schema::{CanonicalField, CanonicalProduct, FieldRequirement};

/// What a generation request produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Content for one canonical field.
    Field(CanonicalField),
    /// The per-product research context.
    Research,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Field(field) => write!(f, "{}", field),
            TaskKind::Research => f.write_str("research"),
        }
    }
}

/// Output constraints for a generated field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConstraints {
    pub max_length: Option<usize>,
    pub min_count: Option<usize>,
    pub max_count: Option<usize>,
}

impl From<&FieldRequirement> for FieldConstraints {
    fn from(requirement: &FieldRequirement) -> Self {
        Self {
            max_length: requirement.max_length,
            min_count: requirement.min_count,
            max_count: requirement.max_count,
        }
    }
}

/// One generation request: task kind, enriched context and constraints.
#[derive(Debug, Clone)]
pub struct GenerationTask {
    pub kind: TaskKind,
    /// The product as it stands, including fields generated earlier in the
    /// same pass.
    pub product: CanonicalProduct,
    pub research: Option<ResearchContext>,
    pub hints: ContextHints,
    pub constraints: FieldConstraints,
}

impl GenerationTask {
    /// A request for one canonical field.
    pub fn field(field: CanonicalField, product: &CanonicalProduct) -> Self {
        Self {
            kind: TaskKind::Field(field),
            product: product.clone(),
            research: None,
            hints: ContextHints::default(),
            constraints: FieldConstraints::default(),
        }
    }

    /// A research request for a product.
    pub fn research(product: &CanonicalProduct) -> Self {
        Self {
            kind: TaskKind::Research,
            ..Self::field(CanonicalField::Title, product)
        }
    }

    pub fn with_research(mut self, research: Option<ResearchContext>) -> Self {
        self.research = research;
        self
    }

    pub fn with_hints(mut self, hints: ContextHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_constraints(mut self, constraints: FieldConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Identifier of the product this request is for.
    pub fn identifier(&self) -> &str {
        &self.product.identifier
    }
}
