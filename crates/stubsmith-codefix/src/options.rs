//! Code style options for generated members.

use serde::{Deserialize, Serialize};

/// Whether a member may use an expression body (`=> expr;`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpressionBodyPreference {
    #[default]
    Never,
    WhenPossible,
}

impl ExpressionBodyPreference {
    pub fn when_possible(self) -> bool {
        self == ExpressionBodyPreference::WhenPossible
    }
}

/// Expression-body preferences per member kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpressionBodyOptions {
    pub methods: ExpressionBodyPreference,
    pub properties: ExpressionBodyPreference,
    pub indexers: ExpressionBodyPreference,
    pub accessors: ExpressionBodyPreference,
    /// Accepted for host compatibility; this fix generates no constructors.
    pub constructors: ExpressionBodyPreference,
    /// Accepted for host compatibility; this fix generates no operators.
    pub operators: ExpressionBodyPreference,
}

impl Default for ExpressionBodyOptions {
    fn default() -> Self {
        Self {
            methods: ExpressionBodyPreference::Never,
            properties: ExpressionBodyPreference::WhenPossible,
            indexers: ExpressionBodyPreference::WhenPossible,
            accessors: ExpressionBodyPreference::WhenPossible,
            constructors: ExpressionBodyPreference::Never,
            operators: ExpressionBodyPreference::Never,
        }
    }
}

impl ExpressionBodyOptions {
    /// Block bodies everywhere.
    pub fn never() -> Self {
        Self {
            methods: ExpressionBodyPreference::Never,
            properties: ExpressionBodyPreference::Never,
            indexers: ExpressionBodyPreference::Never,
            accessors: ExpressionBodyPreference::Never,
            constructors: ExpressionBodyPreference::Never,
            operators: ExpressionBodyPreference::Never,
        }
    }

    /// Expression bodies wherever the member shape allows one.
    pub fn when_possible() -> Self {
        Self {
            methods: ExpressionBodyPreference::WhenPossible,
            properties: ExpressionBodyPreference::WhenPossible,
            indexers: ExpressionBodyPreference::WhenPossible,
            accessors: ExpressionBodyPreference::WhenPossible,
            constructors: ExpressionBodyPreference::WhenPossible,
            operators: ExpressionBodyPreference::WhenPossible,
        }
    }
}

/// How properties with a getter are generated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyGenerationBehavior {
    #[default]
    PreferThrowingProperties,
    PreferAutoProperties,
}

/// Where generated members go within the declaration part.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsertionBehavior {
    #[default]
    WithOtherMembersOfTheSameKind,
    AtTheEnd,
}

/// Options for the implement-abstract-class fix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImplementTypeOptions {
    pub expression_bodies: ExpressionBodyOptions,
    pub property_generation: PropertyGenerationBehavior,
    pub insertion_behavior: InsertionBehavior,
    /// Render types from other namespaces by simple name and report the
    /// namespace for import instead of qualifying the name.
    pub add_imports: bool,
    /// One level of indentation.
    pub indent: String,
}

impl Default for ImplementTypeOptions {
    fn default() -> Self {
        Self {
            expression_bodies: ExpressionBodyOptions::default(),
            property_generation: PropertyGenerationBehavior::default(),
            insertion_behavior: InsertionBehavior::default(),
            add_imports: true,
            indent: "    ".to_string(),
        }
    }
}

impl ImplementTypeOptions {
    /// Defaults with every expression-body preference set to `Never`.
    pub fn all_block_bodies() -> Self {
        Self {
            expression_bodies: ExpressionBodyOptions::never(),
            ..Self::default()
        }
    }

    pub fn with_expression_bodies(mut self, expression_bodies: ExpressionBodyOptions) -> Self {
        self.expression_bodies = expression_bodies;
        self
    }

    pub fn with_property_generation(mut self, behavior: PropertyGenerationBehavior) -> Self {
        self.property_generation = behavior;
        self
    }

    pub fn with_insertion_behavior(mut self, behavior: InsertionBehavior) -> Self {
        self.insertion_behavior = behavior;
        self
    }

    pub fn with_add_imports(mut self, add_imports: bool) -> Self {
        self.add_imports = add_imports;
        self
    }
}

#[cfg(test)]
#[path = "tests/options_tests.rs"]
mod tests;
