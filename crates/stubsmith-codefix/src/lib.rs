//! Implement-abstract-class code fix.
//!
//! Turns the solver's resolved work list into source text: style options,
//! type display from inside the target, default value expressions, stub
//! bodies and the insertion plan for a declaration part.
pub mod code_action_fixes;
pub mod defaults;
pub mod display;
pub mod implement_abstract_class;
pub mod insertion;
pub mod options;
pub mod stub_builder;

pub use code_action_fixes::{CodeFixInfo, TextInsertion, apply_insertions};
pub use display::TypeDisplay;
pub use implement_abstract_class::{ImplementAbstractClassFix, ImplementAbstractClassRequest};
pub use insertion::{DeclarationKind, DeclarationPart, ExistingMember};
pub use options::{
    ExpressionBodyOptions, ExpressionBodyPreference, ImplementTypeOptions, InsertionBehavior,
    PropertyGenerationBehavior,
};
pub use stub_builder::{RenderedMember, StubBuilder};
pub use stubsmith_solver::NotApplicable;
