//! The implement-abstract-class code fix.
//!
//! Resolves the target's unimplemented abstract members, renders one
//! throwing override per member and places them into a visible declaration
//! part of the target. Every not-applicable outcome is detected before any
//! text is generated.

use crate::code_action_fixes::CodeFixInfo;
use crate::display::TypeDisplay;
use crate::insertion::{DeclarationPart, choose_part, order_members, plan_insertions};
use crate::options::ImplementTypeOptions;
use crate::stub_builder::{RenderedMember, StubBuilder};
use stubsmith_solver::{DefId, NotApplicable, SemanticSnapshot, resolve_unimplemented_members};
use tracing::{debug, debug_span};

/// Where the fix was invoked and what the target looks like syntactically.
#[derive(Clone, Debug)]
pub struct ImplementAbstractClassRequest {
    pub target: DefId,
    /// Declaration parts of the target, in declaration order.
    pub parts: Vec<DeclarationPart>,
    /// The part the fix was invoked on.
    pub invoked_part: usize,
    /// Namespaces imported where the invoked part is declared.
    pub usings: Vec<String>,
}

impl ImplementAbstractClassRequest {
    pub fn new(target: DefId, part: DeclarationPart) -> Self {
        ImplementAbstractClassRequest {
            target,
            parts: vec![part],
            invoked_part: 0,
            usings: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: DeclarationPart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn invoked_on(mut self, part: usize) -> Self {
        self.invoked_part = part;
        self
    }

    pub fn with_using(mut self, namespace: impl Into<String>) -> Self {
        self.usings.push(namespace.into());
        self
    }
}

pub struct ImplementAbstractClassFix;

impl ImplementAbstractClassFix {
    pub const FIX_NAME: &'static str = "implementAbstractClass";
    pub const DESCRIPTION: &'static str = "Implement abstract class";

    pub fn compute(
        snapshot: &SemanticSnapshot,
        request: &ImplementAbstractClassRequest,
        options: &ImplementTypeOptions,
    ) -> Result<CodeFixInfo, NotApplicable> {
        let _span = debug_span!("implement_abstract_class", target = request.target.0).entered();

        let resolved = resolve_unimplemented_members(snapshot, request.target)?;
        if resolved.is_empty() {
            return Err(NotApplicable::NoUnimplementedMembers);
        }
        let part_index = choose_part(&request.parts, request.invoked_part)
            .ok_or(NotApplicable::NoVisibleInsertionPoint)?;
        let part = &request.parts[part_index];

        let display = TypeDisplay::new(snapshot, request.target, &request.usings, options.add_imports);
        let mut builder = StubBuilder::new(display, options);
        let mut members: Vec<RenderedMember> =
            resolved.iter().map(|member| builder.build(member)).collect();
        order_members(&mut members);

        let insertions = plan_insertions(part, &members, options.insertion_behavior, &options.indent);
        let imports_to_add = builder.imports();
        debug!(
            part = part_index,
            members = members.len(),
            insertions = insertions.len(),
            imports = imports_to_add.len(),
            "implement abstract class"
        );

        Ok(CodeFixInfo {
            fix_name: Self::FIX_NAME.to_string(),
            description: Self::DESCRIPTION.to_string(),
            part_index,
            members,
            insertions,
            imports_to_add,
        })
    }

    /// Whether the fix would produce an edit for `request`.
    pub fn is_applicable(
        snapshot: &SemanticSnapshot,
        request: &ImplementAbstractClassRequest,
    ) -> Result<(), NotApplicable> {
        let resolved = resolve_unimplemented_members(snapshot, request.target)?;
        if resolved.is_empty() {
            return Err(NotApplicable::NoUnimplementedMembers);
        }
        choose_part(&request.parts, request.invoked_part)
            .map(|_| ())
            .ok_or(NotApplicable::NoVisibleInsertionPoint)
    }
}

#[cfg(test)]
#[path = "tests/implement_abstract_class_unit_tests.rs"]
mod tests;
