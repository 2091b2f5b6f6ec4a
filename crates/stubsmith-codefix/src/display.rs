//! Type display from inside a target type.
//!
//! Types are rendered the way they would be written in the body of the
//! target declaration:
//!
//! - keyword names for intrinsic types;
//! - named types by simple name when their namespace is in scope, otherwise
//!   namespace-qualified (or simple, with the namespace recorded for import);
//! - nested types with their containing-type chain, minus the leading
//!   segments that are the target's own enclosing types. One qualifier is
//!   kept when the remaining name would be read as a type parameter.
//!
//! Elision only applies at the top level of a rendered type. Type arguments
//! are always rendered in full, since a shortened argument may bind to an
//! inherited nested type of another instantiation.

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use stubsmith_common::Atom;
use stubsmith_common::limits::MAX_DISPLAY_DEPTH;
use stubsmith_solver::{DefId, SemanticSnapshot, TypeData, TypeId};
use tracing::warn;

const SYSTEM_NAMESPACE: &str = "System";
const NOT_IMPLEMENTED_EXCEPTION: &str = "NotImplementedException";

pub struct TypeDisplay<'a> {
    snapshot: &'a SemanticSnapshot,
    namespace: Arc<str>,
    usings: &'a [String],
    add_imports: bool,
    /// Identity types of the target and every containing definition.
    enclosing: FxHashSet<TypeId>,
    /// Type parameter names visible in the target's body.
    scope: Vec<Atom>,
    imports: IndexSet<String>,
}

impl<'a> TypeDisplay<'a> {
    pub fn new(
        snapshot: &'a SemanticSnapshot,
        target: DefId,
        usings: &'a [String],
        add_imports: bool,
    ) -> Self {
        let namespace = snapshot
            .definition(target)
            .filter(|def| !def.namespace.is_none())
            .map(|def| snapshot.name(def.namespace))
            .unwrap_or_else(|| Arc::from(""));
        let enclosing = snapshot
            .store
            .self_and_containers(target)
            .into_iter()
            .map(|def| snapshot.identity_type(def))
            .collect();

        TypeDisplay {
            snapshot,
            namespace,
            usings,
            add_imports,
            enclosing,
            scope: snapshot.type_params_in_scope(target),
            imports: IndexSet::new(),
        }
    }

    pub fn snapshot(&self) -> &'a SemanticSnapshot {
        self.snapshot
    }

    /// True when a type from `namespace` can be named without a qualifier.
    pub fn namespace_in_scope(&self, namespace: &str) -> bool {
        namespace.is_empty()
            || *self.namespace == *namespace
            || self
                .namespace
                .strip_prefix(namespace)
                .is_some_and(|rest| rest.starts_with('.'))
            || self.usings.iter().any(|using| using == namespace)
    }

    /// Name of the exception thrown by generated bodies.
    pub fn not_implemented_exception(&self) -> String {
        if self.namespace_in_scope(SYSTEM_NAMESPACE) {
            NOT_IMPLEMENTED_EXCEPTION.to_string()
        } else {
            format!("{SYSTEM_NAMESPACE}.{NOT_IMPLEMENTED_EXCEPTION}")
        }
    }

    /// Namespaces that types rendered so far rely on being imported.
    pub fn imports(&self) -> Vec<String> {
        self.imports.iter().cloned().collect()
    }

    /// Render `ty`. `method_type_params` are the type parameter names of the
    /// member being rendered, in scope on top of the target's.
    pub fn render(&mut self, ty: TypeId, method_type_params: &[Atom]) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty, method_type_params, true, 0);
        out
    }

    fn write_type(
        &mut self,
        out: &mut String,
        ty: TypeId,
        method_type_params: &[Atom],
        top_level: bool,
        depth: u32,
    ) {
        if depth > MAX_DISPLAY_DEPTH {
            warn!(ty = ty.0, "type display depth exceeded");
            out.push_str("object");
            return;
        }

        let Some(data) = self.snapshot.interner.lookup(ty) else {
            out.push_str("object");
            return;
        };
        match data {
            TypeData::Intrinsic(kind) => out.push_str(kind.keyword()),
            TypeData::TypeParameter(info) => out.push_str(&self.snapshot.name(info.name)),
            TypeData::Named { .. } => {
                self.write_named(out, ty, method_type_params, top_level, depth)
            }
            TypeData::Array { .. } => {
                // `int[][,]` is a one-dimensional array of two-dimensional
                // arrays: ranks read outermost first.
                let mut ranks = Vec::new();
                let mut element = ty;
                while let Some(TypeData::Array {
                    element: inner,
                    rank,
                }) = self.snapshot.interner.lookup(element)
                {
                    ranks.push(rank);
                    element = inner;
                }
                self.write_type(out, element, method_type_params, false, depth + 1);
                for rank in ranks {
                    out.push('[');
                    for _ in 1..rank {
                        out.push(',');
                    }
                    out.push(']');
                }
            }
            TypeData::Nullable(inner) => {
                self.write_type(out, inner, method_type_params, false, depth + 1);
                out.push('?');
            }
            TypeData::Pointer(inner) => {
                self.write_type(out, inner, method_type_params, false, depth + 1);
                out.push('*');
            }
            TypeData::Tuple(elements) => {
                out.push('(');
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_type(out, element.ty, method_type_params, false, depth + 1);
                    if let Some(name) = element.name {
                        out.push(' ');
                        out.push_str(&self.snapshot.name(name));
                    }
                }
                out.push(')');
            }
            TypeData::Error { name, qualifier } => {
                if let Some(qualifier) = qualifier {
                    out.push_str(&self.snapshot.name(qualifier));
                    out.push_str("::");
                }
                out.push_str(&self.snapshot.name(name));
            }
        }
    }

    fn write_named(
        &mut self,
        out: &mut String,
        ty: TypeId,
        method_type_params: &[Atom],
        top_level: bool,
        depth: u32,
    ) {
        // Containing-type chain, outermost first.
        let mut segments = Vec::new();
        let mut current = Some(ty);
        while let Some(segment) = current {
            let Some(TypeData::Named { def, outer, args }) =
                self.snapshot.interner.lookup(segment)
            else {
                break;
            };
            segments.push((segment, def, args));
            if segments.len() as u32 > MAX_DISPLAY_DEPTH {
                break;
            }
            current = outer;
        }
        segments.reverse();

        let mut skip = 0;
        if top_level {
            skip = segments
                .iter()
                .rposition(|(segment, _, _)| self.enclosing.contains(segment))
                .map_or(0, |last| last + 1)
                .min(segments.len().saturating_sub(1));
            if skip > 0 {
                let (_, def, _) = &segments[skip];
                if self.shadowed_by_type_param(*def, method_type_params) {
                    skip -= 1;
                }
            }
        }

        if skip == 0 {
            if let Some((_, outermost, _)) = segments.first() {
                self.write_namespace_prefix(out, *outermost);
            }
        }

        for (index, (_, def, args)) in segments.iter().enumerate().skip(skip) {
            if index > skip {
                out.push('.');
            }
            let name = self
                .snapshot
                .definition(*def)
                .map(|definition| self.snapshot.name(definition.name))
                .unwrap_or_else(|| Arc::from("object"));
            out.push_str(&name);
            if !args.is_empty() {
                out.push('<');
                for (position, &arg) in args.iter().enumerate() {
                    if position > 0 {
                        out.push_str(", ");
                    }
                    self.write_type(out, arg, method_type_params, false, depth + 1);
                }
                out.push('>');
            }
        }
    }

    fn shadowed_by_type_param(&self, def: DefId, method_type_params: &[Atom]) -> bool {
        let Some(definition) = self.snapshot.definition(def) else {
            return false;
        };
        self.scope
            .iter()
            .chain(method_type_params)
            .any(|&name| name == definition.name)
    }

    fn write_namespace_prefix(&mut self, out: &mut String, def: DefId) {
        let Some(definition) = self.snapshot.definition(def) else {
            return;
        };
        if definition.namespace.is_none() {
            return;
        }
        let namespace = self.snapshot.name(definition.namespace);
        if self.namespace_in_scope(&namespace) {
            return;
        }
        if self.add_imports {
            self.imports.insert(namespace.to_string());
        } else {
            out.push_str(&namespace);
            out.push('.');
        }
    }
}

#[cfg(test)]
#[path = "tests/display_tests.rs"]
mod tests;
