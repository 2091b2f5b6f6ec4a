//! Override stub rendering.
//!
//! Every generated body throws `NotImplementedException`. Each member is
//! rendered without base indentation; the insertion locator indents it into
//! the declaration part.

use crate::defaults::render_default;
use crate::display::TypeDisplay;
use crate::insertion::DeclarationKind;
use crate::options::{ImplementTypeOptions, PropertyGenerationBehavior};
use serde::Serialize;
use stubsmith_common::Atom;
use stubsmith_solver::{
    Accessibility, AccessorInfo, AccessorKind, MemberKind, ResolvedMember,
};
use tracing::trace;

/// One generated override, ready to insert.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedMember {
    pub name: String,
    pub kind: DeclarationKind,
    pub accessibility: Accessibility,
    pub text: String,
}

impl RenderedMember {
    pub fn is_single_line(&self) -> bool {
        !self.text.contains('\n')
    }
}

pub struct StubBuilder<'o, 'a> {
    options: &'o ImplementTypeOptions,
    display: TypeDisplay<'a>,
    exception: String,
}

impl<'o, 'a> StubBuilder<'o, 'a> {
    pub fn new(display: TypeDisplay<'a>, options: &'o ImplementTypeOptions) -> Self {
        let exception = display.not_implemented_exception();
        StubBuilder {
            options,
            display,
            exception,
        }
    }

    /// Namespaces the rendered types rely on being imported.
    pub fn imports(&self) -> Vec<String> {
        self.display.imports()
    }

    pub fn build(&mut self, member: &ResolvedMember) -> RenderedMember {
        let name = self.display.snapshot().name(member.name).to_string();
        let text = match member.kind {
            MemberKind::Method => self.method(member, &name),
            MemberKind::Property | MemberKind::Indexer => self.property(member, &name),
            MemberKind::Event => self.event(member, &name),
        };
        trace!(member = %name, lines = text.lines().count(), "rendered stub");

        RenderedMember {
            name,
            kind: DeclarationKind::of(member.kind),
            accessibility: member.accessibility,
            text,
        }
    }

    fn throw_expression(&self) -> String {
        format!("throw new {}()", self.exception)
    }

    fn block_body(&self) -> String {
        format!("{{\n{}{};\n}}", self.options.indent, self.throw_expression())
    }

    fn modifiers(&self, member: &ResolvedMember) -> String {
        let mut out = String::from(member.accessibility.keyword());
        out.push_str(" override ");
        if member.is_unsafe {
            out.push_str("unsafe ");
        }
        out
    }

    fn method(&mut self, member: &ResolvedMember, name: &str) -> String {
        let type_params = &member.type_params;
        let return_type = self.display.render(member.ty, type_params);
        let params = self.param_list(member);
        let header = format!(
            "{}{return_type} {name}{}({params})",
            self.modifiers(member),
            self.type_param_list(type_params),
        );

        if self.options.expression_bodies.methods.when_possible() {
            format!("{header} => {};", self.throw_expression())
        } else {
            format!("{header}\n{}", self.block_body())
        }
    }

    fn property(&mut self, member: &ResolvedMember, name: &str) -> String {
        let ty = self.display.render(member.ty, &[]);
        let header = match member.kind {
            MemberKind::Indexer => {
                let params = self.param_list(member);
                format!("{}{ty} this[{params}]", self.modifiers(member))
            }
            _ => format!("{}{ty} {name}", self.modifiers(member)),
        };

        let auto = member.kind == MemberKind::Property
            && self.options.property_generation == PropertyGenerationBehavior::PreferAutoProperties;
        let has_get = member.accessors.iter().any(|a| a.kind == AccessorKind::Get);
        if auto && has_get {
            let accessors: Vec<String> = member
                .accessors
                .iter()
                .map(|accessor| {
                    format!("{}{};", accessor_prefix(member, accessor), accessor.kind.keyword())
                })
                .collect();
            return format!("{header} {{ {} }}", accessors.join(" "));
        }
        if auto {
            let accessors: Vec<String> = member
                .accessors
                .iter()
                .map(|accessor| self.expression_accessor(member, accessor))
                .collect();
            return format!("{header} {{ {} }}", accessors.join(" "));
        }

        let preference = match member.kind {
            MemberKind::Indexer => self.options.expression_bodies.indexers,
            _ => self.options.expression_bodies.properties,
        };
        let read_only = matches!(
            member.accessors.as_slice(),
            [AccessorInfo { kind: AccessorKind::Get, .. }]
        ) && accessor_prefix(member, &member.accessors[0]).is_empty();
        if read_only && preference.when_possible() {
            return format!("{header} => {};", self.throw_expression());
        }

        self.with_accessor_list(header, member)
    }

    fn event(&mut self, member: &ResolvedMember, name: &str) -> String {
        let ty = self.display.render(member.ty, &[]);
        let header = format!("{}event {ty} {name}", self.modifiers(member));
        let both = member.accessors.len() == 2;
        if member.field_like && both {
            return format!("{header};");
        }
        self.with_accessor_list(header, member)
    }

    fn with_accessor_list(&self, header: String, member: &ResolvedMember) -> String {
        let expression = self.options.expression_bodies.accessors.when_possible();
        let accessors: Vec<String> = member
            .accessors
            .iter()
            .map(|accessor| {
                if expression {
                    self.expression_accessor(member, accessor)
                } else {
                    format!(
                        "{}{}\n{}",
                        accessor_prefix(member, accessor),
                        accessor.kind.keyword(),
                        self.block_body()
                    )
                }
            })
            .collect();
        let separator = if expression { "\n" } else { "\n\n" };
        let body = indent_lines(&accessors.join(separator), &self.options.indent);
        format!("{header}\n{{\n{body}\n}}")
    }

    fn expression_accessor(&self, member: &ResolvedMember, accessor: &AccessorInfo) -> String {
        format!(
            "{}{} => {};",
            accessor_prefix(member, accessor),
            accessor.kind.keyword(),
            self.throw_expression()
        )
    }

    fn type_param_list(&self, type_params: &[Atom]) -> String {
        if type_params.is_empty() {
            return String::new();
        }
        let snapshot = self.display.snapshot();
        let names: Vec<String> = type_params
            .iter()
            .map(|&name| snapshot.name(name).to_string())
            .collect();
        format!("<{}>", names.join(", "))
    }

    fn param_list(&mut self, member: &ResolvedMember) -> String {
        let mut rendered = Vec::with_capacity(member.params.len());
        for param in &member.params {
            let mut out = String::new();
            if let Some(keyword) = param.modifier.keyword() {
                out.push_str(keyword);
                out.push(' ');
            }
            out.push_str(&self.display.render(param.ty, &member.type_params));
            out.push(' ');
            out.push_str(&self.display.snapshot().name(param.name));
            if let Some(default) = &param.default {
                out.push_str(" = ");
                out.push_str(&render_default(
                    &mut self.display,
                    param.ty,
                    default,
                    &member.type_params,
                ));
            }
            rendered.push(out);
        }
        rendered.join(", ")
    }
}

/// `internal ` when the accessor is narrower than its member.
fn accessor_prefix(member: &ResolvedMember, accessor: &AccessorInfo) -> String {
    match accessor.accessibility {
        Some(accessibility) if accessibility != member.accessibility => {
            format!("{} ", accessibility.keyword())
        }
        _ => String::new(),
    }
}

/// Prefix every non-empty line of `text` with `indent`.
pub fn indent_lines(text: &str, indent: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "tests/stub_builder_tests.rs"]
mod tests;
