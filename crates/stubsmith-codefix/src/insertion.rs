//! Insertion locator.
//!
//! A declaration part is described by its brace offsets, the spans of its
//! existing members and the hidden regions that overlap it. Slot `i` is the
//! gap before existing member `i` (slot `n` is the gap before the closing
//! brace):
//!
//! ```text
//! class C : Base
//! {            <- slot 0 starts after the open brace
//!     void A() { }
//!              <- slot 1 starts at the end of A
//!     void B() { }
//!              <- slot 2 starts at the end of B, ends at the close brace
//! }
//! ```
//!
//! A slot is available when its gap does not overlap a hidden span. A part
//! with no available slot is hidden.

use crate::code_action_fixes::TextInsertion;
use crate::options::InsertionBehavior;
use crate::stub_builder::{RenderedMember, indent_lines};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use stubsmith_common::ByteSpan;
use stubsmith_solver::{Accessibility, MemberKind};
use tracing::debug;

/// Member declaration kinds, in canonical declaration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    Field,
    Constructor,
    Destructor,
    Indexer,
    Property,
    Event,
    Method,
    Operator,
    NestedType,
}

impl DeclarationKind {
    pub fn of(kind: MemberKind) -> Self {
        match kind {
            MemberKind::Method => DeclarationKind::Method,
            MemberKind::Property => DeclarationKind::Property,
            MemberKind::Indexer => DeclarationKind::Indexer,
            MemberKind::Event => DeclarationKind::Event,
        }
    }
}

/// A member already present in a declaration part.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingMember {
    pub kind: DeclarationKind,
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_static: bool,
    pub span: ByteSpan,
}

/// One syntactic declaration of the target type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationPart {
    /// Offset of `{`.
    pub open_brace: u32,
    /// Offset of `}`.
    pub close_brace: u32,
    /// Existing members in source order.
    #[serde(default)]
    pub members: Vec<ExistingMember>,
    #[serde(default)]
    pub hidden: Vec<ByteSpan>,
    /// Indentation of members in this part; the configured unit when absent.
    #[serde(default)]
    pub member_indent: Option<String>,
}

impl DeclarationPart {
    pub fn new(open_brace: u32, close_brace: u32) -> Self {
        DeclarationPart {
            open_brace,
            close_brace,
            ..Self::default()
        }
    }

    pub fn with_member(mut self, member: ExistingMember) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_hidden(mut self, span: ByteSpan) -> Self {
        self.hidden.push(span);
        self
    }

    pub fn with_member_indent(mut self, indent: impl Into<String>) -> Self {
        self.member_indent = Some(indent.into());
        self
    }

    pub fn slot_count(&self) -> usize {
        self.members.len() + 1
    }

    /// The gap slot `slot` covers.
    pub fn slot_span(&self, slot: usize) -> ByteSpan {
        let start = match slot {
            0 => self.open_brace + 1,
            _ => self.members[slot - 1].span.end,
        };
        let end = self
            .members
            .get(slot)
            .map_or(self.close_brace, |member| member.span.start);
        ByteSpan::new(start, end.max(start))
    }

    pub fn is_slot_available(&self, slot: usize) -> bool {
        let gap = self.slot_span(slot);
        !self.hidden.iter().any(|hidden| hidden.overlaps(gap))
    }

    pub fn available_slots(&self) -> Vec<usize> {
        (0..self.slot_count())
            .filter(|&slot| self.is_slot_available(slot))
            .collect()
    }

    pub fn is_hidden(&self) -> bool {
        self.available_slots().is_empty()
    }
}

/// The part to generate into: the invoked part, else the first other part
/// with an available slot.
pub fn choose_part(parts: &[DeclarationPart], invoked: usize) -> Option<usize> {
    if parts.get(invoked).is_some_and(|part| !part.is_hidden()) {
        return Some(invoked);
    }
    parts
        .iter()
        .enumerate()
        .find(|&(index, part)| index != invoked && !part.is_hidden())
        .map(|(index, _)| index)
}

fn accessibility_rank(accessibility: Accessibility) -> u8 {
    match accessibility {
        Accessibility::Public => 0,
        Accessibility::Internal => 1,
        Accessibility::ProtectedInternal => 2,
        Accessibility::Protected => 3,
        Accessibility::PrivateProtected => 4,
        Accessibility::Private => 5,
    }
}

/// Canonical member order: kind, then static before instance, then
/// accessibility.
pub fn compare_members(
    a: (DeclarationKind, bool, Accessibility),
    b: (DeclarationKind, bool, Accessibility),
) -> Ordering {
    a.0.cmp(&b.0)
        .then_with(|| b.1.cmp(&a.1))
        .then_with(|| accessibility_rank(a.2).cmp(&accessibility_rank(b.2)))
}

fn existing_key(member: &ExistingMember) -> (DeclarationKind, bool, Accessibility) {
    (member.kind, member.is_static, member.accessibility)
}

fn generated_key(member: &RenderedMember) -> (DeclarationKind, bool, Accessibility) {
    (member.kind, false, member.accessibility)
}

/// Sort generated members into canonical order; ties keep resolution order.
pub fn order_members(members: &mut [RenderedMember]) {
    members.sort_by(|a, b| compare_members(generated_key(a), generated_key(b)));
}

/// Slot for one generated member.
fn target_slot(part: &DeclarationPart, member: &RenderedMember, behavior: InsertionBehavior) -> usize {
    let available = part.available_slots();
    let last_available = available.last().copied().unwrap_or(part.slot_count() - 1);
    match behavior {
        InsertionBehavior::AtTheEnd => last_available,
        InsertionBehavior::WithOtherMembersOfTheSameKind => {
            let preferred = part
                .members
                .iter()
                .rposition(|existing| {
                    compare_members(existing_key(existing), generated_key(member))
                        != Ordering::Greater
                })
                .map_or(0, |index| index + 1);
            nearest_available(&available, preferred).unwrap_or(last_available)
        }
    }
}

/// `preferred` if available, else the closest available slot, later first.
fn nearest_available(available: &[usize], preferred: usize) -> Option<usize> {
    available.iter().copied().min_by_key(|&slot| {
        let distance = slot.abs_diff(preferred);
        (distance, slot < preferred)
    })
}

/// Place the ordered members into `part` and produce the text insertions,
/// one per slot used, in offset order.
pub fn plan_insertions(
    part: &DeclarationPart,
    members: &[RenderedMember],
    behavior: InsertionBehavior,
    default_indent: &str,
) -> Vec<TextInsertion> {
    let indent = part.member_indent.as_deref().unwrap_or(default_indent);

    let mut by_slot: Vec<(usize, Vec<&RenderedMember>)> = Vec::new();
    for member in members {
        let slot = target_slot(part, member, behavior);
        match by_slot.iter_mut().find(|(existing, _)| *existing == slot) {
            Some((_, group)) => group.push(member),
            None => by_slot.push((slot, vec![member])),
        }
    }
    by_slot.sort_by_key(|(slot, _)| *slot);

    by_slot
        .into_iter()
        .map(|(slot, group)| {
            let insertion = slot_insertion(part, slot, &group, indent);
            debug!(slot, offset = insertion.offset, members = group.len(), "insertion");
            insertion
        })
        .collect()
}

fn slot_insertion(
    part: &DeclarationPart,
    slot: usize,
    group: &[&RenderedMember],
    indent: &str,
) -> TextInsertion {
    let mut body = String::new();
    for (index, member) in group.iter().enumerate() {
        if index > 0 {
            let compact = member.is_single_line() && group[index - 1].is_single_line();
            body.push_str(if compact { "\n" } else { "\n\n" });
        }
        body.push_str(&indent_lines(&member.text, indent));
    }

    let offset = part.slot_span(slot).start;
    let new_text = if slot == 0 {
        // The existing text after `{` starts with a line break; keep a blank
        // line before the first existing member.
        let trailer = if part.members.is_empty() { "" } else { "\n" };
        format!("\n{body}{trailer}")
    } else {
        format!("\n\n{body}")
    };
    TextInsertion { offset, new_text }
}

#[cfg(test)]
#[path = "tests/insertion_tests.rs"]
mod tests;
