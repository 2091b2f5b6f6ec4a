use crate::stub_builder::RenderedMember;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFixInfo {
    /// The internal name of the code fix ("implementAbstractClass").
    pub fix_name: String,
    /// Human-readable description of the fix.
    pub description: String,
    /// Index of the declaration part the members are generated into.
    pub part_index: usize,
    /// Generated members, in the order they appear in the document.
    pub members: Vec<RenderedMember>,
    /// The text to insert, in offset order.
    pub insertions: Vec<TextInsertion>,
    /// Namespaces the generated text needs imported.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports_to_add: Vec<String>,
}

/// Text inserted at a byte offset of the original document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInsertion {
    pub offset: u32,
    pub new_text: String,
}

impl CodeFixInfo {
    /// Apply the insertions to `text`. Offsets are clamped to the text and
    /// moved back to a character boundary.
    pub fn apply(&self, text: &str) -> String {
        apply_insertions(text, &self.insertions)
    }
}

pub fn apply_insertions(text: &str, insertions: &[TextInsertion]) -> String {
    let mut out = text.to_string();
    let mut ordered: Vec<&TextInsertion> = insertions.iter().collect();
    ordered.sort_by_key(|insertion| std::cmp::Reverse(insertion.offset));
    for insertion in ordered {
        let mut offset = (insertion.offset as usize).min(out.len());
        while !out.is_char_boundary(offset) {
            offset -= 1;
        }
        out.insert_str(offset, &insertion.new_text);
    }
    out
}
