//! Command execution: load a snapshot document, run the fix or the
//! resolver, and shape the JSON output.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use stubsmith_codefix::{CodeFixInfo, ImplementAbstractClassFix, TypeDisplay};
use stubsmith_solver::{
    Accessibility, AccessorKind, MemberKind, NotApplicable, resolve_unimplemented_members,
};
use tracing::info;

use crate::document::{LoadedSnapshot, SnapshotDocument};

/// `stubsmith fix` output.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FixOutput {
    Fixed(CodeFixInfo),
    NotApplicable {
        #[serde(rename = "notApplicable")]
        reason: NotApplicable,
    },
}

/// `stubsmith resolve` output.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResolveOutput {
    Resolved { members: Vec<ResolvedMemberSummary> },
    NotApplicable {
        #[serde(rename = "notApplicable")]
        reason: NotApplicable,
    },
}

/// One resolved work item, with types as they read from inside the target.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMemberSummary {
    pub name: String,
    pub kind: MemberKind,
    pub accessibility: Accessibility,
    pub declaring_type: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub parameters: Vec<String>,
    /// Accessors still needing a body; empty for methods.
    pub outstanding: Vec<AccessorKind>,
}

pub fn load_file(path: &Path) -> Result<LoadedSnapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    SnapshotDocument::from_json(&text)
        .and_then(SnapshotDocument::load)
        .with_context(|| format!("failed to load snapshot {}", path.display()))
}

pub fn run_fix(loaded: &LoadedSnapshot) -> Result<FixOutput> {
    let request = loaded.request()?;
    let output =
        match ImplementAbstractClassFix::compute(&loaded.snapshot, &request, &loaded.options) {
            Ok(fix) => {
                info!(
                    members = fix.members.len(),
                    insertions = fix.insertions.len(),
                    "fix computed"
                );
                FixOutput::Fixed(fix)
            }
            Err(reason) => {
                info!(%reason, "fix not applicable");
                FixOutput::NotApplicable { reason }
            }
        };
    Ok(output)
}

pub fn run_resolve(loaded: &LoadedSnapshot) -> ResolveOutput {
    let snapshot = &loaded.snapshot;
    let resolved = match resolve_unimplemented_members(snapshot, loaded.target) {
        Ok(resolved) if resolved.is_empty() => {
            return ResolveOutput::NotApplicable {
                reason: NotApplicable::NoUnimplementedMembers,
            };
        }
        Ok(resolved) => resolved,
        Err(reason) => return ResolveOutput::NotApplicable { reason },
    };

    let mut display = TypeDisplay::new(snapshot, loaded.target, &loaded.usings, false);
    let members = resolved
        .iter()
        .map(|member| ResolvedMemberSummary {
            name: snapshot.name(member.name).to_string(),
            kind: member.kind,
            accessibility: member.accessibility,
            declaring_type: snapshot
                .definition(member.declaring)
                .map(|def| snapshot.name(def.name).to_string())
                .unwrap_or_default(),
            ty: display.render(member.ty, &member.type_params),
            parameters: member
                .params
                .iter()
                .map(|param| display.render(param.ty, &member.type_params))
                .collect(),
            outstanding: member.accessors.iter().map(|accessor| accessor.kind).collect(),
        })
        .collect();
    ResolveOutput::Resolved { members }
}

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("failed to serialize output")
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod tests;
