use super::*;
use stubsmith_common::ByteSpan;
use stubsmith_solver::{MemberDef, TypeDefinition, TypeId};

fn snapshot_with_abstract_base(target_is_struct: bool) -> (SemanticSnapshot, DefId) {
    let snapshot = SemanticSnapshot::new();
    let base = snapshot.define(TypeDefinition::abstract_class(snapshot.atom("Foo")));
    snapshot.add_member(
        MemberDef::method(snapshot.alloc_member_id(), base, snapshot.atom("Bar"), TypeId::VOID)
            .abstract_(),
    );
    let target = if target_is_struct {
        TypeDefinition::structure(snapshot.atom("Program"))
    } else {
        TypeDefinition::class(snapshot.atom("Program"))
    };
    let target = snapshot.define(target);
    snapshot.set_base(target, snapshot.instantiate_def(base, &[]));
    (snapshot, target)
}

#[test]
fn test_struct_target_is_rejected() {
    let (snapshot, target) = snapshot_with_abstract_base(true);
    let request = ImplementAbstractClassRequest::new(target, DeclarationPart::new(0, 10));
    let result =
        ImplementAbstractClassFix::compute(&snapshot, &request, &ImplementTypeOptions::default());
    assert_eq!(result.err(), Some(NotApplicable::IllegalBaseRelationship));
}

#[test]
fn test_nothing_to_implement() {
    let snapshot = SemanticSnapshot::new();
    let base = snapshot.define(TypeDefinition::class(snapshot.atom("Base")));
    let target = snapshot.define(TypeDefinition::class(snapshot.atom("Derived")));
    snapshot.set_base(target, snapshot.instantiate_def(base, &[]));

    let request = ImplementAbstractClassRequest::new(target, DeclarationPart::new(0, 10));
    assert_eq!(
        ImplementAbstractClassFix::is_applicable(&snapshot, &request),
        Err(NotApplicable::NoUnimplementedMembers)
    );
}

#[test]
fn test_hidden_declaration_is_rejected() {
    let (snapshot, target) = snapshot_with_abstract_base(false);
    let part = DeclarationPart::new(0, 10).with_hidden(ByteSpan::new(1, 20));
    let request = ImplementAbstractClassRequest::new(target, part);
    let result =
        ImplementAbstractClassFix::compute(&snapshot, &request, &ImplementTypeOptions::default());
    assert_eq!(result.err(), Some(NotApplicable::NoVisibleInsertionPoint));
}

#[test]
fn test_generates_into_visible_part() {
    let (snapshot, target) = snapshot_with_abstract_base(false);
    let hidden = DeclarationPart::new(0, 10).with_hidden(ByteSpan::new(1, 20));
    let request = ImplementAbstractClassRequest::new(target, hidden)
        .with_part(DeclarationPart::new(30, 32))
        .with_using("System");

    assert_eq!(ImplementAbstractClassFix::is_applicable(&snapshot, &request), Ok(()));
    let fix = ImplementAbstractClassFix::compute(
        &snapshot,
        &request,
        &ImplementTypeOptions::all_block_bodies(),
    )
    .expect("applicable");
    assert_eq!(fix.fix_name, "implementAbstractClass");
    assert_eq!(fix.description, "Implement abstract class");
    assert_eq!(fix.part_index, 1);
    assert_eq!(fix.insertions.len(), 1);
    assert_eq!(fix.insertions[0].offset, 31);
    assert_eq!(
        fix.insertions[0].new_text,
        "\n    public override void Bar()\n    {\n        throw new NotImplementedException();\n    }"
    );
}

#[test]
fn test_result_serializes_camel_case() {
    let (snapshot, target) = snapshot_with_abstract_base(false);
    let request = ImplementAbstractClassRequest::new(target, DeclarationPart::new(0, 2));
    let fix =
        ImplementAbstractClassFix::compute(&snapshot, &request, &ImplementTypeOptions::default())
            .expect("applicable");
    let json = serde_json::to_value(&fix).expect("serializable");
    assert_eq!(json["fixName"], "implementAbstractClass");
    assert_eq!(json["partIndex"], 0);
    assert_eq!(json["members"][0]["name"], "Bar");
    assert_eq!(json["members"][0]["kind"], "method");
    assert_eq!(json["insertions"][0]["offset"], 1);
    assert!(json.get("importsToAdd").is_none());
}
