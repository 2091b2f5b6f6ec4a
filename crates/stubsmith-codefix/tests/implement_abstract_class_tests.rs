//! End-to-end fix output: resolve, render, insert, and compare the edited
//! document text.

use stubsmith_codefix::{
    DeclarationKind, DeclarationPart, ExistingMember, ImplementAbstractClassFix,
    ImplementAbstractClassRequest, ImplementTypeOptions, NotApplicable,
};
use stubsmith_common::ByteSpan;
use stubsmith_solver::{
    Accessibility, AccessorKind, AccessorSet, DefId, DefKind, DefaultValue, MemberDef, ParamInfo,
    ParamModifier, SemanticSnapshot, TupleElement, TypeDefinition, TypeId,
};

// =============================================================================
// Document helpers
// =============================================================================

/// Offset just past the brace closing the first `{` at or after `from`.
fn block_end(text: &str, from: usize) -> usize {
    let open = from + text[from..].find('{').expect("open brace");
    let mut depth = 0usize;
    for (index, byte) in text.bytes().enumerate().skip(open) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return index + 1;
                }
            }
            _ => {}
        }
    }
    panic!("unbalanced braces after offset {from}");
}

/// The declaration part whose header starts with `header`.
fn part(text: &str, header: &str, member_indent: &str) -> DeclarationPart {
    let start = text.find(header).expect("declaration header");
    let open = start + text[start..].find('{').expect("open brace");
    let close = block_end(text, start) - 1;
    DeclarationPart::new(open as u32, close as u32).with_member_indent(member_indent)
}

/// An existing member whose declaration starts with `header`.
fn member(
    text: &str,
    header: &str,
    kind: DeclarationKind,
    accessibility: Accessibility,
    is_static: bool,
) -> ExistingMember {
    let start = text.find(header).expect("member header");
    ExistingMember {
        kind,
        accessibility,
        is_static,
        span: ByteSpan::new(start as u32, block_end(text, start) as u32),
    }
}

fn method(snapshot: &SemanticSnapshot, def: DefId, name: &str, return_type: TypeId) -> MemberDef {
    MemberDef::method(snapshot.alloc_member_id(), def, snapshot.atom(name), return_type)
}

fn param(snapshot: &SemanticSnapshot, name: &str, ty: TypeId) -> ParamInfo {
    ParamInfo::new(snapshot.atom(name), ty)
}

fn class(snapshot: &SemanticSnapshot, name: &str, base: Option<DefId>) -> DefId {
    let def = snapshot.define(TypeDefinition::class(snapshot.atom(name)));
    if let Some(base) = base {
        snapshot.set_base(def, snapshot.instantiate_def(base, &[]));
    }
    def
}

fn abstract_class(snapshot: &SemanticSnapshot, name: &str) -> DefId {
    snapshot.define(TypeDefinition::abstract_class(snapshot.atom(name)))
}

fn apply(
    snapshot: &SemanticSnapshot,
    request: &ImplementAbstractClassRequest,
    options: &ImplementTypeOptions,
    text: &str,
) -> String {
    ImplementAbstractClassFix::compute(snapshot, request, options)
        .expect("fix applies")
        .apply(text)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_simple_methods() {
    let text = r#"abstract class Foo
{
    protected abstract string FooMethod();
    public abstract void Blah();
}

abstract class Bar : Foo
{
    public abstract bool BarMethod();

    public override void Blah()
    {
    }
}

class Program : Foo
{
    static void Main(string[] args)
    {
    }
}"#;
    let s = SemanticSnapshot::new();
    let foo = abstract_class(&s, "Foo");
    s.add_member(
        method(&s, foo, "FooMethod", TypeId::STRING)
            .abstract_()
            .with_accessibility(Accessibility::Protected),
    );
    let blah = s.add_member(method(&s, foo, "Blah", TypeId::VOID).abstract_());
    let bar = abstract_class(&s, "Bar");
    s.set_base(bar, s.instantiate_def(foo, &[]));
    s.add_member(method(&s, bar, "BarMethod", TypeId::BOOL).abstract_());
    s.add_member(method(&s, bar, "Blah", TypeId::VOID).override_of(blah));
    let program = class(&s, "Program", Some(foo));

    let request = ImplementAbstractClassRequest::new(
        program,
        part(text, "class Program", "    ").with_member(member(
            text,
            "static void Main",
            DeclarationKind::Method,
            Accessibility::Private,
            true,
        )),
    );

    let expected = r#"abstract class Foo
{
    protected abstract string FooMethod();
    public abstract void Blah();
}

abstract class Bar : Foo
{
    public abstract bool BarMethod();

    public override void Blah()
    {
    }
}

class Program : Foo
{
    static void Main(string[] args)
    {
    }

    public override void Blah()
    {
        throw new System.NotImplementedException();
    }

    protected override string FooMethod()
    {
        throw new System.NotImplementedException();
    }
}"#;
    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        expected
    );
}

#[test]
fn test_method_with_tuple_names() {
    let text = "class Program : Base\n{\n}";
    let s = SemanticSnapshot::new();
    let base = abstract_class(&s, "Base");
    let returns = s.interner.tuple(vec![
        TupleElement {
            ty: TypeId::INT,
            name: Some(s.atom("a")),
        },
        TupleElement {
            ty: TypeId::INT,
            name: Some(s.atom("b")),
        },
    ]);
    let takes = s.interner.tuple(vec![
        TupleElement {
            ty: TypeId::STRING,
            name: None,
        },
        TupleElement {
            ty: TypeId::STRING,
            name: Some(s.atom("d")),
        },
    ]);
    s.add_member(
        method(&s, base, "Method", returns)
            .abstract_()
            .with_accessibility(Accessibility::Protected)
            .with_param(param(&s, "x", takes)),
    );
    let program = class(&s, "Program", Some(base));
    let request = ImplementAbstractClassRequest::new(program, part(text, "class Program", "    "));

    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        "class Program : Base\n{\n    protected override (int a, int b) Method((string, string d) x)\n    {\n        throw new System.NotImplementedException();\n    }\n}"
    );
}

#[test]
fn test_not_available_for_struct() {
    let s = SemanticSnapshot::new();
    let foo = abstract_class(&s, "Foo");
    s.add_member(method(&s, foo, "Bar", TypeId::VOID).abstract_());
    let program = s.define(TypeDefinition::structure(s.atom("Program")));
    s.set_base(program, s.instantiate_def(foo, &[]));

    let request = ImplementAbstractClassRequest::new(program, DeclarationPart::new(0, 2));
    let result =
        ImplementAbstractClassFix::compute(&s, &request, &ImplementTypeOptions::default());
    assert_eq!(result.err(), Some(NotApplicable::IllegalBaseRelationship));
}

#[test]
fn test_optional_parameter_defaults() {
    let s = SemanticSnapshot::new();
    let d = abstract_class(&s, "d");
    let value_struct = s.define(TypeDefinition::structure(s.atom("b")));
    let value_ty = s.instantiate_def(value_struct, &[]);
    let int_nullable = s.interner.nullable(TypeId::INT);
    let struct_nullable = s.interner.nullable(value_ty);

    let cases: Vec<(&str, TypeId, DefaultValue, &str)> = vec![
        ("a", TypeId::INT, DefaultValue::Integer(3), "int a = 3"),
        ("b", TypeId::CHAR, DefaultValue::Char('a'), "char b = 'a'"),
        ("c", TypeId::STRING, DefaultValue::String("x".into()), "string c = \"x\""),
        ("e", TypeId::SHORT, DefaultValue::Integer(3), "short e = 3"),
        ("f", TypeId::DECIMAL, DefaultValue::Integer(3), "decimal f = 3"),
        ("g", TypeId::DOUBLE, DefaultValue::Float(3.0), "double g = 3"),
        ("h", TypeId::LONG, DefaultValue::Integer(3), "long h = 3"),
        ("i", TypeId::FLOAT, DefaultValue::Float(3.0), "float i = 3"),
        ("j", TypeId::USHORT, DefaultValue::Integer(3), "ushort j = 3"),
        ("k", TypeId::UINT, DefaultValue::Integer(3), "uint k = 3"),
        ("l", TypeId::ULONG, DefaultValue::Integer(3), "ulong l = 3"),
        ("m", value_ty, DefaultValue::Default, "b m = default(b)"),
        ("n", struct_nullable, DefaultValue::Null, "b? n = null"),
        ("o", struct_nullable, DefaultValue::Default, "b? o = null"),
        ("p", int_nullable, DefaultValue::Integer(5), "int? p = 5"),
        ("q", int_nullable, DefaultValue::Default, "int? q = null"),
        ("r", TypeId::OBJECT, DefaultValue::Null, "object r = null"),
    ];

    let mut foo = method(&s, d, "foo", TypeId::VOID).abstract_();
    for (name, ty, default, _) in &cases {
        foo = foo.with_param(param(&s, name, *ty).with_default(default.clone()));
    }
    s.add_member(foo);
    let target = class(&s, "c", Some(d));

    let text = "class c : d\n{\n}";
    let request = ImplementAbstractClassRequest::new(target, part(text, "class c", "    "));
    let expected_params: Vec<&str> = cases.iter().map(|case| case.3).collect();
    let expected = format!(
        "class c : d\n{{\n    public override void foo({})\n    {{\n        throw new System.NotImplementedException();\n    }}\n}}",
        expected_params.join(", ")
    );
    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        expected
    );
}

#[test]
fn test_different_accessor_accessibility() {
    let text = "class c2 : c1\n{\n}";
    let s = SemanticSnapshot::new();
    let c1 = abstract_class(&s, "c1");
    let c1_ty = s.instantiate_def(c1, &[]);
    s.add_member(
        MemberDef::indexer(
            s.alloc_member_id(),
            c1,
            s.atom("this"),
            c1_ty,
            AccessorSet::GET | AccessorSet::SET,
        )
        .abstract_()
        .with_param(param(&s, "x", c1_ty))
        .with_accessor_accessibility(AccessorKind::Set, Accessibility::Internal),
    );
    let c2 = class(&s, "c2", Some(c1));
    let request = ImplementAbstractClassRequest::new(c2, part(text, "class c2", "    "));

    let expected = r#"class c2 : c1
{
    public override c1 this[c1 x]
    {
        get
        {
            throw new System.NotImplementedException();
        }

        internal set
        {
            throw new System.NotImplementedException();
        }
    }
}"#;
    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        expected
    );
}

#[test]
fn test_field_like_event() {
    let text = "using System;\n\nclass D : C\n{\n}";
    let s = SemanticSnapshot::new();
    let action = s.define(
        TypeDefinition::new(DefKind::Delegate, s.atom("Action")).with_namespace(s.atom("System")),
    );
    let c = abstract_class(&s, "C");
    s.add_member(
        MemberDef::event(s.alloc_member_id(), c, s.atom("E"), s.instantiate_def(action, &[]))
            .abstract_(),
    );
    let d = class(&s, "D", Some(c));
    let request =
        ImplementAbstractClassRequest::new(d, part(text, "class D", "    ")).with_using("System");

    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        "using System;\n\nclass D : C\n{\n    public override event Action E;\n}"
    );
}

#[test]
fn test_indexer_with_system_import() {
    let text = "using System;\n\nclass D : C\n{\n}";
    let s = SemanticSnapshot::new();
    let c = abstract_class(&s, "C");
    s.add_member(
        MemberDef::indexer(
            s.alloc_member_id(),
            c,
            s.atom("this"),
            TypeId::INT,
            AccessorSet::GET | AccessorSet::SET,
        )
        .abstract_()
        .with_param(param(&s, "s", TypeId::STRING))
        .with_accessor_accessibility(AccessorKind::Set, Accessibility::Internal),
    );
    let d = class(&s, "D", Some(c));
    let request =
        ImplementAbstractClassRequest::new(d, part(text, "class D", "    ")).with_using("System");

    let expected = r#"using System;

class D : C
{
    public override int this[string s]
    {
        get
        {
            throw new NotImplementedException();
        }

        internal set
        {
            throw new NotImplementedException();
        }
    }
}"#;
    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        expected
    );
}

/// `abstract class Foo { public abstract void F(); }` and `Program : Foo`.
fn foo_and_program() -> (SemanticSnapshot, DefId) {
    let s = SemanticSnapshot::new();
    let foo = abstract_class(&s, "Foo");
    s.add_member(method(&s, foo, "F", TypeId::VOID).abstract_());
    let program = class(&s, "Program", Some(foo));
    (s, program)
}

#[test]
fn test_missing_in_hidden_type() {
    let text = "class Program : Foo\n{\n#line hidden\n}\n#line default";
    let (s, program) = foo_and_program();
    let hidden_start = text.find("#line hidden").expect("hidden") as u32;
    let request = ImplementAbstractClassRequest::new(
        program,
        part(text, "class Program", "    ").with_hidden(ByteSpan::new(hidden_start, text.len() as u32)),
    );
    assert!(request.parts[0].available_slots().is_empty());

    let result = ImplementAbstractClassFix::compute(&s, &request, &ImplementTypeOptions::default());
    assert_eq!(result.err(), Some(NotApplicable::NoVisibleInsertionPoint));
}

#[test]
fn test_generate_into_non_hidden_part() {
    let text = "partial class Program : Foo\n{\n#line hidden\n}\n#line default\n\npartial class Program\n{\n}\n";
    let (s, program) = foo_and_program();
    let hidden_start = text.find("#line hidden").expect("hidden") as u32;
    let hidden_end = (text.find("#line default").expect("default") + "#line default".len()) as u32;
    let second = text.rfind("partial class Program").expect("second part");

    let first_part = part(text, "partial class Program : Foo", "    ")
        .with_hidden(ByteSpan::new(hidden_start, hidden_end));
    let second_part = part(&text[second..], "partial class Program", "    ");
    let second_part = DeclarationPart::new(
        second_part.open_brace + second as u32,
        second_part.close_brace + second as u32,
    );
    let request = ImplementAbstractClassRequest::new(program, first_part)
        .with_part(second_part)
        .with_using("System");

    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        "partial class Program : Foo\n{\n#line hidden\n}\n#line default\n\npartial class Program\n{\n    public override void F()\n    {\n        throw new NotImplementedException();\n    }\n}\n"
    );
}

#[test]
fn test_generate_if_location_available() {
    let text = r#"partial class Program : Foo
{
    void Bar()
    {
    }

#line hidden
}
#line default"#;
    let (s, program) = foo_and_program();
    let hidden_start = text.find("#line hidden").expect("hidden") as u32;
    let request = ImplementAbstractClassRequest::new(
        program,
        part(text, "partial class Program", "    ")
            .with_member(member(
                text,
                "void Bar",
                DeclarationKind::Method,
                Accessibility::Private,
                false,
            ))
            .with_hidden(ByteSpan::new(hidden_start, text.len() as u32)),
    )
    .with_using("System");

    let expected = r#"partial class Program : Foo
{
    public override void F()
    {
        throw new NotImplementedException();
    }

    void Bar()
    {
    }

#line hidden
}
#line default"#;
    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        expected
    );
}

#[test]
fn test_only_generate_unimplemented_accessors() {
    let text = "using System;\n\nclass C : B\n{\n}";
    let s = SemanticSnapshot::new();
    let a = abstract_class(&s, "A");
    let x = s.add_member(
        MemberDef::property(
            s.alloc_member_id(),
            a,
            s.atom("X"),
            TypeId::INT,
            AccessorSet::GET | AccessorSet::SET,
        )
        .abstract_(),
    );
    let b = abstract_class(&s, "B");
    s.set_base(b, s.instantiate_def(a, &[]));
    s.add_member(
        MemberDef::property(s.alloc_member_id(), b, s.atom("X"), TypeId::INT, AccessorSet::GET)
            .override_of(x),
    );
    let c = class(&s, "C", Some(b));
    let request =
        ImplementAbstractClassRequest::new(c, part(text, "class C", "    ")).with_using("System");

    let expected = r#"using System;

class C : B
{
    public override int X
    {
        set
        {
            throw new NotImplementedException();
        }
    }
}"#;
    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        expected
    );
}

#[test]
fn test_params_array_restored_through_abstract_override() {
    let text = "class C : B\n{\n}";
    let s = SemanticSnapshot::new();
    let a = class(&s, "A", None);
    let ints = s.interner.array(TypeId::INT);
    let virtual_foo = s.add_member(
        method(&s, a, "Foo", TypeId::VOID)
            .virtual_()
            .with_param(param(&s, "x", TypeId::INT))
            .with_param(param(&s, "y", ints).with_modifier(ParamModifier::Params)),
    );
    let b = abstract_class(&s, "B");
    s.set_base(b, s.instantiate_def(a, &[]));
    s.add_member(
        method(&s, b, "Foo", TypeId::VOID)
            .abstract_()
            .override_of(virtual_foo)
            .with_param(param(&s, "x", TypeId::INT))
            .with_param(param(&s, "y", ints).with_default(DefaultValue::Null)),
    );
    let c = class(&s, "C", Some(b));
    let request = ImplementAbstractClassRequest::new(c, part(text, "class C", "    "));

    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        "class C : B\n{\n    public override void Foo(int x, params int[] y)\n    {\n        throw new System.NotImplementedException();\n    }\n}"
    );
}

#[test]
fn test_null_pointer_type() {
    let text = "class D : C\n{\n}";
    let s = SemanticSnapshot::new();
    let c = abstract_class(&s, "C");
    s.add_member(
        method(&s, c, "Foo", TypeId::VOID)
            .abstract_()
            .with_param(
                param(&s, "x", s.interner.pointer(TypeId::INT)).with_default(DefaultValue::Null),
            ),
    );
    let d = class(&s, "D", Some(c));
    let request = ImplementAbstractClassRequest::new(d, part(text, "class D", "    "));

    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        "class D : C\n{\n    public override unsafe void Foo(int* x = null)\n    {\n        throw new System.NotImplementedException();\n    }\n}"
    );
}

#[test]
fn test_error_type_called_var() {
    let text = "class D : C\n{\n}";
    let s = SemanticSnapshot::new();
    let c = abstract_class(&s, "C");
    s.add_member(
        method(&s, c, "Foo", TypeId::VOID)
            .abstract_()
            .with_param(param(&s, "x", s.interner.error_type("X", Some("var")))),
    );
    let d = class(&s, "D", Some(c));
    let request = ImplementAbstractClassRequest::new(d, part(text, "class D", "    "));

    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        "class D : C\n{\n    public override void Foo(X x)\n    {\n        throw new System.NotImplementedException();\n    }\n}"
    );
}

/// `abstract class A<T> { abstract void M(T x); abstract class B : A<B> { class T } }`
fn self_referential_outer() -> (SemanticSnapshot, DefId, DefId, DefId) {
    let s = SemanticSnapshot::new();
    let a = s.define(TypeDefinition::abstract_class(s.atom("A")).with_type_params(vec![s.atom("T")]));
    s.add_member(
        method(&s, a, "M", TypeId::VOID)
            .abstract_()
            .with_param(param(&s, "x", s.type_param(a, 0))),
    );
    let b = s.define(TypeDefinition::abstract_class(s.atom("B")).with_containing(a));
    let b_identity = s.identity_type(b);
    s.set_base(b, s.instantiate_def(a, &[b_identity]));
    let t = s.define(TypeDefinition::class(s.atom("T")).with_containing(b));
    (s, a, b, t)
}

#[test]
fn test_nested_type_named_like_outer_type_parameter() {
    let text = r#"abstract class A<T>
{
    public abstract void M(T x);

    abstract class B : A<B>
    {
        class T : A<T>
        {
        }
    }
}"#;
    let (s, a, _, t) = self_referential_outer();
    s.set_base(t, s.instantiate_def(a, &[s.identity_type(t)]));
    let request = ImplementAbstractClassRequest::new(t, part(text, "class T", "            "));

    let expected = r#"abstract class A<T>
{
    public abstract void M(T x);

    abstract class B : A<B>
    {
        class T : A<T>
        {
            public override void M(B.T x)
            {
                throw new System.NotImplementedException();
            }
        }
    }
}"#;
    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        expected
    );
}

#[test]
fn test_nested_type_through_inherited_nested_base() {
    let text = r#"abstract class A<T>
{
    public abstract void M(T x);
    abstract class B : A<B>
    {
        class T : A<B.T>
        {
        }
    }
}
"#;
    let (s, a, b, t) = self_referential_outer();
    let b_identity = s.instantiate_nested(s.identity_type(a), b, &[]);
    let inherited_b = s.instantiate_nested(s.instantiate_def(a, &[b_identity]), b, &[]);
    let b_dot_t = s.instantiate_nested(inherited_b, t, &[]);
    s.set_base(t, s.instantiate_def(a, &[b_dot_t]));
    let request = ImplementAbstractClassRequest::new(t, part(text, "class T", "            "));

    let expected = r#"abstract class A<T>
{
    public abstract void M(T x);
    abstract class B : A<B>
    {
        class T : A<B.T>
        {
            public override void M(A<A<T>.B>.B.T x)
            {
                throw new System.NotImplementedException();
            }
        }
    }
}
"#;
    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        expected
    );
}

#[test]
fn test_class_with_internal_members_from_another_assembly() {
    let text = "using System;\nusing System.Globalization;\n\npublic class x : EastAsianLunisolarCalendar\n{\n}";
    let s = SemanticSnapshot::new();
    let corlib = s.atom("mscorlib");
    let system = s.atom("System");
    let globalization = s.atom("System.Globalization");
    let date_time = s.define(
        TypeDefinition::structure(s.atom("DateTime"))
            .with_namespace(system)
            .with_assembly(corlib),
    );
    let era_info = s.define(
        TypeDefinition::class(s.atom("EraInfo"))
            .with_namespace(globalization)
            .with_assembly(corlib),
    );
    let date_time = s.instantiate_def(date_time, &[]);
    let era_infos = s.interner.array(s.instantiate_def(era_info, &[]));
    let int_array = s.interner.array(TypeId::INT);

    let calendar = s.define(
        TypeDefinition::abstract_class(s.atom("Calendar"))
            .with_namespace(globalization)
            .with_assembly(corlib),
    );
    let getter = |def: DefId, name: &str, ty: TypeId, accessibility: Accessibility| {
        MemberDef::property(s.alloc_member_id(), def, s.atom(name), ty, AccessorSet::GET)
            .abstract_()
            .with_accessibility(accessibility)
    };
    s.add_member(getter(calendar, "Eras", int_array, Accessibility::Public));
    s.add_member(
        method(&s, calendar, "GetEra", TypeId::INT)
            .abstract_()
            .with_param(param(&s, "time", date_time)),
    );

    let lunisolar = s.define(
        TypeDefinition::abstract_class(s.atom("EastAsianLunisolarCalendar"))
            .with_namespace(globalization)
            .with_assembly(corlib),
    );
    s.set_base(lunisolar, s.instantiate_def(calendar, &[]));
    s.add_member(getter(lunisolar, "MinCalendarYear", TypeId::INT, Accessibility::Internal));
    s.add_member(getter(lunisolar, "MaxCalendarYear", TypeId::INT, Accessibility::Internal));
    s.add_member(getter(lunisolar, "CalEraInfo", era_infos, Accessibility::Internal));
    s.add_member(getter(lunisolar, "MinDate", date_time, Accessibility::Internal));
    s.add_member(getter(lunisolar, "MaxDate", date_time, Accessibility::Internal));
    for (name, params) in [
        ("GetGregorianYear", [("year", TypeId::INT), ("era", TypeId::INT)]),
        ("GetYear", [("year", TypeId::INT), ("time", date_time)]),
        ("GetYearInfo", [("LunarYear", TypeId::INT), ("Index", TypeId::INT)]),
    ] {
        let mut member = method(&s, lunisolar, name, TypeId::INT)
            .abstract_()
            .with_accessibility(Accessibility::Internal);
        for (param_name, ty) in params {
            member = member.with_param(param(&s, param_name, ty));
        }
        s.add_member(member);
    }

    let target = s.define(TypeDefinition::class(s.atom("x")).with_assembly(s.atom("Test")));
    s.set_base(target, s.instantiate_def(lunisolar, &[]));
    let request = ImplementAbstractClassRequest::new(target, part(text, "public class x", "    "))
        .with_using("System")
        .with_using("System.Globalization");

    let getter_text = |header: &str| {
        format!(
            "    {header}\n    {{\n        get\n        {{\n            throw new NotImplementedException();\n        }}\n    }}"
        )
    };
    let method_text = |header: &str| {
        format!("    {header}\n    {{\n        throw new NotImplementedException();\n    }}")
    };
    let members = [
        getter_text("public override int[] Eras"),
        getter_text("internal override int MinCalendarYear"),
        getter_text("internal override int MaxCalendarYear"),
        getter_text("internal override EraInfo[] CalEraInfo"),
        getter_text("internal override DateTime MinDate"),
        getter_text("internal override DateTime MaxDate"),
        method_text("public override int GetEra(DateTime time)"),
        method_text("internal override int GetGregorianYear(int year, int era)"),
        method_text("internal override int GetYear(int year, DateTime time)"),
        method_text("internal override int GetYearInfo(int LunarYear, int Index)"),
    ];
    let expected = format!(
        "using System;\nusing System.Globalization;\n\npublic class x : EastAsianLunisolarCalendar\n{{\n{}\n}}",
        members.join("\n\n")
    );
    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        expected
    );
}

#[test]
fn test_protected_internal_narrows_across_assemblies() {
    let text = "class D : C\n{\n}";
    let s = SemanticSnapshot::new();
    let c = s.define(TypeDefinition::abstract_class(s.atom("C")).with_assembly(s.atom("Lib")));
    s.add_member(
        method(&s, c, "M", TypeId::VOID)
            .abstract_()
            .with_accessibility(Accessibility::ProtectedInternal),
    );
    let d = s.define(TypeDefinition::class(s.atom("D")).with_assembly(s.atom("App")));
    s.set_base(d, s.instantiate_def(c, &[]));
    let request = ImplementAbstractClassRequest::new(d, part(text, "class D", "    "));

    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        "class D : C\n{\n    protected override void M()\n    {\n        throw new System.NotImplementedException();\n    }\n}"
    );
}

/// `public abstract class Base { public abstract void Dispose(); }` and a
/// two-part `partial class A`.
fn partial_class(text: &str, invoked: usize) -> (SemanticSnapshot, ImplementAbstractClassRequest) {
    let s = SemanticSnapshot::new();
    let base = abstract_class(&s, "Base");
    s.add_member(method(&s, base, "Dispose", TypeId::VOID).abstract_());
    let a = class(&s, "A", Some(base));

    let first = part(text, "partial class A", "    ");
    let second_start = text.rfind("partial class A").expect("second part");
    let second = part(&text[second_start..], "partial class A", "    ");
    let second = DeclarationPart::new(
        second.open_brace + second_start as u32,
        second.close_brace + second_start as u32,
    );
    let request = ImplementAbstractClassRequest::new(a, first)
        .with_part(second)
        .invoked_on(invoked)
        .with_using("System");
    (s, request)
}

#[test]
fn test_partial_class_invoked_on_part_with_base() {
    let text = "partial class A : Base\n{\n}\n\npartial class A\n{\n}";
    let (s, request) = partial_class(text, 0);
    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        "partial class A : Base\n{\n    public override void Dispose()\n    {\n        throw new NotImplementedException();\n    }\n}\n\npartial class A\n{\n}"
    );
}

#[test]
fn test_partial_class_invoked_on_part_without_base() {
    let text = "partial class A\n{\n}\n\npartial class A : Base\n{\n}";
    let (s, request) = partial_class(text, 0);
    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::all_block_bodies(), text),
        "partial class A\n{\n    public override void Dispose()\n    {\n        throw new NotImplementedException();\n    }\n}\n\npartial class A : Base\n{\n}"
    );
}

#[test]
fn test_added_import_keeps_exception_qualified() {
    let text = r#"namespace My
{
    public class Foo2 : Foo // Implement Abstract Class
    {
    }
}"#;
    let s = SemanticSnapshot::new();
    let my = s.atom("My");
    let list = s.define(
        TypeDefinition::class(s.atom("List"))
            .with_namespace(s.atom("System.Collections.Generic"))
            .with_type_params(vec![s.atom("T")]),
    );
    let foo = s.define(TypeDefinition::abstract_class(s.atom("Foo")).with_namespace(my));
    s.add_member(
        method(&s, foo, "Bar", TypeId::VOID)
            .abstract_()
            .with_param(param(&s, "values", s.instantiate_def(list, &[TypeId::OBJECT]))),
    );
    let foo2 = s.define(TypeDefinition::class(s.atom("Foo2")).with_namespace(my));
    s.set_base(foo2, s.instantiate_def(foo, &[]));
    let request = ImplementAbstractClassRequest::new(foo2, part(text, "public class Foo2", "        "))
        .with_using("Microsoft.Win32");

    let fix = ImplementAbstractClassFix::compute(&s, &request, &ImplementTypeOptions::default())
        .expect("fix applies");
    assert_eq!(fix.imports_to_add, vec!["System.Collections.Generic".to_string()]);

    let expected = r#"namespace My
{
    public class Foo2 : Foo // Implement Abstract Class
    {
        public override void Bar(List<object> values)
        {
            throw new System.NotImplementedException();
        }
    }
}"#;
    assert_eq!(fix.apply(text), expected);
}

#[test]
fn test_nullable_optional_parameters() {
    let text = "sealed class D : B\n{\n}";
    let s = SemanticSnapshot::new();
    let v = s.define(TypeDefinition::structure(s.atom("V")));
    let v_ty = s.instantiate_def(v, &[]);
    let b = abstract_class(&s, "B");
    s.add_member(
        method(&s, b, "M1", TypeId::VOID)
            .abstract_()
            .with_param(param(&s, "i", TypeId::INT).with_default(DefaultValue::Integer(0)))
            .with_param(param(&s, "s", TypeId::STRING).with_default(DefaultValue::Null))
            .with_param(
                param(&s, "j", s.interner.nullable(TypeId::INT)).with_default(DefaultValue::Null),
            )
            .with_param(param(&s, "v", v_ty).with_default(DefaultValue::Default)),
    );
    let m2 = s.alloc_member_id();
    let t = s.method_type_param(m2, 0, s.atom("T"));
    s.add_member(
        MemberDef::method(m2, b, s.atom("M2"), TypeId::VOID)
            .abstract_()
            .with_type_params(vec![s.atom("T")])
            .with_param(param(&s, "i", s.interner.nullable(t)).with_default(DefaultValue::Null)),
    );
    let d = s.define(TypeDefinition::class(s.atom("D")).with_sealed(true));
    s.set_base(d, s.instantiate_def(b, &[]));
    let request = ImplementAbstractClassRequest::new(d, part(text, "sealed class D", "    "));

    let expected = r#"sealed class D : B
{
    public override void M1(int i = 0, string s = null, int? j = null, V v = default(V))
    {
        throw new System.NotImplementedException();
    }

    public override void M2<T>(T? i = null)
    {
        throw new System.NotImplementedException();
    }
}"#;
    assert_eq!(
        apply(&s, &request, &ImplementTypeOptions::default(), text),
        expected
    );
}

#[test]
fn test_applying_twice_is_not_applicable() {
    let text = "class D : C\n{\n}";
    let s = SemanticSnapshot::new();
    let c = abstract_class(&s, "C");
    let m = s.add_member(method(&s, c, "M", TypeId::VOID).abstract_());
    let d = class(&s, "D", Some(c));
    let request = ImplementAbstractClassRequest::new(d, part(text, "class D", "    "));
    let first = apply(&s, &request, &ImplementTypeOptions::default(), text);
    assert!(first.contains("public override void M()"));

    // The host re-binds the edited document: D now declares the override.
    s.add_member(method(&s, d, "M", TypeId::VOID).override_of(m));
    assert_eq!(
        ImplementAbstractClassFix::is_applicable(&s, &request),
        Err(NotApplicable::NoUnimplementedMembers)
    );
}
