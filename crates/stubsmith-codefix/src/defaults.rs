//! Default value expressions for optional parameters.
//!
//! The rendered expression must be a valid constant of the parameter's
//! (substituted) type: an override that changes a default is legal but
//! surprising, so the value is reproduced exactly.
//!
//! | type               | `null` / `default`     | value                        |
//! |--------------------|------------------------|------------------------------|
//! | `T?`               | `null`                 | rendered as `T`              |
//! | numeric keyword    | `0`                    | literal, `int.MaxValue`, ... |
//! | struct `S`         | `default(S)`           |                              |
//! | enum `E`           | `E.Member` / `(E)0`    | `E.Member` / `(E)value`      |
//! | type parameter `T` | `default(T)` / `null`  |                              |
//! | reference types    | `null`                 |                              |

use crate::display::TypeDisplay;
use stubsmith_common::Atom;
use stubsmith_solver::{DefId, DefKind, DefaultValue, IntrinsicKind, TypeData, TypeId};

/// Render `value` as a default for a parameter of type `ty`.
pub fn render_default(
    display: &mut TypeDisplay<'_>,
    ty: TypeId,
    value: &DefaultValue,
    method_type_params: &[Atom],
) -> String {
    if let DefaultValue::Expression(text) = value {
        return strip_alias_qualifiers(text);
    }

    match display.snapshot().interner.lookup(ty) {
        Some(TypeData::Nullable(inner)) => match value {
            DefaultValue::Null | DefaultValue::Default => "null".to_string(),
            _ => render_default(display, inner, value, method_type_params),
        },
        Some(TypeData::Intrinsic(kind)) => render_intrinsic(kind, value),
        Some(TypeData::Named { def, .. }) => {
            let kind = display.snapshot().definition(def).map(|d| d.kind);
            match kind {
                Some(DefKind::Enum) => render_enum(display, ty, def, value, method_type_params),
                Some(DefKind::Struct) => match value {
                    DefaultValue::Null => "null".to_string(),
                    _ => default_of(display, ty, method_type_params),
                },
                _ => "null".to_string(),
            }
        }
        Some(TypeData::TypeParameter(_)) => match value {
            DefaultValue::Null => "null".to_string(),
            _ => default_of(display, ty, method_type_params),
        },
        Some(TypeData::Tuple(_)) => default_of(display, ty, method_type_params),
        Some(TypeData::Error { .. }) => match value {
            DefaultValue::Default => default_of(display, ty, method_type_params),
            _ => "null".to_string(),
        },
        Some(TypeData::Array { .. } | TypeData::Pointer(_)) | None => "null".to_string(),
    }
}

fn default_of(display: &mut TypeDisplay<'_>, ty: TypeId, method_type_params: &[Atom]) -> String {
    format!("default({})", display.render(ty, method_type_params))
}

fn render_enum(
    display: &mut TypeDisplay<'_>,
    ty: TypeId,
    def: DefId,
    value: &DefaultValue,
    method_type_params: &[Atom],
) -> String {
    let numeric = match value {
        DefaultValue::Integer(value) => *value,
        DefaultValue::Default | DefaultValue::Null => 0,
        DefaultValue::Bool(value) => i128::from(*value),
        DefaultValue::Char(value) => i128::from(u32::from(*value)),
        DefaultValue::Float(value) => *value as i128,
        DefaultValue::String(_) | DefaultValue::Expression(_) => 0,
    };
    let enum_name = display.render(ty, method_type_params);
    let constant = display
        .snapshot()
        .definition(def)
        .and_then(|definition| definition.enum_constant_named(numeric));
    match constant {
        Some(constant) => format!("{enum_name}.{}", display.snapshot().name(constant)),
        None if numeric < 0 => format!("({enum_name})({numeric})"),
        None => format!("({enum_name}){numeric}"),
    }
}

fn render_intrinsic(kind: IntrinsicKind, value: &DefaultValue) -> String {
    match value {
        DefaultValue::Null => "null".to_string(),
        DefaultValue::Default => zero_of(kind).to_string(),
        DefaultValue::Bool(value) => value.to_string(),
        DefaultValue::Char(value) => match kind {
            IntrinsicKind::Char => char_literal(*value),
            _ => render_integer(kind, i128::from(u32::from(*value))),
        },
        DefaultValue::Integer(value) => render_integer(kind, *value),
        DefaultValue::Float(value) => render_float(kind, *value),
        DefaultValue::String(value) => string_literal(value),
        DefaultValue::Expression(text) => strip_alias_qualifiers(text),
    }
}

fn zero_of(kind: IntrinsicKind) -> &'static str {
    match kind {
        IntrinsicKind::Bool => "false",
        IntrinsicKind::Char => "'\\0'",
        IntrinsicKind::Object | IntrinsicKind::String | IntrinsicKind::Void => "null",
        _ => "0",
    }
}

fn render_integer(kind: IntrinsicKind, value: i128) -> String {
    if kind == IntrinsicKind::Char {
        return u32::try_from(value)
            .ok()
            .and_then(char::from_u32)
            .map_or_else(|| value.to_string(), char_literal);
    }
    if let Some((min, max)) = kind.integral_range() {
        if value == max {
            return format!("{}.MaxValue", kind.keyword());
        }
        if value == min && min != 0 {
            return format!("{}.MinValue", kind.keyword());
        }
    }
    value.to_string()
}

fn render_float(kind: IntrinsicKind, value: f64) -> String {
    let keyword = match kind {
        IntrinsicKind::Float => "float",
        IntrinsicKind::Decimal => "decimal",
        IntrinsicKind::Double => "double",
        // An integral parameter never carries a fractional default.
        _ => return (value as i128).to_string(),
    };

    if value.is_nan() {
        return format!("{keyword}.NaN");
    }
    if value.is_infinite() {
        let which = if value > 0.0 { "PositiveInfinity" } else { "NegativeInfinity" };
        return format!("{keyword}.{which}");
    }
    if let Some(limit) = float_limit(kind, value) {
        return format!("{keyword}.{limit}");
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return (value as i64).to_string();
    }
    let suffix = match kind {
        IntrinsicKind::Float => "F",
        IntrinsicKind::Decimal => "M",
        _ => "",
    };
    // Large whole values need an exponent to stay real literals.
    if value.fract() == 0.0 {
        return format!("{value:e}{suffix}");
    }
    format!("{value}{suffix}")
}

fn float_limit(kind: IntrinsicKind, value: f64) -> Option<&'static str> {
    let (min, max) = match kind {
        IntrinsicKind::Double => (f64::MIN, f64::MAX),
        IntrinsicKind::Float => (f64::from(f32::MIN), f64::from(f32::MAX)),
        _ => return None,
    };
    if value == max {
        Some("MaxValue")
    } else if value == min {
        Some("MinValue")
    } else {
        None
    }
}

/// Escaped character literal, quotes included.
pub fn char_literal(value: char) -> String {
    let escaped = match value {
        '\'' => "\\'".to_string(),
        '"' => "\"".to_string(),
        other => escape_char(other),
    };
    format!("'{escaped}'")
}

/// Escaped regular string literal, quotes included.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\'' => out.push('\''),
            other => out.push_str(&escape_char(other)),
        }
    }
    out.push('"');
    out
}

fn escape_char(ch: char) -> String {
    match ch {
        '\\' => "\\\\".to_string(),
        '\0' => "\\0".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        // Line and paragraph separators end a line in source text.
        '\u{2028}' | '\u{2029}' => format!("\\u{:04x}", u32::from(ch)),
        other if other.is_control() => format!("\\u{:04x}", u32::from(other)),
        other => other.to_string(),
    }
}

/// Remove `alias::` prefixes from a host-supplied constant expression.
fn strip_alias_qualifiers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(position) = rest.find("::") {
        let head = &rest[..position];
        let ident_start = head
            .char_indices()
            .rev()
            .take_while(|&(_, c)| c.is_alphanumeric() || c == '_')
            .last()
            .map_or(head.len(), |(index, _)| index);
        out.push_str(&head[..ident_start]);
        rest = &rest[position + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
#[path = "tests/defaults_tests.rs"]
mod tests;
