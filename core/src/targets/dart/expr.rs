//! Dart rendering of conversion expressions.

use crate::ir::{CastTarget, Direction, Expr};
use crate::types::Primitive;

/// Quotes `text` as a single-quoted Dart string literal.
pub fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Renders `expr` as a Dart expression.
pub fn render(expr: &Expr) -> String {
    match expr {
        Expr::Var(name) => name.clone(),
        Expr::Index { target, key } => format!("{}[{}]", render(target), string_literal(key)),
        Expr::IfPresent {
            value,
            binding,
            then,
        } => format!(
            "(){{ final {b} = {}; return {b} == null ? null : {}; }}()",
            render(value),
            render(then),
            b = binding
        ),
        Expr::MapList {
            list,
            binding,
            element,
            direction,
        } => {
            let source = match direction {
                Direction::Decode => format!("({} as List<dynamic>)", render(list)),
                Direction::Encode => render(list),
            };
            format!("{}.map(({}) => {}).toList()", source, binding, render(element))
        }
        Expr::MapEntries {
            map,
            key_binding,
            value_binding,
            key,
            value,
            direction,
        } => {
            let source = match direction {
                Direction::Decode => format!("({} as Map<String, dynamic>)", render(map)),
                Direction::Encode => render(map),
            };
            format!(
                "{}.map(({}, {}) => MapEntry({}, {}))",
                source,
                key_binding,
                value_binding,
                render(key),
                render(value)
            )
        }
        Expr::Cast { value, target } => match target {
            CastTarget::Primitive(Primitive::Double) => {
                format!("({} as num).toDouble()", render(value))
            }
            CastTarget::Primitive(p) => format!("{} as {}", render(value), p.name()),
            CastTarget::Opaque(name) => format!("{} as {}", render(value), name),
        },
        Expr::EnumFromOrdinal { enum_name, value } => {
            format!("{}.values[{} as int]", enum_name, render(value))
        }
        Expr::EnumToOrdinal { enum_name, value } => {
            format!("{}.values.indexOf({})", enum_name, render(value))
        }
        Expr::EnumFromWire { enum_name, value } => {
            format!("{}FromString({})", enum_name, render(value))
        }
        Expr::EnumToWire { enum_name, value } => {
            format!("{}ToString({})", enum_name, render(value))
        }
        Expr::ParseKey { primitive, value } => match primitive {
            Primitive::Bool => format!("{} == 'true'", render(value)),
            p => format!("{}.parse({})", p.name(), render(value)),
        },
        Expr::FormatKey { value, .. } => format!("{}.toString()", render(value)),
        Expr::DecodeClass { class, value } => format!("{}.fromJson({})", class, render(value)),
        Expr::DecodeExtension {
            base,
            extension,
            value,
        } => format!("{}.fromJson({}).as{}", base, render(value), extension),
        Expr::EncodeObject { value } => format!("{}.toJson()", render(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::synth::Synthesizer;
    use pretty_assertions::assert_eq;

    fn decode(schema: &Schema, ty: &str) -> String {
        let synth = Synthesizer::new(schema.resolver());
        render(
            &synth
                .decode_text(ty, Expr::index(Expr::var("json"), "f"))
                .unwrap(),
        )
    }

    fn encode(schema: &Schema, ty: &str) -> String {
        let synth = Synthesizer::new(schema.resolver());
        render(&synth.encode_text(ty, Expr::var("f")).unwrap())
    }

    fn schema() -> Schema {
        Schema::from_yaml(
            r#"
api_url: localhost
enums:
  Color: [Red, Green]
classes:
  User: { id: int }
extensions:
  User: UserExt
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_scalars() {
        let s = schema();
        assert_eq!(decode(&s, "int"), "json['f'] as int");
        assert_eq!(decode(&s, "double"), "(json['f'] as num).toDouble()");
        assert_eq!(decode(&s, "dynamic"), "json['f']");
        assert_eq!(encode(&s, "String"), "f");
    }

    #[test]
    fn test_nullable_enum() {
        let s = schema();
        assert_eq!(
            decode(&s, "Color?"),
            "(){ final val = json['f']; return val == null ? null : Color.values[val as int]; }()"
        );
        assert_eq!(
            encode(&s, "Color?"),
            "(){ final val = f; return val == null ? null : Color.values.indexOf(val); }()"
        );
    }

    #[test]
    fn test_containers() {
        let s = schema();
        assert_eq!(
            decode(&s, "List<User>"),
            "(json['f'] as List<dynamic>).map((element) => User.fromJson(element)).toList()"
        );
        assert_eq!(
            encode(&s, "List<User>"),
            "f.map((element) => element.toJson()).toList()"
        );
        assert_eq!(
            decode(&s, "Map<Color, UserExt>"),
            "(json['f'] as Map<String, dynamic>).map((k, v) => MapEntry(ColorFromString(k), User.fromJson(v).asUserExt))"
        );
        assert_eq!(
            encode(&s, "Map<int, bool>"),
            "f.map((k, v) => MapEntry(k.toString(), v))"
        );
        assert_eq!(encode(&s, "Map<String, List<int>>"), "f");
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal("it's $5"), r"'it\'s \$5'");
    }
}
