// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! LCM `.lcm` schema parser using Pest.
//!
//! The format supports:
//! - An optional `package` declaration
//! - Any number of `struct` blocks
//! - Members with constant (`[3]`) or variable (`[num_positions]`) dimensions
//! - `const` declarations (kept in the AST, not serialized)
//! - `//` and `/* */` comments

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::core::{LogError, Result};
use crate::schema::ast::{
    Constant, Dimension, Field, FieldType, MessageSchema, MessageType, PrimitiveType,
};

/// Pest parser for `.lcm` type definitions.
#[derive(Parser)]
#[grammar = "schema/parser/lcm.pest"] // Path relative to src/ directory
pub struct LcmParser;

/// Parse one `.lcm` source into a [`MessageSchema`].
///
/// Variable dimensions must name an earlier integer member of the same
/// struct; anything else is rejected here so the decoder never has to.
pub fn parse(definition: &str) -> Result<MessageSchema> {
    let pairs = LcmParser::parse(Rule::schema, definition)
        .map_err(|e| LogError::parse("lcm schema", format!("{e}")))?;

    let mut schema = MessageSchema::new(None);

    for pair in pairs {
        // schema = SOI ~ package_decl? ~ struct_decl* ~ EOI
        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::package_decl => {
                    schema.package = item
                        .into_inner()
                        .find(|p| p.as_rule() == Rule::qualified)
                        .map(|p| p.as_str().to_string());
                }
                Rule::struct_decl => {
                    let msg_type = parse_struct(item, schema.package.clone())?;
                    if schema.types.contains_key(&msg_type.name) {
                        return Err(LogError::invalid_schema(
                            msg_type.name,
                            "struct declared twice",
                        ));
                    }
                    schema.add_type(msg_type);
                }
                _ => {}
            }
        }
    }

    Ok(schema)
}

fn parse_struct(pair: Pair<Rule>, package: Option<String>) -> Result<MessageType> {
    let mut inner = pair.into_inner().filter(|p| p.as_rule() != Rule::kw_struct);

    let name = inner
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| LogError::parse("lcm schema", "struct without a name"))?;
    let mut msg_type = MessageType::new(name, package);

    for item in inner {
        match item.as_rule() {
            Rule::member => {
                let field = parse_member(item);
                validate_dimensions(&msg_type, &field)?;
                if msg_type.field(&field.name).is_some() {
                    return Err(LogError::invalid_schema(
                        &msg_type.name,
                        format!("member '{}' declared twice", field.name),
                    ));
                }
                msg_type.fields.push(field);
            }
            Rule::const_decl => {
                let constants = parse_const(item, &msg_type.name)?;
                msg_type.constants.extend(constants);
            }
            _ => {}
        }
    }

    Ok(msg_type)
}

fn parse_member(pair: Pair<Rule>) -> Field {
    // member = qualified ~ ident ~ dimension* ~ ";"
    let mut type_name = FieldType::Nested(String::new());
    let mut name = String::new();
    let mut dimensions = Vec::new();

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::qualified => type_name = FieldType::from_type_str(item.as_str()),
            Rule::ident => name = item.as_str().to_string(),
            Rule::dimension => {
                if let Some(size) = item.into_inner().next() {
                    let dim = match size.as_rule() {
                        Rule::number => match size.as_str().parse() {
                            Ok(n) => Dimension::Const(n),
                            Err(_) => Dimension::Var(size.as_str().to_string()),
                        },
                        _ => Dimension::Var(size.as_str().to_string()),
                    };
                    dimensions.push(dim);
                }
            }
            _ => {}
        }
    }

    Field {
        name,
        type_name,
        dimensions,
    }
}

fn parse_const(pair: Pair<Rule>, struct_name: &str) -> Result<Vec<Constant>> {
    let mut type_name = None;
    let mut constants = Vec::new();

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::qualified => {
                type_name = PrimitiveType::try_from_str(item.as_str());
                if type_name.is_none() {
                    return Err(LogError::invalid_schema(
                        struct_name,
                        format!("constant of non-primitive type '{}'", item.as_str()),
                    ));
                }
            }
            Rule::const_assign => {
                let mut parts = item.into_inner();
                let name = parts.next().map(|p| p.as_str().to_string());
                let value = parts.next().map(|p| p.as_str().trim().to_string());
                if let (Some(name), Some(value), Some(type_name)) = (name, value, type_name) {
                    constants.push(Constant {
                        name,
                        type_name,
                        value,
                    });
                }
            }
            _ => {}
        }
    }

    Ok(constants)
}

/// A variable dimension must refer to an integer scalar declared earlier.
fn validate_dimensions(msg_type: &MessageType, field: &Field) -> Result<()> {
    for dim in &field.dimensions {
        if let Dimension::Var(size_name) = dim {
            let size_field = msg_type.field(size_name).ok_or_else(|| {
                LogError::invalid_schema(
                    &msg_type.name,
                    format!(
                        "dimension '{size_name}' of '{}' is not an earlier member",
                        field.name
                    ),
                )
            })?;
            let is_int_scalar = size_field.dimensions.is_empty()
                && matches!(size_field.type_name, FieldType::Primitive(p) if p.is_integer());
            if !is_int_scalar {
                return Err(LogError::invalid_schema(
                    &msg_type.name,
                    format!("dimension '{size_name}' must be an integer scalar"),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_struct() {
        let schema = parse("struct point_t { double x; double y; }").unwrap();
        let ty = schema.get_type("point_t").unwrap();

        assert_eq!(schema.package, None);
        assert_eq!(ty.fields.len(), 2);
        assert_eq!(ty.fields[0].name, "x");
        assert_eq!(
            ty.fields[1].type_name,
            FieldType::Primitive(PrimitiveType::Double)
        );
    }

    #[test]
    fn test_parse_package_and_order() {
        let src = r#"
package dairlib;

struct b_t { int8_t v; }
struct a_t { b_t inner; }
"#;
        let schema = parse(src).unwrap();
        assert_eq!(schema.package.as_deref(), Some("dairlib"));
        assert_eq!(schema.order, vec!["b_t".to_string(), "a_t".to_string()]);
        assert_eq!(
            schema.get_type("a_t").unwrap().full_name(),
            "dairlib.a_t"
        );
        assert_eq!(
            schema.get_type("dairlib.a_t").unwrap().fields[0].type_name,
            FieldType::Nested("b_t".into())
        );
    }

    #[test]
    fn test_parse_dimensions() {
        let src = "struct arr_t { int32_t n; int32_t m; double grid[n][m]; float acc[3]; }";
        let schema = parse(src).unwrap();
        let ty = schema.get_type("arr_t").unwrap();

        assert_eq!(
            ty.field("grid").unwrap().dimensions,
            vec![Dimension::Var("n".into()), Dimension::Var("m".into())]
        );
        assert_eq!(
            ty.field("acc").unwrap().dimensions,
            vec![Dimension::Const(3)]
        );
    }

    #[test]
    fn test_parse_comments_and_constants() {
        let src = r#"
// leading comment
struct mode_t {
  /* block
     comment */
  const int32_t WALK = 1, RUN = 2;
  int32_t mode; // trailing
}
"#;
        let schema = parse(src).unwrap();
        let ty = schema.get_type("mode_t").unwrap();

        assert_eq!(ty.fields.len(), 1);
        assert_eq!(ty.constants.len(), 2);
        assert_eq!(ty.constants[1].name, "RUN");
        assert_eq!(ty.constants[1].value, "2");
    }

    #[test]
    fn test_member_type_starting_with_keyword() {
        let src = "struct constant_t { int8_t v; } struct holder_t { constant_t c; }";
        let schema = parse(src).unwrap();
        let holder = schema.get_type("holder_t").unwrap();
        assert_eq!(
            holder.fields[0].type_name,
            FieldType::Nested("constant_t".into())
        );
    }

    #[test]
    fn test_reject_unknown_dimension() {
        let err = parse("struct bad_t { double v[n]; }").unwrap_err();
        assert!(matches!(err, LogError::InvalidSchema { .. }));
    }

    #[test]
    fn test_reject_non_integer_dimension() {
        let err = parse("struct bad_t { double n; double v[n]; }").unwrap_err();
        assert!(matches!(err, LogError::InvalidSchema { .. }));
    }

    #[test]
    fn test_reject_duplicate_member() {
        let err = parse("struct bad_t { double v; double v; }").unwrap_err();
        assert!(matches!(err, LogError::InvalidSchema { .. }));
    }

    #[test]
    fn test_syntax_error() {
        let err = parse("struct broken_t { double }").unwrap_err();
        assert!(matches!(err, LogError::ParseError { .. }));
    }
}
