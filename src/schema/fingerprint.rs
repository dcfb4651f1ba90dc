// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! LCM type fingerprints.
//!
//! Every top-level LCM message starts with an 8-byte fingerprint derived from
//! the structure of its type. The base hash covers member names, primitive
//! type names and dimension layout (never the struct name itself); the full
//! fingerprint adds the recursive hashes of nested struct members and rotates
//! left by one bit. Cycles contribute zero.

use super::ast::{Dimension, FieldType, MessageType};
use crate::core::{LogError, Result};

const HASH_SEED: i64 = 0x1234_5678;

#[inline]
fn hash_update(v: i64, c: i8) -> i64 {
    (v.wrapping_shl(8) ^ (v >> 55)).wrapping_add(c as i64)
}

fn hash_string_update(mut v: i64, s: &str) -> i64 {
    // The length is folded in as a signed byte, like the reference generator.
    v = hash_update(v, s.len() as i8);
    for b in s.bytes() {
        v = hash_update(v, b as i8);
    }
    v
}

/// Base hash of a single struct, ignoring nested types.
pub fn base_hash(msg_type: &MessageType) -> i64 {
    let mut v = HASH_SEED;

    for field in &msg_type.fields {
        v = hash_string_update(v, &field.name);

        if let FieldType::Primitive(prim) = field.type_name {
            v = hash_string_update(v, prim.lcm_name());
        }

        v = hash_update(v, field.dimensions.len() as i8);
        for dim in &field.dimensions {
            match dim {
                Dimension::Const(n) => {
                    v = hash_update(v, 0);
                    v = hash_string_update(v, &n.to_string());
                }
                Dimension::Var(name) => {
                    v = hash_update(v, 1);
                    v = hash_string_update(v, name);
                }
            }
        }
    }

    v
}

/// Full fingerprint of `type_name`, resolving nested types through `lookup`.
pub fn fingerprint<'a, F>(type_name: &str, lookup: &F) -> Result<u64>
where
    F: Fn(&str) -> Option<&'a MessageType>,
{
    let mut parents = Vec::new();
    hash_recursive(type_name, lookup, &mut parents)
}

fn hash_recursive<'a, F>(type_name: &str, lookup: &F, parents: &mut Vec<String>) -> Result<u64>
where
    F: Fn(&str) -> Option<&'a MessageType>,
{
    let msg_type = lookup(type_name).ok_or_else(|| LogError::type_not_found(type_name))?;
    if parents.iter().any(|p| p == &msg_type.name) {
        return Ok(0);
    }

    parents.push(msg_type.name.clone());
    let mut hash = base_hash(msg_type) as u64;
    for field in &msg_type.fields {
        if let FieldType::Nested(nested) = &field.type_name {
            hash = hash.wrapping_add(hash_recursive(nested, lookup, parents)?);
        }
    }
    parents.pop();

    Ok(hash.rotate_left(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parser::parse;

    fn fp(src: &str, name: &str) -> u64 {
        let schema = parse(src).unwrap();
        fingerprint(name, &|n: &str| schema.get_type(n)).unwrap()
    }

    #[test]
    fn test_hash_update_matches_reference_arithmetic() {
        // ((v << 8) ^ (v >> 55)) + c on signed 64-bit integers
        let v = HASH_SEED;
        assert_eq!(hash_update(v, 1), (0x1234_5678i64 << 8) + 1);
        let big = i64::MIN + 5;
        assert_eq!(
            hash_update(big, 0),
            big.wrapping_shl(8) ^ (big >> 55)
        );
    }

    #[test]
    fn test_struct_name_does_not_affect_fingerprint() {
        let a = fp("struct a_t { double x; }", "a_t");
        let b = fp("struct b_t { double x; }", "b_t");
        assert_eq!(a, b);
    }

    #[test]
    fn test_member_changes_fingerprint() {
        let base = fp("struct a_t { double x; }", "a_t");
        assert_ne!(base, fp("struct a_t { double y; }", "a_t"));
        assert_ne!(base, fp("struct a_t { float x; }", "a_t"));
        assert_ne!(base, fp("struct a_t { double x[2]; }", "a_t"));
    }

    #[test]
    fn test_const_and_var_dimensions_differ() {
        let fixed = fp("struct a_t { int32_t n; double v[3]; }", "a_t");
        let var = fp("struct a_t { int32_t n; double v[n]; }", "a_t");
        assert_ne!(fixed, var);
    }

    #[test]
    fn test_nested_type_contributes() {
        let outer_a = fp(
            "struct in_t { double x; } struct out_t { in_t a; }",
            "out_t",
        );
        let outer_b = fp(
            "struct in_t { double y; } struct out_t { in_t a; }",
            "out_t",
        );
        assert_ne!(outer_a, outer_b);
    }

    #[test]
    fn test_primitive_only_fingerprint_is_rotated_base_hash() {
        let schema = parse("struct a_t { int64_t utime; }").unwrap();
        let ty = schema.get_type("a_t").unwrap();
        let full = fingerprint("a_t", &|n: &str| schema.get_type(n)).unwrap();
        assert_eq!(full, (base_hash(ty) as u64).rotate_left(1));
    }

    #[test]
    fn test_cycle_terminates() {
        let schema = parse("struct node_t { int32_t n; node_t next[n]; }").unwrap();
        assert!(fingerprint("node_t", &|n: &str| schema.get_type(n)).is_ok());
    }

    #[test]
    fn test_unknown_nested_type() {
        let schema = parse("struct a_t { missing_t m; }").unwrap();
        let err = fingerprint("a_t", &|n: &str| schema.get_type(n)).unwrap_err();
        assert!(matches!(err, LogError::TypeNotFound { .. }));
    }
}
