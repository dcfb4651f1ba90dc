// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! LCM encoder for writing LCM-encoded data.
//!
//! Used when filtering logs and to synthesize payloads in tests. Array
//! lengths are checked against the size members already present in the
//! message.

use byteorder::{BigEndian, WriteBytesExt};

use crate::core::{CodecValue, DecodedMessage, LogError, Result};
use crate::schema::{Field, FieldType, PrimitiveType, TypeTable};

use super::decoder::resolve_dimensions;

/// Default initial capacity for the encoder buffer.
const DEFAULT_CAPACITY: usize = 64;

/// Schema-driven LCM encoder over a [`TypeTable`].
pub struct LcmEncoder<'t> {
    types: &'t TypeTable,
}

impl<'t> LcmEncoder<'t> {
    /// Create an encoder resolving types through `types`.
    pub fn new(types: &'t TypeTable) -> Self {
        Self { types }
    }

    /// Encode a top-level message of `type_name`, fingerprint first.
    pub fn encode(&self, type_name: &str, message: &DecodedMessage) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(DEFAULT_CAPACITY);
        buf.write_u64::<BigEndian>(self.types.fingerprint(type_name)?)?;
        self.encode_struct(type_name, message, &mut buf)?;
        Ok(buf)
    }

    fn encode_struct(
        &self,
        type_name: &str,
        message: &DecodedMessage,
        buf: &mut Vec<u8>,
    ) -> Result<()> {
        let msg_type = self
            .types
            .get(type_name)
            .ok_or_else(|| LogError::type_not_found(type_name))?;

        for field in &msg_type.fields {
            let value = message.get(&field.name).ok_or_else(|| {
                LogError::encode(
                    "LCM",
                    format!("{}: missing member '{}'", msg_type.name, field.name),
                )
            })?;
            let dims = resolve_dimensions(field, message)?;
            self.encode_array(field, &dims, value, buf)?;
        }
        Ok(())
    }

    fn encode_array(
        &self,
        field: &Field,
        dims: &[usize],
        value: &CodecValue,
        buf: &mut Vec<u8>,
    ) -> Result<()> {
        let Some((&len, rest)) = dims.split_first() else {
            return self.encode_element(field, value, buf);
        };
        let items = value.as_array().ok_or_else(|| {
            LogError::encode(
                "LCM",
                format!("member '{}' expects an array, got {}", field.name, value.type_name()),
            )
        })?;
        if items.len() != len {
            return Err(LogError::encode(
                "LCM",
                format!(
                    "member '{}' has {} elements, dimension says {len}",
                    field.name,
                    items.len()
                ),
            ));
        }
        for item in items {
            self.encode_array(field, rest, item, buf)?;
        }
        Ok(())
    }

    fn encode_element(&self, field: &Field, value: &CodecValue, buf: &mut Vec<u8>) -> Result<()> {
        match &field.type_name {
            FieldType::Nested(nested) => {
                let inner = value.as_struct().ok_or_else(|| {
                    LogError::encode(
                        "LCM",
                        format!("member '{}' expects struct {nested}", field.name),
                    )
                })?;
                self.encode_struct(nested, inner, buf)
            }
            FieldType::Primitive(prim) => encode_primitive(*prim, value, buf)
                .ok_or_else(|| {
                    LogError::encode(
                        "LCM",
                        format!(
                            "member '{}' expects {prim}, got {}",
                            field.name,
                            value.type_name()
                        ),
                    )
                })?
                .map_err(LogError::from),
        }
    }
}

/// Write one primitive. `None` when the value does not fit the type.
fn encode_primitive(
    prim: PrimitiveType,
    value: &CodecValue,
    buf: &mut Vec<u8>,
) -> Option<std::io::Result<()>> {
    Some(match (prim, value) {
        (PrimitiveType::Boolean, CodecValue::Bool(b)) => buf.write_u8(u8::from(*b)),
        (PrimitiveType::Int8, CodecValue::Int8(v)) => buf.write_i8(*v),
        (PrimitiveType::Byte, CodecValue::UInt8(v)) => buf.write_u8(*v),
        (PrimitiveType::Int16, v) => buf.write_i16::<BigEndian>(i16::try_from(v.as_i64()?).ok()?),
        (PrimitiveType::Int32, v) => buf.write_i32::<BigEndian>(i32::try_from(v.as_i64()?).ok()?),
        (PrimitiveType::Int64, v) => buf.write_i64::<BigEndian>(v.as_i64()?),
        (PrimitiveType::Float, v) => buf.write_f32::<BigEndian>(v.as_f64()? as f32),
        (PrimitiveType::Double, v) => buf.write_f64::<BigEndian>(v.as_f64()?),
        (PrimitiveType::String, CodecValue::String(s)) => {
            let len = i32::try_from(s.len() + 1).ok()?;
            buf.write_i32::<BigEndian>(len)
                .and_then(|_| {
                    buf.extend_from_slice(s.as_bytes());
                    buf.write_u8(0)
                })
        }
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::lcm::LcmDecoder;
    use std::collections::HashMap;

    fn table(src: &str) -> TypeTable {
        let mut t = TypeTable::new();
        t.add_source(src).unwrap();
        t
    }

    #[test]
    fn test_encode_layout() {
        let types = table("struct s_t { int32_t n; string names[n]; boolean ok; }");
        let mut msg = HashMap::new();
        msg.insert("n".to_string(), CodecValue::Int32(1));
        msg.insert("names".to_string(), CodecValue::string_array(&["ab"]));
        msg.insert("ok".to_string(), CodecValue::Bool(true));

        let bytes = LcmEncoder::new(&types).encode("s_t", &msg).unwrap();
        assert_eq!(&bytes[..8], &types.fingerprint("s_t").unwrap().to_be_bytes());
        assert_eq!(&bytes[8..], &[0, 0, 0, 1, 0, 0, 0, 3, b'a', b'b', 0, 1]);
    }

    #[test]
    fn test_encoded_nested_message_decodes() {
        let types = TypeTable::builtin().unwrap();
        let mut info = HashMap::new();
        info.insert("timestamp".to_string(), CodecValue::Int64(1));
        info.insert("body1_name".to_string(), CodecValue::String("toe_left".into()));
        info.insert("body2_name".to_string(), CodecValue::String("ground".into()));
        for key in ["contact_point", "contact_force", "normal"] {
            info.insert(key.to_string(), CodecValue::f64_array(&[0.0, 0.0, 1.0]));
        }
        let mut msg = HashMap::new();
        msg.insert("timestamp".to_string(), CodecValue::Int64(1));
        msg.insert("num_point_pair_contacts".to_string(), CodecValue::Int32(1));
        msg.insert(
            "point_pair_contact_info".to_string(),
            CodecValue::Array(vec![CodecValue::Struct(info)]),
        );

        let bytes = LcmEncoder::new(&types)
            .encode("lcmt_contact_results_for_viz", &msg)
            .unwrap();
        let decoded = LcmDecoder::new(&types)
            .decode("lcmt_contact_results_for_viz", &bytes)
            .unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let types = table("struct s_t { int32_t n; double v[n]; }");
        let mut msg = HashMap::new();
        msg.insert("n".to_string(), CodecValue::Int32(2));
        msg.insert("v".to_string(), CodecValue::f64_array(&[1.0]));
        let err = LcmEncoder::new(&types).encode("s_t", &msg).unwrap_err();
        assert!(matches!(err, LogError::EncodeError { .. }));
    }

    #[test]
    fn test_missing_member_rejected() {
        let types = table("struct s_t { int32_t n; }");
        let err = LcmEncoder::new(&types)
            .encode("s_t", &HashMap::new())
            .unwrap_err();
        assert!(err.to_string().contains("missing member 'n'"));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let types = table("struct s_t { string s; }");
        let mut msg = HashMap::new();
        msg.insert("s".to_string(), CodecValue::Float64(1.0));
        assert!(LcmEncoder::new(&types).encode("s_t", &msg).is_err());
    }
}
