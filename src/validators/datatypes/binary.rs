//! hexBinary and base64Binary; lengths count octets

use super::TypeValidator;
use crate::error::{ValueError, ValueResult};
use crate::names::is_xml_whitespace;
use crate::validators::context::ValidationContext;
use crate::validators::facets::FacetMask;
use crate::validators::values::ActualValue;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

fn decode_hex(content: &str) -> Option<Vec<u8>> {
    if content.len() % 2 != 0 {
        return None;
    }
    let nibble = |b: u8| (b as char).to_digit(16).map(|d| d as u8);
    content
        .as_bytes()
        .chunks(2)
        .map(|pair| Some(nibble(pair[0])? << 4 | nibble(pair[1])?))
        .collect()
}

fn octets(value: &ActualValue) -> usize {
    match value {
        ActualValue::HexBinary(bytes) | ActualValue::Base64Binary(bytes) => bytes.len(),
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HexBinaryDv;

impl TypeValidator for HexBinaryDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::STRING_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        decode_hex(content)
            .map(ActualValue::HexBinary)
            .ok_or_else(|| ValueError::invalid_lexical(content, "hexBinary"))
    }

    fn data_length(&self, value: &ActualValue) -> usize {
        octets(value)
    }
}

/// base64Binary; whitespace inside the encoded text is ignored
#[derive(Debug, Clone, Copy)]
pub struct Base64BinaryDv;

impl TypeValidator for Base64BinaryDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::STRING_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        let compact: String = content.chars().filter(|c| !is_xml_whitespace(*c)).collect();
        STANDARD
            .decode(compact.as_bytes())
            .map(ActualValue::Base64Binary)
            .map_err(|_| ValueError::invalid_lexical(content, "base64Binary"))
    }

    fn data_length(&self, value: &ActualValue) -> usize {
        octets(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::context::EmptyContext;

    #[test]
    fn test_hex_binary() {
        let v = HexBinaryDv.parse("0fA1", &EmptyContext).unwrap();
        assert_eq!(v, ActualValue::HexBinary(vec![0x0f, 0xa1]));
        assert_eq!(HexBinaryDv.data_length(&v), 2);
        assert!(HexBinaryDv.parse("abc", &EmptyContext).is_err());
        assert!(HexBinaryDv.parse("zz", &EmptyContext).is_err());
        assert_eq!(HexBinaryDv.parse("", &EmptyContext).unwrap(), ActualValue::HexBinary(vec![]));
    }

    #[test]
    fn test_base64_binary() {
        let v = Base64BinaryDv.parse("aGVs\n bG8=", &EmptyContext).unwrap();
        assert_eq!(v, ActualValue::Base64Binary(b"hello".to_vec()));
        assert_eq!(Base64BinaryDv.data_length(&v), 5);
        assert!(Base64BinaryDv.parse("aGVsbG8", &EmptyContext).is_err());
        assert!(Base64BinaryDv.parse("a$==", &EmptyContext).is_err());
    }
}
