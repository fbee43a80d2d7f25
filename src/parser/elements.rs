use std::str::FromStr;

use bigdecimal::BigDecimal;

use super::ParseError;

/// Elements of the gem catalog vocabulary that carry meaning for the parsers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CatalogElement {
    Gem,
    Name,
    Preciousness,
    Origin,
    Value,
    VisualParameters,
    Color,
    Transparency,
    Facets,
}

impl CatalogElement {
    pub(crate) fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"gem" => Some(CatalogElement::Gem),
            b"name" => Some(CatalogElement::Name),
            b"preciousness" => Some(CatalogElement::Preciousness),
            b"origin" => Some(CatalogElement::Origin),
            b"value" => Some(CatalogElement::Value),
            b"visualParameters" => Some(CatalogElement::VisualParameters),
            b"color" => Some(CatalogElement::Color),
            b"transparency" => Some(CatalogElement::Transparency),
            b"facets" => Some(CatalogElement::Facets),
            _ => None,
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            CatalogElement::Gem => "gem",
            CatalogElement::Name => "name",
            CatalogElement::Preciousness => "preciousness",
            CatalogElement::Origin => "origin",
            CatalogElement::Value => "value",
            CatalogElement::VisualParameters => "visualParameters",
            CatalogElement::Color => "color",
            CatalogElement::Transparency => "transparency",
            CatalogElement::Facets => "facets",
        }
    }

    /// Elements that only make sense inside a visualParameters group
    pub(crate) fn is_group_field(&self) -> bool {
        matches!(
            self,
            CatalogElement::Color | CatalogElement::Transparency | CatalogElement::Facets
        )
    }
}

/// Exponents beyond this magnitude are rejected rather than expanded
const MAX_DECIMAL_EXPONENT: i64 = 10_000;

/// Parse exact decimal text (plain or scientific notation) at any precision
pub(crate) fn decode_decimal(element: CatalogElement, text: &str) -> Result<BigDecimal, ParseError> {
    let malformed = || ParseError::malformed_number(element.as_str(), text);
    // num-bigint accepts digit separators, xs:decimal does not
    if text.contains('_') {
        return Err(malformed());
    }
    if let Some((_, exponent)) = text.split_once(|c| c == 'e' || c == 'E') {
        let exponent = i64::from_str(exponent).map_err(|_| malformed())?;
        if !(-MAX_DECIMAL_EXPONENT..=MAX_DECIMAL_EXPONENT).contains(&exponent) {
            return Err(malformed());
        }
    }
    BigDecimal::from_str(text).map_err(|_| malformed())
}

/// Parse integer text
pub(crate) fn decode_integer(element: CatalogElement, text: &str) -> Result<i32, ParseError> {
    i32::from_str(text).map_err(|_| ParseError::malformed_number(element.as_str(), text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal(text: &str) -> BigDecimal {
        BigDecimal::from_str(text).unwrap()
    }

    #[test]
    fn test_decode_decimal_keeps_scale() {
        let value = decode_decimal(CatalogElement::Value, "2.50").unwrap();
        assert_eq!(value, decimal("2.5"));
        assert_eq!(value.to_string(), "2.50");

        let tiny = decode_decimal(CatalogElement::Value, "0.1").unwrap();
        assert_eq!(&tiny + &tiny + &tiny, decimal("0.3"));
    }

    #[test]
    fn test_decode_decimal_scientific() {
        let value = decode_decimal(CatalogElement::Value, "1.5E2").unwrap();
        assert_eq!(value, BigDecimal::from(150));
        assert_eq!(decode_decimal(CatalogElement::Value, "25e-1").unwrap(), decimal("2.5"));
    }

    #[test]
    fn test_decode_decimal_beyond_machine_precision() {
        for text in [
            "1234567890.12345678901234567890",
            "0.12345678901234567890123456789012",
            // 2^96
            "79228162514264337593543950336",
            "-340282366920938463463374607431768211456.000000000000000000001",
        ] {
            let value = decode_decimal(CatalogElement::Value, text).unwrap();
            assert_eq!(value.to_string(), text);
        }

        let above = decode_decimal(CatalogElement::Value, "79228162514264337593543950336").unwrap();
        let below = decode_decimal(CatalogElement::Value, "79228162514264337593543950335.99").unwrap();
        assert!(below < above);
    }

    #[test]
    fn test_decode_decimal_rejects_garbage() {
        for text in ["", "abc", "1,5", "1_000", "1.2.3", "1e", "1e99999999999999999999", "1e20000"] {
            match decode_decimal(CatalogElement::Transparency, text) {
                Err(ParseError::MalformedNumber { element, text: t }) => {
                    assert_eq!(element, "transparency");
                    assert_eq!(t, text);
                }
                other => panic!("expected MalformedNumber for {:?}, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_decode_integer() {
        assert_eq!(decode_integer(CatalogElement::Facets, "57").unwrap(), 57);
        assert_eq!(decode_integer(CatalogElement::Facets, "+8").unwrap(), 8);
        assert!(decode_integer(CatalogElement::Facets, "5.0").is_err());
        assert!(decode_integer(CatalogElement::Facets, "").is_err());
    }

    #[test]
    fn test_local_name_round_trip() {
        for name in ["gem", "name", "preciousness", "origin", "value", "visualParameters", "color", "transparency", "facets"] {
            let element = CatalogElement::from_local_name(name.as_bytes()).unwrap();
            assert_eq!(element.as_str(), name);
        }
        assert!(CatalogElement::from_local_name(b"gems").is_none());
        assert!(CatalogElement::from_local_name(b"Gem").is_none());
    }
}
