//! Scalar values bound as statement parameters.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::de::{self, Deserialize, Deserializer, Visitor};
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

type BoxError = Box<dyn Error + Sync + Send>;

/// A scalar SQL parameter value.
///
/// Integers and floats adapt to the column type Postgres inferred for the
/// placeholder, so `Int(3)` binds equally to `SMALLINT`, `INTEGER`,
/// `BIGINT`, `REAL`, `DOUBLE PRECISION` or `NUMERIC`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL
    Null,
    /// Integral number
    Int(i64),
    /// Non-integral (or out of `i64` range) number
    Float(f64),
    /// Text (TEXT, VARCHAR, etc.)
    Text(String),
}

impl Value {
    /// Returns true if this is a NULL value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Build a numeric value, preferring `Int` when the number is integral.
    pub fn number(n: f64) -> Self {
        if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
            Value::Int(n as i64)
        } else {
            Value::Float(n)
        }
    }

    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Parse text the way a browser form value is coerced to a number.
///
/// Surrounding whitespace is ignored and blank text is zero. Accepted forms
/// are decimal literals with optional sign, fraction and exponent,
/// unsigned `0x`/`0o`/`0b` radix literals and `Infinity`. Anything else is
/// NaN.
pub fn parse_number(text: &str) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        return digits
            .chars()
            .filter_map(|c| c.to_digit(radix))
            .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d));
    }

    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned == "Infinity" {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    if is_decimal_literal(unsigned) {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// `digits [. digits] [e [sign] digits]`, with at least one mantissa digit.
fn is_decimal_literal(s: &str) -> bool {
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }
    if !all_digits(int_part) || !all_digits(frac_part) {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && all_digits(digits)
        }
    }
}

fn mismatch(value: &Value, ty: &Type) -> BoxError {
    format!("cannot bind {value} to a parameter of type {ty}").into()
}

fn parse_text<T>(text: &str, ty: &Type) -> Result<T, BoxError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    text.trim()
        .parse()
        .map_err(|e| format!("cannot bind {text:?} to a parameter of type {ty}: {e}").into())
}

/// Postgres boolean input literals.
fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn timestamp_from_text(text: &str, ty: &Type) -> Result<NaiveDateTime, BoxError> {
    let t = text.trim();
    NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDate::from_str(t).map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|e| format!("cannot bind {text:?} to a parameter of type {ty}: {e}").into())
}

/// Text is converted to whatever the placeholder expects, the way Postgres
/// reads a text literal for that column.
fn text_to_sql(text: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if <&str as ToSql>::accepts(ty) {
        return text.to_sql(ty, out);
    }
    match *ty {
        Type::BOOL => parse_bool(text)
            .ok_or_else(|| -> BoxError {
                format!("cannot bind {text:?} to a parameter of type {ty}: not a boolean").into()
            })?
            .to_sql(ty, out),
        Type::INT2 => parse_text::<i16>(text, ty)?.to_sql(ty, out),
        Type::INT4 => parse_text::<i32>(text, ty)?.to_sql(ty, out),
        Type::INT8 => parse_text::<i64>(text, ty)?.to_sql(ty, out),
        Type::FLOAT4 => parse_text::<f32>(text, ty)?.to_sql(ty, out),
        Type::FLOAT8 => parse_text::<f64>(text, ty)?.to_sql(ty, out),
        Type::NUMERIC => parse_text::<Decimal>(text, ty)?.to_sql(ty, out),
        Type::DATE => parse_text::<NaiveDate>(text, ty)?.to_sql(ty, out),
        Type::TIMESTAMP => timestamp_from_text(text, ty)?.to_sql(ty, out),
        Type::TIMESTAMPTZ => {
            let t = text.trim();
            let at = DateTime::parse_from_rfc3339(t)
                .or_else(|_| DateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S%.f%#z"))
                .map(|dt| dt.with_timezone(&Utc))
                .or_else(|_| timestamp_from_text(text, ty).map(|naive| naive.and_utc()))?;
            at.to_sql(ty, out)
        }
        _ => Err(mismatch(&Value::Text(text.to_owned()), ty)),
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            // Numbers headed for text columns go back to their decimal form.
            Value::Int(_) | Value::Float(_) if <&str as ToSql>::accepts(ty) => {
                self.to_string().as_str().to_sql(ty, out)
            }
            Value::Int(n) => match *ty {
                Type::INT2 => i16::try_from(*n)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*n)?.to_sql(ty, out),
                Type::INT8 => n.to_sql(ty, out),
                Type::FLOAT4 => (*n as f32).to_sql(ty, out),
                Type::FLOAT8 => (*n as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*n).to_sql(ty, out),
                Type::BOOL if *n == 0 || *n == 1 => (*n == 1).to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Value::Float(n) => match *ty {
                Type::FLOAT4 => (*n as f32).to_sql(ty, out),
                Type::FLOAT8 => n.to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*n)?.to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Value::Text(s) => text_to_sql(s, ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::NUMERIC
                | Type::BOOL
                | Type::DATE
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
        ) || <&str as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, a number or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::Text(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::Text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_forms() {
        assert_eq!(parse_number("42"), 42.0);
        assert_eq!(parse_number("  -3.5 "), -3.5);
        assert_eq!(parse_number("+.5"), 0.5);
        assert_eq!(parse_number("7."), 7.0);
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number("2.5E-1"), 0.25);
    }

    #[test]
    fn blank_text_is_zero() {
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("   "), 0.0);
    }

    #[test]
    fn radix_literals_and_infinity() {
        assert_eq!(parse_number("0x1F"), 31.0);
        assert_eq!(parse_number("0b101"), 5.0);
        assert_eq!(parse_number("0o17"), 15.0);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_number("-0x10").is_nan());
        assert!(parse_number("0x").is_nan());
    }

    #[test]
    fn rejects_what_rust_would_accept() {
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("NaN").is_nan());
        assert!(parse_number("infinity").is_nan());
        assert!(parse_number("5abc").is_nan());
        assert!(parse_number(".").is_nan());
        assert!(parse_number("1e").is_nan());
        assert!(parse_number("1 2").is_nan());
    }

    #[test]
    fn number_prefers_int() {
        assert_eq!(Value::number(3.0), Value::Int(3));
        assert_eq!(Value::number(-0.0), Value::Int(0));
        assert_eq!(Value::number(2.5), Value::Float(2.5));
        assert_eq!(Value::number(f64::INFINITY), Value::Float(f64::INFINITY));
        assert_eq!(Value::number(1e300), Value::Float(1e300));
    }

    #[test]
    fn accepts_numeric_and_text_types() {
        assert!(<Value as ToSql>::accepts(&Type::INT4));
        assert!(<Value as ToSql>::accepts(&Type::NUMERIC));
        assert!(<Value as ToSql>::accepts(&Type::VARCHAR));
        assert!(<Value as ToSql>::accepts(&Type::BOOL));
        assert!(<Value as ToSql>::accepts(&Type::DATE));
        assert!(!<Value as ToSql>::accepts(&Type::BYTEA));
    }

    #[test]
    fn int_narrows_to_column_width() {
        let mut buf = BytesMut::new();
        Value::Int(5000).to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(&buf[..], &5000_i32.to_be_bytes());

        let mut buf = BytesMut::new();
        assert!(Value::Int(i64::MAX).to_sql(&Type::INT4, &mut buf).is_err());
    }

    #[test]
    fn text_into_integer_column_is_an_error() {
        let mut buf = BytesMut::new();
        match Value::from("5abc").to_sql(&Type::INT4, &mut buf) {
            Err(err) => assert!(err.to_string().contains("int4")),
            Ok(_) => panic!("non-numeric text must not bind to an integer column"),
        }
    }

    #[test]
    fn numbers_bind_to_text_columns_as_decimal_text() {
        for ty in [Type::TEXT, Type::VARCHAR] {
            let mut buf = BytesMut::new();
            Value::Int(123456).to_sql_checked(&ty, &mut buf).unwrap();
            assert_eq!(&buf[..], b"123456");
        }

        let mut buf = BytesMut::new();
        Value::Float(12.5).to_sql_checked(&Type::VARCHAR, &mut buf).unwrap();
        assert_eq!(&buf[..], b"12.5");
    }

    #[test]
    fn text_binds_to_date_and_time_columns() {
        let mut buf = BytesMut::new();
        Value::from("2023-06-01").to_sql_checked(&Type::DATE, &mut buf).unwrap();
        let mut expected = BytesMut::new();
        NaiveDate::from_ymd_opt(2023, 6, 1)
            .unwrap()
            .to_sql(&Type::DATE, &mut expected)
            .unwrap();
        assert_eq!(buf, expected);

        let mut buf = BytesMut::new();
        assert!(Value::from("2023-06-01 10:30:00").to_sql_checked(&Type::TIMESTAMP, &mut buf).is_ok());
        let mut buf = BytesMut::new();
        assert!(Value::from("2023-06-01T10:30:00Z").to_sql_checked(&Type::TIMESTAMPTZ, &mut buf).is_ok());

        let mut buf = BytesMut::new();
        match Value::from("next tuesday").to_sql_checked(&Type::DATE, &mut buf) {
            Err(err) => assert!(err.to_string().contains("date")),
            Ok(_) => panic!("garbage must not bind to a date column"),
        }
    }

    #[test]
    fn text_binds_to_boolean_columns() {
        for (text, expected) in [("true", true), (" t ", true), ("off", false), ("NO", false)] {
            let mut buf = BytesMut::new();
            Value::from(text).to_sql_checked(&Type::BOOL, &mut buf).unwrap();
            assert_eq!(&buf[..], &[u8::from(expected)], "{text}");
        }

        let mut buf = BytesMut::new();
        Value::Int(1).to_sql_checked(&Type::BOOL, &mut buf).unwrap();
        assert_eq!(&buf[..], &[1]);

        let mut buf = BytesMut::new();
        assert!(Value::from("maybe").to_sql_checked(&Type::BOOL, &mut buf).is_err());
    }

    #[test]
    fn text_that_stayed_text_still_binds_to_numeric_columns() {
        let mut buf = BytesMut::new();
        Value::from("0.0").to_sql_checked(&Type::NUMERIC, &mut buf).unwrap();

        let mut expected = BytesMut::new();
        Decimal::from_str("0.0")
            .unwrap()
            .to_sql(&Type::NUMERIC, &mut expected)
            .unwrap();
        assert_eq!(buf, expected);
    }

    #[test]
    fn null_binds_as_null() {
        let mut buf = BytesMut::new();
        assert!(matches!(
            Value::Null.to_sql(&Type::TEXT, &mut buf).unwrap(),
            IsNull::Yes
        ));
    }

    #[test]
    fn deserializes_flat_json_scalars() {
        let v: Vec<Value> = serde_json::from_str(r#"["a", 1, 1.5, null]"#).unwrap();
        assert_eq!(
            v,
            vec![
                Value::Text("a".into()),
                Value::Int(1),
                Value::Float(1.5),
                Value::Null
            ]
        );
        assert!(serde_json::from_str::<Value>("true").is_err());
        assert!(serde_json::from_str::<Value>("[1]").is_err());
    }
}
