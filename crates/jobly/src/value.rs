//! Dynamically typed scalar values bound to query placeholders.
//!
//! Update payloads and filters only know their field values at runtime, so
//! they are carried as [`SqlValue`]. Encoding follows the parameter type the
//! server inferred for the placeholder: an `Int` bound to an `integer` column
//! is sent as `INT4`, a `Text` bound to a `numeric` column is parsed as a
//! decimal, and so on.

use crate::error::{JoblyError, JoblyResult};
use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

type EncodeResult = Result<IsNull, Box<dyn Error + Sync + Send>>;

/// A scalar (or NULL) value bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Numeric(Decimal),
    Text(String),
}

impl SqlValue {
    /// Whether this value encodes as SQL `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Convert a JSON scalar.
    ///
    /// Arrays and objects have no column representation and are rejected.
    pub fn from_json(value: &serde_json::Value) -> JoblyResult<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(SqlValue::Null),
            Value::Bool(b) => Ok(SqlValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(SqlValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(SqlValue::Float(f))
                } else {
                    Err(JoblyError::bad_request(format!("number out of range: {n}")))
                }
            }
            Value::String(s) => Ok(SqlValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(JoblyError::bad_request(
                "only scalar values can be stored in a column",
            )),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(v) => write!(f, "{v}"),
            SqlValue::Int(v) => write!(f, "{v}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Numeric(v) => write!(f, "{v}"),
            SqlValue::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(i64::from(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Numeric(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> EncodeResult {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(v) => match *ty {
                Type::BOOL => v.to_sql(ty, out),
                _ => Err(mismatch("boolean", ty)),
            },
            SqlValue::Int(v) => int_to_sql(*v, ty, out),
            SqlValue::Float(v) => float_to_sql(*v, ty, out),
            SqlValue::Numeric(v) => numeric_to_sql(*v, ty, out),
            SqlValue::Text(v) => text_to_sql(v, ty, out),
        }
    }

    // Every variant decides per target type inside `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn mismatch(kind: &str, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("cannot encode {kind} value as {ty}").into()
}

fn int_to_sql(v: i64, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::INT8 => v.to_sql(ty, out),
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => (v as f64).to_sql(ty, out),
        Type::NUMERIC => Decimal::from(v).to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR => v.to_string().to_sql(ty, out),
        _ => Err(mismatch("integer", ty)),
    }
}

fn float_to_sql(v: f64, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    match *ty {
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => v.to_sql(ty, out),
        Type::NUMERIC => Decimal::try_from(v)?.to_sql(ty, out),
        Type::INT2 | Type::INT4 | Type::INT8 => {
            if v.fract() != 0.0 || !v.is_finite() {
                return Err(format!("{v} is not a whole number").into());
            }
            int_to_sql(v as i64, ty, out)
        }
        _ => Err(mismatch("float", ty)),
    }
}

fn numeric_to_sql(v: Decimal, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    match *ty {
        Type::NUMERIC => v.to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR => v.to_string().to_sql(ty, out),
        _ => Err(mismatch("numeric", ty)),
    }
}

fn text_to_sql(v: &str, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    match *ty {
        Type::NUMERIC => Decimal::from_str(v.trim())?.to_sql(ty, out),
        Type::INT2 | Type::INT4 | Type::INT8 => int_to_sql(v.trim().parse::<i64>()?, ty, out),
        Type::FLOAT4 | Type::FLOAT8 => float_to_sql(v.trim().parse::<f64>()?, ty, out),
        Type::BOOL => v.trim().parse::<bool>()?.to_sql(ty, out),
        _ if <&str as ToSql>::accepts(ty) => v.to_sql(ty, out),
        _ => Err(mismatch("text", ty)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_scalars_convert() {
        assert_eq!(SqlValue::from_json(&json!(null)).unwrap(), SqlValue::Null);
        assert_eq!(SqlValue::from_json(&json!(true)).unwrap(), SqlValue::Bool(true));
        assert_eq!(SqlValue::from_json(&json!(32)).unwrap(), SqlValue::Int(32));
        assert_eq!(SqlValue::from_json(&json!(0.5)).unwrap(), SqlValue::Float(0.5));
        assert_eq!(
            SqlValue::from_json(&json!("Aliya")).unwrap(),
            SqlValue::Text("Aliya".into())
        );
    }

    #[test]
    fn json_containers_are_rejected() {
        let err = SqlValue::from_json(&json!([1, 2])).unwrap_err();
        assert!(err.is_bad_request());
        assert!(SqlValue::from_json(&json!({"a": 1})).is_err());
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(5)), SqlValue::Int(5));
        assert!(SqlValue::from(None::<String>).is_null());
    }

    #[test]
    fn int_encodes_to_int4_with_range_check() {
        let mut buf = BytesMut::new();
        SqlValue::Int(50_000).to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(&buf[..], &50_000_i32.to_be_bytes());

        let mut buf = BytesMut::new();
        assert!(SqlValue::Int(i64::MAX).to_sql(&Type::INT4, &mut buf).is_err());
    }

    #[test]
    fn text_encodes_into_numeric() {
        let mut from_text = BytesMut::new();
        SqlValue::Text("0.05".into())
            .to_sql(&Type::NUMERIC, &mut from_text)
            .unwrap();

        let mut from_decimal = BytesMut::new();
        Decimal::from_str("0.05")
            .unwrap()
            .to_sql(&Type::NUMERIC, &mut from_decimal)
            .unwrap();

        assert_eq!(from_text, from_decimal);
    }

    #[test]
    fn fractional_float_refuses_integer_column() {
        let mut buf = BytesMut::new();
        assert!(SqlValue::Float(1.5).to_sql(&Type::INT4, &mut buf).is_err());

        let mut buf = BytesMut::new();
        SqlValue::Float(75_000.0).to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(&buf[..], &75_000_i32.to_be_bytes());
    }

    #[test]
    fn null_is_null_for_any_type() {
        let mut buf = BytesMut::new();
        let is_null = SqlValue::Null.to_sql(&Type::NUMERIC, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(buf.is_empty());
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(SqlValue::Text("Aliya".into()).to_string(), "\"Aliya\"");
        assert_eq!(SqlValue::Int(32).to_string(), "32");
        assert_eq!(SqlValue::Null.to_string(), "NULL");
    }
}
