//! Re-serialization of inbound payloads for the upstream call.
//!
//! The forwarded bytes follow ECMAScript `JSON.stringify` rules rather than
//! serde_json's defaults:
//! - numbers use the shortest round-trip form without a trailing `.0`
//!   (`1.0` → `1`, `1e2` → `100`, `1e21` → `1e+21`, `1e-7` → `1e-7`)
//! - integers beyond 2^53 are written as the double they parse to
//! - object keys that are array indices come first, in ascending order

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::ser::{CompactFormatter, Formatter};
use serde_json::{Map, Value};
use std::io;

/// Largest integer a double holds exactly.
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Serialize `value` the way a browser-side `JSON.stringify` would.
pub fn to_vec(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, EcmaFormatter);
    Ordered(value).serialize(&mut serializer)?;
    Ok(out)
}

/// Compact formatter with ECMAScript number rendering.
struct EcmaFormatter;

impl Formatter for EcmaFormatter {
    fn write_i64<W>(&mut self, writer: &mut W, value: i64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if value.unsigned_abs() > MAX_SAFE_INTEGER {
            return write_number(writer, value as f64);
        }
        CompactFormatter.write_i64(writer, value)
    }

    fn write_u64<W>(&mut self, writer: &mut W, value: u64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if value > MAX_SAFE_INTEGER {
            return write_number(writer, value as f64);
        }
        CompactFormatter.write_u64(writer, value)
    }

    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write_number(writer, f64::from(value))
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write_number(writer, value)
    }
}

/// ECMAScript Number::toString for finite doubles.
fn write_number<W>(writer: &mut W, value: f64) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    if !value.is_finite() {
        return writer.write_all(b"null");
    }
    if value == 0.0 {
        return writer.write_all(b"0");
    }
    writer.write_all(format_number(value).as_bytes())
}

fn format_number(value: f64) -> String {
    // `{:e}` yields the shortest round-trip digits, e.g. `1.2345e22`.
    let scientific = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };

    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // value = 0.digits × 10^n
    let n = exponent + 1;

    let mut out = String::with_capacity(digits.len() + 8);
    if value.is_sign_negative() {
        out.push('-');
    }

    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((n - k) as usize));
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-n) as usize));
        out.push_str(&digits);
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        let e = n - 1;
        out.push('e');
        out.push(if e < 0 { '-' } else { '+' });
        out.push_str(&e.unsigned_abs().to_string());
    }
    out
}

/// `Value` wrapper that emits object keys in ECMAScript property order.
struct Ordered<'a>(&'a Value);

impl Serialize for Ordered<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&Ordered(item))?;
                }
                seq.end()
            }
            Value::Object(map) => serialize_object(map, serializer),
            other => other.serialize(serializer),
        }
    }
}

fn serialize_object<S: Serializer>(map: &Map<String, Value>, serializer: S) -> Result<S::Ok, S::Error> {
    let mut indexed: Vec<(u32, &String, &Value)> = map
        .iter()
        .filter_map(|(key, value)| array_index(key).map(|i| (i, key, value)))
        .collect();
    indexed.sort_by_key(|(i, _, _)| *i);

    let mut out = serializer.serialize_map(Some(map.len()))?;
    for &(_, key, value) in &indexed {
        out.serialize_entry(key, &Ordered(value))?;
    }
    for (key, value) in map.iter().filter(|(key, _)| array_index(key).is_none()) {
        out.serialize_entry(key, &Ordered(value))?;
    }
    out.end()
}

/// Canonical decimal form of an integer below 2^32 - 1.
fn array_index(key: &str) -> Option<u32> {
    let index: u32 = key.parse().ok()?;
    (index != u32::MAX && index.to_string() == key).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(text: &str) -> String {
        let value: Value = serde_json::from_str(text).unwrap();
        String::from_utf8(to_vec(&value).unwrap()).unwrap()
    }

    #[test]
    fn test_whole_floats_drop_fraction() {
        assert_eq!(encode(r#"{"temperature":1.0}"#), r#"{"temperature":1}"#);
        assert_eq!(encode("[1e2,-2.0,0.0,-0.0]"), "[100,-2,0,0]");
    }

    #[test]
    fn test_fractions_and_exponents() {
        assert_eq!(encode("[0.5,0.1,123.456,-1.5]"), "[0.5,0.1,123.456,-1.5]");
        assert_eq!(encode("[1e20,1e21,1.5e300]"), "[100000000000000000000,1e+21,1.5e+300]");
        assert_eq!(encode("[0.000001,1e-7,2.5e-10]"), "[0.000001,1e-7,2.5e-10]");
    }

    #[test]
    fn test_large_integers_follow_double_precision() {
        assert_eq!(encode("[9007199254740991]"), "[9007199254740991]");
        assert_eq!(encode("[9007199254740993]"), "[9007199254740992]");
        assert_eq!(encode("[-9007199254740993]"), "[-9007199254740992]");
        assert_eq!(encode("[12345678901234567890123]"), "[1.2345678901234568e+22]");
    }

    #[test]
    fn test_index_keys_come_first() {
        assert_eq!(
            encode(r#"{"b":1,"10":2,"a":{"2":true,"1":false},"1":3,"01":4}"#),
            r#"{"1":3,"10":2,"b":1,"a":{"1":false,"2":true},"01":4}"#
        );
    }

    #[test]
    fn test_strings_and_order_untouched() {
        let value = json!({ "z": "héllo \"q\"\n", "a": null, "m": [true, "x"] });
        assert_eq!(
            String::from_utf8(to_vec(&value).unwrap()).unwrap(),
            r#"{"z":"héllo \"q\"\n","a":null,"m":[true,"x"]}"#
        );
    }
}
