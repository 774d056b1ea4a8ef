use serde_json::Value;

/// Largest integer an IEEE-754 double represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Parses untrusted text (path segments, query values, headers) into an
/// integer. Returns `None` for anything that is not a finite, whole number
/// within the safe integer range.
pub fn to_int(input: &str) -> Option<i64> {
    let n: f64 = input.trim().parse().ok()?;
    int_from_f64(n)
}

/// Same as [`to_int`] for values taken from a JSON body.
pub fn to_int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) if i.unsigned_abs() <= MAX_SAFE_INTEGER as u64 => Some(i),
            Some(_) => None,
            None => n.as_f64().and_then(int_from_f64),
        },
        Value::String(s) => to_int(s),
        _ => None,
    }
}

pub fn int_from_f64(n: f64) -> Option<i64> {
    if !n.is_finite() || n.fract() != 0.0 || n.abs() > MAX_SAFE_INTEGER as f64 {
        return None;
    }
    Some(n as i64)
}
