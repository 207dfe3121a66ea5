use serde::Serialize;
use serde_json::{Number, Value};

use std::fmt;

/// Default nesting bound for canonicalized values.
pub const MAX_DEPTH: usize = 128;

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalizationError {
    /// The value could not be represented as a JSON structure.
    #[error("invalid JSON structure: {0}")]
    InvalidStructure(String),
    /// Non-finite number (NaN/Infinity) detected.
    #[error("non-finite number detected at {0}")]
    NonFiniteNumber(String),
    /// Nesting exceeded the configured depth bound.
    #[error("value nested deeper than {max} levels at {path}")]
    TooDeep {
        /// Location where the bound was crossed.
        path: String,
        /// Configured bound.
        max: usize,
    },
}

/// Helper for building JSON paths in error messages.
#[derive(Debug, Clone)]
struct Path {
    segments: Vec<String>,
}

impl Path {
    fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(field.to_string());
        Self { segments }
    }

    fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(format!("[{}]", index));
        Self { segments }
    }

    fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "root")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}

/// Canonicalizer that emits deterministic, whitespace-free JSON.
///
/// Object keys are emitted in Unicode code point order (which is byte order
/// for UTF-8), arrays keep their order, and scalars use their most compact
/// JSON token. Fields serialized from `Option::None` with
/// `skip_serializing_if` never reach the encoder, so an omitted key and an
/// unset key produce identical bytes.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    max_depth: usize,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

impl Canonicalizer {
    /// Creates a canonicalizer with the default depth bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a canonicalizer with a custom depth bound.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Canonicalizes any serializable value.
    pub fn canonicalize<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<String, CanonicalizationError> {
        let value = serde_json::to_value(value)
            .map_err(|err| CanonicalizationError::InvalidStructure(err.to_string()))?;
        self.canonicalize_value(&value)
    }

    /// Canonicalizes an already-built JSON value.
    pub fn canonicalize_value(&self, value: &Value) -> Result<String, CanonicalizationError> {
        let mut out = String::new();
        self.encode(value, Path::root(), &mut out)?;
        Ok(out)
    }

    fn encode(
        &self,
        value: &Value,
        path: Path,
        out: &mut String,
    ) -> Result<(), CanonicalizationError> {
        if path.depth() > self.max_depth {
            return Err(CanonicalizationError::TooDeep {
                path: path.to_string(),
                max: self.max_depth,
            });
        }

        match value {
            Value::Null => out.push_str("null"),
            Value::Bool(true) => out.push_str("true"),
            Value::Bool(false) => out.push_str("false"),
            Value::Number(num) => out.push_str(&encode_number(num, &path)?),
            Value::String(s) => out.push_str(&encode_string(s)?),
            Value::Array(items) => {
                out.push('[');
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        out.push(',');
                    }
                    self.encode(item, path.push_index(idx), out)?;
                }
                out.push(']');
            }
            Value::Object(map) => {
                // serde_json may be built with `preserve_order`, so sort explicitly.
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));

                out.push('{');
                for (idx, (key, child)) in entries.into_iter().enumerate() {
                    if idx > 0 {
                        out.push(',');
                    }
                    out.push_str(&encode_string(key)?);
                    out.push(':');
                    self.encode(child, path.push_field(key), out)?;
                }
                out.push('}');
            }
        }
        Ok(())
    }
}

/// Integral floats are written without a fractional part so that `1.0` and
/// `1` hash identically.
fn encode_number(num: &Number, path: &Path) -> Result<String, CanonicalizationError> {
    if num.is_f64() {
        let f = num
            .as_f64()
            .ok_or_else(|| CanonicalizationError::NonFiniteNumber(path.to_string()))?;
        if !f.is_finite() {
            return Err(CanonicalizationError::NonFiniteNumber(path.to_string()));
        }
        if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
            return Ok(format!("{}", f as i64));
        }
    }
    Ok(num.to_string())
}

fn encode_string(s: &str) -> Result<String, CanonicalizationError> {
    serde_json::to_string(s).map_err(|err| CanonicalizationError::InvalidStructure(err.to_string()))
}

/// Canonicalizes a value with the default [`Canonicalizer`].
///
/// ```rust
/// use missive_canonical::canonicalize;
/// use serde_json::json;
///
/// let a = canonicalize(&json!({"b": 2, "a": 1}))?;
/// let b = canonicalize(&json!({"a": 1, "b": 2}))?;
/// assert_eq!(a, b);
/// assert_eq!(a, r#"{"a":1,"b":2}"#);
/// # Ok::<(), missive_canonical::CanonicalizationError>(())
/// ```
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<String, CanonicalizationError> {
    Canonicalizer::default().canonicalize(value)
}

/// Canonical UTF-8 bytes for a value.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CanonicalizationError> {
    canonicalize(value).map(String::into_bytes)
}
