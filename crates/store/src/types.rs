use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form record metadata.
pub type Metadata = serde_json::Map<String, Value>;

pub const DEFAULT_TOP_K: u32 = 5;
pub const MAX_TOP_K: u32 = 50;

/// A record sent to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub key: String,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
}

/// One nearest-neighbour result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub key: String,
    /// Store-native distance; smaller is closer.
    pub distance: f32,
    pub metadata: Metadata,
}

impl QueryMatch {
    /// `1 - distance`. Only meaningful when the index metric keeps distances
    /// in `[0, 1]`, which is a property of the index configuration.
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}

/// Number of results to request, always within `1..=MAX_TOP_K`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TopK(u32);

impl TopK {
    /// Strict constructor: `None` outside `1..=MAX_TOP_K`.
    pub fn new(k: u32) -> Option<Self> {
        (1..=MAX_TOP_K).contains(&k).then_some(Self(k))
    }

    /// Non-positive values fall back to the default, large ones are capped.
    pub fn clamped(k: i64) -> Self {
        if k <= 0 {
            Self::default()
        } else if k > i64::from(MAX_TOP_K) {
            Self(MAX_TOP_K)
        } else {
            Self(k as u32)
        }
    }

    /// Interprets a user-supplied `k` without ever failing.
    ///
    /// Numbers are truncated toward zero, integer strings are parsed,
    /// booleans count as 0/1, everything else (absent, null, non-numeric
    /// strings, lists, objects) gives the default.
    pub fn lenient(value: Option<&Value>) -> Self {
        let parsed = match value {
            Some(Value::Number(n)) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            }),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            Some(Value::Bool(b)) => Some(i64::from(*b)),
            _ => None,
        };
        parsed.map(Self::clamped).unwrap_or_default()
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for TopK {
    fn default() -> Self {
        Self(DEFAULT_TOP_K)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lenient(v: Value) -> u32 {
        TopK::lenient(Some(&v)).get()
    }

    #[test]
    fn in_range_values_pass_through() {
        assert_eq!(lenient(json!(1)), 1);
        assert_eq!(lenient(json!(7)), 7);
        assert_eq!(lenient(json!(50)), 50);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(lenient(json!(0)), 5);
        assert_eq!(lenient(json!(-3)), 5);
        assert_eq!(lenient(json!(51)), 50);
        assert_eq!(lenient(json!(10_000)), 50);
        assert_eq!(lenient(json!(u64::MAX)), 50);
    }

    #[test]
    fn non_numeric_values_default() {
        assert_eq!(TopK::lenient(None).get(), 5);
        assert_eq!(lenient(Value::Null), 5);
        assert_eq!(lenient(json!("many")), 5);
        assert_eq!(lenient(json!("2.5")), 5);
        assert_eq!(lenient(json!([3])), 5);
        assert_eq!(lenient(json!({"k": 3})), 5);
    }

    #[test]
    fn numeric_strings_and_floats_are_accepted() {
        assert_eq!(lenient(json!("12")), 12);
        assert_eq!(lenient(json!(" 3 ")), 3);
        assert_eq!(lenient(json!(3.9)), 3);
        assert_eq!(lenient(json!(0.5)), 5);
        assert_eq!(lenient(json!(true)), 1);
    }

    #[test]
    fn lenient_is_always_in_range() {
        for v in [json!(-1e300), json!(1e300), json!(i64::MIN), json!(""), json!(false)] {
            let k = lenient(v);
            assert!((1..=MAX_TOP_K).contains(&k));
        }
    }

    #[test]
    fn strict_constructor_rejects_out_of_range() {
        assert!(TopK::new(0).is_none());
        assert!(TopK::new(51).is_none());
        assert_eq!(TopK::new(10).map(TopK::get), Some(10));
    }

    #[test]
    fn similarity_is_one_minus_distance() {
        let m = QueryMatch {
            key: "k".into(),
            distance: 0.125,
            metadata: Metadata::new(),
        };
        assert_eq!(m.similarity(), 1.0 - 0.125);
    }
}
