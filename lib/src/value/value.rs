use std::fmt;
use std::sync::Arc;
use std::borrow::Cow;

use derive_more::Deref;
use indexmap::IndexMap;
use serde::{Serialize, Deserialize, Deserializer};
use serde::de::{self, Visitor, SeqAccess, MapAccess};

/// The key TOML's deserializer uses to smuggle datetimes through serde.
const TOML_DATETIME_KEY: &str = "$__toml_private_datetime";

/// A field value: a string, an ordered list of values, or a nested record.
///
/// Values are immutable and cheap to clone. Because a value can only be built
/// from values that already exist, a value tree can never contain itself.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Arc<str>),
    List(Arc<Vec<Value>>),
    Record(Arc<Record>),
}

/// A mapping from field names to values that remembers insertion order.
#[derive(Clone, Default, PartialEq, Eq, Deref, Serialize)]
#[serde(transparent)]
pub struct Record(IndexMap<Arc<str>, Value>);

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => fmt::Debug::fmt(s, f),
            Value::List(v) => f.debug_list().entries(v.iter()).finish(),
            Value::Record(r) => fmt::Debug::fmt(r, f),
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl Value {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v.as_slice()),
            _ => None
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None
        }
    }

    pub fn into_record(self) -> Result<Arc<Record>, Value> {
        match self {
            Value::Record(r) => Ok(r),
            _ => Err(self)
        }
    }

    pub fn into_list(self) -> Result<Arc<Vec<Value>>, Value> {
        match self {
            Value::List(v) => Ok(v),
            _ => Err(self)
        }
    }

    /// Empty strings and empty lists are empty. Records, even without any
    /// fields, are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Scalar(s) => s.is_empty(),
            Value::List(v) => v.is_empty(),
            Value::Record(_) => false,
        }
    }

    /// The value as text. Scalars are returned as-is. Lists join their
    /// elements with `", "`; records join `field: value` pairs with `"; "`.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Scalar(s) => Cow::Borrowed(s),
            _ => Cow::Owned(self.to_string()),
        }
    }

    /// Iterates over the scalars of `self`: `self` if it is one, or the
    /// scalar elements of a list. Nested lists and records are not entered.
    pub fn scalars(&self) -> impl Iterator<Item = &str> {
        let (one, many) = match self {
            Value::Scalar(s) => (Some(&**s), &[][..]),
            Value::List(v) => (None, v.as_slice()),
            Value::Record(_) => (None, &[][..]),
        };

        one.into_iter().chain(many.iter().filter_map(Value::as_scalar))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    /// Inserts `value` under `key`. A replaced field keeps its position.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<Value>
        where K: Into<Arc<str>>, V: Into<Value>
    {
        self.0.insert(key.into(), value.into())
    }

    /// Returns the value of `key`, falling back to its lowercase spelling.
    pub fn get_either_case(&self, key: &str) -> Option<&Value> {
        self.get(key).or_else(|| match key.to_lowercase() {
            lower if lower != key => self.get(&*lower),
            _ => None,
        })
    }

    /// Returns the first field whose name equals `key` ignoring ASCII case.
    pub fn get_ignore_case(&self, key: &str) -> Option<(&Arc<str>, &Value)> {
        self.get_key_value(key)
            .or_else(|| self.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)))
    }

    /// Returns the scalar at `key`, or `""` if it's missing or not a scalar.
    pub fn text(&self, key: &str) -> &str {
        self.get(key).and_then(Value::as_scalar).unwrap_or("")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => fmt::Debug::fmt(s, f),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i != 0 { f.write_str(", ")?; }
                    item.fmt(f)?;
                }

                Ok(())
            }
            Value::Record(record) => {
                for (i, (key, value)) in record.iter().enumerate() {
                    if i != 0 { f.write_str("; ")?; }
                    write!(f, "{key}: {value}")?;
                }

                Ok(())
            }
        }
    }
}

macro_rules! impl_from_primitive {
    ($($T:ty),+ => $E:ident::$kind:ident) => {
        $(
            impl From<$T> for $E {
                fn from(value: $T) -> Self {
                    $E::$kind(value.into())
                }
            }
        )+
    };
}

macro_rules! impl_from_display {
    ($($T:ty),+) => {
        $(
            impl From<$T> for Value {
                fn from(value: $T) -> Self {
                    Value::Scalar(value.to_string().into())
                }
            }
        )+
    };
}

impl_from_primitive!(&str => Value::Scalar);
impl_from_primitive!(Cow<'_, str> => Value::Scalar);
impl_from_primitive!(String => Value::Scalar);
impl_from_primitive!(Arc<str> => Value::Scalar);
impl_from_primitive!(Arc<Vec<Value>> => Value::List);
impl_from_primitive!(Arc<Record> => Value::Record);
impl_from_primitive!(Record => Value::Record);
impl_from_display!(bool, char, f32, f64);
impl_from_display!(u8, u16, u32, u64, u128, usize);
impl_from_display!(i8, i16, i32, i64, i128, isize);

impl<T> From<Vec<T>> for Value where Value: From<T> {
    fn from(value: Vec<T>) -> Self {
        value.into_iter()
            .map(Value::from)
            .collect()
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        let vec = iter.into_iter().collect::<Vec<Value>>();
        Value::List(Arc::new(vec))
    }
}

impl<K: Into<Arc<str>>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }

        record
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a Arc<str>, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Arc<str>, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean, list, or table")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(v.into())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(v.into())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(v.into())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(v.into())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(v.into())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(v.into())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok("".into())
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok("".into())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Value, D::Error> {
        Value::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }

        Ok(Value::List(Arc::new(items)))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut record = Record::new();
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value::<Value>()?;
            if key == TOML_DATETIME_KEY && record.is_empty() {
                return Ok(value);
            }

            record.insert(key, value);
        }

        Ok(Value::Record(Arc::new(record)))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let kind = value.kind();
        value.into_record()
            .map(Arc::unwrap_or_clone)
            .map_err(|_| de::Error::custom(format_args!("expected a record, found a {kind}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record, list};

    #[test]
    fn json_coercion_and_order() {
        let value: Value = serde_json::from_str(r#"{
            "zeta": "last letter",
            "count": 3,
            "ratio": 2.5,
            "open": true,
            "missing": null,
            "tags": ["a", 1, ["b"]],
            "alpha": { "nested": "yes" }
        }"#).unwrap();

        let record = value.as_record().unwrap();
        let keys: Vec<&str> = record.keys().map(|k| &**k).collect();
        assert_eq!(keys, ["zeta", "count", "ratio", "open", "missing", "tags", "alpha"]);
        assert_eq!(record.text("count"), "3");
        assert_eq!(record.text("ratio"), "2.5");
        assert_eq!(record.text("open"), "true");
        assert!(record["missing"].is_empty());
        assert_eq!(record["tags"], list!["a", "1", list!["b"]]);
        assert_eq!(record["alpha"].as_record().unwrap().text("nested"), "yes");
    }

    #[test]
    fn debug_format() {
        let record = record! { "name" => "Pond", "plants" => list!["reed", record! { "kind" => "lily" }] };
        assert_eq!(format!("{record:?}"), r#"{"name": "Pond", "plants": ["reed", {"kind": "lily"}]}"#);
        assert_eq!(format!("{:?}", Value::from("x")), r#""x""#);
    }

    #[test]
    fn toml_datetimes_are_scalars() {
        let record: Record = toml::from_str("name = 'Seed Swap'\nwhen = 2030-01-01T10:00:00\n").unwrap();
        assert_eq!(record.text("when"), "2030-01-01T10:00:00");
    }

    #[test]
    fn emptiness() {
        assert!(Value::from("").is_empty());
        assert!(Value::from(Vec::<Value>::new()).is_empty());
        assert!(!Value::from(Record::new()).is_empty());
        assert!(!Value::from(" ").is_empty());
    }

    #[test]
    fn text_and_case_lookup() {
        let record = record! {
            "Category" => "Herbs",
            "colors" => list!["red", "white"],
            "care" => record! { "sun" => "full", "water" => "weekly" },
        };

        assert_eq!(record.get_ignore_case("category").unwrap().1, &Value::from("Herbs"));
        assert!(record.get_either_case("category").is_none());
        assert!(record.get_either_case("COLORS").is_some());
        assert_eq!(record["colors"].to_text(), "red, white");
        assert_eq!(record["care"].to_text(), "sun: full; water: weekly");
        assert_eq!(record["colors"].scalars().collect::<Vec<_>>(), ["red", "white"]);
        assert_eq!(record.text("care"), "");
    }
}
