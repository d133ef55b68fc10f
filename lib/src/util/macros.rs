/// Builds a [`Record`](crate::value::Record), preserving field order.
///
/// ```rust
/// use trellis::{record, list};
///
/// let garden = record! {
///     "name" => "Pollinator Patch",
///     "plants" => list!["milkweed", "aster"],
///     "care" => record! { "water" => "weekly" },
/// };
///
/// let fields: Vec<_> = garden.keys().map(|k| &**k).collect();
/// assert_eq!(fields, ["name", "plants", "care"]);
/// ```
#[macro_export]
macro_rules! record {
    ($($key:expr => $value:expr),* $(,)?) => ({
        #[allow(unused_mut)]
        let mut record = $crate::value::Record::new();
        $(record.insert($key, $value);)*
        record
    });
}

/// Builds a [`Value::List`](crate::value::Value::List) from its elements.
#[macro_export]
macro_rules! list {
    ($($value:expr),* $(,)?) => ({
        let items: Vec<$crate::value::Value> = vec![$($crate::value::Value::from($value)),*];
        $crate::value::Value::from(items)
    });
}

pub use {record, list};
