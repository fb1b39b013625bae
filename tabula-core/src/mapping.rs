use crate::{Entity, IDENTITY_COLUMN, Value};
use std::{
    borrow::Cow,
    fmt::{self, Display},
    mem,
};

/// Association from column name to the value bound for it.
///
/// Keys are unique: inserting an existing key replaces its value. Entries are kept
/// in insertion order (field declaration order when built by [`to_mapping`]), but
/// every consumer that renders SQL must go through [`ColumnMapping::sorted_keys`] or
/// [`ColumnMapping::sorted_entries`], so that the column text and the bound
/// parameters always follow the same lexicographic order.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    columns: Vec<(Cow<'static, str>, Value)>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
        }
    }

    /// Sets `name` to `value`, returning the previous value if the column was present.
    pub fn insert(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        if let Some((_, current)) = self.columns.iter_mut().find(|(k, _)| *k == name) {
            return Some(mem::replace(current, value));
        }
        self.columns.push((name, value));
        None
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(k, _)| &**k == name)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.columns.iter().position(|(k, _)| &**k == name)?;
        Some(self.columns.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The same mapping without the `id` column, as required by insert and update.
    pub fn without_identity(mut self) -> Self {
        self.remove(IDENTITY_COLUMN);
        self
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| &**k)
    }

    /// Keys in ascending lexicographic (byte) order.
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        keys
    }

    /// Key and value pairs in the order of [`ColumnMapping::sorted_keys`].
    pub fn sorted_entries(&self) -> Vec<(&str, &Value)> {
        let mut entries: Vec<(&str, &Value)> =
            self.columns.iter().map(|(k, v)| (&**k, v)).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl<K, V> FromIterator<(K, V)> for ColumnMapping
where
    K: Into<Cow<'static, str>>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut result = ColumnMapping::new();
        for (k, v) in iter {
            result.insert(k, v);
        }
        result
    }
}

impl Display for ColumnMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.sorted_entries().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        f.write_str("}")
    }
}

/// Reads every annotated field of `entity` into a fresh mapping.
pub fn to_mapping<E: Entity>(entity: &E) -> ColumnMapping {
    let columns = E::columns();
    let mut mapping = ColumnMapping::with_capacity(columns.len());
    for column in columns {
        mapping.insert(column.name, column.read(entity));
    }
    mapping
}

/// Builds a [`ColumnMapping`] from `column => value` pairs.
///
/// ```rust
/// let filter = tabula_core::mapping! { "name" => "Ann", "age" => 30 };
/// assert_eq!(filter.sorted_keys(), ["age", "name"]);
/// ```
#[macro_export]
macro_rules! mapping {
    () => {
        $crate::ColumnMapping::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut mapping = $crate::ColumnMapping::new();
        $(mapping.insert($name, $value);)+
        mapping
    }};
}
