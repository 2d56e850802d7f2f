//! Filter Parameters
//!
//! Ordered field filters that scope a collection query and feed the
//! collection cache key.

use serde_json::Value;

// == Filter Value ==
/// Value side of a single filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Equality test against one value
    Scalar(Value),
    /// Membership test against a set of values
    List(Vec<Value>),
}

impl FilterValue {
    // == Render ==
    /// Renders the value for use in a cache key.
    ///
    /// List members are joined with `-`.
    pub fn render(&self) -> String {
        match self {
            FilterValue::Scalar(v) => render_scalar(v),
            FilterValue::List(vs) => vs.iter().map(render_scalar).collect::<Vec<_>>().join("-"),
        }
    }

    /// Tests a record field against this filter.
    fn accepts(&self, field: &Value) -> bool {
        let field = render_scalar(field);
        match self {
            FilterValue::Scalar(v) => render_scalar(v) == field,
            FilterValue::List(vs) => vs.iter().any(|v| render_scalar(v) == field),
        }
    }
}

/// Renders a JSON scalar the way it appears in keys and comparisons.
///
/// Strings are unquoted, null is empty, anything else uses its JSON text.
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// == Filters ==
/// Insertion-ordered field filters.
///
/// Order matters: it determines the parameter segment of the collection
/// key, so the same logical filter built in a different order is a
/// different cache entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    fields: Vec<(String, FilterValue)>,
}

impl Filters {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter.
    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .push((field.into(), FilterValue::Scalar(value.into())));
        self
    }

    /// Adds a membership filter.
    pub fn any_of<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.fields.push((field.into(), FilterValue::List(values)));
        self
    }

    /// Appends a prepared filter.
    pub fn push(&mut self, field: impl Into<String>, value: FilterValue) {
        self.fields.push((field.into(), value));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // == Parameter String ==
    /// Builds the `{field}_{value}` segments joined with `_`.
    pub fn param_string(&self) -> String {
        self.fields
            .iter()
            .map(|(field, value)| format!("{}_{}", field, value.render()))
            .collect::<Vec<_>>()
            .join("_")
    }

    // == Matches ==
    /// Returns true if a record, given as a JSON object, passes every filter.
    ///
    /// A filter on a field the record does not have never matches.
    pub fn matches(&self, record: &Value) -> bool {
        self.fields.iter().all(|(field, filter)| {
            record
                .get(field)
                .map(|value| filter.accepts(value))
                .unwrap_or(false)
        })
    }
}

impl<K, V> FromIterator<(K, V)> for Filters
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => FilterValue::List(items),
            other => FilterValue::Scalar(other),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Scalar(Value::from(value))
    }
}
