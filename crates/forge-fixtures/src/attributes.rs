use crate::{Built, FactoryError, Fixture};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub type DeferredFn = dyn Fn(&Built) -> Result<AttrValue, FactoryError>;
pub type Constructor = dyn Fn() -> Box<dyn Fixture>;

#[derive(Clone)]
pub struct Deferred(Rc<DeferredFn>);

impl Deferred {
    pub fn resolve(&self, target: &Built) -> Result<AttrValue, FactoryError> {
        (self.0)(target)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

#[derive(Clone)]
pub struct ClassRef {
    name: String,
    constructor: Rc<Constructor>,
}

impl ClassRef {
    pub fn new(name: impl Into<String>, constructor: impl Fn() -> Box<dyn Fixture> + 'static) -> Self {
        Self {
            name: name.into(),
            constructor: Rc::new(constructor),
        }
    }

    pub fn of<T>() -> Self
    where
        T: Fixture + Default + Clone,
    {
        Self::new(short_type_name::<T>(), || {
            Box::new(T::default()) as Box<dyn Fixture>
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instantiate(&self) -> Box<dyn Fixture> {
        (self.constructor)()
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassRef").field(&self.name).finish()
    }
}

#[derive(Clone, Debug)]
pub enum AttrValue {
    Json(Value),
    Fixture(Box<dyn Fixture>),
    Class(ClassRef),
    /// Never assigned; used to drop a recipe default for one call.
    Skip,
    Deferred(Deferred),
}

impl AttrValue {
    pub fn object(fixture: impl Fixture) -> Self {
        Self::Fixture(Box::new(fixture))
    }

    pub fn class<T>() -> Self
    where
        T: Fixture + Default + Clone,
    {
        Self::Class(ClassRef::of::<T>())
    }

    pub fn deferred<F, V>(compute: F) -> Self
    where
        F: Fn(&Built) -> V + 'static,
        V: Into<AttrValue>,
    {
        Self::Deferred(Deferred(Rc::new(move |target: &Built| {
            Ok(compute(target).into())
        })))
    }

    pub fn try_deferred<F, V>(compute: F) -> Self
    where
        F: Fn(&Built) -> Result<V, FactoryError> + 'static,
        V: Into<AttrValue>,
    {
        Self::Deferred(Deferred(Rc::new(move |target: &Built| {
            compute(target).map(Into::into)
        })))
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_json().and_then(Value::as_i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_json().and_then(Value::as_bool)
    }

    pub fn decode<T: DeserializeOwned>(&self, name: &str) -> Result<T, FactoryError> {
        match self {
            Self::Json(value) => serde_json::from_value(value.clone())
                .map_err(|error| FactoryError::attribute(name, error.to_string())),
            other => Err(FactoryError::attribute(
                name,
                format!("expected a plain value, found {}", other.describe()),
            )),
        }
    }

    pub fn downcast<T: Fixture + Clone>(&self) -> Option<T> {
        match self {
            Self::Fixture(fixture) => fixture.downcast_ref::<T>().cloned(),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Json(value) => value.to_string(),
            Self::Fixture(fixture) => format!("fixture {}", fixture.type_name()),
            Self::Class(class) => format!("class {}", class.name()),
            Self::Skip => "skip".to_string(),
            Self::Deferred(_) => "deferred computation".to_string(),
        }
    }

    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value.clone()),
            Self::Fixture(fixture) => Some(fixture.to_attributes().to_json()),
            Self::Class(class) => Some(Value::String(class.name().to_string())),
            Self::Skip | Self::Deferred(_) => None,
        }
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Json(Value::String(value.to_string()))
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Json(Value::String(value))
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Json(Value::Bool(value))
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<u64> for AttrValue {
    fn from(value: u64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<ClassRef> for AttrValue {
    fn from(value: ClassRef) -> Self {
        Self::Class(value)
    }
}

impl From<Built> for AttrValue {
    fn from(value: Built) -> Self {
        match value {
            Built::Object(fixture) => Self::Fixture(fixture),
            other => Self::Json(other.to_json()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Attributes {
    values: BTreeMap<String, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttrValue::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(AttrValue::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(AttrValue::as_bool)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn overlay(&mut self, other: &Attributes) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn merged_over(&self, defaults: &Attributes) -> Attributes {
        let mut merged = defaults.clone();
        merged.overlay(self);
        merged
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .filter_map(|(key, value)| value.to_json().map(|json| (key.clone(), json)))
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
