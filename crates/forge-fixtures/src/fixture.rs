use crate::attributes::short_type_name;
use crate::{AttrValue, Attributes, FactoryError};
use serde_json::Value;
use std::any::Any;
use std::fmt;

pub trait FixtureBase: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_box(&self) -> Box<dyn Fixture>;
    fn short_type_name(&self) -> &'static str;
}

impl<T> FixtureBase for T
where
    T: Fixture + Clone,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_box(&self) -> Box<dyn Fixture> {
        Box::new(self.clone())
    }

    fn short_type_name(&self) -> &'static str {
        short_type_name::<T>()
    }
}

pub trait Fixture: FixtureBase + fmt::Debug {
    /// Assigns one attribute. `Ok(false)` means the object has no such
    /// settable attribute, which the factory treats as a silent skip.
    fn set_attribute(&mut self, name: &str, value: &AttrValue) -> Result<bool, FactoryError>;

    fn attribute(&self, name: &str) -> Option<AttrValue>;

    fn attribute_names(&self) -> &'static [&'static str];

    fn save(&mut self) -> bool;

    fn is_valid(&self) -> bool {
        true
    }

    fn errors(&self) -> Value {
        Value::Null
    }

    fn type_name(&self) -> &str {
        self.short_type_name()
    }

    fn to_attributes(&self) -> Attributes {
        self.attribute_names()
            .iter()
            .filter_map(|name| self.attribute(name).map(|value| (*name, value)))
            .collect()
    }
}

impl dyn Fixture {
    pub fn downcast_ref<T: Fixture>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Fixture>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl Clone for Box<dyn Fixture> {
    fn clone(&self) -> Self {
        (**self).clone_box()
    }
}

#[derive(Clone, Debug)]
pub enum Built {
    Object(Box<dyn Fixture>),
    Attributes(Attributes),
    Collection(Vec<Built>),
}

impl Built {
    pub fn object(fixture: impl Fixture) -> Self {
        Self::Object(Box::new(fixture))
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Self::Object(_) => "a fixture",
            Self::Attributes(_) => "an attribute map",
            Self::Collection(_) => "a collection",
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Object(fixture) => fixture.type_name(),
            Self::Attributes(_) => "Attributes",
            Self::Collection(_) => "Collection",
        }
    }

    pub fn attribute(&self, name: &str) -> Option<AttrValue> {
        match self {
            Self::Object(fixture) => fixture.attribute(name),
            Self::Attributes(attrs) => attrs.get(name).cloned(),
            Self::Collection(_) => None,
        }
    }

    pub fn set_attribute(&mut self, name: &str, value: &AttrValue) -> Result<bool, FactoryError> {
        match self {
            Self::Object(fixture) => fixture.set_attribute(name, value),
            Self::Attributes(attrs) => {
                attrs.insert(name, value.clone());
                Ok(true)
            }
            Self::Collection(_) => Ok(false),
        }
    }

    pub fn downcast_ref<T: Fixture>(&self) -> Option<&T> {
        match self {
            Self::Object(fixture) => fixture.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn downcast_mut<T: Fixture>(&mut self) -> Option<&mut T> {
        match self {
            Self::Object(fixture) => fixture.downcast_mut::<T>(),
            _ => None,
        }
    }

    pub fn into_fixture<T: Fixture>(self) -> Option<T> {
        match self {
            Self::Object(fixture) => fixture.into_any().downcast::<T>().ok().map(|boxed| *boxed),
            _ => None,
        }
    }

    pub fn as_attributes(&self) -> Option<&Attributes> {
        match self {
            Self::Attributes(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn into_attributes(self) -> Option<Attributes> {
        match self {
            Self::Attributes(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[Built]> {
        match self {
            Self::Collection(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_attribute_map(self) -> Self {
        match self {
            Self::Object(fixture) => Self::Attributes(fixture.to_attributes()),
            Self::Attributes(attrs) => Self::Attributes(attrs),
            Self::Collection(items) => {
                Self::Collection(items.into_iter().map(Self::into_attribute_map).collect())
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Object(fixture) => fixture.to_attributes().to_json(),
            Self::Attributes(attrs) => attrs.to_json(),
            Self::Collection(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl From<Attributes> for Built {
    fn from(attrs: Attributes) -> Self {
        Self::Attributes(attrs)
    }
}

impl From<Vec<Built>> for Built {
    fn from(items: Vec<Built>) -> Self {
        Self::Collection(items)
    }
}
