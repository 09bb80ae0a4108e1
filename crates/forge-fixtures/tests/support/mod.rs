#![allow(dead_code)]

use forge_fixtures::{
    AttrValue, Attributes, Built, Factory, FactoryError, Fixture, Lifecycle, Registry,
};
use serde_json::{Value, json};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Address {
    pub address: Option<String>,
    pub city: Option<String>,
    pub valid: bool,
    pub saved: bool,
    pub history: Vec<String>,
}

impl Fixture for Address {
    fn set_attribute(&mut self, name: &str, value: &AttrValue) -> Result<bool, FactoryError> {
        match name {
            "address" => self.address = value.decode(name)?,
            "city" => self.city = value.decode(name)?,
            "valid" => self.valid = value.decode(name)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn attribute(&self, name: &str) -> Option<AttrValue> {
        match name {
            "address" => self.address.clone().map(AttrValue::from),
            "city" => self.city.clone().map(AttrValue::from),
            "valid" => Some(self.valid.into()),
            _ => None,
        }
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["address", "city", "valid"]
    }

    fn save(&mut self) -> bool {
        if !self.valid {
            return false;
        }
        self.saved = true;
        true
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn errors(&self) -> Value {
        json!("some validation errors")
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct User {
    pub name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub unique: Option<String>,
    pub argument_received: Option<bool>,
    pub address: Option<Address>,
    pub valid: bool,
    pub saved: bool,
}

impl Fixture for User {
    fn set_attribute(&mut self, name: &str, value: &AttrValue) -> Result<bool, FactoryError> {
        match name {
            "name" => self.name = value.decode(name)?,
            "role" => self.role = value.decode(name)?,
            "email" => self.email = value.decode(name)?,
            "unique" => self.unique = value.decode(name)?,
            "argument_received" => self.argument_received = value.decode(name)?,
            "address" => self.address = value.downcast::<Address>(),
            "valid" => self.valid = value.decode(name)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn attribute(&self, name: &str) -> Option<AttrValue> {
        match name {
            "name" => self.name.clone().map(AttrValue::from),
            "role" => self.role.clone().map(AttrValue::from),
            "email" => self.email.clone().map(AttrValue::from),
            "unique" => self.unique.clone().map(AttrValue::from),
            "argument_received" => self.argument_received.map(AttrValue::from),
            "address" => self.address.clone().map(AttrValue::object),
            "valid" => Some(self.valid.into()),
            _ => None,
        }
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &[
            "name",
            "role",
            "email",
            "unique",
            "argument_received",
            "address",
            "valid",
        ]
    }

    fn save(&mut self) -> bool {
        if !self.valid {
            return false;
        }
        self.saved = true;
        true
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn errors(&self) -> Value {
        json!("some validation errors")
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InvalidUser {
    pub required_attr: Option<String>,
    pub saved: bool,
}

impl Fixture for InvalidUser {
    fn set_attribute(&mut self, name: &str, value: &AttrValue) -> Result<bool, FactoryError> {
        match name {
            "required_attr" => self.required_attr = value.decode(name)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn attribute(&self, name: &str) -> Option<AttrValue> {
        match name {
            "required_attr" => self.required_attr.clone().map(AttrValue::from),
            _ => None,
        }
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["required_attr"]
    }

    fn save(&mut self) -> bool {
        if !self.is_valid() {
            return false;
        }
        self.saved = true;
        true
    }

    fn is_valid(&self) -> bool {
        self.required_attr.is_some()
    }

    fn errors(&self) -> Value {
        if self.is_valid() {
            json!({})
        } else {
            json!({"required_attr": ["can't be blank"]})
        }
    }
}

fn user_manually(factory: &mut Factory) -> Result<Built, FactoryError> {
    let role = factory
        .option("role")
        .and_then(AttrValue::as_str)
        .unwrap_or("user")
        .to_string();
    let unique = format!("value{}", factory.n());
    let address = factory
        .build("address", Attributes::new())?
        .into_fixture::<Address>();

    Ok(Built::object(User {
        name: Some("Fred".to_string()),
        role: Some(role),
        email: Some("fred@home.com".to_string()),
        unique: Some(unique),
        address,
        valid: true,
        ..User::default()
    }))
}

fn user_by_define(factory: &mut Factory) -> Result<Built, FactoryError> {
    let unique = format!("value{}", factory.n());
    let address = factory.create("address", Attributes::new())?;
    let mut user = factory.define(
        Attributes::new()
            .with("class", "user")
            .with("name", "Fred")
            .with("role", "user")
            .with("unique", unique)
            .with("email", "fred@home.com")
            .with("address", address)
            .with("valid", true),
    )?;
    if factory.option("argument_supplied").is_some() {
        user.set_attribute("argument_received", &true.into())?;
    }
    Ok(user)
}

fn set_role(built: &mut Built, role: &str) -> Result<(), FactoryError> {
    built
        .downcast_mut::<User>()
        .map(|user| user.role = Some(role.to_string()))
        .ok_or_else(|| FactoryError::recipe("trait expects a User"))
}

/// Recipes shaped after a typical application test suite.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_type::<User>();
    registry.register_type::<Address>();
    registry.register_type::<InvalidUser>();

    registry.register_recipe("user_manually", user_manually);
    registry.register_recipe("user_by_define", user_by_define);
    registry.register_recipe("user", user_by_define);
    registry.register_recipe("admin_manually", |factory| {
        factory.inherit("user_manually", Attributes::new().with("role", "admin"))
    });
    registry.register_recipe("admin_by_define", |factory| {
        factory.inherit("user_by_define", Attributes::new().with("role", "admin"))
    });
    registry.register_recipe("address", |factory| {
        factory.define(
            Attributes::new()
                .with("address", "25 Wisteria Lane")
                .with("city", "New York")
                .with("valid", true),
        )
    });
    registry.register_recipe("user_hash", |_| {
        Ok(Built::Attributes(
            Attributes::new().with("name", "Fred").with("role", "user"),
        ))
    });
    registry.register_recipe("invalid_user", |factory| {
        factory.define(Attributes::new().with("required_attr", AttrValue::Skip))
    });
    registry.register_recipe("users", |factory| {
        let users = (0..3)
            .map(|_| factory.build("user", Attributes::new()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Built::Collection(users))
    });

    registry.register_trait("manager", "user_manually", |built| set_role(built, "manager"));
    registry.register_trait("invalid", "user", |built| {
        built.set_attribute("valid", &false.into()).map(|_| ())
    });

    for lifecycle in Lifecycle::ALL {
        registry.register_callback(lifecycle, "address", move |built| {
            if let Some(address) = built.downcast_mut::<Address>() {
                address.history.push(lifecycle.prefix().to_string());
            }
            Ok(())
        });
    }
    registry
        .register_named_callback("after_create_not_existing_factory", |_| Ok(()))
        .expect("callback name should parse");

    registry
}

pub fn factory() -> Factory {
    Factory::new(registry())
}

pub fn user(built: &Built) -> &User {
    built.downcast_ref::<User>().expect("a User fixture")
}
