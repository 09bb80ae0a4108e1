use crate::{AttrValue, Attributes, Built, FactoryError, Registry, TraitHandler};
use serde_json::Value;
use tracing::debug;

pub fn trait_handler_name(trait_name: &str, recipe: &str) -> String {
    format!("apply_trait_{trait_name}_to_{recipe}")
}

pub fn requested_traits(overrides: &Attributes, traits_key: &str) -> Result<Vec<String>, FactoryError> {
    let Some(value) = overrides.get(traits_key) else {
        return Ok(Vec::new());
    };

    match value {
        AttrValue::Json(Value::Null) => Ok(Vec::new()),
        AttrValue::Json(Value::String(name)) => Ok(vec![name.clone()]),
        AttrValue::Json(Value::Array(names)) => names
            .iter()
            .map(|name| {
                name.as_str().map(str::to_string).ok_or_else(|| {
                    FactoryError::attribute(traits_key, format!("trait name {name} is not a string"))
                })
            })
            .collect(),
        other => Err(FactoryError::attribute(
            traits_key,
            format!("expected a trait name or list of names, found {}", other.describe()),
        )),
    }
}

pub struct TraitApplier<'a> {
    registry: &'a Registry,
}

impl<'a> TraitApplier<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Applies traits in order. Every handler is looked up before any runs,
    /// so a missing trait leaves the object untouched.
    pub fn apply(
        &self,
        recipe: &str,
        traits: &[String],
        built: &mut Built,
    ) -> Result<(), FactoryError> {
        let handlers = traits
            .iter()
            .map(|trait_name| {
                self.registry
                    .trait_handler(trait_name, recipe)
                    .map(|handler| (trait_name, handler))
                    .ok_or_else(|| FactoryError::InvalidTrait {
                        trait_name: trait_name.clone(),
                        handler: trait_handler_name(trait_name, recipe),
                    })
            })
            .collect::<Result<Vec<(&String, TraitHandler)>, FactoryError>>()?;

        for (trait_name, handler) in handlers {
            debug!(recipe, trait_name = %trait_name, "applying trait");
            handler(built)?;
        }
        Ok(())
    }
}
