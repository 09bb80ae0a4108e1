use crate::{AttrValue, Attributes, Built, FactoryConfig, FactoryError};
use tracing::trace;

pub struct AttributeResolver<'a> {
    config: &'a FactoryConfig,
}

impl<'a> AttributeResolver<'a> {
    pub fn new(config: &'a FactoryConfig) -> Self {
        Self { config }
    }

    pub fn apply(&self, target: &mut Built, attributes: &Attributes) -> Result<(), FactoryError> {
        for (name, value) in attributes.iter() {
            if self.config.is_reserved_key(name) || value.is_skip() || value.is_deferred() {
                continue;
            }
            assign(target, name, value)?;
        }

        for (name, value) in attributes.iter() {
            if self.config.is_reserved_key(name) {
                continue;
            }
            let AttrValue::Deferred(deferred) = value else {
                continue;
            };
            let resolved = deferred.resolve(target)?;
            if resolved.is_skip() {
                trace!(attribute = name, "deferred attribute resolved to skip");
                continue;
            }
            assign(target, name, &resolved)?;
        }

        Ok(())
    }
}

fn assign(target: &mut Built, name: &str, value: &AttrValue) -> Result<(), FactoryError> {
    if target.set_attribute(name, value)? {
        trace!(attribute = name, fixture = target.type_name(), "attribute assigned");
    } else {
        trace!(
            attribute = name,
            fixture = target.type_name(),
            "attribute not applicable to target"
        );
    }
    Ok(())
}
