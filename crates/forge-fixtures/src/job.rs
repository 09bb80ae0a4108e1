use crate::{
    AttrValue, AttributeResolver, Attributes, Built, FactoryConfig, FactoryError, TypeRegistry,
};
use serde_json::Value;
use std::cell::OnceCell;

#[derive(Debug)]
pub struct Job {
    target: String,
    overrides: Attributes,
    defaults: Attributes,
    attributes_only: bool,
    resolved: OnceCell<Attributes>,
    constructed: Option<Built>,
}

impl Job {
    pub fn new(target: impl Into<String>, overrides: Attributes) -> Self {
        Self {
            target: target.into(),
            overrides,
            defaults: Attributes::new(),
            attributes_only: false,
            resolved: OnceCell::new(),
            constructed: None,
        }
    }

    pub fn with_attributes_only(mut self, attributes_only: bool) -> Self {
        self.attributes_only = attributes_only;
        self
    }

    pub fn target_name(&self) -> &str {
        &self.target
    }

    pub fn overrides(&self) -> &Attributes {
        &self.overrides
    }

    pub fn defaults(&self) -> &Attributes {
        &self.defaults
    }

    pub fn is_attributes_only(&self) -> bool {
        self.attributes_only
    }

    pub fn resolved_attributes(&self) -> &Attributes {
        self.resolved
            .get_or_init(|| self.overrides.merged_over(&self.defaults))
    }

    pub fn set_defaults(&mut self, defaults: Attributes) {
        self.defaults = defaults;
        self.resolved = OnceCell::new();
    }

    pub fn target(
        &mut self,
        types: &TypeRegistry,
        config: &FactoryConfig,
    ) -> Result<&mut Built, FactoryError> {
        let built = self.take_target(types, config)?;
        Ok(self.constructed.insert(built))
    }

    pub fn execute(
        &mut self,
        types: &TypeRegistry,
        config: &FactoryConfig,
    ) -> Result<Built, FactoryError> {
        let mut target = self.take_target(types, config)?;
        AttributeResolver::new(config).apply(&mut target, self.resolved_attributes())?;
        Ok(target)
    }

    fn take_target(
        &mut self,
        types: &TypeRegistry,
        config: &FactoryConfig,
    ) -> Result<Built, FactoryError> {
        match self.constructed.take() {
            Some(built) => Ok(built),
            None => self.instantiate(types, config),
        }
    }

    fn instantiate(&self, types: &TypeRegistry, config: &FactoryConfig) -> Result<Built, FactoryError> {
        if self.attributes_only {
            return Ok(Built::Attributes(Attributes::new()));
        }

        let class_name = match self.resolved_attributes().get(&config.class_key) {
            Some(AttrValue::Class(class)) => return Ok(Built::Object(class.instantiate())),
            Some(AttrValue::Json(Value::String(name))) => name.as_str(),
            Some(other) => {
                return Err(FactoryError::InvalidClass {
                    key: config.class_key.clone(),
                    found: other.describe(),
                });
            }
            None => self.target.as_str(),
        };
        types.instantiate(class_name).map(Built::Object)
    }
}

#[derive(Debug, Default)]
pub struct JobPipeline {
    jobs: Vec<Job>,
}

impl JobPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, job: Job) {
        self.jobs.push(job);
    }

    pub fn pop(&mut self) -> Option<Job> {
        self.jobs.pop()
    }

    pub fn current(&self) -> Option<&Job> {
        self.jobs.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Job> {
        self.jobs.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
