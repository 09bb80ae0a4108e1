use crate::hooks::{Lifecycle, run_callback};
use crate::{
    AttrValue, Attributes, Built, Diagnostic, FactoryConfig, FactoryError, InvalidFactoryError,
    Job, JobPipeline, LintOptions, Registry, TraitApplier, lint_or_raise, render_errors,
    requested_traits,
};
use std::ops::{Deref, DerefMut};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SaveMode {
    Lenient,
    Strict,
}

#[derive(Debug)]
pub struct Factory {
    registry: Registry,
    config: FactoryConfig,
    pipeline: JobPipeline,
    sequence: u64,
}

impl Factory {
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, FactoryConfig::default())
    }

    pub fn with_config(registry: Registry, config: FactoryConfig) -> Self {
        Self {
            registry,
            config,
            pipeline: JobPipeline::new(),
            sequence: 0,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    pub fn depth(&self) -> usize {
        self.pipeline.depth()
    }

    pub fn build(&mut self, name: &str, overrides: Attributes) -> Result<Built, FactoryError> {
        self.crank(name, overrides, false)
    }

    pub fn create(&mut self, name: &str, overrides: Attributes) -> Result<Built, FactoryError> {
        let mut built = self.build(name, overrides)?;
        self.persist(name, &mut built, SaveMode::Lenient)?;
        Ok(built)
    }

    pub fn create_strict(
        &mut self,
        name: &str,
        overrides: Attributes,
    ) -> Result<Built, FactoryError> {
        let mut built = self.build(name, overrides)?;
        self.persist(name, &mut built, SaveMode::Strict)?;
        Ok(built)
    }

    pub fn attributes_for(
        &mut self,
        name: &str,
        overrides: Attributes,
    ) -> Result<Attributes, FactoryError> {
        match self.crank(name, overrides, true)? {
            Built::Attributes(attrs) => Ok(attrs),
            other => Err(FactoryError::Unsupported {
                operation: "return attributes for",
                shape: other.shape(),
            }),
        }
    }

    pub fn debug(&mut self, name: &str, overrides: Attributes) -> Result<Built, FactoryError> {
        let built = self.build(name, overrides)?;
        ensure_valid(&built)?;
        Ok(built)
    }

    pub fn debug_create(
        &mut self,
        name: &str,
        overrides: Attributes,
    ) -> Result<Built, FactoryError> {
        let mut built = self.debug(name, overrides)?;
        self.persist(name, &mut built, SaveMode::Lenient)?;
        Ok(built)
    }

    pub fn reset(&mut self) -> Result<(), FactoryError> {
        if !self.pipeline.is_empty() {
            return Err(FactoryError::Busy {
                depth: self.pipeline.depth(),
            });
        }
        self.pipeline = JobPipeline::new();
        self.sequence = 0;
        Ok(())
    }

    pub fn factory_names(&self) -> Vec<String> {
        self.registry.recipe_names()
    }

    pub fn traits_for(&self, recipe: &str) -> Vec<String> {
        self.registry.traits_for(recipe)
    }

    pub fn lint(&mut self, options: &LintOptions) -> Result<Vec<Diagnostic>, InvalidFactoryError> {
        lint_or_raise(self, options, &[])
    }

    pub fn n(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub fn options(&self) -> Result<&Attributes, FactoryError> {
        self.pipeline
            .current()
            .map(Job::overrides)
            .ok_or(FactoryError::NoActiveJob)
    }

    pub fn option(&self, key: &str) -> Option<&AttrValue> {
        self.pipeline
            .current()
            .and_then(|job| job.overrides().get(key))
    }

    pub fn define(&mut self, defaults: Attributes) -> Result<Built, FactoryError> {
        let Self {
            registry,
            config,
            pipeline,
            ..
        } = self;
        let job = pipeline.current_mut().ok_or(FactoryError::NoActiveJob)?;
        job.set_defaults(defaults);
        job.execute(registry.types(), config)
    }

    /// Instantiated on first access; a later `define` populates the same object.
    pub fn target(&mut self) -> Result<&mut Built, FactoryError> {
        let Self {
            registry,
            config,
            pipeline,
            ..
        } = self;
        let job = pipeline.current_mut().ok_or(FactoryError::NoActiveJob)?;
        job.target(registry.types(), config)
    }

    /// Builds another recipe on behalf of the running one. The running
    /// recipe's overrides are laid over `overrides`, so the outermost caller
    /// always has the last word; attribute-map mode propagates downward.
    pub fn inherit(&mut self, name: &str, overrides: Attributes) -> Result<Built, FactoryError> {
        let job = self.pipeline.current().ok_or(FactoryError::NoActiveJob)?;
        let mut merged = overrides;
        for (key, value) in job.overrides().iter() {
            if key != self.config.traits_key {
                merged.insert(key, value.clone());
            }
        }
        let attributes_only = job.is_attributes_only();
        self.crank(name, merged, attributes_only)
    }

    fn crank(
        &mut self,
        name: &str,
        overrides: Attributes,
        attributes_only: bool,
    ) -> Result<Built, FactoryError> {
        let (recipe_name, attributes_only) = self.resolve_name(name, attributes_only);
        let recipe = self
            .registry
            .recipe(&recipe_name)
            .ok_or_else(|| FactoryError::UnknownRecipe {
                name: recipe_name.clone(),
            })?;
        let traits = requested_traits(&overrides, &self.config.traits_key)?;

        let job = Job::new(recipe_name.as_str(), overrides).with_attributes_only(attributes_only);
        let built = {
            let mut scope = JobScope::enter(self, job);
            let mut built = recipe(&mut *scope)?;
            TraitApplier::new(&scope.registry).apply(&recipe_name, &traits, &mut built)?;
            run_callback(&scope.registry, Lifecycle::AfterBuild, &recipe_name, &mut built)?;
            // Traits and callbacks see the object a manual recipe constructed.
            if attributes_only {
                built = built.into_attribute_map();
            }
            built
        };

        if self.config.debug && !attributes_only {
            ensure_valid(&built)?;
        }
        Ok(built)
    }

    fn resolve_name(&self, name: &str, attributes_only: bool) -> (String, bool) {
        if self.registry.contains_recipe(name) {
            return (name.to_string(), attributes_only);
        }
        match name.strip_suffix(self.config.attrs_suffix.as_str()) {
            Some(stripped) if !stripped.is_empty() => (stripped.to_string(), true),
            _ => (name.to_string(), attributes_only),
        }
    }

    fn persist(&mut self, name: &str, built: &mut Built, mode: SaveMode) -> Result<(), FactoryError> {
        let (recipe_name, _) = self.resolve_name(name, false);
        run_callback(&self.registry, Lifecycle::BeforeCreate, &recipe_name, built)?;
        save(built, mode)?;
        run_callback(&self.registry, Lifecycle::AfterCreate, &recipe_name, built)
    }
}

fn save(built: &mut Built, mode: SaveMode) -> Result<(), FactoryError> {
    match built {
        Built::Object(fixture) => {
            if !fixture.save() && mode == SaveMode::Strict {
                return Err(FactoryError::Validation {
                    type_name: fixture.type_name().to_string(),
                    errors: render_errors(&fixture.errors()),
                });
            }
            Ok(())
        }
        Built::Collection(items) => items.iter_mut().try_for_each(|item| save(item, mode)),
        Built::Attributes(_) => Err(FactoryError::Unsupported {
            operation: "save",
            shape: "an attribute map",
        }),
    }
}

fn ensure_valid(built: &Built) -> Result<(), FactoryError> {
    match built {
        Built::Object(fixture) if fixture.is_valid() => Ok(()),
        Built::Object(fixture) => Err(FactoryError::Invalid {
            type_name: fixture.type_name().to_string(),
            errors: render_errors(&fixture.errors()),
        }),
        Built::Collection(items) => items.iter().try_for_each(ensure_valid),
        Built::Attributes(_) => Err(FactoryError::Unsupported {
            operation: "validate",
            shape: "an attribute map",
        }),
    }
}

/// Keeps one job on the pipeline for as long as it lives; the job is popped
/// on drop, so early returns and unwinding leave the pipeline balanced.
struct JobScope<'a> {
    factory: &'a mut Factory,
}

impl<'a> JobScope<'a> {
    fn enter(factory: &'a mut Factory, job: Job) -> Self {
        debug!(
            recipe = job.target_name(),
            depth = factory.pipeline.depth() + 1,
            attributes_only = job.is_attributes_only(),
            "job started"
        );
        factory.pipeline.push(job);
        Self { factory }
    }
}

impl Deref for JobScope<'_> {
    type Target = Factory;

    fn deref(&self) -> &Factory {
        self.factory
    }
}

impl DerefMut for JobScope<'_> {
    fn deref_mut(&mut self) -> &mut Factory {
        self.factory
    }
}

impl Drop for JobScope<'_> {
    fn drop(&mut self) {
        if let Some(job) = self.factory.pipeline.pop() {
            debug!(
                recipe = job.target_name(),
                depth = self.factory.pipeline.depth(),
                "job finished"
            );
        }
    }
}
