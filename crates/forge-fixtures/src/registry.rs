use crate::hooks::{Callback, Lifecycle};
use crate::traits::trait_handler_name;
use crate::{Built, ClassRef, Factory, FactoryError, Fixture};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub type Recipe = Rc<dyn Fn(&mut Factory) -> Result<Built, FactoryError>>;
pub type TraitHandler = Rc<dyn Fn(&mut Built) -> Result<(), FactoryError>>;

#[derive(Clone, Default)]
pub struct TypeRegistry {
    classes: BTreeMap<String, ClassRef>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self) -> Option<ClassRef>
    where
        T: Fixture + Default + Clone,
    {
        let class = ClassRef::of::<T>();
        self.classes.insert(class.name().to_string(), class)
    }

    pub fn register_with(
        &mut self,
        name: impl Into<String>,
        constructor: impl Fn() -> Box<dyn Fixture> + 'static,
    ) -> Option<ClassRef> {
        let class = ClassRef::new(camelize(&name.into()), constructor);
        self.classes.insert(class.name().to_string(), class)
    }

    pub fn resolve(&self, name: &str) -> Result<&ClassRef, FactoryError> {
        let class_name = camelize(name);
        self.classes
            .get(&class_name)
            .ok_or(FactoryError::UnknownClass { name: class_name })
    }

    pub fn instantiate(&self, name: &str) -> Result<Box<dyn Fixture>, FactoryError> {
        self.resolve(name).map(ClassRef::instantiate)
    }

    pub fn names(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }
}

/// `user_by_define` -> `UserByDefine`; already capitalized names pass through.
pub fn camelize(name: &str) -> String {
    name.split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[derive(Clone, Default)]
pub struct Registry {
    recipes: BTreeMap<String, Recipe>,
    traits: BTreeMap<(String, String), TraitHandler>,
    callbacks: BTreeMap<(Lifecycle, String), Callback>,
    types: TypeRegistry,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_recipe<F>(&mut self, name: impl Into<String>, recipe: F) -> Option<Recipe>
    where
        F: Fn(&mut Factory) -> Result<Built, FactoryError> + 'static,
    {
        self.recipes.insert(name.into(), Rc::new(recipe))
    }

    pub fn register_trait<F>(
        &mut self,
        trait_name: impl Into<String>,
        recipe: impl Into<String>,
        handler: F,
    ) -> Option<TraitHandler>
    where
        F: Fn(&mut Built) -> Result<(), FactoryError> + 'static,
    {
        self.traits
            .insert((recipe.into(), trait_name.into()), Rc::new(handler))
    }

    pub fn register_callback<F>(
        &mut self,
        lifecycle: Lifecycle,
        recipe: impl Into<String>,
        callback: F,
    ) -> Option<Callback>
    where
        F: Fn(&mut Built) -> Result<(), FactoryError> + 'static,
    {
        self.callbacks
            .insert((lifecycle, recipe.into()), Rc::new(callback))
    }

    pub fn register_named_callback<F>(&mut self, name: &str, callback: F) -> Result<(), FactoryError>
    where
        F: Fn(&mut Built) -> Result<(), FactoryError> + 'static,
    {
        let (lifecycle, recipe) = Lifecycle::parse_callback_name(name).ok_or_else(|| {
            FactoryError::recipe(format!("'{name}' is not a lifecycle callback name"))
        })?;
        self.register_callback(lifecycle, recipe, callback);
        Ok(())
    }

    pub fn register_type<T>(&mut self) -> Option<ClassRef>
    where
        T: Fixture + Default + Clone,
    {
        self.types.register::<T>()
    }

    pub fn register_type_with(
        &mut self,
        name: impl Into<String>,
        constructor: impl Fn() -> Box<dyn Fixture> + 'static,
    ) -> Option<ClassRef> {
        self.types.register_with(name, constructor)
    }

    pub fn recipe(&self, name: &str) -> Option<Recipe> {
        self.recipes.get(name).cloned()
    }

    pub fn contains_recipe(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    pub fn recipe_names(&self) -> Vec<String> {
        self.recipes.keys().cloned().collect()
    }

    pub fn trait_handler(&self, trait_name: &str, recipe: &str) -> Option<TraitHandler> {
        self.traits
            .get(&(recipe.to_string(), trait_name.to_string()))
            .cloned()
    }

    pub fn traits_for(&self, recipe: &str) -> Vec<String> {
        self.traits
            .keys()
            .filter(|(owner, _)| owner == recipe)
            .map(|(_, trait_name)| trait_name.clone())
            .collect()
    }

    pub fn trait_bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.traits
            .keys()
            .map(|(recipe, trait_name)| (trait_name.as_str(), recipe.as_str()))
    }

    pub fn trait_handler_names(&self) -> Vec<String> {
        self.trait_bindings()
            .map(|(trait_name, recipe)| trait_handler_name(trait_name, recipe))
            .collect()
    }

    pub fn callback(&self, lifecycle: Lifecycle, recipe: &str) -> Option<Callback> {
        self.callbacks
            .get(&(lifecycle, recipe.to_string()))
            .cloned()
    }

    pub fn callback_bindings(&self) -> impl Iterator<Item = (Lifecycle, &str)> {
        self.callbacks
            .keys()
            .map(|(lifecycle, recipe)| (*lifecycle, recipe.as_str()))
    }

    pub fn callback_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .callback_bindings()
            .map(|(lifecycle, recipe)| lifecycle.callback_name(recipe))
            .collect();
        names.sort_unstable();
        names
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("recipes", &self.recipe_names())
            .field("traits", &self.trait_handler_names())
            .field("callbacks", &self.callback_names())
            .field("types", &self.types.names())
            .finish()
    }
}
