use crate::{
    Attributes, Diagnostic, Factory, InvalidFactoryError, Registry, Severity, trait_handler_name,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const RULE_FACTORY_INVALID: &str = "factory_invalid";
pub const RULE_CALLBACK_DANGLING: &str = "callback_dangling";
pub const RULE_TRAIT_RECIPE_EXISTS: &str = "trait_recipe_exists";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LintStrategy {
    #[default]
    FactoryOnly,
    FactoryAndTraits,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintOptions {
    pub factory_names: Option<Vec<String>>,
    pub strategy: LintStrategy,
}

impl LintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_factory_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.factory_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_traits(mut self) -> Self {
        self.strategy = LintStrategy::FactoryAndTraits;
        self
    }
}

pub trait LintRule {
    fn name(&self) -> &str;
    fn apply(&self, registry: &Registry) -> Vec<Diagnostic>;
}

pub fn lint(
    factory: &mut Factory,
    options: &LintOptions,
    extra_rules: &[&dyn LintRule],
) -> Vec<Diagnostic> {
    let names = options
        .factory_names
        .clone()
        .unwrap_or_else(|| factory.factory_names());

    let mut diagnostics = Vec::new();
    for recipe in &names {
        diagnostics.extend(lint_factory(factory, recipe));
        if options.strategy == LintStrategy::FactoryAndTraits {
            diagnostics.extend(lint_traits(factory, recipe));
        }
    }

    diagnostics.extend(rule_callback_dangling(factory.registry()));
    diagnostics.extend(rule_trait_recipe_exists(factory.registry()));

    for rule in extra_rules {
        diagnostics.extend(rule.apply(factory.registry()));
    }

    info!(
        recipes = names.len(),
        errors = diagnostics.iter().filter(|d| d.is_error()).count(),
        "lint finished"
    );
    diagnostics
}

pub fn lint_or_raise(
    factory: &mut Factory,
    options: &LintOptions,
    extra_rules: &[&dyn LintRule],
) -> Result<Vec<Diagnostic>, InvalidFactoryError> {
    let diagnostics = lint(factory, options, extra_rules);
    if diagnostics.iter().any(Diagnostic::is_error) {
        return Err(InvalidFactoryError::new(diagnostics));
    }
    Ok(diagnostics)
}

pub fn render_report(diagnostics: &[Diagnostic]) -> String {
    let factory_lines: Vec<String> = diagnostics
        .iter()
        .filter(|d| d.is_error() && d.rule != RULE_CALLBACK_DANGLING)
        .map(|d| {
            let kind = d.error_kind.as_deref().unwrap_or(d.rule.as_str());
            let location = d.location();
            if location.is_empty() {
                format!("* {} ({kind})", d.message)
            } else {
                format!("* {location} - {} ({kind})", d.message)
            }
        })
        .collect();
    let callback_lines: Vec<&str> = diagnostics
        .iter()
        .filter(|d| d.is_error() && d.rule == RULE_CALLBACK_DANGLING)
        .map(|d| d.message.as_str())
        .collect();

    let mut sections = Vec::new();
    if !factory_lines.is_empty() {
        sections.push(format!(
            "The following factories are invalid:\n\n{}",
            factory_lines.join("\n")
        ));
    }
    if !callback_lines.is_empty() {
        sections.push(format!(
            "The following callbacks are invalid:\n\n{}",
            callback_lines.join("\n")
        ));
    }
    sections.join("\n\n")
}

fn lint_factory(factory: &mut Factory, recipe: &str) -> Vec<Diagnostic> {
    match factory.create_strict(recipe, Attributes::new()) {
        Ok(_) => Vec::new(),
        Err(error) => {
            warn!(recipe, error = %error, "factory failed lint");
            vec![
                Diagnostic::new(RULE_FACTORY_INVALID, Severity::Error, error.to_string())
                    .with_recipe(recipe)
                    .with_error_kind(error.kind()),
            ]
        }
    }
}

fn lint_traits(factory: &mut Factory, recipe: &str) -> Vec<Diagnostic> {
    let traits_key = factory.config().traits_key.clone();
    let mut diagnostics = Vec::new();
    for trait_name in factory.traits_for(recipe) {
        let overrides = Attributes::new().with(traits_key.as_str(), trait_name.as_str());
        if let Err(error) = factory.create_strict(recipe, overrides) {
            warn!(recipe, trait_name = %trait_name, error = %error, "trait failed lint");
            diagnostics.push(
                Diagnostic::new(RULE_FACTORY_INVALID, Severity::Error, error.to_string())
                    .with_recipe(recipe)
                    .with_trait(trait_name)
                    .with_error_kind(error.kind()),
            );
        }
    }
    diagnostics
}

fn rule_callback_dangling(registry: &Registry) -> Vec<Diagnostic> {
    let mut names: Vec<String> = registry
        .callback_bindings()
        .filter(|(_, recipe)| !registry.contains_recipe(recipe))
        .map(|(lifecycle, recipe)| lifecycle.callback_name(recipe))
        .collect();
    names.sort_unstable();

    names
        .into_iter()
        .map(|name| Diagnostic::new(RULE_CALLBACK_DANGLING, Severity::Error, name))
        .collect()
}

fn rule_trait_recipe_exists(registry: &Registry) -> Vec<Diagnostic> {
    registry
        .trait_bindings()
        .filter(|(_, recipe)| !registry.contains_recipe(recipe))
        .map(|(trait_name, recipe)| {
            Diagnostic::new(
                RULE_TRAIT_RECIPE_EXISTS,
                Severity::Warning,
                format!(
                    "trait handler '{}' targets unknown recipe '{recipe}'",
                    trait_handler_name(trait_name, recipe)
                ),
            )
            .with_recipe(recipe)
            .with_trait(trait_name)
        })
        .collect()
}
