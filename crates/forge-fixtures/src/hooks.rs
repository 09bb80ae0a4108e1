use crate::{Built, FactoryError, Registry};
use std::rc::Rc;
use tracing::debug;

pub type Callback = Rc<dyn Fn(&mut Built) -> Result<(), FactoryError>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lifecycle {
    AfterBuild,
    BeforeCreate,
    AfterCreate,
}

impl Lifecycle {
    pub const ALL: [Lifecycle; 3] = [Self::AfterBuild, Self::BeforeCreate, Self::AfterCreate];

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::AfterBuild => "after_build",
            Self::BeforeCreate => "before_create",
            Self::AfterCreate => "after_create",
        }
    }

    pub fn callback_name(&self, recipe: &str) -> String {
        format!("{}_{recipe}", self.prefix())
    }

    /// Splits `after_create_user` into `(AfterCreate, "user")`.
    pub fn parse_callback_name(name: &str) -> Option<(Lifecycle, &str)> {
        Self::ALL.into_iter().find_map(|lifecycle| {
            let recipe = name
                .strip_prefix(lifecycle.prefix())?
                .strip_prefix('_')?;
            let valid = !recipe.is_empty()
                && recipe
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
            valid.then_some((lifecycle, recipe))
        })
    }
}

pub(crate) fn run_callback(
    registry: &Registry,
    lifecycle: Lifecycle,
    recipe: &str,
    built: &mut Built,
) -> Result<(), FactoryError> {
    let Some(callback) = registry.callback(lifecycle, recipe) else {
        return Ok(());
    };
    debug!(
        callback = %lifecycle.callback_name(recipe),
        "running lifecycle callback"
    );
    callback(built)
}
