use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    pub attrs_suffix: String,
    pub traits_key: String,
    pub class_key: String,
    pub debug: bool,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            attrs_suffix: "_attrs".to_string(),
            traits_key: "traits".to_string(),
            class_key: "class".to_string(),
            debug: false,
        }
    }
}

impl FactoryConfig {
    pub fn is_reserved_key(&self, key: &str) -> bool {
        key == self.class_key || key == self.traits_key
    }
}
