mod support;

use forge_fixtures::{Attributes, FactoryError};
use serde_json::json;
use support::user;

#[test]
fn build_with_trait_expected_handler_applied() {
    let mut factory = support::factory();
    let built = factory
        .build("user_manually", Attributes::new().with("traits", "manager"))
        .expect("trait build should succeed");
    assert_eq!(user(&built).role.as_deref(), Some("manager"));
}

#[test]
fn build_with_trait_list_expected_all_applied() {
    let mut factory = support::factory();
    let built = factory
        .build("user", Attributes::new().with("traits", json!(["invalid"])))
        .expect("trait build should succeed");
    assert!(!user(&built).valid);
}

#[test]
fn build_trait_overrides_explicit_attribute() {
    let mut factory = support::factory();
    let built = factory
        .build(
            "user_manually",
            Attributes::new()
                .with("role", "admin")
                .with("traits", "manager"),
        )
        .expect("trait build should succeed");
    assert_eq!(user(&built).role.as_deref(), Some("manager"));
}

#[test]
fn build_trait_of_other_recipe_expected_invalid_trait_error() {
    let mut factory = support::factory();
    let error = factory
        .build("user_by_define", Attributes::new().with("traits", "manager"))
        .expect_err("manager is not defined for user_by_define");
    assert_eq!(
        error,
        FactoryError::InvalidTrait {
            trait_name: "manager".to_string(),
            handler: "apply_trait_manager_to_user_by_define".to_string(),
        }
    );
    assert_eq!(
        error.to_string(),
        "Invalid trait 'manager'! No method 'apply_trait_manager_to_user_by_define' is defined."
    );
    assert_eq!(factory.depth(), 0);
}

#[test]
fn build_malformed_traits_value_expected_attribute_error() {
    let mut factory = support::factory();
    let error = factory
        .build("user", Attributes::new().with("traits", 7_i64))
        .expect_err("numeric traits value should fail");
    assert_eq!(error.kind(), "AttributeError");
}

#[test]
fn build_traits_key_expected_never_assigned_to_target() {
    let mut factory = support::factory();
    let attrs = factory
        .attributes_for("user", Attributes::new().with("traits", "invalid"))
        .expect("attributes_for should succeed");
    assert!(!attrs.contains_key("traits"));
    assert_eq!(attrs.get_bool("valid"), Some(false));
}

#[test]
fn build_inherited_recipe_expected_outer_traits_not_reapplied() {
    let mut registry = support::registry();
    registry.register_trait("count", "admin_manually", |built| {
        let name = built
            .attribute("name")
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();
        built
            .set_attribute("name", &format!("{name}!").into())
            .map(|_| ())
    });
    let mut factory = forge_fixtures::Factory::new(registry);

    let built = factory
        .build("admin_manually", Attributes::new().with("traits", "count"))
        .expect("trait should apply once on the outer recipe");
    assert_eq!(user(&built).name.as_deref(), Some("Fred!"));
}

#[test]
fn attributes_for_manual_recipe_with_trait_expected_handler_sees_object() {
    let mut factory = support::factory();
    let attrs = factory
        .attributes_for("user_manually", Attributes::new().with("traits", "manager"))
        .expect("trait should apply before conversion to a map");
    assert_eq!(attrs.get_str("role"), Some("manager"));
    assert!(!attrs.contains_key("traits"));
}

#[test]
fn traits_for_expected_registered_trait_names() {
    let factory = support::factory();
    assert_eq!(factory.traits_for("user"), vec!["invalid".to_string()]);
    assert_eq!(factory.traits_for("user_manually"), vec!["manager".to_string()]);
    assert!(factory.traits_for("address").is_empty());
}
