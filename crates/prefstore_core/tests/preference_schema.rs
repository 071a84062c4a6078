use prefstore_core::db::open_db_in_memory;
use prefstore_core::{
    AllowedValues, ConfigurationError, OwnerRef, PreferenceCollection, PreferenceOptions,
    PreferenceRepository, PreferenceSchema, PreferenceSchemaSource, PreferenceService,
    Preferrer, SaveError, SchemaRegistry, SqlitePreferenceRepository,
};
use rusqlite::Connection;
use serde_json::json;
use std::sync::Arc;

struct User {
    preferences: PreferenceCollection,
}

impl User {
    fn new(owner_id: &str) -> Self {
        Self {
            preferences: Self::new_preferences(owner_id),
        }
    }
}

impl Preferrer for User {
    const PREFERRER_TYPE: &'static str = "User";

    fn preferences(&self) -> &PreferenceCollection {
        &self.preferences
    }

    fn preferences_mut(&mut self) -> &mut PreferenceCollection {
        &mut self.preferences
    }
}

prefstore_core::preference_schema! {
    User {
        meal_choice => PreferenceOptions::new().default_value("Chicken"),
        language => PreferenceOptions::new().options(AllowedValues::labeled([
            ("en_US", "English - U.S.A."),
            ("fr_FR", "Francais - Le France"),
            ("en_FR", "English - France"),
        ])),
        favorite_color => PreferenceOptions::new()
            .options(["Green", "Blue", "Red"])
            .allow_null(true),
        nickname,
    }
}

struct Group {
    preferences: PreferenceCollection,
    schema: Arc<PreferenceSchema>,
}

impl PreferenceSchemaSource for Group {
    fn preference_schema(&self) -> Option<&PreferenceSchema> {
        Some(&*self.schema)
    }
}

impl Preferrer for Group {
    const PREFERRER_TYPE: &'static str = "Group";

    fn preferences(&self) -> &PreferenceCollection {
        &self.preferences
    }

    fn preferences_mut(&mut self) -> &mut PreferenceCollection {
        &mut self.preferences
    }
}

fn save(conn: &mut Connection, owner: &mut impl Preferrer) -> Result<(), SaveError> {
    PreferenceService::new(conn).save(owner).map(|_| ())
}

#[test]
fn concrete_getter_falls_back_to_default_until_set() {
    let mut conn = open_db_in_memory().unwrap();
    let mut user = User::new("1");
    user.set_language_preference("en_US");

    assert_eq!(user.meal_choice_preference(), Some(json!("Chicken")));
    save(&mut conn, &mut user).unwrap();

    user.set_meal_choice_preference("Seafood");
    save(&mut conn, &mut user).unwrap();

    let mut reloaded = User::new("1");
    PreferenceService::new(&mut conn)
        .reload(&mut reloaded)
        .unwrap();
    assert_eq!(reloaded.meal_choice_preference(), Some(json!("Seafood")));
    assert_eq!(reloaded.language_preference(), Some(json!("en_US")));
}

#[test]
fn default_is_not_stored_before_an_explicit_set() {
    let mut conn = open_db_in_memory().unwrap();
    let mut user = User::new("1");
    user.set_language_preference("fr_FR");
    save(&mut conn, &mut user).unwrap();

    let stored = SqlitePreferenceRepository::new(&conn);
    let owners = User::find_all_by_meal_choice_preference(&stored, &json!("Chicken")).unwrap();
    assert!(owners.is_empty());
    assert_eq!(user.get_preference("meal_choice"), None);
}

#[test]
fn value_outside_allowed_set_rejects_save() {
    let mut conn = open_db_in_memory().unwrap();
    let mut user = User::new("1");
    user.set_language_preference("German");

    let err = save(&mut conn, &mut user).unwrap_err();
    match err {
        SaveError::Invalid(errors) => {
            assert_eq!(
                errors.on("language_preference"),
                Some("is not included in the list")
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(user.preferences().has_pending());
}

#[test]
fn macro_declaration_alone_wires_rules_into_saves() {
    let mut conn = open_db_in_memory().unwrap();
    let mut user = User::new("1");

    let schema = user.preference_schema().unwrap();
    assert!(std::ptr::eq(schema, User::declared_preferences()));

    user.set_language_preference("German");
    let err = save(&mut conn, &mut user).unwrap_err();
    let SaveError::Invalid(errors) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(
        errors.on("language_preference"),
        Some("is not included in the list")
    );
    assert_eq!(
        SqlitePreferenceRepository::new(&conn)
            .list_for_owner(user.owner_ref())
            .unwrap()
            .len(),
        0
    );
}

#[test]
fn unset_value_with_allowed_set_requires_allow_null() {
    let mut conn = open_db_in_memory().unwrap();
    let mut user = User::new("1");

    let err = save(&mut conn, &mut user).unwrap_err();
    let SaveError::Invalid(errors) = err else {
        panic!("expected validation failure");
    };
    assert!(errors.on("language_preference").is_some());
    assert!(errors.on("favorite_color_preference").is_none());
    assert!(errors.on("meal_choice_preference").is_none());
}

#[test]
fn nullable_set_still_rejects_outsiders() {
    let mut conn = open_db_in_memory().unwrap();
    let mut user = User::new("1");
    user.set_language_preference("en_FR");
    user.set_favorite_color_preference("Beige");

    let err = save(&mut conn, &mut user).unwrap_err();
    let SaveError::Invalid(errors) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(errors.len(), 1);
    assert!(errors.on("favorite_color_preference").is_some());

    user.set_favorite_color_preference("Blue");
    save(&mut conn, &mut user).unwrap();
}

#[test]
fn setter_normalizes_blank_to_unset() {
    let mut user = User::new("1");
    user.set_nickname_preference("  ");

    assert_eq!(user.nickname_preference(), None);
    assert!(user.preferences().record("nickname").is_some());
}

#[test]
fn options_accessor_exposes_allowed_set_and_labels() {
    let languages = User::language_preference_options().unwrap();
    assert_eq!(
        languages.values(),
        vec![&json!("en_US"), &json!("fr_FR"), &json!("en_FR")]
    );
    assert_eq!(languages.label(&json!("en_US")), Some("English - U.S.A."));

    assert!(User::favorite_color_preference_options()
        .unwrap()
        .contains(&json!("Red")));
    assert!(User::meal_choice_preference_options().is_none());
    assert_eq!(User::declared_preferences().len(), 4);
}

#[test]
fn find_all_by_concrete_finder_returns_matching_owners() {
    let mut conn = open_db_in_memory().unwrap();
    for (owner_id, language) in [("1", "en_US"), ("2", "fr_FR"), ("3", "fr_FR")] {
        let mut user = User::new(owner_id);
        user.set_language_preference(language);
        save(&mut conn, &mut user).unwrap();
    }

    let repo = SqlitePreferenceRepository::new(&conn);
    let owners = User::find_all_by_language_preference(&repo, &json!("fr_FR")).unwrap();
    assert_eq!(
        owners,
        vec![OwnerRef::new("User", "2"), OwnerRef::new("User", "3")]
    );
}

#[test]
fn dynamic_getter_agrees_with_concrete_getter() {
    let mut user = User::new("1");
    assert_eq!(
        user.dispatch_preference("meal_choice_preference", &[]).unwrap(),
        user.meal_choice_preference()
    );

    user.dispatch_preference("meal_choice_preference=", &[json!("Vegetarian")])
        .unwrap();
    assert_eq!(user.meal_choice_preference(), Some(json!("Vegetarian")));
}

#[test]
fn registry_rejects_declaration_on_type_without_capability() {
    let mut registry = SchemaRegistry::new();
    registry.enable_type::<User>();

    let err = registry
        .preference_for(&["User", "Widget"], |block| {
            block.preference("timezone", PreferenceOptions::new().default_value("UTC"));
        })
        .unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::PreferencesNotEnabled {
            owner_type: "Widget".to_string()
        }
    );
    assert!(registry.schema("User").unwrap().is_empty());
}

#[test]
fn registry_schema_validates_runtime_declared_owner() {
    let mut registry = SchemaRegistry::new();
    registry.enable_type::<Group>();
    registry
        .preference_for(&["Group"], |block| {
            block
                .preference("digest", PreferenceOptions::new().options(["daily", "weekly"]))
                .preference("timezone", PreferenceOptions::new().default_value("UTC"));
        })
        .unwrap();

    let mut group = Group {
        preferences: Group::new_preferences("staff"),
        schema: registry.shared("Group").unwrap(),
    };
    assert_eq!(
        group.dispatch_preference("timezone_preference", &[]).unwrap(),
        Some(json!("UTC"))
    );

    let mut conn = open_db_in_memory().unwrap();
    group.set_preference("digest", "hourly");
    assert!(matches!(
        save(&mut conn, &mut group),
        Err(SaveError::Invalid(_))
    ));

    group.set_preference("digest", "weekly");
    save(&mut conn, &mut group).unwrap();
}
