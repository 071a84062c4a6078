use prefstore_core::db::open_db_in_memory;
use prefstore_core::{
    AccessorError, PreferenceCollection, PreferenceSchemaSource, PreferenceService, Preferrer,
};
use serde_json::json;

struct Account {
    preferences: PreferenceCollection,
}

impl Account {
    fn new(owner_id: &str) -> Self {
        Self {
            preferences: Self::new_preferences(owner_id),
        }
    }
}

impl PreferenceSchemaSource for Account {}

impl Preferrer for Account {
    const PREFERRER_TYPE: &'static str = "Account";

    fn preferences(&self) -> &PreferenceCollection {
        &self.preferences
    }

    fn preferences_mut(&mut self) -> &mut PreferenceCollection {
        &mut self.preferences
    }
}

#[test]
fn dynamic_setter_value_survives_save_and_reload() {
    let mut conn = open_db_in_memory().unwrap();
    let mut account = Account::new("acct-1");

    account
        .dispatch_preference("email_notification_preference=", &[json!(true)])
        .unwrap();
    account
        .dispatch_preference("watch_forums_preference=", &[json!("weekly")])
        .unwrap();
    PreferenceService::new(&mut conn).save(&mut account).unwrap();

    let mut reloaded = Account::new("acct-1");
    PreferenceService::new(&mut conn)
        .reload(&mut reloaded)
        .unwrap();
    assert_eq!(
        reloaded
            .dispatch_preference("email_notification_preference", &[])
            .unwrap(),
        Some(json!(true))
    );
    assert_eq!(
        reloaded.get_preference("watch_forums"),
        Some(&json!("weekly"))
    );
}

#[test]
fn unset_dynamic_getter_returns_none() {
    let mut account = Account::new("acct-1");
    assert_eq!(
        account.dispatch_preference("theme_preference", &[]).unwrap(),
        None
    );
    assert!(account.preferences().is_empty(), "getters never create records");
}

#[test]
fn dynamic_setter_normalizes_blank_values() {
    let mut account = Account::new("acct-1");
    let stored = account
        .dispatch_preference("signature_preference=", &[json!("")])
        .unwrap();

    assert_eq!(stored, None);
    assert_eq!(account.preferences().len(), 1);
}

#[test]
fn wrong_argument_count_reports_given_and_expected() {
    let mut account = Account::new("acct-1");

    let getter_err = account
        .dispatch_preference("theme_preference", &[json!("dark")])
        .unwrap_err();
    assert_eq!(
        getter_err.to_string(),
        "wrong number of arguments for `theme_preference` (1 for 0)"
    );

    let setter_err = account
        .dispatch_preference("theme_preference=", &[json!("dark"), json!("light")])
        .unwrap_err();
    assert_eq!(
        setter_err,
        AccessorError::ArgumentCount {
            accessor: "theme_preference=".to_string(),
            expected: 1,
            given: 2,
        }
    );
    assert!(account.preferences().is_empty());
}

#[test]
fn names_outside_the_convention_are_not_dispatched() {
    let mut account = Account::new("acct-1");
    for accessor in ["theme", "theme_preferences", "theme_preference==", "_preference"] {
        assert_eq!(
            account.dispatch_preference(accessor, &[]),
            Err(AccessorError::NoSuchAccessor(accessor.to_string()))
        );
    }
}
