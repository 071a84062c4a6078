//! Compile-time accessor generation for declared preferences.

/// Declares preferences for an owner type and generates its accessors.
///
/// For every `name` this expands to, on the owner type:
/// - `name_preference(&self)`: stored value, or the declared default;
/// - `set_name_preference(&mut self, value)`;
/// - `name_preference_options()`: the declared allowed set, if any;
/// - `find_all_by_name_preference(repo, value)`: owners holding `value`.
///
/// It also generates `declared_preferences()`, the owner type's schema table,
/// built once on first use, and implements `PreferenceSchemaSource` with it so
/// saves and generic dispatch apply the declared rules. The owner type must
/// implement `Preferrer` and must not implement `PreferenceSchemaSource` itself.
///
/// ```ignore
/// prefstore_core::preference_schema! {
///     User {
///         meal_choice => PreferenceOptions::new().default_value("Chicken"),
///         language => PreferenceOptions::new().options(["en_US", "fr_FR"]),
///         nickname,
///     }
/// }
/// ```
#[macro_export]
macro_rules! preference_schema {
    (@options $options:expr) => {
        $options
    };
    (@options) => {
        $crate::PreferenceOptions::default()
    };
    ($owner:ident { $($name:ident $(=> $options:expr)?),* $(,)? }) => {
        $crate::__private::paste! {
            impl $crate::PreferenceSchemaSource for $owner {
                fn preference_schema(&self) -> Option<&$crate::PreferenceSchema> {
                    Some(Self::declared_preferences())
                }
            }

            impl $owner {
                /// Preference rules declared for this owner type.
                pub fn declared_preferences() -> &'static $crate::PreferenceSchema {
                    static SCHEMA: $crate::__private::Lazy<$crate::PreferenceSchema> =
                        $crate::__private::Lazy::new(|| {
                            let mut schema = $crate::PreferenceSchema::new(
                                <$owner as $crate::Preferrer>::PREFERRER_TYPE,
                            );
                            $(
                                schema.declare(
                                    stringify!($name),
                                    $crate::preference_schema!(@options $($options)?),
                                );
                            )*
                            schema
                        });
                    &SCHEMA
                }

                $(
                    pub fn [<$name _preference>](&self) -> Option<$crate::__private::Value> {
                        Self::declared_preferences().resolve(
                            <Self as $crate::Preferrer>::preferences(self),
                            stringify!($name),
                        )
                    }

                    pub fn [<set_ $name _preference>](
                        &mut self,
                        value: impl Into<$crate::__private::Value>,
                    ) -> &$crate::PreferenceRecord {
                        <Self as $crate::Preferrer>::set_preference(self, stringify!($name), value)
                    }

                    pub fn [<$name _preference_options>]() -> Option<&'static $crate::AllowedValues> {
                        Self::declared_preferences().allowed_values(stringify!($name))
                    }

                    pub fn [<find_all_by_ $name _preference>](
                        repo: &impl $crate::PreferenceRepository,
                        value: &$crate::__private::Value,
                    ) -> $crate::RepoResult<Vec<$crate::OwnerRef>> {
                        repo.find_owners_by(
                            <Self as $crate::Preferrer>::PREFERRER_TYPE,
                            stringify!($name),
                            value,
                        )
                    }
                )*
            }
        }
    };
}
