//! Update forms and shallow merging.
//!
//! A commit is one of three explicit forms: replace the value, merge a patch
//! into it, or compute the next value from the current one. Merging is
//! single-level: a field present in the patch overwrites the whole field,
//! nested structures included.

use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Boxed function-of-previous-state.
pub type Transform<T> = Box<dyn FnOnce(&T) -> T + Send>;

/// One commit to a cell, chosen explicitly by the caller.
pub enum Update<T, P> {
    /// The argument becomes the new value.
    Replace(T),
    /// The patch's fields overwrite the current value's fields.
    Merge(P),
    /// The function's result on the current value becomes the new value.
    Transform(Transform<T>),
}

impl<T, P> Update<T, P> {
    /// Build a `Transform` update from a closure.
    pub fn transform<F>(f: F) -> Self
    where
        F: FnOnce(&T) -> T + Send + 'static,
    {
        Update::Transform(Box::new(f))
    }
}

impl<T: fmt::Debug, P: fmt::Debug> fmt::Debug for Update<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Update::Merge(patch) => f.debug_tuple("Merge").field(patch).finish(),
            Update::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// A structured value that accepts partial patches.
pub trait Merge {
    /// The partial form of `Self`.
    type Patch;

    /// Overwrite the fields named by `patch`, leaving the rest untouched.
    fn merge(&mut self, patch: Self::Patch);
}

/// JSON objects merge key by key. Merging into a non-object yields the patch
/// itself as an object, since a scalar contributes no fields.
impl Merge for Value {
    type Patch = Map<String, Value>;

    fn merge(&mut self, patch: Self::Patch) {
        match self {
            Value::Object(fields) => fields.extend(patch),
            other => *other = Value::Object(patch),
        }
    }
}

impl<K, V, S> Merge for IndexMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Patch = IndexMap<K, V, S>;

    fn merge(&mut self, patch: Self::Patch) {
        self.extend(patch);
    }
}

impl<K, V, S> Merge for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Patch = HashMap<K, V, S>;

    fn merge(&mut self, patch: Self::Patch) {
        self.extend(patch);
    }
}

/// Declare a patch struct for a plain struct and implement [`Merge`] for it.
///
/// Every listed field becomes an `Option` in the patch; `Some` fields
/// overwrite, `None` fields are left alone.
///
/// ```rust
/// use statehooks_core::patch_struct;
/// use statehooks_core::state::Merge;
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Battery {
///     pub level: f64,
///     pub charging: bool,
/// }
///
/// patch_struct! {
///     pub struct BatteryPatch for Battery {
///         level: f64,
///         charging: bool,
///     }
/// }
///
/// let mut battery = Battery { level: 0.5, charging: false };
/// battery.merge(BatteryPatch { charging: Some(true), ..Default::default() });
/// assert_eq!(battery, Battery { level: 0.5, charging: true });
/// ```
#[macro_export]
macro_rules! patch_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $patch:ident for $target:ty {
            $($field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $patch {
            $(pub $field: ::core::option::Option<$ty>,)*
        }

        impl $crate::state::Merge for $target {
            type Patch = $patch;

            fn merge(&mut self, patch: Self::Patch) {
                $(
                    if let ::core::option::Option::Some(value) = patch.$field {
                        self.$field = value;
                    }
                )*
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq)]
    struct Position {
        latitude: f64,
        longitude: f64,
        accuracy: Option<f64>,
        loading: bool,
    }

    patch_struct! {
        struct PositionPatch for Position {
            latitude: f64,
            longitude: f64,
            accuracy: Option<f64>,
            loading: bool,
        }
    }

    #[test]
    fn json_merge_overwrites_named_fields_only() {
        let mut value = json!({ "loading": true, "level": null, "charging": null });
        let patch = json!({ "loading": false, "level": 0.8 });
        let Value::Object(patch) = patch else {
            unreachable!()
        };

        value.merge(patch);

        assert_eq!(
            value,
            json!({ "loading": false, "level": 0.8, "charging": null })
        );
    }

    #[test]
    fn json_merge_is_single_level() {
        let mut value = json!({ "coords": { "lat": 1.0, "lng": 2.0 }, "error": null });
        let Value::Object(patch) = json!({ "coords": { "lat": 5.0 } }) else {
            unreachable!()
        };

        value.merge(patch);

        assert_eq!(value, json!({ "coords": { "lat": 5.0 }, "error": null }));
    }

    #[test]
    fn json_merge_into_scalar_yields_patch() {
        let mut value = json!(3);
        let Value::Object(patch) = json!({ "a": 1 }) else {
            unreachable!()
        };

        value.merge(patch);

        assert_eq!(value, json!({ "a": 1 }));
    }

    #[test]
    fn index_map_merge_keeps_order_and_untouched_keys() {
        let mut map: IndexMap<&str, i32> = [("x", 1), ("y", 2), ("z", 3)].into_iter().collect();
        map.merge([("y", 20), ("w", 4)].into_iter().collect());

        let entries: Vec<_> = map.into_iter().collect();
        assert_eq!(entries, vec![("x", 1), ("y", 20), ("z", 3), ("w", 4)]);
    }

    #[test]
    fn patch_struct_overwrites_some_fields() {
        let mut position = Position {
            latitude: 0.0,
            longitude: 0.0,
            accuracy: None,
            loading: true,
        };

        position.merge(PositionPatch {
            latitude: Some(51.5),
            longitude: Some(-0.1),
            accuracy: Some(Some(12.0)),
            ..Default::default()
        });

        assert_eq!(
            position,
            Position {
                latitude: 51.5,
                longitude: -0.1,
                accuracy: Some(12.0),
                loading: true,
            }
        );
    }

    #[test]
    fn update_debug_hides_closures() {
        let update: Update<i32, ()> = Update::transform(|v| v + 1);
        assert_eq!(format!("{update:?}"), "Transform(..)");
        let update: Update<i32, ()> = Update::Replace(4);
        assert_eq!(format!("{update:?}"), "Replace(4)");
    }

    fn object(fields: &BTreeMap<String, i64>) -> Map<String, Value> {
        fields
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(*value)))
            .collect()
    }

    proptest! {
        #[test]
        fn merge_overwrites_exactly_the_patched_fields(
            current in prop::collection::btree_map("[a-f]", any::<i64>(), 0..6),
            patch in prop::collection::btree_map("[a-f]", any::<i64>(), 0..6)
        ) {
            let mut value = Value::Object(object(&current));
            value.merge(object(&patch));

            let Value::Object(merged) = value else {
                return Err(TestCaseError::fail("merge produced a non-object"));
            };
            for (key, field) in &merged {
                let expected = patch.get(key).or_else(|| current.get(key));
                prop_assert_eq!(field.as_i64(), expected.copied());
            }
            let keys: std::collections::BTreeSet<&String> =
                current.keys().chain(patch.keys()).collect();
            prop_assert_eq!(merged.len(), keys.len());
        }
    }
}
