//! # Field Patches
//!
//! Three-state value for the scalar fields of a synchronization document.
//!
//! ```text
//! ┌──────────────────┬──────────────────┬──────────────────────────────────┐
//! │ JSON             │ Patch<T>         │ On save                          │
//! ├──────────────────┼──────────────────┼──────────────────────────────────┤
//! │ key absent       │ Keep             │ column left as stored            │
//! │ "key": null      │ Clear            │ column set to NULL               │
//! │ "key": value     │ Set(value)       │ column set to value              │
//! └──────────────────┴──────────────────┴──────────────────────────────────┘
//! ```
//!
//! `Keep` only comes from a missing key, so every struct holding a `Patch`
//! field needs `#[serde(default)]`. A NULL column decodes to `Clear`, never
//! to `Keep`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;

/// A scalar field of a PATCH-style document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Leave the stored value untouched.
    #[default]
    Keep,
    /// Set the stored value to NULL.
    Clear,
    /// Set the stored value.
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// The value, when one is set.
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Keep | Patch::Clear => None,
        }
    }

    pub fn as_deref(&self) -> Option<&T::Target>
    where
        T: Deref,
    {
        self.value().map(|value| value.deref())
    }

    /// Maps a set value, keeping `Keep` and `Clear` as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Keep => Patch::Keep,
            Patch::Clear => Patch::Clear,
            Patch::Set(value) => Patch::Set(f(value)),
        }
    }

    /// The value to write, or `None` when the field is kept.
    ///
    /// `Some(None)` means "write NULL".
    pub fn into_write(self) -> Option<Option<T>> {
        match self {
            Patch::Keep => None,
            Patch::Clear => Some(None),
            Patch::Set(value) => Some(Some(value)),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        }
    }
}

// =============================================================================
// Serde
// =============================================================================

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Set(value) => serializer.serialize_some(value),
            Patch::Keep | Patch::Clear => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

// =============================================================================
// sqlx (reads)
// =============================================================================

#[cfg(feature = "sqlx")]
impl<T, DB> sqlx::Type<DB> for Patch<T>
where
    T: sqlx::Type<DB>,
    DB: sqlx::Database,
{
    fn type_info() -> DB::TypeInfo {
        <T as sqlx::Type<DB>>::type_info()
    }

    fn compatible(ty: &DB::TypeInfo) -> bool {
        <Option<T> as sqlx::Type<DB>>::compatible(ty)
    }
}

#[cfg(feature = "sqlx")]
impl<'r, T, DB> sqlx::Decode<'r, DB> for Patch<T>
where
    T: sqlx::Decode<'r, DB>,
    DB: sqlx::Database,
{
    fn decode(
        value: <DB as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        <Option<T> as sqlx::Decode<'r, DB>>::decode(value).map(Patch::from)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(default)]
    struct Block {
        #[serde(skip_serializing_if = "Patch::is_keep")]
        title: Patch<String>,
    }

    #[test]
    fn test_three_states_from_json() {
        let absent: Block = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.title, Patch::Keep);

        let nulled: Block = serde_json::from_value(json!({ "title": null })).unwrap();
        assert_eq!(nulled.title, Patch::Clear);

        let set: Block = serde_json::from_value(json!({ "title": "Cases" })).unwrap();
        assert_eq!(set.title.as_deref(), Some("Cases"));
    }

    #[test]
    fn test_serialization_keeps_states_apart() {
        let keep = serde_json::to_value(Block::default()).unwrap();
        assert_eq!(keep, json!({}));

        let clear = serde_json::to_value(Block {
            title: Patch::Clear,
        })
        .unwrap();
        assert_eq!(clear, json!({ "title": null }));
    }

    #[test]
    fn test_write_value() {
        assert_eq!(Patch::<i64>::Keep.into_write(), None);
        assert_eq!(Patch::<i64>::Clear.into_write(), Some(None));
        assert_eq!(Patch::Set(5).map(|v| v * 2).into_write(), Some(Some(10)));
        assert_eq!(Patch::from(None::<i64>), Patch::Clear);
    }
}
