//! Original-versus-current tracking for editable fields.

use serde::{Deserialize, Serialize};

/// Equality used to decide whether a field was edited.
pub trait FieldValue: Clone {
    fn same_as(&self, other: &Self) -> bool;
}

macro_rules! exact_field_value {
    ($($t:ty),*) => {
        $(impl FieldValue for $t {
            fn same_as(&self, other: &Self) -> bool {
                self == other
            }
        })*
    };
}

exact_field_value!(bool, i32, i64, u32, usize, String);

impl FieldValue for f64 {
    fn same_as(&self, other: &Self) -> bool {
        let scale = 1.0_f64.max(self.abs()).max(other.abs());
        (self - other).abs() <= 1e-9 * scale
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same_as(b),
            (None, None) => true,
            _ => false,
        }
    }
}

/// One editable field: the value loaded from the store and the value the
/// user has typed since.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDiff<T> {
    original: T,
    current: T,
}

impl<T: FieldValue> SettingsDiff<T> {
    pub fn new(value: T) -> Self {
        Self {
            original: value.clone(),
            current: value,
        }
    }

    pub fn original(&self) -> &T {
        &self.original
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn set(&mut self, value: T) {
        self.current = value;
    }

    pub fn is_changed(&self) -> bool {
        !self.original.same_as(&self.current)
    }

    /// Discard the edit.
    pub fn revert(&mut self) {
        self.current = self.original.clone();
    }

    /// Accept the edit as the new baseline.
    pub fn accept(&mut self) {
        self.original = self.current.clone();
    }

    /// Replace both sides, as when the store changed underneath the session.
    pub fn reload(&mut self, value: T) {
        self.original = value.clone();
        self.current = value;
    }
}

impl<T: FieldValue + Default> Default for SettingsDiff<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_after_load() {
        let field = SettingsDiff::new("10".to_string());
        assert!(!field.is_changed());
    }

    #[test]
    fn test_edit_and_revert() {
        let mut field = SettingsDiff::new(false);
        field.set(true);
        assert!(field.is_changed());
        field.revert();
        assert!(!field.is_changed());
        assert!(!*field.current());
    }

    #[test]
    fn test_accept_moves_baseline() {
        let mut field = SettingsDiff::new(1usize);
        field.set(2);
        field.accept();
        assert!(!field.is_changed());
        assert_eq!(*field.original(), 2);
    }

    #[test]
    fn test_float_tolerance() {
        let mut field = SettingsDiff::new(0.1 + 0.2);
        field.set(0.3);
        assert!(!field.is_changed());
        field.set(0.31);
        assert!(field.is_changed());
    }
}
