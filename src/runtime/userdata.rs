//! Host object adapters.

use std::fmt;

use super::ZrValue;

/// A host object exposed to scripts through named properties.
///
/// Adapters own any interior mutability they need; scripts only hold shared
/// references.
pub trait ZrUserdata: fmt::Debug {
    /// Name shown by `typeof` and in diagnostics.
    fn type_name(&self) -> &str {
        "userdata"
    }

    /// Read a property. `None` reads as `undefined`.
    fn get(&self, name: &str) -> Option<ZrValue>;

    /// Write a property.
    fn set(&self, name: &str, value: ZrValue) -> Result<(), String>;
}
