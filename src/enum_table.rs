//! Enum-like name/value tables
//!
//! An [`EnumTable`] is a closed, ordered set of named constants. The table is
//! declared statically with `#[derive(EnumTable)]`, so there is nothing to
//! initialize and iteration order is declaration order.

pub use tsframe_macros::EnumTable;

/// A unit-only enum whose variants map to a name and a value
pub trait EnumTable: Copy + Sized + 'static {
    /// Type of the values held by the table
    type Value;

    /// All variants, in declaration order
    const VARIANTS: &'static [Self];

    /// Name of the variant
    fn name(&self) -> &'static str;

    /// Value of the variant
    fn value(&self) -> Self::Value;

    /// Name → value pairs in declaration order
    fn dict() -> Vec<(&'static str, Self::Value)> {
        Self::iter().collect()
    }

    /// Iterate over `(name, value)` pairs
    fn iter() -> impl Iterator<Item = (&'static str, Self::Value)> {
        Self::VARIANTS.iter().map(|v| (v.name(), v.value()))
    }

    /// Iterate over the names
    fn keys() -> impl Iterator<Item = &'static str> {
        Self::VARIANTS.iter().map(Self::name)
    }

    /// Iterate over the values
    fn values() -> impl Iterator<Item = Self::Value> {
        Self::VARIANTS.iter().map(Self::value)
    }

    /// Look up a variant by its name
    fn from_name(name: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.name() == name)
    }

    /// Look up the first variant holding `value`
    fn from_value(value: &Self::Value) -> Option<Self>
    where
        Self::Value: PartialEq,
    {
        Self::VARIANTS.iter().copied().find(|v| v.value() == *value)
    }
}
