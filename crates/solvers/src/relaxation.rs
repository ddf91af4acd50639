//! Under-relaxation.
//!
//! Explicit relaxation blends the previous and new values of a field,
//! `old + f * (new - old)`. Implicit relaxation modifies a linear system so
//! its solution moves only part of the way from the previous iterate, while
//! leaving the converged solution unchanged.
//!
//! Factors are looked up by name from [`RelaxationFactors`], which holds
//! separate tables for fields and equations with an optional default.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use plenum_core::{Blend, CellField, FieldError, LinearSystem, Mesh};

/// Name of the entry that applies to fields or equations without their own.
const DEFAULT_KEY: &str = "default";

/// Errors that can occur when creating a relaxation factor.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum RelaxationError {
    #[error("relaxation factor must be positive and finite, found {0}")]
    NotPositive(f64),

    #[error("relaxation factor must not exceed 1, found {0}")]
    AboveOne(f64),
}

/// A positive, finite relaxation factor.
///
/// A factor of `1` means no relaxation. Factors above `1` extrapolate and
/// are accepted by [`RelaxationFactor::new`] but rejected by
/// [`RelaxationFactor::bounded`], which configuration uses.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct RelaxationFactor(f64);

impl RelaxationFactor {
    /// The factor that leaves values unchanged.
    pub const NONE: Self = Self(1.0);

    /// Creates a factor, accepting any positive finite value.
    ///
    /// # Errors
    ///
    /// Returns an error if `factor` is not positive and finite.
    pub fn new(factor: f64) -> Result<Self, RelaxationError> {
        if factor.is_finite() && factor > 0.0 {
            Ok(Self(factor))
        } else {
            Err(RelaxationError::NotPositive(factor))
        }
    }

    /// Creates a factor in `(0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `factor` is outside `(0, 1]`.
    pub fn bounded(factor: f64) -> Result<Self, RelaxationError> {
        let factor = Self::new(factor)?;
        if factor.0 > 1.0 {
            return Err(RelaxationError::AboveOne(factor.0));
        }
        Ok(factor)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns `true` if this factor leaves values unchanged.
    #[must_use]
    pub fn is_none(self) -> bool {
        self.0 == 1.0
    }
}

impl Default for RelaxationFactor {
    fn default() -> Self {
        Self::NONE
    }
}

/// Returns `old + factor * (new - old)` element-wise.
///
/// # Panics
///
/// Panics if `old` and `new` have different lengths.
pub fn relax<T: Blend>(old: &[T], new: &[T], factor: RelaxationFactor) -> Vec<T> {
    assert_eq!(old.len(), new.len(), "relaxed values must have equal lengths");
    if factor.is_none() {
        return new.to_vec();
    }
    old.iter()
        .zip(new)
        .map(|(old, new)| old.blend(new, factor.value()))
        .collect()
}

/// Relaxes a cell field toward `new`, keeping the conditions of `new` and
/// re-evaluating boundary values.
///
/// # Errors
///
/// Returns an error if the fields do not match the mesh.
pub fn relax_field<T: Blend>(
    mesh: &Mesh,
    old: &CellField<T>,
    new: &CellField<T>,
    factor: RelaxationFactor,
) -> Result<CellField<T>, FieldError> {
    if old.len() != new.len() {
        return Err(FieldError::CellCount {
            expected: new.len(),
            found: old.len(),
        });
    }
    new.with_values(mesh, relax(old.values(), new.values(), factor))
}

/// Applies implicit under-relaxation to a linear system.
///
/// With `A = D + N` split into diagonal and off-diagonal parts, the relaxed
/// system is `(D / f) x + N x = b + ((1 - f) / f) D x_prev`. Its solution
/// coincides with the original one once `x == x_prev`.
///
/// # Panics
///
/// Panics if `previous` does not have one entry per row.
pub fn relax_equation(system: &mut LinearSystem, previous: &[f64], factor: RelaxationFactor) {
    assert_eq!(previous.len(), system.n_rows(), "one previous value per row");
    if factor.is_none() {
        return;
    }
    let f = factor.value();
    for (row, x_prev) in previous.iter().enumerate() {
        let diagonal = system.diagonal(row);
        system.scale_diagonal(row, 1.0 / f);
        system.add_source(row, (1.0 - f) / f * diagonal * x_prev);
    }
}

/// Relaxation factors by field and equation name.
///
/// Each table may hold a `default` entry used for names without their own.
/// Deserializes from tables of the form:
///
/// ```toml
/// [fields]
/// p = 0.3
///
/// [equations]
/// U = 0.7
/// default = 0.9
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawFactors")]
pub struct RelaxationFactors {
    fields: BTreeMap<String, RelaxationFactor>,
    equations: BTreeMap<String, RelaxationFactor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawFactors {
    fields: BTreeMap<String, f64>,
    equations: BTreeMap<String, f64>,
}

impl TryFrom<RawFactors> for RelaxationFactors {
    type Error = RelaxationError;

    fn try_from(raw: RawFactors) -> Result<Self, Self::Error> {
        let validate = |table: BTreeMap<String, f64>| {
            table
                .into_iter()
                .map(|(name, f)| Ok((name, RelaxationFactor::bounded(f)?)))
                .collect::<Result<BTreeMap<_, _>, RelaxationError>>()
        };
        Ok(Self {
            fields: validate(raw.fields)?,
            equations: validate(raw.equations)?,
        })
    }
}

impl RelaxationFactors {
    /// Creates an empty set, which relaxes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the explicit relaxation factor for a field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, factor: RelaxationFactor) -> Self {
        self.fields.insert(name.into(), factor);
        self
    }

    /// Sets the implicit relaxation factor for an equation.
    #[must_use]
    pub fn with_equation(mut self, name: impl Into<String>, factor: RelaxationFactor) -> Self {
        self.equations.insert(name.into(), factor);
        self
    }

    /// Returns the factor for a field, falling back to the `default` entry.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<RelaxationFactor> {
        lookup(&self.fields, name)
    }

    /// Returns the factor for an equation, falling back to the `default`
    /// entry.
    #[must_use]
    pub fn equation(&self, name: &str) -> Option<RelaxationFactor> {
        lookup(&self.equations, name)
    }
}

fn lookup(table: &BTreeMap<String, RelaxationFactor>, name: &str) -> Option<RelaxationFactor> {
    table
        .get(name)
        .or_else(|| table.get(DEFAULT_KEY))
        .copied()
}
