use nalgebra::{Vector2, Vector3};

/// A trait for field elements that can be linearly blended toward another value.
///
/// `a.blend(&b, factor)` returns `a + factor * (b - a)`, so a factor of `0`
/// yields `a` and a factor of `1` yields `b`. This is the only arithmetic a
/// field element needs for face interpolation and under-relaxation, which lets
/// those operators be written once for scalar and vector fields.
///
/// For factors in `[0, 1]` every component of the result lies between the
/// corresponding components of `a` and `b`.
pub trait Blend: Copy {
    /// Returns `self + factor * (other - self)`.
    #[must_use]
    fn blend(&self, other: &Self, factor: f64) -> Self;
}

impl Blend for f64 {
    fn blend(&self, other: &Self, factor: f64) -> Self {
        self + factor * (other - self)
    }
}

impl Blend for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn blend(&self, other: &Self, factor: f64) -> Self {
        self + (factor as f32) * (other - self)
    }
}

impl Blend for Vector2<f64> {
    fn blend(&self, other: &Self, factor: f64) -> Self {
        self + (other - self) * factor
    }
}

impl Blend for Vector3<f64> {
    fn blend(&self, other: &Self, factor: f64) -> Self {
        self + (other - self) * factor
    }
}
