//! BLAS-style vector kernels.
//!
//! The kernels are generic over [`Scalar`], which is implemented for `f32`,
//! `f64`, `Complex<f32>`, and `Complex<f64>`. Each instantiation performs the
//! same sequence of operations, so results match across element types up to
//! the precision of the type.
//!
//! Slices passed to a kernel must have equal lengths; this is checked in debug
//! builds only.

use num_complex::Complex;
use num_traits::{Float, Num, Zero};

/// A real or complex element type usable by the vector kernels.
pub trait Scalar: Num + Copy + Send + Sync {
    /// The real type of the modulus.
    type Real: Float;

    /// Returns the complex conjugate (the value itself for reals).
    #[must_use]
    fn conj(self) -> Self;

    /// Returns the squared modulus.
    fn modulus_sqr(self) -> Self::Real;
}

impl Scalar for f32 {
    type Real = f32;

    fn conj(self) -> Self {
        self
    }

    fn modulus_sqr(self) -> f32 {
        self * self
    }
}

impl Scalar for f64 {
    type Real = f64;

    fn conj(self) -> Self {
        self
    }

    fn modulus_sqr(self) -> f64 {
        self * self
    }
}

impl<T> Scalar for Complex<T>
where
    T: Float + Send + Sync,
{
    type Real = T;

    fn conj(self) -> Self {
        Complex::conj(&self)
    }

    fn modulus_sqr(self) -> T {
        self.norm_sqr()
    }
}

/// Returns `Σ conj(x_i) y_i`.
pub fn dot<S: Scalar>(x: &[S], y: &[S]) -> S {
    debug_assert_eq!(x.len(), y.len());
    x.iter()
        .zip(y)
        .fold(S::zero(), |acc, (&a, &b)| acc + a.conj() * b)
}

/// Computes `y += alpha * x`.
pub fn axpy<S: Scalar>(alpha: S, x: &[S], y: &mut [S]) {
    debug_assert_eq!(x.len(), y.len());
    for (y, &x) in y.iter_mut().zip(x) {
        *y = *y + alpha * x;
    }
}

/// Computes `y = x + beta * y`.
pub fn xpby<S: Scalar>(x: &[S], beta: S, y: &mut [S]) {
    debug_assert_eq!(x.len(), y.len());
    for (y, &x) in y.iter_mut().zip(x) {
        *y = x + beta * *y;
    }
}

/// Computes `x *= alpha`.
pub fn scale<S: Scalar>(alpha: S, x: &mut [S]) {
    for x in x {
        *x = alpha * *x;
    }
}

/// Returns the Euclidean norm `sqrt(Σ |x_i|²)`.
pub fn norm2<S: Scalar>(x: &[S]) -> S::Real {
    x.iter()
        .fold(S::Real::zero(), |acc, &a| acc + a.modulus_sqr())
        .sqrt()
}
