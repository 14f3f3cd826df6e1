use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Degenerate geometry: zero-length vector in angle computation (coincident atoms)")]
    DegenerateVector,
}

/// Squared Euclidean distance in Angstrom^2. Bond descriptors work entirely
/// in squared lengths; nothing in the filtering path takes a square root.
#[inline]
pub fn distance_squared(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm_squared()
}

/// The angle at `center` between the directions to `a` and `b`, in degrees.
///
/// Fails if either arm has (near-)zero length instead of letting `acos`
/// produce a NaN. The cosine is clamped to [-1, 1] against round-off.
pub fn angle_degrees(
    center: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
) -> Result<f64, GeometryError> {
    let v1 = a - center;
    let v2 = b - center;
    let norm_product_sq = v1.norm_squared() * v2.norm_squared();
    if norm_product_sq <= f64::EPSILON {
        return Err(GeometryError::DegenerateVector);
    }
    let cos = (v1.dot(&v2) / norm_product_sq.sqrt()).clamp(-1.0, 1.0);
    Ok(cos.acos().to_degrees())
}
