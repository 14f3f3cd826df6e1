//! Geometric connectivity perception: bond classification from covalent
//! radii, fragment partitioning by graph traversal, and bond-angle
//! enumeration over the perceived bonds.

pub mod angles;
pub mod bonds;
