//! hl-core: stable foundation for hoselock.
//!
//! Contains:
//! - geom (poses, rays, plane projection on nalgebra)
//! - numeric (Real + tolerances + float helpers)
//! - ids (stable compact IDs for interactable parts)
//! - error (shared error types)

pub mod error;
pub mod geom;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{HlError, HlResult};
pub use geom::*;
pub use ids::*;
pub use numeric::*;
