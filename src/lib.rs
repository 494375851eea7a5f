//! Tileable Voronoi caustics for stylized water
//!
//! A standalone library that turns a handful of random points into a
//! seamlessly repeating caustic texture, plus CPU versions of the toon ocean
//! and gradient shading programs that consume it.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use toon_ocean::*;
//!
//! let config = CausticConfigBuilder::new()
//!     .seed(42)
//!     .size(512, 512).unwrap()
//!     .build().unwrap();
//!
//! let mut generator = CausticGenerator::new(config);
//!
//! // Bindable immediately; pixels arrive from the rayon pool
//! let texture = generator.generate_caustic_texture(10).unwrap();
//! texture.wait_ready().unwrap();
//! texture.save_png("caustics.png").unwrap();
//! ```
//!
//! # Pipeline
//!
//! sites → diagram → relaxed sites → 3×3 tiled diagram → inset polygons →
//! [`PolygonMask`] → [`MaskRasterizer`] → [`CausticTexture`]
//!
//! # Features
//!
//! - `spatial-index` (default): O(log n) point-to-cell lookups using a KD-tree
//! - `serde`: Serialization support for configuration and shader parameters

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod voronoi;
pub mod generation;
pub mod mask;
pub mod raster;
pub mod texture;
pub mod generator;
pub mod shading;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{CausticError, Result};
pub use config::{
    CausticConfig, CausticConfigBuilder, Displacement, FilterPipeline, GooFilter, MIN_POINT_COUNT,
};
pub use geometry::{distance, lerp, BBox, Point, Segment};
pub use voronoi::{compute_diagram, Cell, Diagram, Edge, HalfEdge};
pub use generation::{compose_mask, relax_cells, LloydOptions};
pub use mask::{FilterStep, MaskPolygon, PolygonMask};
pub use raster::{CoverageMap, MaskRasterizer, SoftwareRasterizer};
pub use texture::{CausticTexture, WrapMode};
pub use generator::CausticGenerator;
pub use shading::{Color, DepthFrame, DepthSource, GradientShader, OceanFragment, OceanParams, OceanShader};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam vector types used in the public API
pub use glam::{DVec2, Vec2, Vec4};
