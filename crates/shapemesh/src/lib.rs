#![deny(bare_trait_objects)]
#![allow(clippy::float_cmp)]

//! Triangle meshes for vector shapes.
//!
//! # Crates
//!
//! This meta-crate (`shapemesh`) reexports the following sub-crates for convenience:
//!
//! * **shapemesh_tessellation** - Fill triangulation and stroke outlining.
//! * **shapemesh_path** - Shape records, styles, paths and contour assembly.
//! * **shapemesh_geom** - Line segments, quadratic bézier curves and curve flattening.
//!
//! Each `shapemesh_<name>` crate is reexported as a `<name>` module in `shapemesh`. For example:
//!
//! ```ignore
//! use shapemesh_tessellation::FillTessellator;
//! ```
//!
//! Is equivalent to:
//!
//! ```ignore
//! use shapemesh::tessellation::FillTessellator;
//! ```
//!
//! # Overview
//!
//! A shape is a list of [records](path/records/index.html): style changes and
//! move/line/curve edges in twips, each edge being on the boundary of up to
//! two fills and along at most one line. The [`ShapePipeline`](pipeline/struct.ShapePipeline.html)
//! turns a shape into one mesh per style:
//!
//! ```ascii
//!  records ─► ShapeScanner ─► chains per style ─► assemble_contours ─► Path
//!                                                                        │
//!        meshes ◄── VertexBuffer ◄── FillTessellator / StrokeTessellator ◄┘
//! ```
//!
//! # Example
//!
//! ```
//! use shapemesh::*;
//! use shapemesh::path::{Color, FillStyle, ShapeDefinition, ShapeRecord, StyleChange, StyleTable};
//! use shapemesh::path::TwipPoint;
//!
//! let mut styles = StyleTable::new();
//! let red = styles.add_fill(FillStyle::solid(Color::from_rgb(0xff0000, 255)));
//!
//! // A 10x10 pixels square, in twips.
//! let shape = ShapeDefinition::new(styles, vec![
//!     ShapeRecord::StyleChange(
//!         StyleChange::new().with_move_to(TwipPoint::new(0, 0)).with_fill_style_1(red),
//!     ),
//!     ShapeRecord::line_to(200, 0),
//!     ShapeRecord::line_to(200, 200),
//!     ShapeRecord::line_to(0, 200),
//!     ShapeRecord::line_to(0, 0),
//! ]);
//!
//! let mut pipeline = ShapePipeline::new(PipelineConfig::default());
//! pipeline.load_shape(&shape);
//!
//! let meshes = pipeline.build();
//! assert_eq!(meshes.len(), 1);
//! assert_eq!(meshes[0].buffer.area(), 100.0);
//! ```

pub extern crate shapemesh_tessellation;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub use shapemesh_tessellation as tessellation;
pub use tessellation::geom;
pub use tessellation::path;

pub use path::math;

pub mod cache;
mod config;
pub mod pipeline;

#[doc(inline)]
pub use crate::cache::MeshCache;
pub use crate::config::PipelineConfig;
#[doc(inline)]
pub use crate::pipeline::{
    Mesh, MeshId, MeshKind, MeshSource, MeshStyle, PipelineState, ShapePipeline,
};
