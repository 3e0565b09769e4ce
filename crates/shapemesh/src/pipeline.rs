//! From shape records and drawing commands to meshes.
//!
//! A [`ShapePipeline`](struct.ShapePipeline.html) produces one
//! [`Mesh`](struct.Mesh.html) per fill style and per line style of a shape.
//! Its input is a decoded shape, loaded with
//! [`load_shape`](struct.ShapePipeline.html#method.load_shape), and drawing
//! commands (`begin_fill`, `line_style`, `move_to`, `line_to`, `curve_to`).
//!
//! ## States
//!
//! ```ascii
//!            load_shape                  build
//!   Idle ──────────────────► Dirty ───────────────► Built
//!    │                        ▲                     │ │
//!    │ drawing commands       │ set_morph_ratio     │ │ set_pixel_scale,
//!    ▼                        └─────────────────────┘ │ set_line_thickness
//!   Accumulating ◄──── drawing commands ──────────────┤ (strokes only)
//!        │                                            │
//!        └──────────────────── build ─────────────────┘
//! ```
//!
//! `clear` goes back to `Idle` from any state.
//!
//! Rebuilding from `Dirty` or `Accumulating` resolves all paths again and
//! tessellates every mesh. Changing the pixel scale or the thickness of a
//! line in the `Built` state only runs the stroke tessellator again, on the
//! center-lines prepared by the previous build.

use crate::cache::MeshCache;
use crate::config::PipelineConfig;
use crate::math::Point;
use crate::path::{
    ChainArena, Contour, FillStyle, FlattenedPath, Path, PathBuilder, ShapeContours,
    ShapeDefinition, ShapeScanner, StrokeStyle, StyleKey,
};
use crate::tessellation::{
    FillTessellator, StrokeTessellator, Triangulator, VertexBuffer, VertexLayout,
};

use std::collections::HashMap;
use std::sync::Arc;

/// Where the geometry of a mesh comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum MeshSource {
    /// The records of the loaded shape.
    Shape,
    /// The drawing commands.
    Drawing,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum MeshKind {
    Fill,
    Stroke,
}

/// Identifies a mesh across builds.
///
/// For shapes, `table` and `style` are the [style key](../path/scanner/struct.StyleKey.html)
/// of the mesh and `run` is 0. For drawings, `table` and `style` are 0 and
/// `run` counts the style changes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct MeshId {
    pub source: MeshSource,
    pub kind: MeshKind,
    pub table: u16,
    pub style: u32,
    pub run: u32,
}

impl MeshId {
    fn shape(kind: MeshKind, key: StyleKey) -> Self {
        MeshId {
            source: MeshSource::Shape,
            kind,
            table: key.table,
            style: key.index,
            run: 0,
        }
    }

    fn drawing(kind: MeshKind, run: u32) -> Self {
        MeshId {
            source: MeshSource::Drawing,
            kind,
            table: 0,
            style: 0,
            run,
        }
    }
}

/// The style a mesh is painted with.
#[derive(Clone, Debug, PartialEq)]
pub enum MeshStyle {
    Fill(Arc<FillStyle>),
    Stroke(Arc<StrokeStyle>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub id: MeshId,
    pub style: MeshStyle,
    pub buffer: VertexBuffer,
    /// True if part of the geometry could not be tessellated.
    pub partial: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Nothing to build.
    Idle,
    /// Drawing commands are arriving.
    Accumulating,
    /// The meshes are out of date.
    Dirty,
    /// The meshes are up to date.
    Built,
}

struct LoadedShape {
    contours: ShapeContours,
    fills: Vec<Vec<Contour>>,
    strokes: Vec<Vec<Contour>>,
}

struct DrawingRun {
    id: MeshId,
    style: MeshStyle,
    builder: PathBuilder,
}

// A prepared path, outlined again as is when only the thickness or the
// pixel scale change.
struct Run {
    id: MeshId,
    style: MeshStyle,
    path: FlattenedPath,
}

/// Builds the meshes of a shape.
///
/// # Example
///
/// ```
/// use shapemesh::*;
/// use shapemesh::math::point;
/// use shapemesh::path::{Color, FillStyle, LineCap, LineJoin, StrokeStyle};
///
/// let mut pipeline = ShapePipeline::new(PipelineConfig::default());
///
/// pipeline.begin_fill(FillStyle::solid(Color::BLACK));
/// pipeline.line_style(Some(
///     StrokeStyle::new(2.0, Color::WHITE)
///         .with_joint(LineJoin::Miter)
///         .with_cap(LineCap::None),
/// ));
/// pipeline.move_to(point(0.0, 0.0));
/// pipeline.line_to(point(10.0, 0.0));
/// pipeline.line_to(point(10.0, 10.0));
/// pipeline.line_to(point(0.0, 10.0));
/// pipeline.line_to(point(0.0, 0.0));
/// pipeline.end_fill();
///
/// let meshes = pipeline.build();
/// assert_eq!(meshes.len(), 2);
/// assert_eq!(meshes[0].buffer.triangle_count(), 2);
/// ```
pub struct ShapePipeline {
    config: PipelineConfig,
    state: PipelineState,
    fill_tessellator: FillTessellator,
    stroke_tessellator: StrokeTessellator,
    cache: MeshCache,
    shape: Option<LoadedShape>,
    morph_ratio: f32,
    drawing: Vec<DrawingRun>,
    active_fill: Option<usize>,
    active_line: Option<usize>,
    pen: Point,
    next_run: u32,
    thickness: HashMap<MeshId, f32>,
    runs: Vec<Run>,
    meshes: Vec<Mesh>,
}

impl ShapePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        ShapePipeline {
            config,
            state: PipelineState::Idle,
            fill_tessellator: FillTessellator::new(),
            stroke_tessellator: StrokeTessellator::new(),
            cache: MeshCache::new(),
            shape: None,
            morph_ratio: 0.0,
            drawing: Vec::new(),
            active_fill: None,
            active_line: None,
            pen: Point::new(0.0, 0.0),
            next_run: 0,
            thickness: HashMap::new(),
            runs: Vec::new(),
            meshes: Vec::new(),
        }
    }

    /// Replaces the polygon triangulation used for fills.
    pub fn with_triangulator(mut self, triangulator: Box<dyn Triangulator>) -> Self {
        self.fill_tessellator.set_triangulator(triangulator);
        self
    }

    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    #[inline]
    pub fn morph_ratio(&self) -> f32 {
        self.morph_ratio
    }

    /// The meshes of the last build.
    #[inline]
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.iter().find(|mesh| mesh.id == id)
    }

    #[inline]
    pub fn cache(&self) -> &MeshCache {
        &self.cache
    }

    /// Scans the records of a shape and stitches its contours.
    ///
    /// Replaces the previously loaded shape. Drawing commands are kept.
    pub fn load_shape(&mut self, shape: &ShapeDefinition) {
        let mut contours = ShapeScanner::scan(shape);

        let arena = &mut contours.arena;
        let fills = contours
            .fills
            .iter()
            .map(|set| set.assemble(arena))
            .collect::<Vec<_>>();
        let strokes = contours
            .strokes
            .iter()
            .map(|set| set.assemble(arena))
            .collect::<Vec<_>>();

        log::debug!(
            "loaded a shape with {} fill styles and {} line styles",
            fills.len(),
            strokes.len()
        );

        self.shape = Some(LoadedShape {
            contours,
            fills,
            strokes,
        });
        self.set_state(PipelineState::Dirty);
    }

    /// Starts filling the following drawing commands. Ends the previous fill.
    pub fn begin_fill(&mut self, style: FillStyle) {
        let index = self.start_run(MeshKind::Fill, MeshStyle::Fill(Arc::new(style)));
        self.active_fill = Some(index);
        self.touch();
    }

    pub fn end_fill(&mut self) {
        if let Some(index) = self.active_fill.take() {
            self.drawing[index].builder.end_sub_path();
        }
        self.touch();
    }

    /// Starts stroking the following drawing commands, or stops with `None`.
    pub fn line_style(&mut self, style: Option<StrokeStyle>) {
        if let Some(index) = self.active_line.take() {
            self.drawing[index].builder.end_sub_path();
        }

        if let Some(style) = style {
            let index = self.start_run(MeshKind::Stroke, MeshStyle::Stroke(Arc::new(style)));
            self.active_line = Some(index);
        }
        self.touch();
    }

    pub fn move_to(&mut self, to: Point) {
        self.pen = to;
        self.for_each_active(|builder| builder.move_to(to));
        self.touch();
    }

    pub fn line_to(&mut self, to: Point) {
        self.pen = to;
        self.for_each_active(|builder| builder.line_to(to));
        self.touch();
    }

    pub fn curve_to(&mut self, ctrl: Point, to: Point) {
        self.pen = to;
        self.for_each_active(|builder| builder.curve_to(ctrl, to));
        self.touch();
    }

    /// Tessellates everything that changed since the last build.
    pub fn build(&mut self) -> &[Mesh] {
        match self.state {
            PipelineState::Built => return &self.meshes,
            PipelineState::Idle => return &self.meshes,
            PipelineState::Accumulating | PipelineState::Dirty => {}
        }

        self.recycle_meshes();
        self.resolve_runs();

        let fill_layout = self.config.fill.vertex_layout();
        for run in &self.runs {
            let layout = match run.style {
                MeshStyle::Fill(..) => fill_layout,
                MeshStyle::Stroke(..) => VertexLayout::Position,
            };
            let mut buffer = self.cache.take(run.id, layout);
            let partial = tessellate_run(
                run,
                &self.config,
                &mut self.fill_tessellator,
                &mut self.stroke_tessellator,
                &mut buffer,
            );

            self.meshes.push(Mesh {
                id: run.id,
                style: run.style.clone(),
                buffer,
                partial,
            });
        }

        log::debug!(
            "built {} meshes, {} partial",
            self.meshes.len(),
            self.meshes.iter().filter(|mesh| mesh.partial).count()
        );

        self.set_state(PipelineState::Built);

        &self.meshes
    }

    /// Changes the size of a screen pixel in shape units.
    ///
    /// In the `Built` state, only the strokes are tessellated again.
    pub fn set_pixel_scale(&mut self, scale: f32) {
        if self.config.pixel_scale == scale {
            return;
        }

        self.config.pixel_scale = scale;
        if self.state == PipelineState::Built {
            for index in 0..self.runs.len() {
                self.outline(index);
            }
        }
    }

    /// Overrides the thickness of a line style.
    ///
    /// In the `Built` state, only this stroke is tessellated again. Returns
    /// false if there is no stroke with this id.
    pub fn set_line_thickness(&mut self, id: MeshId, thickness: f32) -> bool {
        if !self.has_stroke(id) {
            return false;
        }

        self.thickness.insert(id, thickness);

        if self.state == PipelineState::Built {
            if let Some(index) = self.runs.iter().position(|run| run.id == id) {
                if let MeshStyle::Stroke(style) = &self.runs[index].style {
                    let style = with_thickness(style, Some(thickness));
                    self.runs[index].style = MeshStyle::Stroke(style);
                }
                self.outline(index);
            }
        }

        true
    }

    /// Changes the interpolation ratio between the shape and its morph target.
    ///
    /// The ratio is clamped to `[0, 1]`.
    pub fn set_morph_ratio(&mut self, ratio: f32) {
        let ratio = ratio.max(0.0).min(1.0);
        if ratio == self.morph_ratio {
            return;
        }

        self.morph_ratio = ratio;
        if self.state == PipelineState::Built {
            self.set_state(PipelineState::Dirty);
        }
    }

    /// Forgets the shape and the drawing commands. The vertex buffers are
    /// kept in the cache.
    pub fn clear(&mut self) {
        self.recycle_meshes();
        self.runs.clear();
        self.shape = None;
        self.drawing.clear();
        self.active_fill = None;
        self.active_line = None;
        self.pen = Point::new(0.0, 0.0);
        self.next_run = 0;
        self.thickness.clear();
        self.morph_ratio = 0.0;
        self.set_state(PipelineState::Idle);
    }

    fn set_state(&mut self, state: PipelineState) {
        if state != self.state {
            log::trace!("pipeline state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn touch(&mut self) {
        self.set_state(PipelineState::Accumulating);
    }

    fn start_run(&mut self, kind: MeshKind, style: MeshStyle) -> usize {
        let previous = match kind {
            MeshKind::Fill => self.active_fill.take(),
            MeshKind::Stroke => self.active_line.take(),
        };
        if let Some(index) = previous {
            self.drawing[index].builder.end_sub_path();
        }

        let mut builder = PathBuilder::new();
        builder.move_to(self.pen);

        self.drawing.push(DrawingRun {
            id: MeshId::drawing(kind, self.next_run),
            style,
            builder,
        });
        self.next_run += 1;

        self.drawing.len() - 1
    }

    fn for_each_active<F: FnMut(&mut PathBuilder)>(&mut self, mut callback: F) {
        for index in self.active_fill.iter().chain(self.active_line.iter()) {
            callback(&mut self.drawing[*index].builder);
        }
    }

    fn has_stroke(&self, id: MeshId) -> bool {
        if id.kind != MeshKind::Stroke {
            return false;
        }

        match id.source {
            MeshSource::Drawing => self.drawing.iter().any(|run| run.id == id),
            MeshSource::Shape => match &self.shape {
                Some(shape) => shape
                    .contours
                    .strokes
                    .iter()
                    .any(|set| MeshId::shape(MeshKind::Stroke, set.key) == id),
                None => false,
            },
        }
    }

    fn recycle_meshes(&mut self) {
        for mesh in self.meshes.drain(..) {
            self.cache.recycle(mesh.id, mesh.buffer);
        }
    }

    fn resolve_runs(&mut self) {
        let runs = &mut self.runs;
        runs.clear();

        let fill_options = self.config.fill.prepare_options();
        let stroke_options = self.config.stroke.prepare_options();

        if let Some(shape) = &self.shape {
            let arena = &shape.contours.arena;
            for (set, contours) in shape.contours.fills.iter().zip(&shape.fills) {
                runs.push(Run {
                    id: MeshId::shape(MeshKind::Fill, set.key),
                    style: MeshStyle::Fill(Arc::clone(&set.style)),
                    path: contours_to_path(contours, arena, self.morph_ratio)
                        .prepare(&fill_options),
                });
            }
            for (set, contours) in shape.contours.strokes.iter().zip(&shape.strokes) {
                let id = MeshId::shape(MeshKind::Stroke, set.key);
                runs.push(Run {
                    id,
                    style: MeshStyle::Stroke(with_thickness(&set.style, self.thickness.get(&id).cloned())),
                    path: contours_to_path(contours, arena, self.morph_ratio)
                        .prepare(&stroke_options),
                });
            }
        }

        for run in &self.drawing {
            let (style, options) = match &run.style {
                MeshStyle::Stroke(style) => (
                    MeshStyle::Stroke(with_thickness(style, self.thickness.get(&run.id).cloned())),
                    &stroke_options,
                ),
                fill => (fill.clone(), &fill_options),
            };
            runs.push(Run {
                id: run.id,
                style,
                path: run.builder.clone().build().prepare(options),
            });
        }
    }

    // Tessellates the stroke of a run again, in place.
    fn outline(&mut self, index: usize) {
        let run = &self.runs[index];
        if let MeshStyle::Stroke(..) = run.style {
            let mesh = &mut self.meshes[index];
            mesh.buffer.clear();
            mesh.partial = tessellate_run(
                run,
                &self.config,
                &mut self.fill_tessellator,
                &mut self.stroke_tessellator,
                &mut mesh.buffer,
            );
            mesh.style = run.style.clone();
        }
    }
}

impl Default for ShapePipeline {
    fn default() -> Self {
        ShapePipeline::new(PipelineConfig::default())
    }
}

impl std::fmt::Debug for ShapePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapePipeline")
            .field("state", &self.state)
            .field("meshes", &self.meshes.len())
            .finish()
    }
}

fn contours_to_path(contours: &[Contour], arena: &ChainArena, ratio: f32) -> Path {
    let mut builder = PathBuilder::new();
    for contour in contours {
        contour.build_into(arena, ratio, &mut builder);
    }

    builder.build()
}

fn with_thickness(style: &Arc<StrokeStyle>, thickness: Option<f32>) -> Arc<StrokeStyle> {
    match thickness {
        Some(thickness) if thickness != style.thickness => {
            Arc::new(StrokeStyle::clone(style).with_thickness(thickness))
        }
        _ => Arc::clone(style),
    }
}

// Returns true if the mesh is partial.
fn tessellate_run(
    run: &Run,
    config: &PipelineConfig,
    fill: &mut FillTessellator,
    stroke: &mut StrokeTessellator,
    buffer: &mut VertexBuffer,
) -> bool {
    match &run.style {
        MeshStyle::Fill(..) => match fill.tessellate_flattened(&run.path, &config.fill, buffer) {
            Ok(outcome) => outcome.is_partial(),
            Err(e) => {
                log::warn!("fill {:?} was not tessellated: {}", run.id, e);
                true
            }
        },
        MeshStyle::Stroke(style) => {
            let result = stroke.tessellate_flattened(
                &run.path,
                style,
                config.pixel_scale,
                &config.stroke,
                buffer,
            );
            match result {
                Ok(..) => false,
                Err(e) => {
                    log::warn!("stroke {:?} was not tessellated: {}", run.id, e);
                    true
                }
            }
        }
    }
}
