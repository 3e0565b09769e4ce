use shapemesh::math::{point, Box2D, Point};
use shapemesh::path::{
    Color, FillStyle, LineCap, LineJoin, ScaleMode, ShapeDefinition, ShapeRecord, StrokeStyle,
    StyleChange, StyleTable, TwipPoint,
};
use shapemesh::tessellation::geom::QuadraticBezierSegment;
use shapemesh::tessellation::math_utils::orientation;
use shapemesh::tessellation::stroke::curve_rails;
use shapemesh::tessellation::{FillOptions, FillRule, OracleError, StrokeOptions, VertexBuffer};
use shapemesh::*;

fn assert_almost_eq(a: f32, b: f32, epsilon: f32) {
    if (a - b).abs() > epsilon {
        panic!("assert almost equal: {} != {}", a, b);
    }
}

fn assert_box(buffer: &VertexBuffer, min: (f32, f32), max: (f32, f32)) {
    let bb: Box2D = buffer.bounding_box().unwrap();
    assert_almost_eq(bb.min.x, min.0, 0.001);
    assert_almost_eq(bb.min.y, min.1, 0.001);
    assert_almost_eq(bb.max.x, max.0, 0.001);
    assert_almost_eq(bb.max.y, max.1, 0.001);
}

fn orientations(buffer: &VertexBuffer) -> Vec<f32> {
    buffer
        .triangles()
        .map(|[a, b, c]| orientation(a, b, c))
        .collect()
}

fn draw_polygon(pipeline: &mut ShapePipeline, points: &[Point]) {
    pipeline.move_to(points[0]);
    for p in &points[1..] {
        pipeline.line_to(*p);
    }
}

fn square() -> Vec<Point> {
    vec![
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(10.0, 10.0),
        point(0.0, 10.0),
        point(0.0, 0.0),
    ]
}

fn solid(rgb: u32) -> FillStyle {
    FillStyle::solid(Color::from_rgb(rgb, 255))
}

fn miter_line(thickness: f32) -> StrokeStyle {
    StrokeStyle::new(thickness, Color::BLACK)
        .with_joint(LineJoin::Miter)
        .with_cap(LineCap::None)
}

fn style_change() -> StyleChange {
    StyleChange::new()
}

#[test]
fn square_fill() {
    let mut pipeline = ShapePipeline::default();
    pipeline.begin_fill(solid(0xff0000));
    draw_polygon(&mut pipeline, &square());
    pipeline.end_fill();
    assert_eq!(pipeline.state(), PipelineState::Accumulating);

    let meshes = pipeline.build();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].id.kind, MeshKind::Fill);
    assert_eq!(meshes[0].id.source, MeshSource::Drawing);
    assert!(!meshes[0].partial);
    assert_eq!(meshes[0].buffer.triangle_count(), 2);
    assert_eq!(meshes[0].buffer.area(), 100.0);
    assert!(orientations(&meshes[0].buffer).iter().all(|&o| o > 0.0));
    assert_eq!(pipeline.state(), PipelineState::Built);
}

#[test]
fn reversed_square_fill() {
    let mut points = square();
    points.reverse();

    let mut pipeline = ShapePipeline::default();
    pipeline.begin_fill(solid(0xff0000));
    draw_polygon(&mut pipeline, &points);

    let meshes = pipeline.build();
    assert_eq!(meshes[0].buffer.triangle_count(), 2);
    assert!(orientations(&meshes[0].buffer).iter().all(|&o| o < 0.0));
}

#[test]
fn square_stroke() {
    let mut pipeline = ShapePipeline::default();
    pipeline.line_style(Some(miter_line(2.0)));
    draw_polygon(&mut pipeline, &square());

    let meshes = pipeline.build();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].id.kind, MeshKind::Stroke);

    // Outer boundary 12x12, inner boundary 8x8.
    let buffer = &meshes[0].buffer;
    assert_box(buffer, (-1.0, -1.0), (11.0, 11.0));
    let inner = Box2D::new(point(1.0, 1.0), point(9.0, 9.0));
    for [a, b, c] in buffer.triangles() {
        let center = point((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
        assert!(!inner.contains(center), "{:?}", center);
    }
}

#[test]
fn degenerate_curve_is_a_line() {
    let mut pipeline = ShapePipeline::default();
    pipeline.line_style(Some(miter_line(2.0)));
    pipeline.move_to(point(0.0, 0.0));
    pipeline.curve_to(point(5.0, 5.0), point(5.0, 5.0));

    let meshes = pipeline.build();
    assert_eq!(meshes[0].buffer.triangle_count(), 2);
    let d = (0.5f32).sqrt();
    assert_box(&meshes[0].buffer, (-d, -d), (5.0 + d, 5.0 + d));
}

#[test]
fn shape_with_adjacent_fills() {
    let mut styles = StyleTable::new();
    let left = styles.add_fill(solid(0xff0000));
    let right = styles.add_fill(solid(0x0000ff));

    let records = vec![
        ShapeRecord::StyleChange(
            style_change()
                .with_move_to(TwipPoint::new(0, 0))
                .with_fill_style_1(left),
        ),
        ShapeRecord::line_to(200, 0),
        // Shared by both squares.
        ShapeRecord::StyleChange(style_change().with_fill_style_0(right)),
        ShapeRecord::line_to(200, 200),
        ShapeRecord::StyleChange(style_change().with_fill_style_0(0)),
        ShapeRecord::line_to(0, 200),
        ShapeRecord::line_to(0, 0),
        ShapeRecord::StyleChange(
            style_change()
                .with_move_to(TwipPoint::new(200, 0))
                .with_fill_style_1(right),
        ),
        ShapeRecord::line_to(400, 0),
        ShapeRecord::line_to(400, 200),
        ShapeRecord::line_to(200, 200),
    ];

    let mut pipeline = ShapePipeline::default();
    pipeline.load_shape(&ShapeDefinition::new(styles, records));
    assert_eq!(pipeline.state(), PipelineState::Dirty);

    let meshes = pipeline.build();
    assert_eq!(meshes.len(), 2);
    assert_eq!(meshes[0].id.style, left);
    assert_eq!(meshes[1].id.style, right);
    assert_eq!(meshes[0].style, MeshStyle::Fill(std::sync::Arc::new(solid(0xff0000))));

    assert_almost_eq(meshes[0].buffer.area(), 100.0, 0.001);
    assert_almost_eq(meshes[1].buffer.area(), 100.0, 0.001);
    assert_box(&meshes[0].buffer, (0.0, 0.0), (10.0, 10.0));
    assert_box(&meshes[1].buffer, (10.0, 0.0), (20.0, 10.0));
}

#[test]
fn same_fill_on_both_sides_is_not_a_boundary() {
    let mut styles = StyleTable::new();
    let fill = styles.add_fill(solid(0x00ff00));

    // A square with a diagonal that has the fill on both sides.
    let records = vec![
        ShapeRecord::StyleChange(
            style_change()
                .with_move_to(TwipPoint::new(0, 0))
                .with_fill_style_1(fill),
        ),
        ShapeRecord::line_to(200, 0),
        ShapeRecord::line_to(200, 200),
        ShapeRecord::line_to(0, 200),
        ShapeRecord::line_to(0, 0),
        ShapeRecord::StyleChange(style_change().with_fill_style_0(fill)),
        ShapeRecord::line_to(200, 200),
    ];

    let mut pipeline = ShapePipeline::default();
    pipeline.load_shape(&ShapeDefinition::new(styles, records));

    let meshes = pipeline.build();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].buffer.triangle_count(), 2);
    assert_almost_eq(meshes[0].buffer.area(), 100.0, 0.001);
}

#[test]
fn overlapping_sub_paths_follow_the_fill_rule() {
    let offset: Vec<Point> = square().iter().map(|p| point(p.x + 5.0, p.y + 5.0)).collect();
    let overlap = point(7.5, 7.5);
    let covers = |[a, b, c]: [Point; 3], p: Point| {
        let (ab, bc, ca) = (orientation(a, b, p), orientation(b, c, p), orientation(c, a, p));
        (ab >= 0.0 && bc >= 0.0 && ca >= 0.0) || (ab <= 0.0 && bc <= 0.0 && ca <= 0.0)
    };

    for (rule, area) in [(FillRule::NonZero, 175.0), (FillRule::EvenOdd, 150.0)] {
        let fill = FillOptions::default().with_fill_rule(rule);
        let mut pipeline = ShapePipeline::new(PipelineConfig::default().with_fill(fill));
        pipeline.begin_fill(solid(0x00ff00));
        draw_polygon(&mut pipeline, &square());
        draw_polygon(&mut pipeline, &offset);
        pipeline.end_fill();

        let meshes = pipeline.build();
        assert_eq!(meshes.len(), 1);
        assert!(!meshes[0].partial);
        assert_almost_eq(meshes[0].buffer.area(), area, 0.01);
        assert_box(&meshes[0].buffer, (0.0, 0.0), (15.0, 15.0));

        let covered = meshes[0].buffer.triangles().any(|t| covers(t, overlap));
        assert_eq!(covered, rule == FillRule::NonZero);
    }
}

fn mesh_vertices(pipeline: &mut ShapePipeline) -> Vec<Vec<f32>> {
    pipeline
        .build()
        .iter()
        .map(|mesh| mesh.buffer.vertices.clone())
        .collect()
}

#[test]
fn builds_are_deterministic() {
    let draw = |pipeline: &mut ShapePipeline| {
        pipeline.begin_fill(solid(0x808080));
        pipeline.line_style(Some(StrokeStyle::new(3.0, Color::BLACK)));
        pipeline.move_to(point(0.0, 0.0));
        pipeline.curve_to(point(30.0, -20.0), point(60.0, 0.0));
        pipeline.curve_to(point(50.0, 30.0), point(60.0, 60.0));
        pipeline.line_to(point(0.0, 60.0));
        pipeline.curve_to(point(10.0, 30.0), point(0.0, 0.0));
        // A hole with a curved side.
        pipeline.move_to(point(20.0, 20.0));
        pipeline.line_to(point(20.0, 40.0));
        pipeline.curve_to(point(30.0, 45.0), point(40.0, 40.0));
        pipeline.line_to(point(20.0, 20.0));
        pipeline.end_fill();
    };

    let config = PipelineConfig::default().with_fill(FillOptions::non_zero());
    let mut first = ShapePipeline::new(config);
    let mut second = ShapePipeline::new(config);
    draw(&mut first);
    draw(&mut second);

    let a = mesh_vertices(&mut first);
    assert_eq!(a.len(), 2);
    assert!(a.iter().all(|vertices| !vertices.is_empty()));
    assert_eq!(a, mesh_vertices(&mut second));

    // Resolving and tessellating everything again gives the same vertices.
    first.set_morph_ratio(0.5);
    first.set_morph_ratio(0.0);
    assert_eq!(first.state(), PipelineState::Dirty);
    assert_eq!(a, mesh_vertices(&mut first));
}

#[test]
fn morph_ratio() {
    let mut styles = StyleTable::new();
    let fill = styles.add_fill(solid(0xff0000));

    let square = |size: i32| {
        vec![
            ShapeRecord::StyleChange(
                style_change()
                    .with_move_to(TwipPoint::new(0, 0))
                    .with_fill_style_1(fill),
            ),
            ShapeRecord::line_to(size, 0),
            ShapeRecord::line_to(size, size),
            ShapeRecord::line_to(0, size),
            ShapeRecord::line_to(0, 0),
        ]
    };

    let shape = ShapeDefinition::new(styles, square(200)).with_morph_records(square(400));

    let mut pipeline = ShapePipeline::default();
    pipeline.load_shape(&shape);
    assert_almost_eq(pipeline.build()[0].buffer.area(), 100.0, 0.001);

    pipeline.set_morph_ratio(1.0);
    assert_eq!(pipeline.state(), PipelineState::Dirty);
    assert_almost_eq(pipeline.build()[0].buffer.area(), 400.0, 0.001);

    pipeline.set_morph_ratio(0.5);
    assert_almost_eq(pipeline.build()[0].buffer.area(), 225.0, 0.001);

    pipeline.set_morph_ratio(2.0);
    assert_eq!(pipeline.morph_ratio(), 1.0);
}

#[test]
fn thickness_change_only_outlines_again() {
    let mut pipeline = ShapePipeline::default();
    pipeline.begin_fill(solid(0xff0000));
    pipeline.line_style(Some(miter_line(2.0)));
    draw_polygon(&mut pipeline, &square());
    pipeline.end_fill();

    let (fill_id, stroke_id, fill_vertices) = {
        let meshes = pipeline.build();
        (meshes[0].id, meshes[1].id, meshes[0].buffer.vertices.clone())
    };
    assert_box(&pipeline.meshes()[1].buffer, (-1.0, -1.0), (11.0, 11.0));

    assert!(!pipeline.set_line_thickness(fill_id, 4.0));
    assert!(pipeline.set_line_thickness(stroke_id, 4.0));
    assert_eq!(pipeline.state(), PipelineState::Built);

    let stroke = pipeline.mesh(stroke_id).unwrap();
    assert_box(&stroke.buffer, (-2.0, -2.0), (12.0, 12.0));
    match &stroke.style {
        MeshStyle::Stroke(style) => assert_eq!(style.thickness, 4.0),
        style => panic!("unexpected style {:?}", style),
    }
    assert_eq!(pipeline.mesh(fill_id).unwrap().buffer.vertices, fill_vertices);

    // The override survives a full rebuild.
    pipeline.set_morph_ratio(0.5);
    pipeline.build();
    assert_box(&pipeline.mesh(stroke_id).unwrap().buffer, (-2.0, -2.0), (12.0, 12.0));
}

#[test]
fn outlining_again_matches_a_fresh_build() {
    let draw = |pipeline: &mut ShapePipeline, thickness: f32| {
        pipeline.line_style(Some(StrokeStyle::new(thickness, Color::BLACK)));
        pipeline.move_to(point(0.0, 0.0));
        pipeline.curve_to(point(50.0, 0.0), point(50.0, 50.0));
        pipeline.line_to(point(0.0, 50.0));
    };

    let mut pipeline = ShapePipeline::default();
    draw(&mut pipeline, 2.0);
    let id = pipeline.build()[0].id;
    assert!(pipeline.set_line_thickness(id, 6.0));
    pipeline.set_pixel_scale(0.25);
    assert_eq!(pipeline.state(), PipelineState::Built);

    let mut fresh = ShapePipeline::new(PipelineConfig::default().with_pixel_scale(0.25));
    draw(&mut fresh, 6.0);
    assert_eq!(
        pipeline.meshes()[0].buffer.vertices,
        mesh_vertices(&mut fresh)[0]
    );
}

#[test]
fn pixel_scale_change() {
    let hairline = StrokeStyle::new(0.0, Color::BLACK)
        .with_cap(LineCap::None)
        .with_scale_mode(ScaleMode::Hairline);

    let mut pipeline = ShapePipeline::default();
    pipeline.line_style(Some(hairline));
    pipeline.move_to(point(0.0, 0.0));
    pipeline.line_to(point(10.0, 0.0));

    assert_box(&pipeline.build()[0].buffer, (0.0, -0.5), (10.0, 0.5));

    pipeline.set_pixel_scale(0.25);
    assert_eq!(pipeline.state(), PipelineState::Built);
    assert_eq!(pipeline.config().pixel_scale, 0.25);
    assert_box(&pipeline.meshes()[0].buffer, (0.0, -2.0), (10.0, 2.0));

    pipeline.set_pixel_scale(0.0);
    assert!(pipeline.meshes()[0].partial);
    assert!(pipeline.meshes()[0].buffer.is_empty());
}

#[test]
fn oracle_failure_only_affects_its_fill() {
    let oracle = |_: &[Vec<Point>], _: FillRule| -> Result<Vec<[Point; 3]>, OracleError> {
        Err(OracleError::Unavailable)
    };

    let mut pipeline = ShapePipeline::default().with_triangulator(Box::new(oracle));
    pipeline.begin_fill(solid(0xff0000));
    pipeline.line_style(Some(miter_line(2.0)));
    draw_polygon(&mut pipeline, &square());

    let meshes = pipeline.build();
    assert!(meshes[0].partial);
    assert!(meshes[0].buffer.is_empty());
    assert!(!meshes[1].partial);
    assert_eq!(meshes[1].buffer.triangle_count(), 16);
}

#[test]
fn tight_curve_stroke() {
    let curve = QuadraticBezierSegment {
        from: point(0.0, -1.0),
        ctrl: point(10.0, 0.0),
        to: point(0.0, 1.0),
    };

    let mut pipeline = ShapePipeline::default();
    pipeline.line_style(Some(StrokeStyle::new(10.0, Color::BLACK).with_cap(LineCap::None)));
    pipeline.move_to(curve.from);
    pipeline.curve_to(curve.ctrl, curve.to);

    let meshes = pipeline.build();
    assert!(!meshes[0].partial);
    assert!(!meshes[0].buffer.is_empty());

    let mut pieces = Vec::new();
    curve_rails(&curve, 5.0, StrokeOptions::DEFAULT_MAX_RAIL_DEPTH, &mut pieces);
    assert!(pieces.len() > 1);
    assert!(pieces.iter().all(|piece| !piece.overlaps()));
}

#[test]
fn clear_keeps_the_buffers() {
    let mut pipeline = ShapePipeline::default();
    pipeline.begin_fill(solid(0xff0000));
    draw_polygon(&mut pipeline, &square());
    pipeline.build();

    pipeline.clear();
    assert_eq!(pipeline.state(), PipelineState::Idle);
    assert!(pipeline.meshes().is_empty());
    assert_eq!(pipeline.cache().len(), 1);
    assert!(pipeline.build().is_empty());
}
