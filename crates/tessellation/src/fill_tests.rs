use crate::geometry_builder::*;
use crate::math::*;
use crate::math_utils::orientation;
use crate::path::Path;
use crate::{FillOptions, FillOutcome, FillRule, FillTessellator, OracleError, TessellationError};
use crate::{FlatteningOptions, UnsupportedParameter};

fn polygon_path(points: &[(f32, f32)]) -> Path {
    let mut builder = Path::builder();
    builder.move_to(point(points[0].0, points[0].1));
    for p in &points[1..] {
        builder.line_to(point(p.0, p.1));
    }
    builder.build()
}

fn tessellate(path: &Path, options: &FillOptions) -> (VertexBuffer, FillOutcome) {
    let mut buffer = VertexBuffer::new(options.vertex_layout());
    let mut tessellator = FillTessellator::new();
    let outcome = tessellator.tessellate_path(path, options, &mut buffer).unwrap();
    (buffer, outcome)
}

fn assert_almost_eq(a: f32, b: f32, epsilon: f32) {
    if (a - b).abs() > epsilon {
        panic!("assert almost equal: {} != {}", a, b);
    }
}

fn orientations(buffer: &VertexBuffer) -> Vec<f32> {
    buffer
        .triangles()
        .map(|[a, b, c]| orientation(a, b, c))
        .collect()
}

#[test]
fn square() {
    let path = polygon_path(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
    let (buffer, outcome) = tessellate(&path, &FillOptions::default());

    assert_eq!(outcome.count.triangles, 2);
    assert_eq!(outcome.count.vertices, 6);
    assert!(!outcome.oracle_failed);
    assert_eq!(buffer.area(), 100.0);
    assert!(orientations(&buffer).iter().all(|&o| o > 0.0));
}

#[test]
fn reversed_square_reverses_triangles() {
    let path = polygon_path(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]);
    let (buffer, outcome) = tessellate(&path, &FillOptions::default());

    assert_eq!(outcome.count.triangles, 2);
    assert_eq!(buffer.area(), 100.0);
    assert!(orientations(&buffer).iter().all(|&o| o < 0.0));
}

#[test]
fn curve_classification_follows_the_winding() {
    let options = FillOptions::default().with_analytic_curves(true);

    // The body of the shape is above the curve, which bulges downwards.
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.curve_to(point(5.0, -5.0), point(10.0, 0.0));
    builder.line_to(point(10.0, 10.0));
    builder.line_to(point(0.0, 10.0));
    builder.line_to(point(0.0, 0.0));
    let above = builder.build();

    // Same curve, with the body below it.
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.curve_to(point(5.0, -5.0), point(10.0, 0.0));
    builder.line_to(point(10.0, -10.0));
    builder.line_to(point(0.0, -10.0));
    builder.line_to(point(0.0, 0.0));
    let below = builder.build();

    let (buffer, _) = tessellate(&above, &options);
    assert_eq!(buffer.triangle_count(), 3);
    assert_eq!(buffer.triangle_kind(2), TriangleKind::Convex);
    assert!(orientations(&buffer).iter().all(|&o| o > 0.0));

    let (buffer, _) = tessellate(&below, &options);
    // The polygon goes through the control point, the square is now a pentagon.
    assert_eq!(buffer.triangle_count(), 4);
    assert_eq!(buffer.triangle_kind(3), TriangleKind::Concave);
    assert!(orientations(&buffer).iter().all(|&o| o < 0.0));
    // The curve triangle is subtracted from the polygon then added back.
    assert_almost_eq(buffer.area(), 100.0, 0.001);
}

#[test]
fn convex_curves_are_tiled() {
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.curve_to(point(5.0, -5.0), point(10.0, 0.0));
    builder.line_to(point(10.0, 10.0));
    builder.line_to(point(0.0, 10.0));
    builder.line_to(point(0.0, 0.0));
    let path = builder.build();

    let (buffer, outcome) = tessellate(&path, &FillOptions::default());
    assert!(outcome.count.triangles > 3);
    assert_eq!(buffer.layout(), VertexLayout::Position);

    // The exact area is 100 + 2/3 * 25.
    let area = buffer.area();
    assert!(area > 116.0, "{}", area);
    assert!(area <= 116.67, "{}", area);
    assert!(orientations(&buffer).iter().all(|&o| o >= 0.0));
}

#[test]
fn concave_curves_are_flattened() {
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.curve_to(point(5.0, 5.0), point(10.0, 0.0));
    builder.line_to(point(10.0, 10.0));
    builder.line_to(point(0.0, 10.0));
    builder.line_to(point(0.0, 0.0));
    let path = builder.build();

    let (buffer, _) = tessellate(&path, &FillOptions::default());

    // The exact area is 100 - 2/3 * 25.
    let area = buffer.area();
    assert!(area >= 83.33, "{}", area);
    assert!(area < 84.0, "{}", area);
}

#[test]
fn finer_flattening_gets_closer_to_the_curve() {
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.curve_to(point(50.0, 100.0), point(100.0, 0.0));
    builder.line_to(point(0.0, 0.0));
    let path = builder.build();

    let exact = 2.0 / 3.0 * 5000.0;
    let coarse = FillOptions::default().with_flattening(FlatteningOptions::DEFAULT.with_max_depth(1));
    let fine = FillOptions::default().with_flattening(FlatteningOptions::DEFAULT.with_max_depth(5));

    let coarse_area = tessellate(&path, &coarse).0.area();
    let fine_area = tessellate(&path, &fine).0.area();
    assert!(coarse_area < fine_area);
    assert!(exact - fine_area < exact - coarse_area);
    assert!(fine_area <= exact + 0.01);
}

#[test]
fn hole() {
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.line_to(point(10.0, 0.0));
    builder.line_to(point(10.0, 10.0));
    builder.line_to(point(0.0, 10.0));
    builder.line_to(point(0.0, 0.0));
    builder.move_to(point(2.0, 2.0));
    builder.line_to(point(2.0, 8.0));
    builder.line_to(point(8.0, 8.0));
    builder.line_to(point(8.0, 2.0));
    builder.line_to(point(2.0, 2.0));
    let path = builder.build();

    for &rule in &[FillRule::EvenOdd, FillRule::NonZero] {
        let (buffer, outcome) = tessellate(&path, &FillOptions::default().with_fill_rule(rule));
        assert!(!outcome.oracle_failed);
        assert_almost_eq(buffer.area(), 64.0, 0.001);
    }
}

#[test]
fn overlapping_contours_follow_the_fill_rule() {
    let mut builder = Path::builder();
    for &(x, y) in &[(0.0f32, 0.0f32), (3.0, 3.0)] {
        builder.move_to(point(x, y));
        builder.line_to(point(x + 10.0, y));
        builder.line_to(point(x + 10.0, y + 10.0));
        builder.line_to(point(x, y + 10.0));
        builder.line_to(point(x, y));
    }
    let path = builder.build();

    // The union of both squares.
    let (buffer, outcome) = tessellate(&path, &FillOptions::non_zero());
    assert!(!outcome.oracle_failed);
    assert_eq!(outcome.dropped_contours, 0);
    assert_almost_eq(buffer.area(), 151.0, 0.01);
    assert!(orientations(&buffer).iter().all(|&o| o >= 0.0));

    // Without the 7x7 overlap.
    let (buffer, outcome) = tessellate(&path, &FillOptions::even_odd());
    assert!(!outcome.oracle_failed);
    assert_almost_eq(buffer.area(), 102.0, 0.01);
}

#[test]
fn self_intersecting_contour() {
    let path = polygon_path(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0), (0.0, 0.0)]);

    for &rule in &[FillRule::EvenOdd, FillRule::NonZero] {
        let (buffer, outcome) = tessellate(&path, &FillOptions::default().with_fill_rule(rule));
        assert!(!outcome.oracle_failed);
        assert_almost_eq(buffer.area(), 50.0, 0.01);
    }
}

#[test]
fn oracle_failure_keeps_curve_triangles() {
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.curve_to(point(5.0, -5.0), point(10.0, 0.0));
    builder.line_to(point(10.0, 10.0));
    builder.line_to(point(0.0, 10.0));
    builder.line_to(point(0.0, 0.0));
    let path = builder.build();

    let mut tessellator = FillTessellator::with_triangulator(Box::new(
        |_: &[Vec<Point>], _: FillRule| -> Result<Vec<[Point; 3]>, OracleError> {
            Err(OracleError::Rejected("self-intersecting".to_string()))
        },
    ));

    let options = FillOptions::default().with_analytic_curves(true);
    let mut buffer = VertexBuffer::new(options.vertex_layout());
    let outcome = tessellator.tessellate_path(&path, &options, &mut buffer).unwrap();

    assert!(outcome.oracle_failed);
    assert!(outcome.is_partial());
    assert_eq!(outcome.count.triangles, 1);
    assert_eq!(buffer.triangle_kind(0), TriangleKind::Convex);
}

#[test]
fn curves_only_contour_does_not_need_the_oracle() {
    // A lens made of two curves has no polygonal part.
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.curve_to(point(5.0, -5.0), point(10.0, 0.0));
    builder.curve_to(point(5.0, 5.0), point(0.0, 0.0));
    let path = builder.build();

    let mut tessellator = FillTessellator::with_triangulator(Box::new(
        |_: &[Vec<Point>], _: FillRule| -> Result<Vec<[Point; 3]>, OracleError> {
            Err(OracleError::Unavailable)
        },
    ));

    let mut buffer = VertexBuffer::new(VertexLayout::Position);
    let outcome = tessellator
        .tessellate_path(&path, &FillOptions::default(), &mut buffer)
        .unwrap();

    assert!(!outcome.oracle_failed);
    assert_eq!(outcome.dropped_contours, 1);
    assert!(outcome.count.triangles > 2);
    assert!(buffer.area() > 30.0);
}

#[test]
fn open_contours_are_closed() {
    let path = polygon_path(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);

    let (buffer, outcome) = tessellate(&path, &FillOptions::default());
    assert_eq!(outcome.count.triangles, 1);
    assert_eq!(buffer.area(), 50.0);

    let (buffer, outcome) = tessellate(&path, &FillOptions::default().with_force_close(false));
    assert_eq!(outcome.dropped_contours, 1);
    assert!(buffer.is_empty());
}

#[test]
fn degenerate_contours_are_dropped() {
    let path = polygon_path(&[(0.0, 0.0), (5.0, 0.0), (0.0, 0.0)]);
    let (buffer, outcome) = tessellate(&path, &FillOptions::default());

    assert!(buffer.is_empty());
    assert_eq!(outcome.count, Count::default());
    assert!(!outcome.oracle_failed);
}

#[test]
fn nan_positions_are_rejected() {
    let path = polygon_path(&[(0.0, 0.0), (f32::NAN, 0.0), (10.0, 10.0), (0.0, 0.0)]);
    let mut buffer = VertexBuffer::new(VertexLayout::Position);
    let result = FillTessellator::new().tessellate_path(&path, &FillOptions::default(), &mut buffer);

    assert_eq!(
        result,
        Err(TessellationError::UnsupportedParameter(
            UnsupportedParameter::PositionIsNaN
        ))
    );
    assert!(buffer.is_empty());
}

#[test]
fn tessellation_is_deterministic() {
    let mut builder = Path::builder();
    builder.move_to(point(0.0, 0.0));
    builder.curve_to(point(30.0, -20.0), point(60.0, 0.0));
    builder.curve_to(point(50.0, 30.0), point(60.0, 60.0));
    builder.line_to(point(0.0, 60.0));
    builder.curve_to(point(10.0, 30.0), point(0.0, 0.0));
    builder.move_to(point(20.0, 20.0));
    builder.line_to(point(20.0, 40.0));
    builder.line_to(point(40.0, 40.0));
    builder.line_to(point(20.0, 20.0));
    let path = builder.build();

    for &analytic in &[false, true] {
        let options = FillOptions::non_zero().with_analytic_curves(analytic);
        let mut tessellator = FillTessellator::new();
        let mut first = VertexBuffer::new(options.vertex_layout());
        let mut second = VertexBuffer::new(options.vertex_layout());
        tessellator.tessellate_path(&path, &options, &mut first).unwrap();
        tessellator.tessellate_path(&path, &options, &mut second).unwrap();
        let mut fresh = VertexBuffer::new(options.vertex_layout());
        FillTessellator::new().tessellate_path(&path, &options, &mut fresh).unwrap();

        assert!(!first.is_empty());
        assert_eq!(first.vertices, second.vertices);
        assert_eq!(first.vertices, fresh.vertices);
    }
}

#[test]
fn count_only() {
    let path = polygon_path(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
    let mut output = NoOutput::new();
    let outcome = FillTessellator::new()
        .tessellate_path(&path, &FillOptions::default(), &mut output)
        .unwrap();

    assert_eq!(outcome.count, Count { vertices: 6, triangles: 2 });
}
