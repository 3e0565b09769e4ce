//! Fill and line style value types.
//!
//! Styles are immutable and shared through `Arc`. The tessellators only read
//! the stroke parameters; everything else is carried unchanged to the output
//! meshes so that the caller can turn it into a material.

use crate::math::Transform;

use std::sync::Arc;

/// An 8 bit per channel RGBA color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Color::new(0, 0, 0, 255);
    pub const WHITE: Self = Color::new(255, 255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Builds a color from a `0xRRGGBB` value and an alpha.
    #[inline]
    pub const fn from_rgb(rgb: u32, alpha: u8) -> Self {
        Color {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: alpha,
        }
    }

    #[inline]
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum GradientKind {
    Linear,
    Radial,
    /// Radial gradient with a focal point, see `Gradient::focal_ratio`.
    Focal,
}

/// What happens past the ends of a gradient.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum GradientSpread {
    Pad,
    Reflect,
    Repeat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum GradientInterpolation {
    Rgb,
    LinearRgb,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct GradientStop {
    /// Position of the stop, 0 to 255.
    pub ratio: u8,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Gradient {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
    /// Maps the gradient square to shape space.
    pub matrix: Transform,
    pub spread: GradientSpread,
    pub interpolation: GradientInterpolation,
    /// Position of the focal point along the x axis of the gradient, in `[-1, 1]`.
    pub focal_ratio: f32,
}

/// Opaque reference to an image owned by the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ImageRef(pub u32);

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct BitmapFill {
    pub image: ImageRef,
    pub matrix: Transform,
    pub repeat: bool,
    pub smooth: bool,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FillStyle {
    Solid { color: Color },
    Gradient(Gradient),
    Bitmap(BitmapFill),
}

impl FillStyle {
    #[inline]
    pub fn solid(color: Color) -> Self {
        FillStyle::Solid { color }
    }
}

/// Line cap as defined by the SVG specification.
///
/// See: <https://svgwg.org/specs/strokes/#StrokeLinecapProperty>
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineCap {
    /// The stroke ends exactly at the end point of the path.
    None,
    /// A half circle is added at the end of the stroke.
    Round,
    /// The stroke is extended by half of its thickness past the end point.
    Square,
}

/// Line join as defined by the SVG specification.
///
/// See: <https://svgwg.org/specs/strokes/#StrokeLinejoinProperty>
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineJoin {
    /// A sharp corner is to be used to join path segments, unless the miter
    /// limit is exceeded, in which case the corner is cut off.
    Miter,
    /// A round corner is to be used to join path segments.
    Round,
    /// A beveled corner is to be used to join path segments.
    /// The bevel shape is a triangle that fills the area between the two stroked
    /// segments.
    Bevel,
}

/// How the stroke thickness reacts to the pixel scale of the display.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum ScaleMode {
    /// Scales with the shape, never thinner than one pixel.
    Normal,
    /// Keeps the same thickness on screen whatever the scale.
    None,
    Vertical,
    Horizontal,
    /// Always one pixel wide.
    Hairline,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StrokeStyle {
    pub color: Color,
    /// Line width in pixels.
    pub thickness: f32,
    pub joint: LineJoin,
    pub cap: LineCap,
    /// Ratio between the miter length and half of the thickness past which
    /// miter joins are cut. `None` picks the tessellator's default.
    pub miter_limit: Option<f32>,
    pub scale_mode: ScaleMode,
    /// Lines can be painted with a fill style instead of a plain color.
    pub fill: Option<FillStyle>,
}

impl StrokeStyle {
    pub fn new(thickness: f32, color: Color) -> Self {
        StrokeStyle {
            color,
            thickness,
            joint: LineJoin::Round,
            cap: LineCap::Round,
            miter_limit: None,
            scale_mode: ScaleMode::Normal,
            fill: None,
        }
    }

    #[inline]
    pub fn with_joint(mut self, joint: LineJoin) -> Self {
        self.joint = joint;
        self
    }

    #[inline]
    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    #[inline]
    pub fn with_miter_limit(mut self, limit: f32) -> Self {
        self.miter_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_scale_mode(mut self, mode: ScaleMode) -> Self {
        self.scale_mode = mode;
        self
    }

    #[inline]
    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness;
        self
    }

    #[inline]
    pub fn with_fill(mut self, fill: FillStyle) -> Self {
        self.fill = Some(fill);
        self
    }
}

/// The fill and line styles that shape records refer to.
///
/// Records use 1-based indices into these tables, 0 meaning "no style".
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StyleTable {
    pub fills: Vec<Arc<FillStyle>>,
    pub lines: Vec<Arc<StrokeStyle>>,
}

impl StyleTable {
    pub fn new() -> Self {
        StyleTable::default()
    }

    /// Adds a fill style and returns its 1-based index.
    pub fn add_fill(&mut self, style: FillStyle) -> u32 {
        self.fills.push(Arc::new(style));
        self.fills.len() as u32
    }

    /// Adds a line style and returns its 1-based index.
    pub fn add_line(&mut self, style: StrokeStyle) -> u32 {
        self.lines.push(Arc::new(style));
        self.lines.len() as u32
    }

    pub fn fill(&self, index: u32) -> Option<&Arc<FillStyle>> {
        if index == 0 {
            return None;
        }
        self.fills.get(index as usize - 1)
    }

    pub fn line(&self, index: u32) -> Option<&Arc<StrokeStyle>> {
        if index == 0 {
            return None;
        }
        self.lines.get(index as usize - 1)
    }
}

#[test]
fn color_from_rgb() {
    assert_eq!(Color::from_rgb(0xff8000, 128), Color::new(255, 128, 0, 128));
    assert_eq!(Color::WHITE.to_rgba_f32(), [1.0, 1.0, 1.0, 1.0]);
}

#[test]
fn style_table_indices() {
    let mut table = StyleTable::new();
    let red = table.add_fill(FillStyle::solid(Color::from_rgb(0xff0000, 255)));
    let line = table.add_line(StrokeStyle::new(2.0, Color::BLACK));

    assert_eq!(red, 1);
    assert_eq!(line, 1);
    assert!(table.fill(0).is_none());
    assert!(table.fill(2).is_none());
    assert_eq!(
        **table.fill(1).unwrap(),
        FillStyle::solid(Color::new(255, 0, 0, 255))
    );
    assert_eq!(table.line(1).unwrap().thickness, 2.0);
}
