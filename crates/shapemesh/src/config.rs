use crate::tessellation::{FillOptions, StrokeOptions};

/// Parameters of a [ShapePipeline](../struct.ShapePipeline.html).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct PipelineConfig {
    /// Options of the fill tessellator.
    ///
    /// Default value: `FillOptions::DEFAULT`.
    pub fill: FillOptions,

    /// Options of the stroke tessellator.
    ///
    /// Default value: `StrokeOptions::DEFAULT`.
    pub stroke: StrokeOptions,

    /// Size of a screen pixel in shape units, used to resolve the
    /// thickness of strokes.
    ///
    /// Default value: `1.0`.
    pub pixel_scale: f32,
}

impl PipelineConfig {
    pub const DEFAULT: Self = PipelineConfig {
        fill: FillOptions::DEFAULT,
        stroke: StrokeOptions::DEFAULT,
        pixel_scale: 1.0,
    };

    #[inline]
    pub const fn with_fill(mut self, fill: FillOptions) -> Self {
        self.fill = fill;
        self
    }

    #[inline]
    pub const fn with_stroke(mut self, stroke: StrokeOptions) -> Self {
        self.stroke = stroke;
        self
    }

    #[inline]
    pub const fn with_pixel_scale(mut self, scale: f32) -> Self {
        self.pixel_scale = scale;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn builder_methods() {
    use crate::tessellation::FillRule;

    let config = PipelineConfig::default()
        .with_fill(FillOptions::non_zero())
        .with_pixel_scale(0.5);

    assert_eq!(config.fill.fill_rule, FillRule::NonZero);
    assert_eq!(config.stroke, StrokeOptions::DEFAULT);
    assert_eq!(config.pixel_scale, 0.5);
}
