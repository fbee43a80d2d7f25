use bigdecimal::BigDecimal;

use super::{Color, Gem, Preciousness, VisualParameters};

/// Builder for constructing gems
///
/// Used as the in-progress accumulator by the parsers and as a fluent
/// constructor in tests and downstream code.
#[derive(Debug, Clone, Default)]
pub struct GemBuilder {
    gem: Gem,
}

impl GemBuilder {
    /// Start a gem with the given identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            gem: Gem {
                id: id.into(),
                ..Default::default()
            },
        }
    }

    /// Set the display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.gem.name = name.into();
        self
    }

    /// Set the category
    pub fn preciousness(mut self, preciousness: Preciousness) -> Self {
        self.gem.preciousness = Some(preciousness);
        self
    }

    /// Set the place of origin
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.gem.origin = origin.into();
        self
    }

    /// Set the value in carats
    pub fn value(mut self, value: BigDecimal) -> Self {
        self.gem.value = Some(value);
        self
    }

    /// Append a visual-parameters group
    pub fn add_visual_parameters(mut self, params: VisualParameters) -> Self {
        self.gem.visual_parameters.push(params);
        self
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.gem.name = name;
    }

    pub(crate) fn set_preciousness(&mut self, preciousness: Preciousness) {
        self.gem.preciousness = Some(preciousness);
    }

    pub(crate) fn set_origin(&mut self, origin: String) {
        self.gem.origin = origin;
    }

    pub(crate) fn set_value(&mut self, value: BigDecimal) {
        self.gem.value = Some(value);
    }

    pub(crate) fn push_visual_parameters(&mut self, params: VisualParameters) {
        self.gem.visual_parameters.push(params);
    }

    /// Identifier of the gem under construction
    pub fn id(&self) -> &str {
        &self.gem.id
    }

    /// Finish the gem
    pub fn build(self) -> Gem {
        self.gem
    }
}

/// Builder for a visual-parameters group
#[derive(Debug, Clone, Default)]
pub struct VisualParametersBuilder {
    params: VisualParameters,
}

impl VisualParametersBuilder {
    /// Start an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a color
    pub fn color(mut self, color: Color) -> Self {
        self.params.colors.push(color);
        self
    }

    /// Set the transparency
    pub fn transparency(mut self, transparency: BigDecimal) -> Self {
        self.params.transparency = Some(transparency);
        self
    }

    /// Set the facet count
    pub fn facets(mut self, facets: i32) -> Self {
        self.params.facets = Some(facets);
        self
    }

    pub(crate) fn set_transparency(&mut self, transparency: BigDecimal) {
        self.params.transparency = Some(transparency);
    }

    pub(crate) fn set_facets(&mut self, facets: i32) {
        self.params.facets = Some(facets);
    }

    pub(crate) fn set_colors(&mut self, colors: Vec<Color>) {
        self.params.colors = colors;
    }

    /// Finish the group
    pub fn build(self) -> VisualParameters {
        self.params
    }
}
