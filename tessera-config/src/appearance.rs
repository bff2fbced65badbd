use std::str::FromStr;

use miette::IntoDiagnostic as _;

pub const DEFAULT_DECORATION_COLOR: Color = Color::new_unpremul(0.2, 0.2, 0.2, 1.);
pub const DEFAULT_SUGGESTION_COLOR: Color = Color::new_unpremul(0., 0.3, 0.5, 0.5);

/// RGB color in [0, 1] with unpremultiplied alpha.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new_unpremul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_array_unpremul([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array_unpremul(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl FromStr for Color {
    type Err = miette::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = csscolorparser::parse(s)
            .into_diagnostic()?
            .clamp()
            .to_array();
        Ok(Self::from_array_unpremul(color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex() {
        let color = Color::from_str("#00000080").unwrap();
        assert_eq!(color.r, 0.);
        assert!((color.a - 128. / 255.).abs() < 1e-6);
    }

    #[test]
    fn parse_invalid() {
        assert!(Color::from_str("not a color").is_err());
    }
}
