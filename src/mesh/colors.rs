//! Color mapping for site attributes

/// RGBA color type
pub type RegionColor = [f32; 4];

/// Trait for mapping site attributes to colors
pub trait ColorMapper<T> {
    /// Map a site's attributes to an RGBA color
    fn map_color(&self, attributes: &T) -> RegionColor;
}

impl<T, F> ColorMapper<T> for F
where
    F: Fn(&T) -> RegionColor,
{
    fn map_color(&self, attributes: &T) -> RegionColor {
        self(attributes)
    }
}

/// Paints every region the same color
#[derive(Debug, Clone, Copy)]
pub struct UniformColorMapper(pub RegionColor);

impl Default for UniformColorMapper {
    fn default() -> Self {
        Self([0.5, 0.5, 0.5, 1.0])
    }
}

impl<T> ColorMapper<T> for UniformColorMapper {
    fn map_color(&self, _attributes: &T) -> RegionColor {
        self.0
    }
}

/// Colors regions by owner index, cycling through a palette
///
/// Sites without an owner get the neutral color.
#[derive(Debug, Clone)]
pub struct PaletteColorMapper {
    pub palette: Vec<RegionColor>,
    pub neutral: RegionColor,
}

impl Default for PaletteColorMapper {
    fn default() -> Self {
        Self {
            palette: vec![
                [0.89, 0.29, 0.20, 1.0], // Red
                [0.22, 0.49, 0.72, 1.0], // Blue
                [0.30, 0.69, 0.29, 1.0], // Green
                [0.60, 0.31, 0.64, 1.0], // Purple
                [1.00, 0.50, 0.00, 1.0], // Orange
                [0.95, 0.85, 0.20, 1.0], // Yellow
            ],
            neutral: [0.35, 0.35, 0.35, 1.0],
        }
    }
}

impl ColorMapper<Option<usize>> for PaletteColorMapper {
    fn map_color(&self, owner: &Option<usize>) -> RegionColor {
        match owner {
            Some(index) if !self.palette.is_empty() => self.palette[index % self.palette.len()],
            _ => self.neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_color_mapper() {
        let mapper = PaletteColorMapper::default();

        let first = mapper.map_color(&Some(0));
        assert_eq!(first[3], 1.0);
        assert_eq!(first, mapper.palette[0]);

        // indices wrap around the palette
        let wrapped = mapper.map_color(&Some(mapper.palette.len() + 1));
        assert_eq!(wrapped, mapper.palette[1]);

        assert_eq!(mapper.map_color(&None), mapper.neutral);
    }

    #[test]
    fn test_empty_palette_is_neutral() {
        let mapper = PaletteColorMapper {
            palette: vec![],
            neutral: [0.0, 0.0, 0.0, 1.0],
        };
        assert_eq!(mapper.map_color(&Some(3)), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_closure_and_uniform_mappers() {
        let by_strength = |strength: &f32| [*strength, 0.0, 1.0 - *strength, 1.0];
        assert_eq!(by_strength.map_color(&0.25), [0.25, 0.0, 0.75, 1.0]);

        let uniform = UniformColorMapper([1.0, 1.0, 1.0, 0.5]);
        assert_eq!(uniform.map_color(&"anything"), [1.0, 1.0, 1.0, 0.5]);
    }
}
