use super::{check_max_color_count, exact_palette, ColorQuantizer, Palette};
use crate::color::{Color, ColorMultiset};
use crate::Result;

/// Fixed grid of evenly spaced levels per channel.
///
/// Uses the largest `n` with `n³` not above the requested size. With a
/// single level the palette is the centroid of the input.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformQuantizer;

impl UniformQuantizer {
    fn levels_per_channel(max_color_count: usize) -> usize {
        let mut levels = 1;
        while (levels + 1) * (levels + 1) * (levels + 1) <= max_color_count {
            levels += 1;
        }
        levels
    }

    fn grid(levels: usize) -> Vec<Color> {
        let step = 1.0 / (levels - 1) as f64;
        let mut colors = Vec::with_capacity(levels * levels * levels);
        for red in 0..levels {
            for green in 0..levels {
                for blue in 0..levels {
                    colors.push(Color::new(
                        red as f64 * step,
                        green as f64 * step,
                        blue as f64 * step,
                    ));
                }
            }
        }
        colors
    }
}

impl ColorQuantizer for UniformQuantizer {
    fn quantize(&self, colors: &ColorMultiset, max_color_count: usize) -> Result<Palette> {
        check_max_color_count(max_color_count)?;
        if let Some(palette) = exact_palette(colors, max_color_count)? {
            return Ok(palette);
        }
        let levels = Self::levels_per_channel(max_color_count);
        if levels == 1 {
            return Palette::new(colors.centroid().into_iter().collect());
        }
        Palette::new(Self::grid(levels))
    }
}

#[cfg(test)]
mod test {
    use super::UniformQuantizer;
    use crate::color::{assert_color_near, Color, ColorMultiset};
    use crate::quantizer::ColorQuantizer;

    fn many_colors() -> ColorMultiset {
        (0..4096u32).map(|i| Color::from_rgb_int(i * 4099)).collect()
    }

    #[test]
    fn levels_per_channel() {
        assert_eq!(UniformQuantizer::levels_per_channel(1), 1);
        assert_eq!(UniformQuantizer::levels_per_channel(7), 1);
        assert_eq!(UniformQuantizer::levels_per_channel(8), 2);
        assert_eq!(UniformQuantizer::levels_per_channel(26), 2);
        assert_eq!(UniformQuantizer::levels_per_channel(27), 3);
        assert_eq!(UniformQuantizer::levels_per_channel(256), 6);
    }

    #[test]
    fn full_grid() {
        let palette = UniformQuantizer.quantize(&many_colors(), 256).unwrap();
        assert_eq!(palette.len(), 216);
        assert_eq!(palette.colors()[0], Color::BLACK);
        assert_color_near(&palette.colors()[215], &Color::WHITE);
    }

    #[test]
    fn eight_colors_are_cube_corners() {
        let palette = UniformQuantizer.quantize(&many_colors(), 8).unwrap();
        assert_eq!(palette.len(), 8);
        assert!(palette.colors().contains(&Color::RED));
        assert!(palette.colors().contains(&Color::GREEN));
        assert!(palette.colors().contains(&Color::BLUE));
    }

    #[test]
    fn single_level_uses_centroid() {
        let colors: ColorMultiset = [Color::BLACK, Color::WHITE, Color::BLACK, Color::WHITE]
            .into_iter()
            .collect();
        let palette = UniformQuantizer.quantize(&colors, 1).unwrap();
        assert_eq!(palette.len(), 1);
        assert_color_near(&palette.colors()[0], &Color::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn few_colors_are_kept_exactly() {
        let colors: ColorMultiset = [Color::from_rgb_int(0x123456)].into_iter().collect();
        let palette = UniformQuantizer.quantize(&colors, 8).unwrap();
        assert_eq!(palette.colors(), &[Color::from_rgb_int(0x123456)]);
    }
}
