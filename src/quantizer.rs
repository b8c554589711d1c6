use std::collections::HashSet;

use clap::builder::PossibleValue;
use clap::ValueEnum;

use crate::color::{Color, ColorMultiset};
use crate::error::Error;
use crate::Result;

pub mod median_cut;
pub mod uniform;

pub use median_cut::MedianCutQuantizer;
pub use uniform::UniformQuantizer;

pub const MAX_PALETTE_SIZE: usize = 256;

/// Reduces a weighted set of colors to a palette of bounded size.
pub trait ColorQuantizer {
    fn quantize(&self, colors: &ColorMultiset, max_color_count: usize) -> Result<Palette>;
}

/// Ordered set of distinct colors, addressed by index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Creates a palette, dropping repeated colors but keeping the order of
    /// their first occurrence.
    pub fn new(colors: Vec<Color>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(colors.len());
        let colors: Vec<Color> = colors.into_iter().filter(|c| seen.insert(*c)).collect();
        if colors.len() > MAX_PALETTE_SIZE {
            return Err(Error::InvalidArgument(format!(
                "A palette can't hold more than {} colors, but got {}",
                MAX_PALETTE_SIZE,
                colors.len()
            )));
        }
        Ok(Palette { colors })
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: u8) -> Option<&Color> {
        self.colors.get(index as usize)
    }

    pub fn nearest_index(&self, color: &Color) -> Option<u8> {
        color.nearest_index(&self.colors).map(|index| index as u8)
    }

    /// Number of entries of the color table holding this palette, the
    /// smallest power of two that fits, but at least 2.
    pub fn color_table_size(&self) -> usize {
        self.colors.len().max(2).next_power_of_two()
    }

    /// RGB triples, padded with black up to [`Palette::color_table_size`].
    pub fn color_table(&self) -> Vec<u8> {
        let table_size = self.color_table_size();
        let mut table = Vec::with_capacity(table_size * 3);
        for color in &self.colors {
            table.extend(color.to_rgb_bytes());
        }
        table.resize(table_size * 3, 0);
        table
    }
}

pub(crate) fn check_max_color_count(max_color_count: usize) -> Result<()> {
    if max_color_count == 0 || max_color_count > MAX_PALETTE_SIZE {
        return Err(Error::InvalidArgument(format!(
            "Palette size must be between 1 and {}, but was {}",
            MAX_PALETTE_SIZE, max_color_count
        )));
    }
    Ok(())
}

/// The palette for inputs which already fit, `None` if they don't.
pub(crate) fn exact_palette(
    colors: &ColorMultiset,
    max_color_count: usize,
) -> Result<Option<Palette>> {
    if colors.distinct_len() > max_color_count {
        return Ok(None);
    }
    Palette::new(colors.distinct_colors().collect()).map(Some)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantizerKind {
    MedianCut,
    Uniform,
}

impl ValueEnum for QuantizerKind {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::MedianCut, Self::Uniform]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Self::MedianCut => Some(PossibleValue::new("MedianCut")),
            Self::Uniform => Some(PossibleValue::new("Uniform")),
        }
    }
}

impl ColorQuantizer for QuantizerKind {
    fn quantize(&self, colors: &ColorMultiset, max_color_count: usize) -> Result<Palette> {
        match self {
            Self::MedianCut => MedianCutQuantizer.quantize(colors, max_color_count),
            Self::Uniform => UniformQuantizer.quantize(colors, max_color_count),
        }
    }
}
