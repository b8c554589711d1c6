use std::collections::HashMap;

use clap::builder::PossibleValue;
use clap::ValueEnum;

use crate::color::Color;
use crate::error::Error;
use crate::image::{Image, IndexedImage};
use crate::quantizer::Palette;
use crate::Result;

/// Maps every dot of a frame onto an entry of a palette.
pub trait Ditherer {
    fn dither(&self, image: &Image, palette: &Palette) -> Result<IndexedImage>;
}

fn nearest_index(palette: &Palette, color: &Color) -> Result<u8> {
    palette.nearest_index(color).ok_or_else(|| {
        Error::InvalidArgument("Palette must contain at least one color".to_owned())
    })
}

/// Plain nearest color lookup, without error diffusion.
#[derive(Clone, Copy, Debug, Default)]
pub struct NearestColorDitherer;

impl Ditherer for NearestColorDitherer {
    fn dither(&self, image: &Image, palette: &Palette) -> Result<IndexedImage> {
        let mut lookup: HashMap<Color, u8> = HashMap::new();
        let mut indices = Vec::with_capacity(image.dots().len());
        for dot in image.dots() {
            let index = match lookup.get(dot) {
                Some(&index) => index,
                None => {
                    let index = nearest_index(palette, dot)?;
                    lookup.insert(*dot, index);
                    index
                }
            };
            indices.push(index);
        }
        IndexedImage::new(image.width(), image.height(), indices)
    }
}

/// Floyd-Steinberg error diffusion.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloydSteinbergDitherer;

/// (column offset, row offset, share of the error)
const ERROR_DISTRIBUTION: [(isize, usize, f64); 4] = [
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

impl FloydSteinbergDitherer {
    fn diffuse(dots: &mut [Color], width: usize, height: usize, x: usize, y: usize, error: Color) {
        for (column_offset, row_offset, share) in ERROR_DISTRIBUTION {
            let column = x as isize + column_offset;
            let row = y + row_offset;
            if column < 0 || column as usize >= width || row >= height {
                continue;
            }
            let position = row * width + column as usize;
            dots[position] = dots[position] + error.scaled(share);
        }
    }
}

impl Ditherer for FloydSteinbergDitherer {
    fn dither(&self, image: &Image, palette: &Palette) -> Result<IndexedImage> {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let mut dots = image.dots().to_vec();
        let mut indices = Vec::with_capacity(dots.len());
        for y in 0..height {
            for x in 0..width {
                let original = dots[y * width + x];
                let index = nearest_index(palette, &original)?;
                let chosen = palette.colors()[index as usize];
                indices.push(index);
                Self::diffuse(&mut dots, width, height, x, y, original - chosen);
            }
        }
        IndexedImage::new(image.width(), image.height(), indices)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DithererKind {
    Nearest,
    FloydSteinberg,
}

impl ValueEnum for DithererKind {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Nearest, Self::FloydSteinberg]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Self::Nearest => Some(PossibleValue::new("Nearest")),
            Self::FloydSteinberg => Some(PossibleValue::new("FloydSteinberg")),
        }
    }
}

impl Ditherer for DithererKind {
    fn dither(&self, image: &Image, palette: &Palette) -> Result<IndexedImage> {
        match self {
            Self::Nearest => NearestColorDitherer.dither(image, palette),
            Self::FloydSteinberg => FloydSteinbergDitherer.dither(image, palette),
        }
    }
}
