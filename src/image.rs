use crate::color::{Color, ColorMultiset};
use crate::error::Error;
use crate::Result;

pub mod reader;
pub mod writer;

/// A true color frame, dots in row-major order
#[derive(Clone, Debug)]
pub struct Image {
    width: u16,
    height: u16,
    dots: Vec<Color>,
}

impl Image {
    pub fn new(width: u16, height: u16, dots: Vec<Color>) -> Result<Self> {
        check_dimensions(width, height, dots.len())?;
        Ok(Image {
            width,
            height,
            dots,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn dots(&self) -> &[Color] {
        &self.dots
    }

    pub fn dot(&self, column_index: u16, row_index: u16) -> Color {
        self.dots[column_index as usize + row_index as usize * self.width as usize]
    }

    pub fn color_multiset(&self) -> ColorMultiset {
        self.dots.iter().copied().collect()
    }
}

/// A frame mapped onto a palette, one index per dot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedImage {
    width: u16,
    height: u16,
    indices: Vec<u8>,
}

impl IndexedImage {
    pub fn new(width: u16, height: u16, indices: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height, indices.len())?;
        Ok(IndexedImage {
            width,
            height,
            indices,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }
}

fn check_dimensions(width: u16, height: u16, length: usize) -> Result<()> {
    let expected = width as usize * height as usize;
    if length != expected {
        return Err(Error::InvalidArgument(format!(
            "Expected {} dots for an image of {}x{}, but got {}",
            expected, width, height, length
        )));
    }
    Ok(())
}

pub trait ImageReader {
    fn read_image(&mut self) -> Result<Image>;
}

pub trait SequenceWriter {
    fn write_sequence(&mut self) -> Result<()>;
}
