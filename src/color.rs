use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Sub};

use crate::error::Error;

pub mod multiset;

pub use multiset::ColorMultiset;

/// An RGB color with real-valued components.
///
/// Components are normalized, `0.0` meaning no intensity and `1.0` full
/// intensity. They are not clamped, so intermediate results such as the
/// difference of two colors stay representable.
#[derive(Clone, Copy, Debug)]
pub struct Color {
    red: f64,
    green: f64,
    blue: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Red,
    Green,
    Blue,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::Red, Component::Green, Component::Blue];
}

impl TryFrom<usize> for Component {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Red),
            1 => Ok(Self::Green),
            2 => Ok(Self::Blue),
            _ => Err(Error::InvalidArgument(format!(
                "Unexpected component index: {}",
                value
            ))),
        }
    }
}

const MAX_CHANNEL_VALUE: f64 = 255.0;

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0);

    pub const fn new(red: f64, green: f64, blue: f64) -> Self {
        Color { red, green, blue }
    }

    /// Unpacks `0xRRGGBB`. Bits above the lowest 24 are ignored.
    pub fn from_rgb_int(rgb: u32) -> Self {
        let red = (rgb >> 16) & 0xFF;
        let green = (rgb >> 8) & 0xFF;
        let blue = rgb & 0xFF;
        Self::from_rgb_bytes([red as u8, green as u8, blue as u8])
    }

    pub fn from_rgb_bytes(rgb: [u8; 3]) -> Self {
        Color {
            red: rgb[0] as f64 / MAX_CHANNEL_VALUE,
            green: rgb[1] as f64 / MAX_CHANNEL_VALUE,
            blue: rgb[2] as f64 / MAX_CHANNEL_VALUE,
        }
    }

    pub fn to_rgb_int(&self) -> u32 {
        let [red, green, blue] = self.to_rgb_bytes();
        ((red as u32) << 16) | ((green as u32) << 8) | blue as u32
    }

    pub fn to_rgb_bytes(&self) -> [u8; 3] {
        [
            Self::channel_to_byte(self.red),
            Self::channel_to_byte(self.green),
            Self::channel_to_byte(self.blue),
        ]
    }

    fn channel_to_byte(value: f64) -> u8 {
        (value * MAX_CHANNEL_VALUE).round().clamp(0.0, MAX_CHANNEL_VALUE) as u8
    }

    pub fn red(&self) -> f64 {
        self.red
    }

    pub fn green(&self) -> f64 {
        self.green
    }

    pub fn blue(&self) -> f64 {
        self.blue
    }

    /// Component by position: 0 is red, 1 is green, 2 is blue.
    pub fn component(&self, index: usize) -> crate::Result<f64> {
        let component = Component::try_from(index)?;
        Ok(self.get(component))
    }

    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Red => self.red,
            Component::Green => self.green,
            Component::Blue => self.blue,
        }
    }

    pub fn scaled(&self, factor: f64) -> Color {
        Color {
            red: self.red * factor,
            green: self.green * factor,
            blue: self.blue * factor,
        }
    }

    pub fn euclidean_distance_to(&self, other: &Color) -> f64 {
        self.squared_distance_to(other).sqrt()
    }

    fn squared_distance_to(&self, other: &Color) -> f64 {
        let difference = *self - *other;
        difference.red * difference.red
            + difference.green * difference.green
            + difference.blue * difference.blue
    }

    /// Position of the closest candidate. On equal distances the earlier
    /// candidate wins.
    pub fn nearest_index<'a, I>(&self, candidates: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a Color>,
    {
        let mut nearest: Option<(usize, f64)> = None;
        for (index, candidate) in candidates.into_iter().enumerate() {
            let distance = self.squared_distance_to(candidate);
            match nearest {
                Some((_, nearest_distance)) if nearest_distance <= distance => {}
                _ => nearest = Some((index, distance)),
            }
        }
        nearest.map(|(index, _)| index)
    }

    pub fn nearest_color<'a, I>(&self, candidates: I) -> Option<Color>
    where
        I: IntoIterator<Item = &'a Color>,
        I::IntoIter: Clone,
    {
        let candidates = candidates.into_iter();
        let index = self.nearest_index(candidates.clone())?;
        candidates.copied().nth(index)
    }

    fn normalized_bits(&self) -> [u64; 3] {
        [self.red, self.green, self.blue].map(|c| if c == 0.0 { 0 } else { c.to_bits() })
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.normalized_bits() == other.normalized_bits()
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized_bits().hash(state);
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Self) -> Self::Output {
        Color {
            red: self.red + rhs.red,
            green: self.green + rhs.green,
            blue: self.blue + rhs.blue,
        }
    }
}

impl Sub for Color {
    type Output = Color;

    fn sub(self, rhs: Self) -> Self::Output {
        Color {
            red: self.red - rhs.red,
            green: self.green - rhs.green,
            blue: self.blue - rhs.blue,
        }
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scaled(rhs)
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06X}", self.to_rgb_int())
    }
}

#[cfg(test)]
pub(crate) fn assert_color_near(actual: &Color, expected: &Color) {
    const EPSILON: f64 = 1e-6;
    assert!(
        actual.euclidean_distance_to(expected) < EPSILON,
        "color {:?} is not close to {:?}",
        actual,
        expected
    );
}
