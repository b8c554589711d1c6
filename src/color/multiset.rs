use std::collections::HashMap;

use super::Color;

/// Colors with their number of occurrences.
///
/// Iteration yields every distinct color once, in the order in which it was
/// first added.
#[derive(Clone, Debug, Default)]
pub struct ColorMultiset {
    entries: Vec<(Color, usize)>,
    positions: HashMap<Color, usize>,
    total: usize,
}

impl ColorMultiset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, color: Color) {
        self.add_count(color, 1);
    }

    pub fn add_count(&mut self, color: Color, count: usize) {
        if count == 0 {
            return;
        }
        match self.positions.get(&color) {
            Some(&position) => self.entries[position].1 += count,
            None => {
                self.positions.insert(color, self.entries.len());
                self.entries.push((color, count));
            }
        }
        self.total += count;
    }

    pub fn count(&self, color: &Color) -> usize {
        self.positions
            .get(color)
            .map_or(0, |&position| self.entries[position].1)
    }

    /// Total number of occurrences.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn distinct_len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Color, usize)> + '_ {
        self.entries.iter().map(|(color, count)| (color, *count))
    }

    pub fn distinct_colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.entries.iter().map(|(color, _)| *color)
    }

    /// Occurrence-weighted mean of all colors, `None` when empty.
    pub fn centroid(&self) -> Option<Color> {
        weighted_centroid(&self.entries)
    }
}

pub(crate) fn weighted_centroid(entries: &[(Color, usize)]) -> Option<Color> {
    let total: usize = entries.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return None;
    }
    let sum = entries
        .iter()
        .fold(Color::BLACK, |sum, (color, count)| {
            sum + color.scaled(*count as f64)
        });
    Some(sum.scaled(1.0 / total as f64))
}

impl FromIterator<Color> for ColorMultiset {
    fn from_iter<T: IntoIterator<Item = Color>>(iter: T) -> Self {
        let mut multiset = ColorMultiset::new();
        multiset.extend(iter);
        multiset
    }
}

impl Extend<Color> for ColorMultiset {
    fn extend<T: IntoIterator<Item = Color>>(&mut self, iter: T) {
        for color in iter {
            self.add(color);
        }
    }
}
