use std::mem;

use super::{check_max_color_count, exact_palette, ColorQuantizer, Palette};
use crate::color::multiset::weighted_centroid;
use crate::color::{Color, ColorMultiset, Component};
use crate::Result;

/// Median cut over a work-list of buckets.
///
/// The most populous bucket that still holds two or more distinct colors is
/// split next; on equal population the bucket listed first wins. A bucket is
/// split along the component with the widest range (red before green before
/// blue on equal ranges) at its weighted median. Every final bucket
/// contributes its weighted centroid to the palette.
#[derive(Clone, Copy, Debug, Default)]
pub struct MedianCutQuantizer;

impl ColorQuantizer for MedianCutQuantizer {
    fn quantize(&self, colors: &ColorMultiset, max_color_count: usize) -> Result<Palette> {
        check_max_color_count(max_color_count)?;
        if let Some(palette) = exact_palette(colors, max_color_count)? {
            return Ok(palette);
        }
        let buckets = split_into_buckets(colors, max_color_count);
        let palette = Palette::new(buckets.iter().filter_map(Bucket::centroid).collect())?;
        log::info!(
            "Median cut reduced {} distinct colors to {}",
            colors.distinct_len(),
            palette.len()
        );
        Ok(palette)
    }
}

#[derive(Default)]
struct Bucket {
    entries: Vec<(Color, usize)>,
    population: usize,
}

impl Bucket {
    fn new(entries: Vec<(Color, usize)>) -> Self {
        let population = entries.iter().map(|(_, count)| count).sum();
        Bucket {
            entries,
            population,
        }
    }

    fn is_splittable(&self) -> bool {
        self.entries.len() > 1
    }

    fn range(&self, component: Component) -> f64 {
        let (min, max) = self.entries.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(min, max), (color, _)| {
                let value = color.get(component);
                (min.min(value), max.max(value))
            },
        );
        max - min
    }

    fn widest_component(&self) -> Component {
        let mut widest = Component::Red;
        let mut widest_range = f64::NEG_INFINITY;
        for component in Component::ALL {
            let range = self.range(component);
            if range > widest_range {
                widest = component;
                widest_range = range;
            }
        }
        widest
    }

    /// Splits after the color at which the running count first reaches half
    /// of the population. Both halves keep at least one color.
    fn split(mut self) -> (Bucket, Bucket) {
        let component = self.widest_component();
        self.entries
            .sort_by(|a, b| a.0.get(component).total_cmp(&b.0.get(component)));
        let mut cut = self.entries.len() - 1;
        let mut running = 0;
        for (position, (_, count)) in self.entries.iter().enumerate() {
            running += count;
            if running * 2 >= self.population {
                cut = position + 1;
                break;
            }
        }
        let cut = cut.clamp(1, self.entries.len() - 1);
        let upper = self.entries.split_off(cut);
        (Bucket::new(self.entries), Bucket::new(upper))
    }

    fn centroid(&self) -> Option<Color> {
        weighted_centroid(&self.entries)
    }
}

fn split_into_buckets(colors: &ColorMultiset, max_color_count: usize) -> Vec<Bucket> {
    let entries = colors.iter().map(|(color, count)| (*color, count)).collect();
    let mut buckets = vec![Bucket::new(entries)];
    while buckets.len() < max_color_count {
        let Some(position) = next_bucket_to_split(&buckets) else {
            break;
        };
        let bucket = mem::take(&mut buckets[position]);
        let (lower, upper) = bucket.split();
        buckets[position] = lower;
        buckets.push(upper);
    }
    buckets
}

fn next_bucket_to_split(buckets: &[Bucket]) -> Option<usize> {
    let mut selected: Option<usize> = None;
    for (position, bucket) in buckets.iter().enumerate() {
        if !bucket.is_splittable() {
            continue;
        }
        match selected {
            Some(current) if buckets[current].population >= bucket.population => {}
            _ => selected = Some(position),
        }
    }
    selected
}
