use std::io::Write;
use std::sync::mpsc;
use std::sync::Arc;

mod encoder;

use clap::builder::PossibleValue;
use clap::ValueEnum;
use encoder::GifEncoder;
use threadpool::ThreadPool;

use crate::color::{Color, ColorMultiset};
use crate::dither::{Ditherer, DithererKind};
use crate::error::Error;
use crate::image::{Image, SequenceWriter};
use crate::lzw::LzwEncoder;
use crate::quantizer::{ColorQuantizer, Palette, QuantizerKind};
use crate::{Arguments, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisposalMethod {
    #[default]
    Unspecified = 0,
    DoNotDispose = 1,
    RestoreToBackground = 2,
    RestoreToPrevious = 3,
}

impl DisposalMethod {
    fn value(&self) -> u8 {
        *self as u8
    }
}

impl ValueEnum for DisposalMethod {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self::Unspecified,
            Self::DoNotDispose,
            Self::RestoreToBackground,
            Self::RestoreToPrevious,
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Self::Unspecified => Some(PossibleValue::new("Unspecified")),
            Self::DoNotDispose => Some(PossibleValue::new("DoNotDispose")),
            Self::RestoreToBackground => Some(PossibleValue::new("RestoreToBackground")),
            Self::RestoreToPrevious => Some(PossibleValue::new("RestoreToPrevious")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteMode {
    /// One palette for the whole sequence
    Global,
    /// One palette per frame
    Local,
}

impl ValueEnum for PaletteMode {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Global, Self::Local]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Self::Global => Some(PossibleValue::new("Global")),
            Self::Local => Some(PossibleValue::new("Local")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameOptions {
    pub left: u16,
    pub top: u16,
    pub delay_centiseconds: u16,
    pub disposal_method: DisposalMethod,
}

pub struct GifOptions {
    pub max_color_count: usize,
    pub quantizer: QuantizerKind,
    pub ditherer: DithererKind,
    pub palette_mode: PaletteMode,
    pub frame_options: FrameOptions,
    pub loop_count: u16,
}

impl From<&Arguments> for GifOptions {
    fn from(value: &Arguments) -> Self {
        Self {
            max_color_count: value.max_color_count,
            quantizer: value.quantizer,
            ditherer: value.ditherer,
            palette_mode: value.palette_mode,
            frame_options: FrameOptions {
                left: 0,
                top: 0,
                delay_centiseconds: value.delay_centiseconds,
                disposal_method: value.disposal_method,
            },
            loop_count: value.loop_count,
        }
    }
}

pub struct GifImageWriter<'a, T: Write> {
    writer: T,
    images: &'a [Arc<Image>],
    options: &'a GifOptions,
    threadpool: &'a ThreadPool,
}

impl<'a, T: Write> GifImageWriter<'a, T> {
    pub fn new(
        writer: T,
        images: &'a [Arc<Image>],
        options: &'a GifOptions,
        threadpool: &'a ThreadPool,
    ) -> Self {
        Self {
            writer,
            images,
            options,
            threadpool,
        }
    }

    fn screen_size(&self) -> Result<(u16, u16)> {
        let frame_options = &self.options.frame_options;
        let mut width = 0;
        let mut height = 0;
        for image in self.images {
            let right = frame_options.left.checked_add(image.width());
            let bottom = frame_options.top.checked_add(image.height());
            match (right, bottom) {
                (Some(right), Some(bottom)) => {
                    width = width.max(right);
                    height = height.max(bottom);
                }
                _ => {
                    return Err(Error::InvalidArgument(format!(
                        "Frame of {}x{} at ({}, {}) does not fit into the logical screen",
                        image.width(),
                        image.height(),
                        frame_options.left,
                        frame_options.top
                    )))
                }
            }
        }
        Ok((width, height))
    }

    fn global_palette(&self) -> Result<Option<Arc<Palette>>> {
        match self.options.palette_mode {
            PaletteMode::Local => Ok(None),
            PaletteMode::Global => {
                let mut colors = ColorMultiset::new();
                for image in self.images {
                    colors.extend(image.dots().iter().copied());
                }
                let palette =
                    build_palette(&colors, self.options.quantizer, self.options.max_color_count)?;
                log::info!("Global palette holds {} colors", palette.len());
                Ok(Some(Arc::new(palette)))
            }
        }
    }

    fn encode_frames(&self, global_palette: Option<&Arc<Palette>>) -> Result<Vec<EncodedFrame>> {
        let (sender, receiver) = mpsc::channel();
        for (frame_index, image) in self.images.iter().enumerate() {
            let sender = sender.clone();
            let image = Arc::clone(image);
            let global_palette = global_palette.cloned();
            let job = FrameJob {
                max_color_count: self.options.max_color_count,
                quantizer: self.options.quantizer,
                ditherer: self.options.ditherer,
                frame_options: self.options.frame_options,
            };
            self.threadpool.execute(move || {
                let result = job.run(&image, global_palette.as_deref());
                // the receiver only goes away after an earlier failure
                let _ = sender.send((frame_index, result));
            });
        }
        drop(sender);

        let mut frames: Vec<Option<EncodedFrame>> = Vec::new();
        frames.resize_with(self.images.len(), || None);
        for _ in 0..self.images.len() {
            let (frame_index, result) = receiver.recv().map_err(|_| Error::WorkerDisconnected)?;
            log::info!("Encoded frame {}", frame_index);
            frames[frame_index] = Some(result?);
        }
        frames
            .into_iter()
            .map(|frame| frame.ok_or(Error::WorkerDisconnected))
            .collect()
    }
}

impl<T: Write> SequenceWriter for GifImageWriter<'_, T> {
    fn write_sequence(&mut self) -> Result<()> {
        if self.images.is_empty() {
            return Err(Error::InvalidArgument(
                "At least one frame is required".to_owned(),
            ));
        }
        let (width, height) = self.screen_size()?;
        let global_palette = self.global_palette()?;
        let frames = self.encode_frames(global_palette.as_ref())?;
        let loop_count = if frames.len() > 1 || self.options.loop_count != 0 {
            Some(self.options.loop_count)
        } else {
            None
        };
        let output = OutputSequence {
            width,
            height,
            global_color_table: global_palette.map(|palette| palette.color_table()),
            loop_count,
            frames,
        };
        let mut encoder = GifEncoder::new(&mut self.writer, &output);
        encoder.encode()?;
        self.writer.flush().map_err(|_| Error::FailedToWriteTrailer)
    }
}

fn build_palette(
    colors: &ColorMultiset,
    quantizer: QuantizerKind,
    max_color_count: usize,
) -> Result<Palette> {
    let palette = quantizer.quantize(colors, max_color_count)?;
    if palette.is_empty() {
        // frames without dots still need a color table
        return Palette::new(vec![Color::BLACK]);
    }
    Ok(palette)
}

struct FrameJob {
    max_color_count: usize,
    quantizer: QuantizerKind,
    ditherer: DithererKind,
    frame_options: FrameOptions,
}

impl FrameJob {
    fn run(&self, image: &Image, global_palette: Option<&Palette>) -> Result<EncodedFrame> {
        let local_palette = match global_palette {
            Some(_) => None,
            None => Some(build_palette(
                &image.color_multiset(),
                self.quantizer,
                self.max_color_count,
            )?),
        };
        let palette = global_palette
            .or(local_palette.as_ref())
            .ok_or_else(|| Error::IllegalState("No palette available for frame".to_owned()))?;
        let indexed = self.ditherer.dither(image, palette)?;
        let lzw_encoder = LzwEncoder::new(palette.color_table_size())?;
        let mut data = Vec::new();
        lzw_encoder.encode(indexed.indices(), &mut data)?;
        Ok(EncodedFrame {
            width: image.width(),
            height: image.height(),
            options: self.frame_options,
            local_color_table: local_palette.map(|palette| palette.color_table()),
            minimum_code_size: lzw_encoder.minimum_code_size(),
            data,
        })
    }
}

struct EncodedFrame {
    width: u16,
    height: u16,
    options: FrameOptions,
    local_color_table: Option<Vec<u8>>,
    minimum_code_size: u8,
    /// sub-blocked code stream including the terminator
    data: Vec<u8>,
}

struct OutputSequence {
    width: u16,
    height: u16,
    global_color_table: Option<Vec<u8>>,
    loop_count: Option<u16>,
    frames: Vec<EncodedFrame>,
}
