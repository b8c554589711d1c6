use std::{
    fs::{File, OpenOptions},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
    sync::Arc,
};

pub use cli::CLIParser;
pub use error::Error;
use image::reader::ppm::PPMImageReader;
use image::writer::gif::{DisposalMethod, GifImageWriter, GifOptions, PaletteMode};
use image::{Image, ImageReader, SequenceWriter};
use threadpool::ThreadPool;

use dither::DithererKind;
use quantizer::QuantizerKind;

pub mod binary_stream;
mod cli;
pub mod color;
pub mod dither;
pub mod error;
pub mod image;
mod logger;
pub mod lzw;
pub mod quantizer;

pub type Result<T> = std::result::Result<T, error::Error>;

pub struct Arguments {
    output_file: PathBuf,
    input_files: Vec<PathBuf>,
    max_color_count: usize,
    quantizer: QuantizerKind,
    ditherer: DithererKind,
    palette_mode: PaletteMode,
    delay_centiseconds: u16,
    disposal_method: DisposalMethod,
    loop_count: u16,
    number_of_threads: usize,
}

fn open_input_file(file_path: &Path) -> Result<File> {
    File::open(file_path).map_err(|e| {
        Error::UnableToOpenInputFileForReading(file_path.display().to_string(), e)
    })
}

fn open_output_file(file_path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)
        .map_err(|e| {
            Error::UnableToOpenOutputFileForWriting(file_path.display().to_string(), e)
        })
}

fn read_frames(input_files: &[PathBuf]) -> Result<Vec<Arc<Image>>> {
    let mut frames = Vec::with_capacity(input_files.len());
    for input_file_path in input_files {
        let input_file = open_input_file(input_file_path)?;
        let mut reader = PPMImageReader::new(BufReader::new(input_file));
        let image = reader.read_image()?;
        log::info!(
            "Read frame {} of {}x{} from {}",
            frames.len(),
            image.width(),
            image.height(),
            input_file_path.display()
        );
        frames.push(Arc::new(image));
    }
    Ok(frames)
}

pub fn convert_ppm_to_gif(arguments: &Arguments) -> Result<()> {
    let frames = read_frames(&arguments.input_files)?;
    let options = GifOptions::from(arguments);
    let threadpool = ThreadPool::new(arguments.number_of_threads.max(1));
    let output_file = open_output_file(&arguments.output_file)?;
    let output_file_writer = BufWriter::new(output_file);
    let mut writer = GifImageWriter::new(output_file_writer, &frames, &options, &threadpool);
    writer.write_sequence()
}
