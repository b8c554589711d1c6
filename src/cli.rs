use crate::dither::DithererKind;
use crate::image::writer::gif::{DisposalMethod, PaletteMode};
use crate::quantizer::QuantizerKind;
use crate::Arguments;
use clap::{
    arg, crate_authors, crate_description, crate_name, crate_version, value_parser, Arg,
    ArgMatches, Command,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::{io, thread};

pub struct CLIParser {
    command: Command,
}

impl CLIParser {
    pub fn new() -> Self {
        let command = Self::create_base_command();
        let command = Self::register_arguments(command);
        CLIParser { command }
    }

    pub fn parse<I, T>(&mut self, itr: I) -> Arguments
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .command
            .try_get_matches_from_mut(itr)
            .unwrap_or_else(|e| e.exit());
        Self::extract_arguments(&matches)
    }

    fn register_arguments(command: Command) -> Command {
        let command = Self::register_output_file_argument(command);
        let command = Self::register_input_files_argument(command);
        let command = Self::register_colors_argument(command);
        let command = Self::register_quantizer_argument(command);
        let command = Self::register_ditherer_argument(command);
        let command = Self::register_palette_mode_argument(command);
        let command = Self::register_delay_argument(command);
        let command = Self::register_disposal_argument(command);
        let command = Self::register_loop_count_argument(command);
        Self::register_threads_argument(command)
    }

    fn register_output_file_argument(command: Command) -> Command {
        command.arg(Self::create_output_file_argument())
    }

    fn register_input_files_argument(command: Command) -> Command {
        command.arg(Self::create_input_files_argument())
    }

    fn register_colors_argument(command: Command) -> Command {
        command.arg(Self::create_colors_argument())
    }

    fn register_quantizer_argument(command: Command) -> Command {
        command.arg(Self::create_quantizer_argument())
    }

    fn register_ditherer_argument(command: Command) -> Command {
        command.arg(Self::create_ditherer_argument())
    }

    fn register_palette_mode_argument(command: Command) -> Command {
        command.arg(Self::create_palette_mode_argument())
    }

    fn register_delay_argument(command: Command) -> Command {
        command.arg(Self::create_delay_argument())
    }

    fn register_disposal_argument(command: Command) -> Command {
        command.arg(Self::create_disposal_argument())
    }

    fn register_loop_count_argument(command: Command) -> Command {
        command.arg(Self::create_loop_count_argument())
    }

    fn register_threads_argument(command: Command) -> Command {
        command.arg(Self::create_threads_argument())
    }

    fn create_base_command() -> Command {
        Command::new(crate_name!())
            .version(crate_version!())
            .author(crate_authors!())
            .about(crate_description!())
    }

    fn create_output_file_argument() -> Arg {
        Arg::new("output_file")
            .help("Path to GIF output file")
            .value_parser(value_parser!(PathBuf))
            .required(true)
    }

    fn create_input_files_argument() -> Arg {
        Arg::new("input_files")
            .help("Paths to PPM input files, one per frame")
            .value_parser(value_parser!(PathBuf))
            .num_args(1..)
            .required(true)
    }

    fn create_colors_argument() -> Arg {
        arg!(colors: -c --colors <COLORS> "Maximum number of palette colors")
            .default_value("256")
            .value_parser(value_parser!(u16).range(1..=256))
    }

    fn create_quantizer_argument() -> Arg {
        arg!(quantizer: -q --quantizer <QUANTIZER> "Color quantization method")
            .default_value("MedianCut")
            .value_parser(value_parser!(QuantizerKind))
    }

    fn create_ditherer_argument() -> Arg {
        arg!(ditherer: -d --ditherer <DITHERER> "Dithering method")
            .default_value("FloydSteinberg")
            .value_parser(value_parser!(DithererKind))
    }

    fn create_palette_mode_argument() -> Arg {
        arg!(palette_mode: -m --palette_mode <MODE> "One global palette or one palette per frame")
            .default_value("Global")
            .value_parser(value_parser!(PaletteMode))
    }

    fn create_delay_argument() -> Arg {
        arg!(delay: --delay <CENTISECONDS> "Delay between frames in hundredths of a second")
            .default_value("10")
            .value_parser(value_parser!(u16))
    }

    fn create_disposal_argument() -> Arg {
        arg!(disposal: --disposal <METHOD> "Disposal method applied after each frame")
            .default_value("Unspecified")
            .value_parser(value_parser!(DisposalMethod))
    }

    fn create_loop_count_argument() -> Arg {
        arg!(loop_count: -l --loop_count <COUNT> "Number of repetitions, 0 loops forever")
            .default_value("0")
            .value_parser(value_parser!(u16))
    }

    fn create_threads_argument() -> Arg {
        arg!(-t --threads <THREADS> "Number of Threads")
            .default_value(get_number_of_threads().unwrap_or(1).to_string())
            .required(false)
            .value_parser(value_parser!(usize))
    }

    fn extract_arguments(matches: &ArgMatches) -> Arguments {
        Arguments {
            output_file: Self::extract_output_file_argument(matches),
            input_files: Self::extract_input_files_argument(matches),
            max_color_count: Self::extract_colors_argument(matches),
            quantizer: Self::extract_quantizer_argument(matches),
            ditherer: Self::extract_ditherer_argument(matches),
            palette_mode: Self::extract_palette_mode_argument(matches),
            delay_centiseconds: Self::extract_delay_argument(matches),
            disposal_method: Self::extract_disposal_argument(matches),
            loop_count: Self::extract_loop_count_argument(matches),
            number_of_threads: Self::extract_threads_argument(matches),
        }
    }

    fn extract_output_file_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("output_file")
            .expect("Required argument output_file not provided")
            .clone()
    }

    fn extract_input_files_argument(matches: &ArgMatches) -> Vec<PathBuf> {
        matches
            .get_many::<PathBuf>("input_files")
            .expect("Required argument input_files not provided")
            .cloned()
            .collect()
    }

    fn extract_colors_argument(matches: &ArgMatches) -> usize {
        *matches
            .get_one::<u16>("colors")
            .expect("Number of colors must be provided, but was unset.") as usize
    }

    fn extract_quantizer_argument(matches: &ArgMatches) -> QuantizerKind {
        matches
            .get_one::<QuantizerKind>("quantizer")
            .expect("Quantizer must be provided, but was unset.")
            .to_owned()
    }

    fn extract_ditherer_argument(matches: &ArgMatches) -> DithererKind {
        matches
            .get_one::<DithererKind>("ditherer")
            .expect("Ditherer must be provided, but was unset.")
            .to_owned()
    }

    fn extract_palette_mode_argument(matches: &ArgMatches) -> PaletteMode {
        matches
            .get_one::<PaletteMode>("palette_mode")
            .expect("Palette mode must be provided, but was unset.")
            .to_owned()
    }

    fn extract_delay_argument(matches: &ArgMatches) -> u16 {
        matches
            .get_one::<u16>("delay")
            .expect("Delay must be provided, but was unset.")
            .to_owned()
    }

    fn extract_disposal_argument(matches: &ArgMatches) -> DisposalMethod {
        matches
            .get_one::<DisposalMethod>("disposal")
            .expect("Disposal method must be provided, but was unset.")
            .to_owned()
    }

    fn extract_loop_count_argument(matches: &ArgMatches) -> u16 {
        matches
            .get_one::<u16>("loop_count")
            .expect("Loop count must be provided, but was unset.")
            .to_owned()
    }

    fn extract_threads_argument(matches: &ArgMatches) -> usize {
        matches
            .get_one::<usize>("threads")
            .expect("Required argument threads not provided")
            .to_owned()
    }
}

impl Default for CLIParser {
    fn default() -> Self {
        Self::new()
    }
}

fn get_number_of_threads() -> io::Result<usize> {
    Ok(thread::available_parallelism()?.get())
}
