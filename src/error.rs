use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    InvalidArgument(String),
    IllegalState(String),
    PPMFileDoesNotContainRequiredToken(&'static str),
    ParsingOfTokenFailed(&'static str),
    IncompletePixelParsed(usize),
    MismatchOfSizeBetweenHeaderAndValues,
    ColorValueExceedsMaxValue(u16, u16),
    UnableToOpenInputFileForReading(String, std::io::Error),
    FailedToReadInputFile(std::io::Error),
    UnableToOpenOutputFileForWriting(String, std::io::Error),
    FailedToWriteHeader,
    FailedToWriteLogicalScreenDescriptor,
    FailedToWriteColorTable,
    FailedToWriteApplicationExtension,
    FailedToWriteGraphicControlExtension,
    FailedToWriteImageDescriptor,
    FailedToWriteImageData(std::io::Error),
    FailedToWriteTrailer,
    WorkerDisconnected,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "{}", message),
            Self::IllegalState(message) => write!(f, "{}", message),
            Self::PPMFileDoesNotContainRequiredToken(token_name) => {
                write!(f, "Expected token '{}' not found in PPM file", token_name)
            }
            Self::ParsingOfTokenFailed(token_name) => {
                write!(f, "Parsing of token '{}' failed", token_name)
            }
            Self::IncompletePixelParsed(number_of_tokens_parsed) => {
                write!(
                    f,
                    "Incomplete pixel parsed. Expected 3 components, but got {}.",
                    number_of_tokens_parsed
                )
            }
            Self::MismatchOfSizeBetweenHeaderAndValues => {
                write!(
                    f,
                    "Number of pixels does not match the size provided in header"
                )
            }
            Self::ColorValueExceedsMaxValue(value, max_value) => {
                write!(
                    f,
                    "Color value {} is greater than the max value of {}",
                    value, max_value
                )
            }
            Self::UnableToOpenInputFileForReading(path, error) => {
                write!(
                    f,
                    "Unable to open input file '{}' for reading: {}",
                    path, error
                )
            }
            Self::FailedToReadInputFile(error) => {
                write!(f, "Failed to read input file: {}", error)
            }
            Self::UnableToOpenOutputFileForWriting(path, error) => {
                write!(
                    f,
                    "Unable to open output file '{}' for writing: {}",
                    path, error
                )
            }
            Self::FailedToWriteHeader => write!(f, "Failed to write GIF header"),
            Self::FailedToWriteLogicalScreenDescriptor => {
                write!(f, "Failed to write logical screen descriptor")
            }
            Self::FailedToWriteColorTable => write!(f, "Failed to write color table"),
            Self::FailedToWriteApplicationExtension => {
                write!(f, "Failed to write looping application extension")
            }
            Self::FailedToWriteGraphicControlExtension => {
                write!(f, "Failed to write graphic control extension")
            }
            Self::FailedToWriteImageDescriptor => write!(f, "Failed to write image descriptor"),
            Self::FailedToWriteImageData(error) => {
                write!(f, "Failed to write image data: {}", error)
            }
            Self::FailedToWriteTrailer => write!(f, "Failed to write trailer"),
            Self::WorkerDisconnected => {
                write!(f, "A frame worker terminated without reporting its result")
            }
        }
    }
}

impl std::error::Error for Error {}
