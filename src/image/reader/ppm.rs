use std::io::{self, ErrorKind, Read};

use super::super::Image;
use super::super::ImageReader;
use crate::color::Color;
use crate::error::Error;

pub struct PPMImageReader<T: Read> {
    reader: T,
}

impl<T: Read> PPMImageReader<T> {
    pub fn new(reader: T) -> Self {
        Self { reader }
    }
}

impl<T: Read> ImageReader for PPMImageReader<T> {
    fn read_image(&mut self) -> crate::Result<Image> {
        parse_ppm(&mut self.reader)
    }
}

fn parse_ppm<R: Read>(reader: &mut R) -> crate::Result<Image> {
    let mut tokenizer = PPMTokenizer::new(reader);
    let result = PPMParser::new(&mut tokenizer).parse_tokens();
    // a read error ends the token stream early, so it explains any parse error
    if let Some(error) = tokenizer.take_error() {
        return Err(Error::FailedToReadInputFile(error));
    }
    result
}

struct PPMTokenizer<'a, R: Read> {
    reader: &'a mut R,
    buffer: Vec<u8>,
    error: Option<io::Error>,
}

impl<'a, R: Read> PPMTokenizer<'a, R> {
    pub fn new(reader: &'a mut R) -> Self {
        PPMTokenizer {
            reader,
            buffer: Vec::new(),
            error: None,
        }
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.error.is_some() {
            return None;
        }
        let mut byte = [0; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return None,
                Ok(_) => return Some(byte[0]),
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                Err(error) => {
                    self.error = Some(error);
                    return None;
                }
            }
        }
    }
}

impl<R: Read> Iterator for PPMTokenizer<'_, R> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        let mut in_comment = false;

        while let Some(byte) = self.read_byte() {
            if in_comment {
                if byte == b'\n' {
                    in_comment = false;
                }
                continue;
            }
            if byte == b'#' {
                in_comment = true;
                continue;
            }
            if byte.is_ascii_whitespace() {
                if !self.buffer.is_empty() {
                    break;
                }
            } else {
                self.buffer.push(byte);
            }
        }

        if self.buffer.is_empty() {
            return None;
        }

        Some(String::from_utf8_lossy(&self.buffer).into_owned())
    }
}

const P3_HEADER_TOKEN_NAME: &str = "P3 Header";
const WIDTH_HEADER_TOKEN_NAME: &str = "Width Header";
const HEIGHT_HEADER_TOKEN_NAME: &str = "Height Header";
const MAX_VALUE_HEADER_TOKEN_NAME: &str = "Max Value Header";
const COLOR_COMPONENT_VALUE_TOKEN_NAME: &str = "Color Component Value";

#[derive(Clone, Copy)]
struct Dot {
    buffer: [u16; 3],
    index: usize,
}

impl Dot {
    fn new() -> Self {
        Self {
            buffer: [u16::default(); 3],
            index: 0,
        }
    }

    fn push_color_component(&mut self, component: u16) {
        if self.is_complete() {
            return;
        }
        self.buffer[self.index] = component;
        self.index += 1;
    }

    fn is_complete(&self) -> bool {
        self.index == 3
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn is_empty(&self) -> bool {
        self.index == 0
    }

    fn to_color(self, max_value: u16) -> crate::Result<Color> {
        if let Some(&component) = self.buffer.iter().find(|&&c| c > max_value) {
            return Err(Error::ColorValueExceedsMaxValue(component, max_value));
        }
        let max = max_value as f64;
        Ok(Color::new(
            self.buffer[0] as f64 / max,
            self.buffer[1] as f64 / max,
            self.buffer[2] as f64 / max,
        ))
    }
}

struct PPMParser<'a, T> {
    tokenizer: &'a mut T,
}

impl<'a, T> PPMParser<'a, T>
where
    T: Iterator<Item = String>,
{
    fn new(tokenizer: &'a mut T) -> Self {
        Self { tokenizer }
    }

    fn parse_tokens(&mut self) -> crate::Result<Image> {
        let header = self.parse_header()?;
        Self::check_header_version(&header)?;
        let width = self.parse_width()?;
        let height = self.parse_height()?;
        let max_value = self.parse_max_value()?;
        let dots = self.parse_all_dots()?;
        Self::check_parsed_dots_length_match_header_information(&dots, width, height)?;
        let dots = dots
            .into_iter()
            .map(|d| d.to_color(max_value))
            .collect::<crate::Result<Vec<Color>>>()?;
        Image::new(width, height, dots)
    }

    fn check_parsed_dots_length_match_header_information(
        dots: &[Dot],
        width: u16,
        height: u16,
    ) -> crate::Result<()> {
        let expected_number_of_dots = width as usize * height as usize;
        if dots.len() != expected_number_of_dots {
            return Err(Error::MismatchOfSizeBetweenHeaderAndValues);
        }
        Ok(())
    }

    fn check_header_version(header: &str) -> crate::Result<()> {
        if header != "P3" {
            return Err(Error::PPMFileDoesNotContainRequiredToken(
                P3_HEADER_TOKEN_NAME,
            ));
        }
        Ok(())
    }

    fn parse_header(&mut self) -> crate::Result<String> {
        self.tokenizer
            .next()
            .ok_or(Error::PPMFileDoesNotContainRequiredToken(
                P3_HEADER_TOKEN_NAME,
            ))
    }

    fn parse_width(&mut self) -> crate::Result<u16> {
        self.parse_header_value(WIDTH_HEADER_TOKEN_NAME)
    }

    fn parse_height(&mut self) -> crate::Result<u16> {
        self.parse_header_value(HEIGHT_HEADER_TOKEN_NAME)
    }

    fn parse_max_value(&mut self) -> crate::Result<u16> {
        let max_value = self.parse_header_value(MAX_VALUE_HEADER_TOKEN_NAME)?;
        if max_value == 0 {
            return Err(Error::ParsingOfTokenFailed(MAX_VALUE_HEADER_TOKEN_NAME));
        }
        Ok(max_value)
    }

    fn parse_header_value(&mut self, token_name: &'static str) -> crate::Result<u16> {
        self.tokenizer
            .next()
            .ok_or(Error::PPMFileDoesNotContainRequiredToken(token_name))?
            .parse()
            .map_err(|_| Error::ParsingOfTokenFailed(token_name))
    }

    fn parse_all_dots(&mut self) -> crate::Result<Vec<Dot>> {
        let mut current_dot = Dot::new();
        let mut dots = Vec::new();
        for token in self.tokenizer.by_ref() {
            let component = Self::parse_color_value(&token)?;
            current_dot.push_color_component(component);
            if current_dot.is_complete() {
                dots.push(current_dot);
                current_dot.reset();
            }
        }
        Self::check_pixel_was_complete(&current_dot)?;
        Ok(dots)
    }

    fn check_pixel_was_complete(dot: &Dot) -> crate::Result<()> {
        if !dot.is_empty() {
            return Err(Error::IncompletePixelParsed(dot.index));
        }
        Ok(())
    }

    fn parse_color_value(token: &str) -> crate::Result<u16> {
        token
            .parse()
            .map_err(|_| Error::ParsingOfTokenFailed(COLOR_COMPONENT_VALUE_TOKEN_NAME))
    }
}

#[cfg(test)]
mod test {
    use std::io::{self, Read};

    use crate::{color::Color, error::Error, image::Image, Result};

    use super::parse_ppm;

    fn parse_ppm_tokens(token_string: &str) -> Result<Image> {
        let mut bytes = token_string.as_bytes();
        parse_ppm(&mut bytes)
    }

    /// Hands out its content, then fails every further read.
    struct BrokenReader<'a> {
        content: &'a [u8],
    }

    impl Read for BrokenReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.content.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "device unplugged"));
            }
            self.content.read(buf)
        }
    }

    #[test]
    fn read_string() {
        let string = "P3\n# Example PPM image string\n3 2\n255\n255 0 0   0 255 0   0 0 255\n255 255 0  255 0 255  0 255 255";
        let image = parse_ppm_tokens(string).unwrap();
        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 2);
        assert_eq!(image.dot(0, 0), Color::RED);
        assert_eq!(image.dot(1, 0), Color::GREEN);
        assert_eq!(image.dot(2, 0), Color::BLUE);
        assert_eq!(image.dot(2, 1), Color::from_rgb_int(0x00FFFF));
    }

    #[test]
    fn read_continuous_string() {
        let string = "P3 3 2 255 255 0 0   0 255 0   0 0 255 255 255 0  255 0 255  0 255 255";
        let image = parse_ppm_tokens(string).unwrap();
        assert_eq!(image.height(), 2);
    }

    #[test]
    fn read_newline_string() {
        let string = "P3\n# Example PPM image newlines\n3\n2\n255\n255\n0\n0\n0\n255\n0\n0\n0\n255\n255\n255\n0\n255\n0\n255\n0\n255\n255";
        let image = parse_ppm_tokens(string).unwrap();
        assert_eq!(image.height(), 2);
    }

    #[test]
    fn scales_by_max_value() {
        let string = "P3 1 1 15 15 0 5";
        let image = parse_ppm_tokens(string).unwrap();
        assert_eq!(image.dot(0, 0), Color::new(1.0, 0.0, 5.0 / 15.0));
    }

    #[test]
    fn incomplete_pixel() {
        let string = "P3\n3 2 255 0 0 255 0 0";
        if let Err(Error::IncompletePixelParsed(n)) = parse_ppm_tokens(string) {
            if n != 2 {
                panic!("Number of parsed components should be 2, but was {}", n);
            }
            return;
        };
        panic!("Incomplete pixel not detected");
    }

    #[test]
    fn wrong_size() {
        let string = "P3\n3 2 255 0 0 255";
        if let Err(Error::MismatchOfSizeBetweenHeaderAndValues) = parse_ppm_tokens(string) {
            return;
        };
        panic!("Mismatch of size in header and actual pixels was not detected!");
    }

    #[test]
    fn wrong_header() {
        let string = "P6 1 1 255 0 0 0";
        assert!(matches!(
            parse_ppm_tokens(string),
            Err(Error::PPMFileDoesNotContainRequiredToken(_))
        ));
    }

    #[test]
    fn missing_height() {
        let string = "P3 1";
        assert!(matches!(
            parse_ppm_tokens(string),
            Err(Error::PPMFileDoesNotContainRequiredToken(_))
        ));
    }

    #[test]
    fn unparsable_component() {
        let string = "P3 1 1 255 0 x 0";
        assert!(matches!(
            parse_ppm_tokens(string),
            Err(Error::ParsingOfTokenFailed(_))
        ));
    }

    #[test]
    fn component_exceeds_max_value() {
        let string = "P3 1 1 100 0 101 0";
        assert!(matches!(
            parse_ppm_tokens(string),
            Err(Error::ColorValueExceedsMaxValue(101, 100))
        ));
    }

    #[test]
    fn read_error_is_reported() {
        let mut reader = BrokenReader {
            content: b"P3 2 1 255 0 0 0 ",
        };
        match parse_ppm(&mut reader) {
            Err(Error::FailedToReadInputFile(error)) => {
                assert_eq!(error.to_string(), "device unplugged")
            }
            Err(other) => panic!("Expected read failure, got {}", other),
            Ok(_) => panic!("Read failure was not detected"),
        }
    }

    #[test]
    fn read_error_after_complete_image_is_reported() {
        let mut reader = BrokenReader {
            content: b"P3 1 1 255 0 0 0 ",
        };
        assert!(matches!(
            parse_ppm(&mut reader),
            Err(Error::FailedToReadInputFile(_))
        ));
    }
}
