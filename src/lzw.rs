//! GIF flavoured Lempel-Ziv-Welch compression of palette indices.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::binary_stream::{BitWriter, SubBlockWriter};
use crate::error::Error;
use crate::Result;

pub const MAX_CODE_SIZE: u8 = 12;
const MAX_CODE_COUNT: u16 = 1 << MAX_CODE_SIZE;
const SMALLEST_MINIMUM_CODE_SIZE: u8 = 2;
const MIN_COLOR_TABLE_SIZE: usize = 2;
const MAX_COLOR_TABLE_SIZE: usize = 256;

/// Smallest `b` with `2^b >= color_table_size`, but at least 2.
pub fn minimum_code_size_for(color_table_size: usize) -> u8 {
    let mut bits = 0;
    while (1usize << bits) < color_table_size {
        bits += 1;
    }
    bits.max(SMALLEST_MINIMUM_CODE_SIZE)
}

/// Encoder configuration for one color table size.
///
/// The clear code is `2^minimum_code_size`, which is the color table size
/// for every table with at least four entries. A two color table still uses
/// a minimum code size of 2, so its clear code is 4.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LzwEncoder {
    color_table_size: usize,
    minimum_code_size: u8,
}

impl LzwEncoder {
    pub fn new(color_table_size: usize) -> Result<Self> {
        if !color_table_size.is_power_of_two()
            || !(MIN_COLOR_TABLE_SIZE..=MAX_COLOR_TABLE_SIZE).contains(&color_table_size)
        {
            return Err(Error::InvalidArgument(format!(
                "Color table size must be a power of two between {} and {}, but was {}",
                MIN_COLOR_TABLE_SIZE, MAX_COLOR_TABLE_SIZE, color_table_size
            )));
        }
        Ok(LzwEncoder {
            color_table_size,
            minimum_code_size: minimum_code_size_for(color_table_size),
        })
    }

    pub fn minimum_code_size(&self) -> u8 {
        self.minimum_code_size
    }

    pub fn clear_code(&self) -> u16 {
        1 << self.minimum_code_size
    }

    pub fn end_of_information_code(&self) -> u16 {
        self.clear_code() + 1
    }

    fn first_free_code(&self) -> u16 {
        self.clear_code() + 2
    }

    /// Compresses `indices` into `writer` as a sequence of sub-blocks,
    /// terminated by an empty block.
    pub fn encode<W: Write>(&self, indices: &[u8], writer: W) -> Result<()> {
        let mut stream = self.stream(writer);
        stream.push(indices)?;
        stream.finish()
    }

    /// Starts a resumable encoding into `writer`. Nothing is written until
    /// the first call to [`LzwStream::push`] or [`LzwStream::finish`].
    pub fn stream<W: Write>(&self, writer: W) -> LzwStream<W> {
        LzwStream {
            encoder: *self,
            writer: BitWriter::new(SubBlockWriter::new(writer)),
            dictionary: HashMap::new(),
            code_size: self.minimum_code_size + 1,
            next_code: self.first_free_code(),
            prefix: None,
            state: StreamState::Init,
            codes_written: 0,
        }
    }

    fn check_indices(&self, indices: &[u8]) -> Result<()> {
        match indices
            .iter()
            .find(|&&index| index as usize >= self.color_table_size)
        {
            Some(index) => Err(Error::InvalidArgument(format!(
                "Index {} is outside of the color table of size {}",
                index, self.color_table_size
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    Init,
    Accumulating,
    Flushed,
}

/// Encoding state which survives between calls to [`LzwStream::push`].
pub struct LzwStream<W: Write> {
    encoder: LzwEncoder,
    writer: BitWriter<SubBlockWriter<W>>,
    /// (code of the matched prefix, appended index) -> code of the extension
    dictionary: HashMap<(u16, u8), u16>,
    code_size: u8,
    next_code: u16,
    /// code of the longest match so far, `None` right after a start
    prefix: Option<u16>,
    state: StreamState,
    codes_written: usize,
}

impl<W: Write> LzwStream<W> {
    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn push(&mut self, indices: &[u8]) -> Result<()> {
        self.ensure_not_flushed()?;
        self.encoder.check_indices(indices)?;
        if self.state == StreamState::Init {
            self.start().map_err(Error::FailedToWriteImageData)?;
        }
        for &index in indices {
            self.process(index).map_err(Error::FailedToWriteImageData)?;
        }
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        self.ensure_not_flushed()?;
        if self.state == StreamState::Init {
            self.start().map_err(Error::FailedToWriteImageData)?;
        }
        self.write_remaining_codes()
            .map_err(Error::FailedToWriteImageData)?;
        self.state = StreamState::Flushed;
        log::debug!(
            "LZW stream finished after {} codes in {} sub-blocks",
            self.codes_written,
            self.writer.get_ref().blocks_written()
        );
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().into_inner()
    }

    fn ensure_not_flushed(&self) -> Result<()> {
        if self.state == StreamState::Flushed {
            return Err(Error::IllegalState(
                "LZW stream was already finished".to_owned(),
            ));
        }
        Ok(())
    }

    fn start(&mut self) -> io::Result<()> {
        self.write_code(self.encoder.clear_code())?;
        self.reset();
        self.state = StreamState::Accumulating;
        Ok(())
    }

    fn reset(&mut self) {
        self.dictionary.clear();
        self.code_size = self.encoder.minimum_code_size + 1;
        self.next_code = self.encoder.first_free_code();
    }

    fn process(&mut self, index: u8) -> io::Result<()> {
        let Some(prefix) = self.prefix else {
            self.prefix = Some(index as u16);
            return Ok(());
        };
        if let Some(&code) = self.dictionary.get(&(prefix, index)) {
            self.prefix = Some(code);
            return Ok(());
        }
        self.write_code(prefix)?;
        if self.next_code == MAX_CODE_COUNT {
            log::trace!("LZW dictionary full, resetting");
            self.write_code(self.encoder.clear_code())?;
            self.reset();
        } else {
            self.insert(prefix, index);
        }
        self.prefix = Some(index as u16);
        Ok(())
    }

    fn insert(&mut self, prefix: u16, index: u8) {
        self.dictionary.insert((prefix, index), self.next_code);
        self.next_code += 1;
        // the code just inserted needs one more bit than the current width
        if self.next_code > 1 << self.code_size && self.code_size < MAX_CODE_SIZE {
            self.code_size += 1;
        }
    }

    fn write_remaining_codes(&mut self) -> io::Result<()> {
        if let Some(prefix) = self.prefix.take() {
            self.write_code(prefix)?;
            // a decoder adds one more entry after reading the last code
            if self.next_code == 1 << self.code_size && self.code_size < MAX_CODE_SIZE {
                self.code_size += 1;
            }
        }
        self.write_code(self.encoder.end_of_information_code())?;
        self.writer.flush()?;
        self.writer.get_mut().finish()
    }

    fn write_code(&mut self, code: u16) -> io::Result<()> {
        self.codes_written += 1;
        self.writer.write_bits(code as u32, self.code_size)
    }
}
