use std::io;
use std::io::Write;

/// Largest number of data bytes in one sub-block
pub const MAX_SUB_BLOCK_LENGTH: usize = 255;

/// State for writing variable width codes to a Writer, least significant
/// bit first
pub struct BitWriter<T: Write> {
    /// the underlying output stream
    writer: T,
    /// buffer of individual bits not yet written
    buffer: u8,
    /// how many bits are waiting to be written
    buffer_space_used: u8,
}

impl<T: Write> BitWriter<T> {
    pub fn new(writer: T) -> BitWriter<T> {
        BitWriter {
            writer,
            buffer: 0,
            buffer_space_used: 0,
        }
    }

    /// write the lowest `count` bits of `value`, lowest bit first
    ///
    /// completed bytes are passed on to the underlying writer right away,
    /// use flush to write a trailing partial byte.
    pub fn write_bits(&mut self, value: u32, count: u8) -> io::Result<()> {
        if count > 32 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "can't write more than 32 bits at once",
            ));
        }
        let mut value = value;
        let mut remaining = count;
        while remaining > 0 {
            let free = 8 - self.buffer_space_used;
            let taken = free.min(remaining);
            let mask = ((1u16 << taken) - 1) as u8;
            self.buffer |= ((value as u8) & mask) << self.buffer_space_used;
            self.buffer_space_used += taken;
            remaining -= taken;
            value = value.checked_shr(taken as u32).unwrap_or(0);
            if self.buffer_space_used == 8 {
                self.writer.write_all(&[self.buffer])?;
                self.buffer = 0; // depended upon in flush()
                self.buffer_space_used = 0;
            }
        }
        Ok(())
    }

    pub fn get_ref(&self) -> &T {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.writer
    }

    pub fn into_inner(self) -> T {
        self.writer
    }
}

impl<T: Write> Write for BitWriter<T> {
    /// Writing of whole bytes, each one is treated as an 8 bit code
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.write_bits(byte as u32, 8)?;
        }
        Ok(buf.len())
    }

    /// Flush all bits and the underlying writer;
    ///
    /// If there are non-byte-aligned bits still
    /// in the buffer, they will be written to the output
    /// with 0 padding to the next byte;
    fn flush(&mut self) -> io::Result<()> {
        if self.buffer_space_used != 0 {
            self.writer.write_all(&[self.buffer])?;
            self.buffer = 0;
            self.buffer_space_used = 0;
        }
        self.writer.flush()
    }
}

/// Splits a byte stream into length-prefixed sub-blocks of at most 255 bytes.
///
/// Full blocks are written as soon as they are complete. `flush` writes a
/// pending partial block, `finish` additionally writes the zero-length
/// block terminator.
pub struct SubBlockWriter<T: Write> {
    writer: T,
    block: Vec<u8>,
    blocks_written: usize,
}

impl<T: Write> SubBlockWriter<T> {
    pub fn new(writer: T) -> Self {
        SubBlockWriter {
            writer,
            block: Vec::with_capacity(MAX_SUB_BLOCK_LENGTH),
            blocks_written: 0,
        }
    }

    fn write_block(&mut self) -> io::Result<()> {
        if self.block.is_empty() {
            return Ok(());
        }
        self.writer.write_all(&[self.block.len() as u8])?;
        self.writer.write_all(&self.block)?;
        self.block.clear();
        self.blocks_written += 1;
        Ok(())
    }

    pub fn blocks_written(&self) -> usize {
        self.blocks_written
    }

    pub fn finish(&mut self) -> io::Result<()> {
        self.flush()?;
        self.writer.write_all(&[0])?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> T {
        self.writer
    }
}

impl<T: Write> Write for SubBlockWriter<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.block.push(byte);
            if self.block.len() == MAX_SUB_BLOCK_LENGTH {
                self.write_block()?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.write_block()?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod test {
    use super::{BitWriter, SubBlockWriter};
    use std::io::Write;

    #[test]
    fn byte_mode_test() {
        let mut my_output: Vec<u8> = vec![];
        let mut writer = BitWriter::new(&mut my_output);
        let input: &[u8] = &[72, 65, 76, 76, 79];
        writer.write_all(input).expect("should not fail");
        writer.flush().expect("flushing should not fail");
        assert_eq!(my_output, vec![72, 65, 76, 76, 79]);
    }

    #[test]
    fn bit_mode_test() {
        let mut my_output: Vec<u8> = vec![];
        let mut writer = BitWriter::new(&mut my_output);
        // 0b100 then 0b001 then 0b010 then 0b0110 then 0b1000
        writer.write_bits(4, 3).expect("ERR");
        writer.write_bits(1, 3).expect("ERR");
        writer.write_bits(2, 3).expect("ERR");
        writer.write_bits(6, 3).expect("ERR");
        writer.write_bits(8, 4).expect("ERR");
        writer.flush().expect("ERR");
        assert_eq!(my_output, vec![0b1000_1100, 0b1000_1100]);
    }

    #[test]
    fn partial_byte_is_zero_padded() {
        let mut my_output: Vec<u8> = vec![];
        let mut writer = BitWriter::new(&mut my_output);
        writer.write_bits(0b101, 3).expect("ERR");
        writer.flush().expect("ERR");
        assert_eq!(my_output, vec![0b0000_0101]);
    }

    #[test]
    fn wide_code_spans_bytes() {
        let mut my_output: Vec<u8> = vec![];
        let mut writer = BitWriter::new(&mut my_output);
        writer.write_bits(0b1, 1).expect("ERR");
        writer.write_bits(0xABC, 12).expect("ERR");
        writer.flush().expect("ERR");
        // 0xABC << 1 | 1 = 0x1579
        assert_eq!(my_output, vec![0x79, 0x15]);
    }

    #[test]
    fn bits_above_count_are_ignored() {
        let mut my_output: Vec<u8> = vec![];
        let mut writer = BitWriter::new(&mut my_output);
        writer.write_bits(0xFF, 2).expect("ERR");
        writer.flush().expect("ERR");
        assert_eq!(my_output, vec![0b11]);
    }

    #[test]
    fn sub_blocks_are_length_prefixed() {
        let mut my_output: Vec<u8> = vec![];
        let mut writer = SubBlockWriter::new(&mut my_output);
        let data: Vec<u8> = (0..300).map(|i| i as u8).collect();
        writer.write_all(&data).expect("ERR");
        writer.finish().expect("ERR");
        assert_eq!(writer.blocks_written(), 2);
        assert_eq!(my_output.len(), 1 + 255 + 1 + 45 + 1);
        assert_eq!(my_output[0], 255);
        assert_eq!(&my_output[1..256], &data[..255]);
        assert_eq!(my_output[256], 45);
        assert_eq!(&my_output[257..302], &data[255..]);
        assert_eq!(my_output[302], 0);
    }

    #[test]
    fn exactly_full_block_has_no_empty_trailing_block() {
        let mut my_output: Vec<u8> = vec![];
        let mut writer = SubBlockWriter::new(&mut my_output);
        writer.write_all(&[7; 255]).expect("ERR");
        writer.finish().expect("ERR");
        assert_eq!(my_output.len(), 257);
        assert_eq!(my_output[0], 255);
        assert_eq!(my_output[256], 0);
    }

    #[test]
    fn empty_stream_is_only_terminator() {
        let mut my_output: Vec<u8> = vec![];
        let mut writer = SubBlockWriter::new(&mut my_output);
        writer.finish().expect("ERR");
        assert_eq!(my_output, vec![0]);
    }
}
