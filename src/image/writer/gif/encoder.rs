use std::fmt::Display;
use std::io;
use std::io::Write;

use super::{EncodedFrame, OutputSequence};
use crate::error::Error;
use crate::logger;
use crate::Result;

const HEADER: &[u8; 6] = b"GIF89a";
const TRAILER: u8 = 0x3B;
const EXTENSION_INTRODUCER: u8 = 0x21;
const IMAGE_SEPARATOR: u8 = 0x2C;
const APPLICATION_EXTENSION_LABEL: u8 = 0xFF;
const GRAPHIC_CONTROL_EXTENSION_LABEL: u8 = 0xF9;
const BLOCK_TERMINATOR: u8 = 0x00;
const NETSCAPE_IDENTIFIER: &[u8; 11] = b"NETSCAPE2.0";

const COLOR_TABLE_FLAG: u8 = 0b1000_0000;
const COLOR_RESOLUTION: u8 = 0b0111_0000;

enum Block {
    Header,
    LogicalScreenDescriptor,
    GlobalColorTable,
    ApplicationExtension,
    GraphicControlExtension,
    ImageDescriptor,
    LocalColorTable,
    Trailer,
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Header => write!(f, "Header"),
            Self::LogicalScreenDescriptor => write!(f, "Logical Screen Descriptor"),
            Self::GlobalColorTable => write!(f, "Global Color Table"),
            Self::ApplicationExtension => write!(f, "Application Extension"),
            Self::GraphicControlExtension => write!(f, "Graphic Control Extension"),
            Self::ImageDescriptor => write!(f, "Image Descriptor"),
            Self::LocalColorTable => write!(f, "Local Color Table"),
            Self::Trailer => write!(f, "Trailer"),
        }
    }
}

/// Size field of a packed byte, the table holds 2^(field + 1) entries.
fn color_table_size_field(color_table: &[u8]) -> u8 {
    let entries = color_table.len() / 3;
    (entries.max(2).trailing_zeros() - 1) as u8
}

pub struct GifEncoder<'a, T> {
    writer: &'a mut T,
    sequence: &'a OutputSequence,
}

impl<'a, T: Write> GifEncoder<'a, T> {
    pub fn new(writer: &'a mut T, sequence: &'a OutputSequence) -> GifEncoder<'a, T> {
        GifEncoder { writer, sequence }
    }

    pub fn encode(&mut self) -> Result<()> {
        self.write_header()?;
        self.write_logical_screen_descriptor()?;
        self.write_global_color_table()?;
        self.write_application_extension()?;
        for frame in &self.sequence.frames {
            self.write_frame(frame)?;
        }
        self.write_trailer()?;
        Ok(())
    }

    fn write_block(&mut self, block: Block, content: &[u8]) -> io::Result<()> {
        log::info!("Writing {}", block);
        logger::log_block(&block.to_string(), content);
        self.writer.write_all(content)
    }

    fn write_header(&mut self) -> Result<()> {
        self.write_block(Block::Header, HEADER)
            .map_err(|_| Error::FailedToWriteHeader)
    }

    fn write_logical_screen_descriptor(&mut self) -> Result<()> {
        let mut packed = COLOR_RESOLUTION;
        if let Some(color_table) = &self.sequence.global_color_table {
            packed |= COLOR_TABLE_FLAG | color_table_size_field(color_table);
        }
        let mut content: Vec<u8> = Vec::with_capacity(7);
        content.extend(self.sequence.width.to_le_bytes());
        content.extend(self.sequence.height.to_le_bytes());
        content.push(packed);
        // background color index, pixel aspect ratio
        content.push(0);
        content.push(0);
        self.write_block(Block::LogicalScreenDescriptor, &content)
            .map_err(|_| Error::FailedToWriteLogicalScreenDescriptor)
    }

    fn write_global_color_table(&mut self) -> Result<()> {
        let Some(color_table) = &self.sequence.global_color_table else {
            return Ok(());
        };
        self.write_block(Block::GlobalColorTable, color_table)
            .map_err(|_| Error::FailedToWriteColorTable)
    }

    fn write_application_extension(&mut self) -> Result<()> {
        let Some(loop_count) = self.sequence.loop_count else {
            return Ok(());
        };
        let mut content: Vec<u8> = Vec::with_capacity(19);
        content.push(EXTENSION_INTRODUCER);
        content.push(APPLICATION_EXTENSION_LABEL);
        content.push(NETSCAPE_IDENTIFIER.len() as u8);
        content.extend(NETSCAPE_IDENTIFIER);
        content.push(3);
        content.push(1);
        content.extend(loop_count.to_le_bytes());
        content.push(BLOCK_TERMINATOR);
        self.write_block(Block::ApplicationExtension, &content)
            .map_err(|_| Error::FailedToWriteApplicationExtension)
    }

    fn write_frame(&mut self, frame: &EncodedFrame) -> Result<()> {
        self.write_graphic_control_extension(frame)?;
        self.write_image_descriptor(frame)?;
        self.write_local_color_table(frame)?;
        self.write_image_data(frame)
    }

    fn write_graphic_control_extension(&mut self, frame: &EncodedFrame) -> Result<()> {
        let mut content: Vec<u8> = Vec::with_capacity(8);
        content.push(EXTENSION_INTRODUCER);
        content.push(GRAPHIC_CONTROL_EXTENSION_LABEL);
        content.push(4);
        content.push(frame.options.disposal_method.value() << 2);
        content.extend(frame.options.delay_centiseconds.to_le_bytes());
        // transparent color index, unused
        content.push(0);
        content.push(BLOCK_TERMINATOR);
        self.write_block(Block::GraphicControlExtension, &content)
            .map_err(|_| Error::FailedToWriteGraphicControlExtension)
    }

    fn write_image_descriptor(&mut self, frame: &EncodedFrame) -> Result<()> {
        let packed = match &frame.local_color_table {
            Some(color_table) => COLOR_TABLE_FLAG | color_table_size_field(color_table),
            None => 0,
        };
        let mut content: Vec<u8> = Vec::with_capacity(10);
        content.push(IMAGE_SEPARATOR);
        content.extend(frame.options.left.to_le_bytes());
        content.extend(frame.options.top.to_le_bytes());
        content.extend(frame.width.to_le_bytes());
        content.extend(frame.height.to_le_bytes());
        content.push(packed);
        self.write_block(Block::ImageDescriptor, &content)
            .map_err(|_| Error::FailedToWriteImageDescriptor)
    }

    fn write_local_color_table(&mut self, frame: &EncodedFrame) -> Result<()> {
        let Some(color_table) = &frame.local_color_table else {
            return Ok(());
        };
        self.write_block(Block::LocalColorTable, color_table)
            .map_err(|_| Error::FailedToWriteColorTable)
    }

    fn write_image_data(&mut self, frame: &EncodedFrame) -> Result<()> {
        log::info!(
            "Writing Image Data of {} bytes with minimum code size {}",
            frame.data.len(),
            frame.minimum_code_size
        );
        self.writer
            .write_all(&[frame.minimum_code_size])
            .map_err(Error::FailedToWriteImageData)?;
        self.writer
            .write_all(&frame.data)
            .map_err(Error::FailedToWriteImageData)
    }

    fn write_trailer(&mut self) -> Result<()> {
        self.write_block(Block::Trailer, &[TRAILER])
            .map_err(|_| Error::FailedToWriteTrailer)
    }
}
