use gif_sequence_encoder::{convert_ppm_to_gif, CLIParser};
use std::path::PathBuf;
use std::{env, fs};

const FIRST_FRAME_PATH: &str = "tests/frame1.ppm";
const SECOND_FRAME_PATH: &str = "tests/frame2.ppm";

fn get_project_root_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn get_path(relative_path: &str) -> PathBuf {
    let mut root_path = get_project_root_path();
    root_path.push(relative_path);
    root_path
}

fn cleanup(result_image_path: &PathBuf) {
    if result_image_path.exists() && result_image_path.is_file() {
        fs::remove_file(result_image_path).expect("Deletion of output file failed");
    }
}

/// Width, height and RGB triples of a plain PPM fixture.
fn read_ppm_fixture(relative_path: &str) -> (u16, u16, Vec<[u8; 3]>) {
    let content = fs::read_to_string(get_path(relative_path)).expect("Fixture not readable");
    let values: Vec<u32> = content
        .lines()
        .filter(|line| !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace())
        .skip(1)
        .map(|token| token.parse().expect("Fixture token is not a number"))
        .collect();
    let (width, height) = (values[0] as u16, values[1] as u16);
    let dots = values[3..]
        .chunks(3)
        .map(|dot| [dot[0] as u8, dot[1] as u8, dot[2] as u8])
        .collect();
    (width, height, dots)
}

struct DecodedFrame {
    width: u16,
    height: u16,
    dots: Vec<[u8; 3]>,
}

fn read_sub_blocks(content: &[u8], position: &mut usize) -> Vec<u8> {
    let mut data = Vec::new();
    loop {
        let length = content[*position] as usize;
        *position += 1;
        if length == 0 {
            return data;
        }
        data.extend_from_slice(&content[*position..*position + length]);
        *position += length;
    }
}

fn read_color_table(content: &[u8], position: &mut usize, packed: u8) -> Vec<[u8; 3]> {
    let entries = 2usize << (packed & 0x07);
    let table = content[*position..*position + entries * 3]
        .chunks(3)
        .map(|entry| [entry[0], entry[1], entry[2]])
        .collect();
    *position += entries * 3;
    table
}

fn decompress(minimum_code_size: u8, data: &[u8]) -> Vec<u8> {
    let clear_code = 1usize << minimum_code_size;
    let end_code = clear_code + 1;
    let initial_table: Vec<Vec<u8>> = (0..clear_code + 2)
        .map(|code| vec![code as u8])
        .collect();
    let mut table = initial_table.clone();
    let mut code_size = minimum_code_size + 1;
    let mut bit_position = 0;
    let mut previous: Option<usize> = None;
    let mut indices = Vec::new();
    loop {
        let mut code = 0;
        for bit in 0..code_size as usize {
            let byte = data[bit_position / 8];
            code |= (((byte >> (bit_position % 8)) & 1) as usize) << bit;
            bit_position += 1;
        }
        if code == clear_code {
            table = initial_table.clone();
            code_size = minimum_code_size + 1;
            previous = None;
            continue;
        }
        if code == end_code {
            return indices;
        }
        let entry = match (table.get(code), previous) {
            (Some(entry), _) => entry.clone(),
            (None, Some(previous)) => {
                let mut entry = table[previous].clone();
                entry.push(table[previous][0]);
                entry
            }
            (None, None) => panic!("Unknown code {} at start of stream", code),
        };
        if let Some(previous) = previous {
            if table.len() < 4096 {
                let mut new_entry = table[previous].clone();
                new_entry.push(entry[0]);
                table.push(new_entry);
            }
        }
        if table.len() == 1 << code_size && code_size < 12 {
            code_size += 1;
        }
        indices.extend_from_slice(&entry);
        previous = Some(code);
    }
}

fn decode_gif(content: &[u8]) -> Vec<DecodedFrame> {
    assert_eq!(&content[..6], b"GIF89a");
    let screen_packed = content[10];
    let mut position = 13;
    let global_table = if screen_packed & 0x80 != 0 {
        Some(read_color_table(content, &mut position, screen_packed))
    } else {
        None
    };
    let mut frames = Vec::new();
    loop {
        let introducer = content[position];
        position += 1;
        match introducer {
            0x21 => {
                position += 1;
                read_sub_blocks(content, &mut position);
            }
            0x2C => {
                let field = |offset: usize| {
                    u16::from_le_bytes([content[position + offset], content[position + offset + 1]])
                };
                let (width, height) = (field(4), field(6));
                let packed = content[position + 8];
                position += 9;
                let local_table = if packed & 0x80 != 0 {
                    Some(read_color_table(content, &mut position, packed))
                } else {
                    None
                };
                let minimum_code_size = content[position];
                position += 1;
                let data = read_sub_blocks(content, &mut position);
                let indices = decompress(minimum_code_size, &data);
                let table = local_table
                    .as_ref()
                    .or(global_table.as_ref())
                    .expect("Frame without color table");
                frames.push(DecodedFrame {
                    width,
                    height,
                    dots: indices.iter().map(|&index| table[index as usize]).collect(),
                });
            }
            0x3B => {
                assert_eq!(position, content.len(), "Data found after trailer");
                return frames;
            }
            other => panic!("Unexpected block introducer {:#04X}", other),
        }
    }
}

fn assert_frames_match_fixtures(content: &[u8]) {
    let frames = decode_gif(content);
    assert_eq!(frames.len(), 2, "number of frames does not match");
    for (frame, fixture) in frames.iter().zip([FIRST_FRAME_PATH, SECOND_FRAME_PATH]) {
        let (width, height, dots) = read_ppm_fixture(fixture);
        assert_eq!((frame.width, frame.height), (width, height), "{}", fixture);
        assert_eq!(frame.dots, dots, "decoded dots of {} do not match", fixture);
    }
}

fn convert(result_image_name: &str, options: &[&str]) -> Vec<u8> {
    let result_image_path = get_path(result_image_name);
    cleanup(&result_image_path);
    let first_frame_path = get_path(FIRST_FRAME_PATH);
    let second_frame_path = get_path(SECOND_FRAME_PATH);
    let mut command_line = vec![
        "test",
        result_image_path.to_str().unwrap(),
        first_frame_path.to_str().unwrap(),
        second_frame_path.to_str().unwrap(),
    ];
    command_line.extend_from_slice(options);
    let mut cli_parser = CLIParser::new();
    let arguments = cli_parser.parse(command_line);
    convert_ppm_to_gif(&arguments).expect("Conversion failed");
    assert!(result_image_path.exists(), "Output file was not created");
    let content = fs::read(&result_image_path).expect("Output file could not be read");
    cleanup(&result_image_path);
    content
}

#[test]
fn test_convert_ppm_to_gif_with_global_palette() {
    let content = convert("tests/result_global.gif", &["-t", "2"]);
    assert_eq!(&content[..6], b"GIF89a");
    assert_eq!(&content[6..10], &[8, 0, 6, 0], "screen size does not match");
    assert_eq!(content[10] & 0x80, 0x80, "global color table flag missing");
    assert_eq!(content.last(), Some(&0x3B));
}

#[test]
fn test_convert_ppm_to_gif_with_local_palettes() {
    let content = convert(
        "tests/result_local.gif",
        &[
            "--palette_mode",
            "Local",
            "--quantizer",
            "Uniform",
            "--ditherer",
            "Nearest",
            "--colors",
            "8",
            "--delay",
            "20",
            "--loop_count",
            "2",
        ],
    );
    assert_eq!(&content[..6], b"GIF89a");
    assert_eq!(content[10], 0x70, "no global color table expected");
    assert_eq!(&content[13..16], &[0x21, 0xFF, 0x0B]);
    assert_eq!(&content[16..27], b"NETSCAPE2.0");
    assert_eq!(&content[27..32], &[3, 1, 2, 0, 0]);
    assert_eq!(&content[32..36], &[0x21, 0xF9, 4, 0]);
    assert_eq!(&content[36..38], &[20, 0], "delay does not match");
    assert_eq!(content.last(), Some(&0x3B));
}

#[test]
fn test_decoded_frames_match_input_with_global_palette() {
    let content = convert("tests/result_decoded_global.gif", &[]);
    assert_frames_match_fixtures(&content);
}

#[test]
fn test_decoded_frames_match_input_with_local_palettes() {
    let content = convert(
        "tests/result_decoded_local.gif",
        &["--palette_mode", "Local", "--ditherer", "Nearest"],
    );
    assert_frames_match_fixtures(&content);
}
