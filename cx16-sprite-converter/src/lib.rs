//! Converts palette indexed PNG sprites into the raw files the Commander X16
//! loads straight into VERA: a 4bpp bitmap and a 16 colour palette.
//!
//! ```no_run
//! use cx16_sprite_converter::{ConverterConfig, convert_sprite};
//!
//! let sprite = convert_sprite(&ConverterConfig::default())?;
//! assert_eq!(sprite.bitmap().len(), 4096);
//! # Ok::<(), cx16_sprite_converter::Error>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use snafu::{ResultExt, Snafu, ensure};

mod bitmap;
mod colour;
mod config;
mod image_loader;
mod palette16;

pub use bitmap::{BITMAP_SIZE, SPRITE_HEIGHT, SPRITE_WIDTH};
pub use colour::Colour;
pub use config::ConverterConfig;
pub use image_loader::IndexedImage;
pub use palette16::{MAX_COLOURS_PER_PALETTE, MAX_PALETTE_SIZE, Palette16};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to open image {}", path.display()))]
    OpenImage {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to decode {} as a png", path.display()))]
    Decode {
        path: PathBuf,
        source: png::DecodingError,
    },

    #[snafu(display("Expected an indexed colour image, got {colour_type:?}"))]
    NotIndexed { colour_type: png::ColorType },

    /// An indexed png with no `PLTE` chunk. Some versions of the png decoder
    /// reject these themselves, in which case this surfaces as `Decode`.
    #[snafu(display("Indexed image has no palette"))]
    MissingPalette,

    #[snafu(display("A {width}x{height} image needs one index per pixel, got {actual}"))]
    PixelCount {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[snafu(display(
        "The sprite size ({width}, {height}) is invalid, must be ({SPRITE_WIDTH}, {SPRITE_HEIGHT})"
    ))]
    InvalidDimensions { width: usize, height: usize },

    #[snafu(display(
        "Palette has {count} colours but can have at most {MAX_COLOURS_PER_PALETTE}"
    ))]
    TooManyColours { count: usize },

    #[snafu(display(
        "Pixel ({x}, {y}) uses colour {index} but the palette only has {palette_len} colours"
    ))]
    IndexOutOfRange {
        x: usize,
        y: usize,
        index: u8,
        palette_len: usize,
    },

    #[snafu(display("Packed {what} is {actual} bytes, expected {expected}"))]
    BufferSize {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[snafu(display("Failed to write {}", path.display()))]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to read config file {}", path.display()))]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to parse config file {}", path.display()))]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[snafu(display(
        "Expected version of {} to be 1.0, got {version}",
        path.display()
    ))]
    UnsupportedConfigVersion { path: PathBuf, version: String },
}

/// The packed bitmap and palette for one sprite, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedSprite {
    bitmap: Vec<u8>,
    palette: Vec<u8>,
}

impl ConvertedSprite {
    /// Validates the image and packs it. Nothing is written to disk here, so
    /// every way the conversion can fail is caught before any output exists.
    pub fn from_image(image: &IndexedImage) -> Result<Self, Error> {
        ensure!(
            image.width() == SPRITE_WIDTH && image.height() == SPRITE_HEIGHT,
            InvalidDimensionsSnafu {
                width: image.width(),
                height: image.height(),
            }
        );

        let palette = Palette16::from_table(image.palette())?;
        let bitmap = bitmap::pack_4bpp(image, palette.len())?;
        let palette = palette.to_cx16_bytes();

        ensure!(
            bitmap.len() == BITMAP_SIZE,
            BufferSizeSnafu {
                what: "bitmap",
                expected: BITMAP_SIZE,
                actual: bitmap.len(),
            }
        );
        ensure!(
            palette.len() <= MAX_PALETTE_SIZE,
            BufferSizeSnafu {
                what: "palette",
                expected: MAX_PALETTE_SIZE,
                actual: palette.len(),
            }
        );

        Ok(ConvertedSprite { bitmap, palette })
    }

    pub fn bitmap(&self) -> &[u8] {
        &self.bitmap
    }

    pub fn palette(&self) -> &[u8] {
        &self.palette
    }

    /// Overwrites the palette file, then the bitmap file.
    pub fn write(&self, config: &ConverterConfig) -> Result<(), Error> {
        write_output(&config.palette_output, &self.palette)?;
        write_output(&config.bitmap_output, &self.bitmap)
    }
}

fn write_output(path: &Path, data: &[u8]) -> Result<(), Error> {
    fs::write(path, data).context(WriteOutputSnafu { path })?;
    tracing::info!(path = %path.display(), bytes = data.len(), "Wrote output");

    Ok(())
}

/// Loads the sprite named by `config`, converts it and writes both output files.
pub fn convert_sprite(config: &ConverterConfig) -> Result<ConvertedSprite, Error> {
    let _span =
        tracing::info_span!("convert sprite", input = %config.input.display()).entered();

    let image = IndexedImage::load_from_file(&config.input)?;
    tracing::info!(
        width = image.width(),
        height = image.height(),
        bit_depth = image.bit_depth(),
        colours = image.palette().len(),
        "Loaded image"
    );

    let sprite = ConvertedSprite::from_image(&image)?;
    sprite.write(config)?;

    Ok(sprite)
}

#[cfg(test)]
mod test {
    use tempfile::TempDir;

    use super::*;
    use crate::image_loader::test::{write_indexed_png, write_rgb_png};

    fn config_in(dir: &TempDir) -> ConverterConfig {
        ConverterConfig {
            input: dir.path().join("sprite.png"),
            bitmap_output: dir.path().join("SPRITE.BIN"),
            palette_output: dir.path().join("SPRITE.PAL"),
        }
    }

    fn assert_no_output(config: &ConverterConfig) {
        assert!(!config.bitmap_output.exists());
        assert!(!config.palette_output.exists());
    }

    fn sprite_indices(f: impl Fn(usize, usize) -> u8) -> Vec<u8> {
        (0..SPRITE_HEIGHT)
            .flat_map(|y| (0..SPRITE_WIDTH).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect()
    }

    fn write_sprite(path: &Path, palette: &[u8], indices: &[u8]) {
        write_indexed_png(
            path,
            SPRITE_WIDTH as u32,
            SPRITE_HEIGHT as u32,
            png::BitDepth::Eight,
            palette,
            indices,
        );
    }

    #[test]
    fn blank_white_sprite_converts() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        write_sprite(&config.input, &[255, 255, 255], &sprite_indices(|_, _| 0));

        let sprite = convert_sprite(&config).unwrap();

        assert_eq!(sprite.bitmap(), &[0; BITMAP_SIZE][..]);
        assert_eq!(sprite.palette(), &[0xff, 0x0f]);
        assert_eq!(fs::read(&config.bitmap_output).unwrap(), sprite.bitmap());
        assert_eq!(fs::read(&config.palette_output).unwrap(), sprite.palette());
    }

    #[test]
    fn pixels_pair_up_high_nibble_first() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let palette: Vec<u8> = (0..16).flat_map(|i| [i * 16, i * 16, i * 16]).collect();
        let indices = sprite_indices(|x, y| ((x + y) % 16) as u8);
        write_sprite(&config.input, &palette, &indices);

        let sprite = convert_sprite(&config).unwrap();

        assert_eq!(sprite.bitmap().len(), BITMAP_SIZE);
        assert_eq!(sprite.palette().len(), 32);
        for (i, byte) in sprite.bitmap().iter().enumerate() {
            assert_eq!(*byte, (indices[i * 2] << 4) | indices[i * 2 + 1]);
        }
    }

    #[test]
    fn four_bit_png_matches_eight_bit_png() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let palette: Vec<u8> = (0..4).flat_map(|i| [i * 60, 0, 255 - i * 60]).collect();
        let indices = sprite_indices(|x, y| ((x * 3 + y) % 4) as u8);
        write_sprite(&config.input, &palette, &indices);
        let eight_bit = convert_sprite(&config).unwrap();

        let packed: Vec<u8> = indices
            .chunks_exact(2)
            .map(|pair| (pair[0] << 4) | pair[1])
            .collect();
        write_indexed_png(
            &config.input,
            SPRITE_WIDTH as u32,
            SPRITE_HEIGHT as u32,
            png::BitDepth::Four,
            &palette,
            &packed,
        );
        let four_bit = convert_sprite(&config).unwrap();

        assert_eq!(four_bit, eight_bit);
        assert_eq!(four_bit.bitmap(), &packed[..]);
    }

    #[test]
    fn wrong_size_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        write_indexed_png(
            &config.input,
            32,
            32,
            png::BitDepth::Eight,
            &[0, 0, 0],
            &[0; 32 * 32],
        );

        let err = convert_sprite(&config).unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidDimensions {
                width: 32,
                height: 32
            }
        ));
        assert_no_output(&config);
    }

    #[test]
    fn rgb_image_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        write_rgb_png(&config.input, SPRITE_WIDTH as u32, SPRITE_HEIGHT as u32);

        let err = convert_sprite(&config).unwrap_err();

        assert!(matches!(
            err,
            Error::NotIndexed {
                colour_type: png::ColorType::Rgb
            }
        ));
        assert_no_output(&config);
    }

    #[test]
    fn too_many_colours_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let palette: Vec<u8> = (0..17).flat_map(|i| [i, i, i]).collect();
        write_sprite(&config.input, &palette, &sprite_indices(|_, _| 0));

        let err = convert_sprite(&config).unwrap_err();

        assert!(matches!(err, Error::TooManyColours { count: 17 }));
        assert_no_output(&config);
    }

    #[test]
    fn index_past_the_palette_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let indices = sprite_indices(|x, y| if (x, y) == (5, 9) { 2 } else { 1 });
        write_sprite(&config.input, &[0, 0, 0, 255, 255, 255], &indices);

        let err = convert_sprite(&config).unwrap_err();

        assert!(matches!(
            err,
            Error::IndexOutOfRange {
                x: 5,
                y: 9,
                index: 2,
                palette_len: 2
            }
        ));
        assert_no_output(&config);
    }

    #[test]
    fn missing_input_reports_the_path() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let err = convert_sprite(&config).unwrap_err();

        assert!(matches!(&err, Error::OpenImage { path, .. } if *path == config.input));
        assert_no_output(&config);
    }

    #[test]
    fn outputs_are_overwritten() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        fs::write(&config.bitmap_output, [0xaa; 10_000]).unwrap();
        fs::write(&config.palette_output, [0xaa; 100]).unwrap();
        write_sprite(&config.input, &[255, 255, 255], &sprite_indices(|_, _| 0));

        convert_sprite(&config).unwrap();

        assert_eq!(fs::read(&config.bitmap_output).unwrap().len(), BITMAP_SIZE);
        assert_eq!(fs::read(&config.palette_output).unwrap(), [0xff, 0x0f]);
    }
}
