use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use snafu::{OptionExt, ResultExt, ensure};

use crate::{
    DecodeSnafu, Error, MissingPaletteSnafu, NotIndexedSnafu, OpenImageSnafu, PixelCountSnafu,
    colour::Colour,
};

/// A palette indexed image with one byte per pixel, whatever bit depth the
/// source png was stored at.
#[derive(Debug, Clone)]
pub struct IndexedImage {
    width: usize,
    height: usize,
    bit_depth: u8,
    indices: Vec<u8>,
    palette: Vec<Colour>,
}

impl IndexedImage {
    pub fn load_from_file(image_path: &Path) -> Result<Self, Error> {
        let file = File::open(image_path).context(OpenImageSnafu { path: image_path })?;

        Self::load_from_reader(BufReader::new(file), image_path)
    }

    /// `image_path` is only used for error reporting.
    pub fn load_from_reader(reader: impl Read, image_path: &Path) -> Result<Self, Error> {
        let mut decoder = png::Decoder::new(reader);
        // keep the raw indices rather than expanding them to rgb
        decoder.set_transformations(png::Transformations::IDENTITY);

        let mut reader = decoder
            .read_info()
            .context(DecodeSnafu { path: image_path })?;

        let info = reader.info();
        ensure!(
            info.color_type == png::ColorType::Indexed,
            NotIndexedSnafu {
                colour_type: info.color_type
            }
        );

        let palette = info
            .palette
            .as_deref()
            .context(MissingPaletteSnafu)?
            .chunks_exact(3)
            .map(|rgb| Colour::from_rgb(rgb[0], rgb[1], rgb[2]))
            .collect();

        let mut buffer = vec![0; reader.output_buffer_size()];
        let frame = reader
            .next_frame(&mut buffer)
            .context(DecodeSnafu { path: image_path })?;

        let width = frame.width as usize;
        let height = frame.height as usize;
        let bit_depth = frame.bit_depth as u8;

        let indices = unpack_rows(
            &buffer[..frame.buffer_size()],
            frame.line_size,
            width,
            height,
            bit_depth,
        );

        Ok(IndexedImage {
            width,
            height,
            bit_depth,
            indices,
            palette,
        })
    }

    /// Builds an image from one index per pixel, row by row.
    pub fn from_indices(
        width: usize,
        height: usize,
        indices: Vec<u8>,
        palette: Vec<Colour>,
    ) -> Result<Self, Error> {
        ensure!(
            width.checked_mul(height) == Some(indices.len()),
            PixelCountSnafu {
                width,
                height,
                actual: indices.len(),
            }
        );

        Ok(IndexedImage {
            width,
            height,
            bit_depth: 8,
            indices,
            palette,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The bit depth of the png the image was decoded from.
    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    pub fn palette(&self) -> &[Colour] {
        &self.palette
    }

    pub(crate) fn index(&self, x: usize, y: usize) -> u8 {
        self.indices[x + y * self.width]
    }

    /// Every pixel as `(x, y, index)`, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.indices
            .iter()
            .enumerate()
            .map(|(i, &index)| (i % self.width, i / self.width, index))
    }
}

// Indexed pngs below 8 bits pack several pixels into each byte, leftmost pixel
// in the most significant bits, and pad every row out to a whole byte.
fn unpack_rows(
    data: &[u8],
    line_size: usize,
    width: usize,
    height: usize,
    bit_depth: u8,
) -> Vec<u8> {
    let bit_depth = bit_depth as usize;
    let pixels_per_byte = 8 / bit_depth;
    let mask = ((1u16 << bit_depth) - 1) as u8;

    data.chunks(line_size)
        .take(height)
        .flat_map(|row| {
            (0..width).map(move |x| {
                let shift = 8 - bit_depth * (x % pixels_per_byte + 1);
                (row[x / pixels_per_byte] >> shift) & mask
            })
        })
        .collect()
}
