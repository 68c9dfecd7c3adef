use snafu::ensure;

use crate::{Error, TooManyColoursSnafu, colour::Colour};

pub const MAX_COLOURS_PER_PALETTE: usize = 16;
/// Size in bytes of a full palette once packed for VERA.
pub const MAX_PALETTE_SIZE: usize = MAX_COLOURS_PER_PALETTE * 2;

/// Up to 16 colours, kept in the order of the source palette so that pixel
/// indices still refer to the same colours once packed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Palette16 {
    colours: Vec<Colour>,
}

impl Palette16 {
    pub fn from_table(colours: &[Colour]) -> Result<Self, Error> {
        ensure!(
            colours.len() <= MAX_COLOURS_PER_PALETTE,
            TooManyColoursSnafu {
                count: colours.len()
            }
        );

        Ok(Palette16 {
            colours: colours.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    pub fn colours(&self) -> impl Iterator<Item = &Colour> {
        self.colours.iter()
    }

    pub fn to_cx16_bytes(&self) -> Vec<u8> {
        self.colours
            .iter()
            .flat_map(|colour| colour.to_cx16_bytes())
            .collect()
    }
}
