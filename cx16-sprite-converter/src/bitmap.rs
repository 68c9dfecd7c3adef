use crate::{Error, IndexOutOfRangeSnafu, image_loader::IndexedImage};

pub const SPRITE_WIDTH: usize = 64;
pub const SPRITE_HEIGHT: usize = 128;
pub const BITMAP_SIZE: usize = SPRITE_WIDTH * SPRITE_HEIGHT / 2;

/// Packs two pixels per byte, left pixel in the high nibble, row by row from
/// the top. The image width must be even.
///
/// Fails if any pixel refers to a colour beyond `palette_len`, reporting the
/// first such pixel.
pub(crate) fn pack_4bpp(image: &IndexedImage, palette_len: usize) -> Result<Vec<u8>, Error> {
    if let Some((x, y, index)) = image
        .pixels()
        .find(|&(_, _, index)| usize::from(index) >= palette_len)
    {
        return IndexOutOfRangeSnafu {
            x,
            y,
            index,
            palette_len,
        }
        .fail();
    }

    Ok((0..image.height())
        .flat_map(|y| (0..image.width() / 2).map(move |x| (x * 2, y)))
        .map(|(x, y)| (image.index(x, y) << 4) | image.index(x + 1, y))
        .collect())
}
