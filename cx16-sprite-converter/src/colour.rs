use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Debug for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Colour {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Colour { r, g, b }
    }

    /// Reduces the colour to VERA's `0000rrrrggggbbbb` palette word by dropping
    /// the low 4 bits of each channel.
    pub fn to_rgb12(self) -> u16 {
        let (r, g, b) = (self.r as u16, self.g as u16, self.b as u16);
        ((r >> 4) << 8) | ((g >> 4) << 4) | (b >> 4)
    }

    pub fn from_rgb12(rgb12: u16) -> Self {
        let channel = |shift: u16| (((rgb12 >> shift) & 15) as u8) << 4;
        Colour::from_rgb(channel(8), channel(4), channel(0))
    }

    /// The two bytes VERA expects for a palette entry: green and blue first,
    /// then red in the low nibble of the second byte.
    pub fn to_cx16_bytes(self) -> [u8; 2] {
        self.to_rgb12().to_le_bytes()
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Colour {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        Self::from_rgb(
            quickcheck::Arbitrary::arbitrary(g),
            quickcheck::Arbitrary::arbitrary(g),
            quickcheck::Arbitrary::arbitrary(g),
        )
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let original = *self;

        Box::new(
            vec![
                Colour::from_rgb(0, 0, 0),
                Colour::from_rgb(self.r, 0, 0),
                Colour::from_rgb(self.r, self.g, 0),
            ]
            .into_iter()
            .filter(move |&colour| colour != original),
        )
    }
}
