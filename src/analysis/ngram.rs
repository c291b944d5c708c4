//! Fixed-width integer keys for 2-byte and 3-byte sequences
//!
//! Sequence tables are keyed by the raw bytes packed into one integer so the
//! counting loop never allocates or hashes a string:
//!
//! ```text
//! pair   [a, b]     ──▶ u16  (a << 8)  | b
//! triple [a, b, c]  ──▶ u32  (a << 16) | (b << 8) | c     (top byte always 0)
//! ```
//!
//! Sequences are bytes, not characters. A multi-byte UTF-8 character is split
//! across several keys and only reassembled when keys are unpacked.

#[inline]
pub fn pack2(a: u8, b: u8) -> u16 {
    (u16::from(a) << 8) | u16::from(b)
}

#[inline]
pub fn pack3(a: u8, b: u8, c: u8) -> u32 {
    (u32::from(a) << 16) | (u32::from(b) << 8) | u32::from(c)
}

#[inline]
pub fn unpack2(key: u16) -> [u8; 2] {
    let [a, b] = key.to_be_bytes();
    [a, b]
}

#[inline]
pub fn unpack3(key: u32) -> [u8; 3] {
    let [_, a, b, c] = key.to_be_bytes();
    [a, b, c]
}

/// Sliding window over the last three bytes of a stream
///
/// Push bytes one at a time; after each push the window yields the pair and
/// triple ending at that byte once enough bytes have been seen.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteWindow {
    bytes: [u8; 3],
    seen: usize,
}

impl ByteWindow {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.bytes = [self.bytes[1], self.bytes[2], byte];
        self.seen = self.seen.saturating_add(1);
    }

    /// Key of the last two bytes, once at least two have been pushed
    #[inline]
    pub fn pair(&self) -> Option<u16> {
        (self.seen >= 2).then(|| pack2(self.bytes[1], self.bytes[2]))
    }

    /// Key of the last three bytes, once at least three have been pushed
    #[inline]
    pub fn triple(&self) -> Option<u32> {
        (self.seen >= 3).then(|| pack3(self.bytes[0], self.bytes[1], self.bytes[2]))
    }
}
