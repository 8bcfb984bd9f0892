//! Linear byte-addressed memory

use crate::word::Word;

/// Frame memory. Grows in 32-byte words and never shrinks.
///
/// Gas for growth is charged by the interpreter before calling [`Memory::grow`];
/// the accessors below only see ranges that are already paid for.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Create new empty memory
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Current size in bytes (always a multiple of 32)
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Size in bytes after touching `[offset, offset + size)`, rounded up to a word
    pub fn size_after(&self, offset: usize, size: usize) -> usize {
        if size == 0 {
            return self.data.len();
        }
        let end = offset.saturating_add(size);
        let aligned = end.div_ceil(32).saturating_mul(32);
        aligned.max(self.data.len())
    }

    /// Zero-fill up to `new_size` bytes
    pub fn grow(&mut self, new_size: usize) {
        if new_size > self.data.len() {
            self.data.resize(new_size, 0);
        }
    }

    /// Load a 32-byte word; bytes past the end read as zero
    pub fn load(&self, offset: usize) -> Word {
        let mut bytes = [0u8; 32];
        self.read_into(offset, &mut bytes);
        Word::from_big_endian(&bytes)
    }

    /// Store a 32-byte word
    pub fn store(&mut self, offset: usize, value: Word) {
        let mut bytes = [0u8; 32];
        value.to_big_endian(&mut bytes);
        self.store_slice(offset, &bytes);
    }

    /// Store a single byte
    pub fn store8(&mut self, offset: usize, value: u8) {
        self.grow(self.size_after(offset, 1));
        self.data[offset] = value;
    }

    /// Borrow `[offset, offset + size)`; empty if the range was never grown into
    pub fn slice(&self, offset: usize, size: usize) -> &[u8] {
        if size == 0 {
            return &[];
        }
        offset
            .checked_add(size)
            .and_then(|end| self.data.get(offset..end))
            .unwrap_or_default()
    }

    /// Store a byte slice
    pub fn store_slice(&mut self, offset: usize, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.grow(self.size_after(offset, data.len()));
        self.data[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Write `size` bytes taken from `src` starting at `src_offset`, zero
    /// padding whatever lies past the end of `src`
    pub fn store_padded(&mut self, offset: usize, size: usize, src: &[u8], src_offset: usize) {
        if size == 0 {
            return;
        }
        self.grow(self.size_after(offset, size));
        let dest = &mut self.data[offset..offset + size];
        let available = src.get(src_offset..).unwrap_or_default();
        let copied = available.len().min(size);
        dest[..copied].copy_from_slice(&available[..copied]);
        dest[copied..].fill(0);
    }

    /// Copy within memory; ranges may overlap
    pub fn copy(&mut self, dest: usize, src: usize, size: usize) {
        if size == 0 {
            return;
        }
        self.grow(self.size_after(dest.max(src), size));
        self.data.copy_within(src..src + size, dest);
    }

    /// Raw memory bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn read_into(&self, offset: usize, out: &mut [u8]) {
        if offset >= self.data.len() {
            return;
        }
        let end = offset.saturating_add(out.len()).min(self.data.len());
        out[..end - offset].copy_from_slice(&self.data[offset..end]);
    }
}
