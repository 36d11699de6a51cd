use byteorder::{ByteOrder, LittleEndian};

use crate::error::CoreError;

/// Bounds-checked little-endian access over a borrowed save region.
///
/// Every read and write validates `offset..offset + width` against the
/// region first, so an out-of-range request surfaces as
/// [`CoreError::BufferTooShort`] and never touches memory.
pub struct LeBytes<B> {
    inner: B,
}

pub fn ensure_len(buffer: &[u8], offset: usize, len: usize) -> Result<(), CoreError> {
    match offset.checked_add(len) {
        Some(end) if end <= buffer.len() => Ok(()),
        _ => Err(CoreError::BufferTooShort {
            offset,
            len,
            buffer_len: buffer.len(),
        }),
    }
}

/// `base + offset`, or `BufferTooShort` when the sum overflows.
pub fn offset_from(buffer: &[u8], base: usize, offset: usize) -> Result<usize, CoreError> {
    base.checked_add(offset).ok_or(CoreError::BufferTooShort {
        offset: base,
        len: offset,
        buffer_len: buffer.len(),
    })
}

impl<B: AsRef<[u8]>> LeBytes<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    pub fn len(&self) -> usize {
        self.inner.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8], CoreError> {
        let bytes = self.inner.as_ref();
        ensure_len(bytes, offset, len)?;
        Ok(&bytes[offset..offset + len])
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, CoreError> {
        Ok(self.slice(offset, 1)?[0])
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, CoreError> {
        Ok(LittleEndian::read_u16(self.slice(offset, 2)?))
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, CoreError> {
        Ok(LittleEndian::read_u32(self.slice(offset, 4)?))
    }

    pub fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], CoreError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.slice(offset, N)?);
        Ok(out)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> LeBytes<B> {
    pub fn slice_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8], CoreError> {
        ensure_len(self.inner.as_ref(), offset, len)?;
        Ok(&mut self.inner.as_mut()[offset..offset + len])
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) -> Result<(), CoreError> {
        self.slice_mut(offset, 1)?[0] = value;
        Ok(())
    }

    pub fn write_u16(&mut self, offset: usize, value: u16) -> Result<(), CoreError> {
        LittleEndian::write_u16(self.slice_mut(offset, 2)?, value);
        Ok(())
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) -> Result<(), CoreError> {
        LittleEndian::write_u32(self.slice_mut(offset, 4)?, value);
        Ok(())
    }

    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<(), CoreError> {
        self.slice_mut(offset, bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::LeBytes;
    use crate::error::CoreErrorCode;

    #[test]
    fn reads_little_endian_words() {
        let bytes = [0x34u8, 0x12, 0x78, 0x56];
        let view = LeBytes::new(&bytes[..]);
        assert_eq!(view.read_u16(0).unwrap(), 0x1234);
        assert_eq!(view.read_u32(0).unwrap(), 0x5678_1234);
    }

    #[test]
    fn rejects_reads_past_the_end() {
        let bytes = [0u8; 3];
        let view = LeBytes::new(&bytes[..]);
        let err = view.read_u32(0).unwrap_err();
        assert_eq!(err.code(), CoreErrorCode::BufferTooShort);
        assert!(view.read_u8(usize::MAX).is_err());
    }

    #[test]
    fn failed_write_leaves_buffer_untouched() {
        let mut bytes = [0xAAu8; 3];
        let mut view = LeBytes::new(&mut bytes[..]);
        assert!(view.write_u32(1, 0).is_err());
        assert_eq!(bytes, [0xAA; 3]);
    }
}
