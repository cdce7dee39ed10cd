//! Helper functions for reading binary data

use std::io::{Cursor, Read};

use crate::error::GlbError;

/// Read a 32-bit little-endian integer
pub(crate) fn read_u32(cursor: &mut Cursor<&[u8]>, context: &'static str) -> Result<u32, GlbError> {
    let mut buf = [0u8; 4];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| GlbError::CorruptFile(context))?;
    Ok(u32::from_le_bytes(buf))
}

/// Borrow `len` bytes at the cursor position and advance past them
pub(crate) fn read_slice<'a>(
    cursor: &mut Cursor<&'a [u8]>,
    len: usize,
    context: &'static str,
) -> Result<&'a [u8], GlbError> {
    let data: &'a [u8] = *cursor.get_ref();
    let start = cursor.position() as usize;
    let bytes = start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or(GlbError::CorruptFile(context))?;
    cursor.set_position((start + len) as u64);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u32_little_endian() {
        let data = [0x67, 0x6C, 0x54, 0x46, 0x02];
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(read_u32(&mut cursor, "magic").unwrap(), 0x4654_6C67);
        assert!(matches!(
            read_u32(&mut cursor, "version"),
            Err(GlbError::CorruptFile("version"))
        ));
    }

    #[test]
    fn test_read_slice_bounds() {
        let data = [1u8, 2, 3, 4, 5];
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(read_slice(&mut cursor, 2, "a").unwrap(), &[1, 2]);
        assert_eq!(read_slice(&mut cursor, 3, "b").unwrap(), &[3, 4, 5]);
        assert!(read_slice(&mut cursor, 1, "c").is_err());
        assert!(read_slice(&mut cursor, usize::MAX, "d").is_err());
    }
}
