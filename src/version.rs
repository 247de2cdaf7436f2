use crate::read::ReadError;
use crate::stream::{ByteReader, Truncated};

/// Version tag written at the start of every file.
///
/// Files carrying any other tag are never decoded.
pub const FORMAT_VERSION: f32 = 1.0;

/// Width of the leading version tag.
pub const fn encoded_len() -> usize {
    std::mem::size_of::<f32>()
}

#[inline]
pub fn is_supported(version: f32) -> bool {
    version == FORMAT_VERSION
}

/// Reads the version tag at the reader's cursor and checks it.
pub fn check_version(reader: &mut ByteReader<'_>) -> Result<bool, Truncated> {
    reader.read_f32().map(is_supported)
}

/// Reads the version tag and fails unless it is supported.
pub fn expect_version(reader: &mut ByteReader<'_>) -> Result<(), ReadError> {
    let version = reader.read_f32()?;
    if !is_supported(version) {
        return Err(ReadError::UnsupportedVersion(version));
    }
    Ok(())
}

/// Returns the version tag at the start of `bytes`, if there is one.
pub fn peek_version(bytes: &[u8]) -> Option<f32> {
    let tag: [u8; 4] = bytes.get(..encoded_len())?.try_into().ok()?;
    Some(f32::from_le_bytes(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_current_version_only() {
        let ok = FORMAT_VERSION.to_le_bytes();
        assert_eq!(check_version(&mut ByteReader::new(&ok)), Ok(true));
        let old = 0.9f32.to_le_bytes();
        assert_eq!(check_version(&mut ByteReader::new(&old)), Ok(false));
        assert!(!is_supported(f32::NAN));
    }

    #[test]
    fn expect_reports_the_found_tag() {
        let old = 0.5f32.to_le_bytes();
        assert_eq!(
            expect_version(&mut ByteReader::new(&old)),
            Err(ReadError::UnsupportedVersion(0.5))
        );
        assert!(matches!(
            expect_version(&mut ByteReader::new(&old[..2])),
            Err(ReadError::Truncated(_))
        ));
    }

    #[test]
    fn peek_needs_four_bytes() {
        assert_eq!(peek_version(&[0, 0, 0x80]), None);
        assert_eq!(peek_version(&[0, 0, 0x80, 0x3F, 0xFF]), Some(1.0));
    }
}
