//! Blob inputs accepted by the typed value decoders.
//!
//! A blob is normally the raw byte sequence taken out of a decoded map, but
//! the browser viewer hands values over as hex strings. Both are accepted
//! through [`IntoBlob`]: byte containers are borrowed as-is, while `str`
//! inputs are always parsed as hex (ASCII whitespace between digits is
//! ignored).

use crate::error::CodecResult;
use bytes::Bytes;
use std::borrow::Cow;

/// Conversion into the raw bytes of a value blob.
pub trait IntoBlob<'a> {
    /// Produce the raw blob bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CodecError::InvalidHex`] if a string input is not valid hex.
    fn into_blob(self) -> CodecResult<Cow<'a, [u8]>>;
}

impl<'a> IntoBlob<'a> for &'a [u8] {
    fn into_blob(self) -> CodecResult<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(self))
    }
}

impl<'a, const N: usize> IntoBlob<'a> for &'a [u8; N] {
    fn into_blob(self) -> CodecResult<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(self.as_slice()))
    }
}

impl<'a> IntoBlob<'a> for &'a Vec<u8> {
    fn into_blob(self) -> CodecResult<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(self.as_slice()))
    }
}

impl<'a> IntoBlob<'a> for &'a Bytes {
    fn into_blob(self) -> CodecResult<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(self.as_ref()))
    }
}

impl<'a> IntoBlob<'a> for &'a str {
    fn into_blob(self) -> CodecResult<Cow<'a, [u8]>> {
        decode_hex(self).map(Cow::Owned)
    }
}

impl<'a> IntoBlob<'a> for &'a String {
    fn into_blob(self) -> CodecResult<Cow<'a, [u8]>> {
        self.as_str().into_blob()
    }
}

/// Parse a hex string into bytes, ignoring ASCII whitespace.
///
/// # Errors
///
/// Returns [`crate::CodecError::InvalidHex`] on odd length or non-hex digits.
pub fn decode_hex(input: &str) -> CodecResult<Vec<u8>> {
    if input.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        Ok(hex::decode(compact)?)
    } else {
        Ok(hex::decode(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodecError;

    #[test]
    fn raw_bytes_are_borrowed() {
        let data = vec![1u8, 2, 3];
        let blob = (&data).into_blob().unwrap();
        assert!(matches!(blob, Cow::Borrowed(_)));
        assert_eq!(&*blob, &[1, 2, 3]);
    }

    #[test]
    fn hex_string_is_parsed() {
        assert_eq!(&*"0a73".into_blob().unwrap(), &[0x0a, 0x73]);
        assert_eq!(&*"0A 73\n".into_blob().unwrap(), &[0x0a, 0x73]);
    }

    #[test]
    fn empty_hex_is_empty_blob() {
        assert!("".into_blob().unwrap().is_empty());
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(matches!(
            "abc".into_blob(),
            Err(CodecError::InvalidHex { .. })
        ));
        assert!(matches!(
            "zz".into_blob(),
            Err(CodecError::InvalidHex { .. })
        ));
    }
}
