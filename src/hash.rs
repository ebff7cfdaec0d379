//! ConvKey: the rolling hash used to bucket cached security descriptors.
//!
//! The descriptor is read as little-endian 32-bit words; each step rotates the
//! accumulator left by 3 and adds the word. A trailing partial word (0-3
//! bytes) does not participate. Length still takes part in match equality, so
//! two descriptors differing only in that tail share a key but never match.

/// 32-bit hash of a security descriptor.
pub type ConvKey = u32;

/// Computes the ConvKey of `descriptor`.
///
/// # Example
///
/// ```
/// use seccache::hash::conv_key;
///
/// assert_eq!(conv_key(&[]), 0);
/// assert_eq!(conv_key(&[1, 0, 0, 0]), 1);
/// // (1 rotl 3) + 2
/// assert_eq!(conv_key(&[1, 0, 0, 0, 2, 0, 0, 0]), 10);
/// ```
#[inline]
pub fn conv_key(descriptor: &[u8]) -> ConvKey {
    descriptor.chunks_exact(4).fold(0u32, |key, word| {
        let word = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
        key.rotate_left(3).wrapping_add(word)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_short_inputs_hash_to_zero() {
        assert_eq!(conv_key(&[]), 0);
        assert_eq!(conv_key(&[0xff]), 0);
        assert_eq!(conv_key(&[0xff, 0xff, 0xff]), 0);
    }

    #[test]
    fn words_are_little_endian() {
        assert_eq!(conv_key(&[0x01, 0x02, 0x03, 0x04]), 0x0403_0201);
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let base = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut padded = base.to_vec();
        padded.extend_from_slice(&[9, 10, 11]);
        assert_eq!(conv_key(&base), conv_key(&padded));
    }

    #[test]
    fn rotation_wraps_and_addition_wraps() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0x01, 0x00, 0x00, 0x00];
        let expected = 0xffff_ffffu32.rotate_left(3).wrapping_add(1);
        assert_eq!(conv_key(&bytes), expected);
    }

    #[test]
    fn hash_is_deterministic_and_order_sensitive() {
        let a = [1u8, 0, 0, 0, 2, 0, 0, 0];
        let b = [2u8, 0, 0, 0, 1, 0, 0, 0];
        assert_eq!(conv_key(&a), conv_key(&a));
        assert_ne!(conv_key(&a), conv_key(&b));
    }
}
