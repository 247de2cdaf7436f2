/// Content fingerprint of an encoded mesh file.
///
/// Not stored in the file; used to compare cache files and encoder output.
#[inline(always)]
pub fn fingerprint(encoded: &[u8]) -> u64 {
    rapidhash::rapidhash_inline(encoded, rapidhash::RAPID_SEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn differs_on_single_byte_change() {
        let a = [1u8, 2, 3, 4];
        let b = [1u8, 2, 3, 5];
        assert_eq!(fingerprint(&a), fingerprint(&a));
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
