#![forbid(unsafe_code)]
//! Order-preserving encoders and key successor helpers.

pub mod ord {
    //! Order-preserving encoders for numeric and byte-string key components.
    //!
    //! Every encoder appends to `dst` so that the byte-lexicographic order of
    //! two encodings matches the native order of the encoded values.

    const SIGN_BIT: u64 = 1 << 63;
    const ESCAPE: u8 = 0x00;
    const ESCAPED_NUL: u8 = 0xff;
    const TERMINATOR: u8 = 0x01;

    /// Big-endian encoding for lexicographic order preservation.
    pub fn put_u32_be(dst: &mut Vec<u8>, v: u32) {
        dst.extend_from_slice(&v.to_be_bytes());
    }

    /// Big-endian encoding for lexicographic order preservation.
    pub fn put_u64_be(dst: &mut Vec<u8>, v: u64) {
        dst.extend_from_slice(&v.to_be_bytes());
    }

    /// Encodes a signed i64 with order preservation (flip sign bit for sorting).
    pub fn put_i64_be(dst: &mut Vec<u8>, v: i64) {
        put_u64_be(dst, (v as u64) ^ SIGN_BIT);
    }

    /// Encodes a non-NaN f64 with order preservation.
    ///
    /// Negative zero is folded into positive zero; callers give NaN its own
    /// type marker instead of routing it here.
    pub fn put_f64_be(dst: &mut Vec<u8>, v: f64) {
        debug_assert!(!v.is_nan(), "NaN keys are not allowed");
        let v = if v == 0.0 { 0.0 } else { v };
        put_u64_be(dst, encode_f64_bits(v));
    }

    /// Appends an escaped, terminated byte string.
    ///
    /// `0x00` is written as `0x00 0xff` and the value ends with `0x00 0x01`,
    /// so no encoding is a prefix of another and shorter strings sort first.
    pub fn put_escaped_bytes(dst: &mut Vec<u8>, src: &[u8]) {
        dst.reserve(src.len() + 2);
        for &b in src {
            dst.push(b);
            if b == ESCAPE {
                dst.push(ESCAPED_NUL);
            }
        }
        dst.push(ESCAPE);
        dst.push(TERMINATOR);
    }

    fn encode_f64_bits(v: f64) -> u64 {
        let bits = v.to_bits();
        if bits & SIGN_BIT != 0 {
            !bits
        } else {
            bits ^ SIGN_BIT
        }
    }
}

pub mod key {
    //! Successor operations over raw keys.

    /// Returns the smallest key strictly greater than `key`.
    pub fn next(key: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(key.len() + 1);
        out.extend_from_slice(key);
        out.push(0x00);
        out
    }

    /// Returns the smallest key greater than every key that has `key` as a
    /// prefix.
    ///
    /// Trailing `0xff` bytes are dropped and the last remaining byte is
    /// incremented. An empty or all-`0xff` key has no finite prefix end; the
    /// result is then empty, which scan spans read as "no upper limit".
    pub fn prefix_end(key: &[u8]) -> Vec<u8> {
        match key.iter().rposition(|&b| b != 0xff) {
            Some(pos) => {
                let mut out = key[..=pos].to_vec();
                out[pos] += 1;
                out
            }
            None => Vec::new(),
        }
    }
}
