const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const BITS_PER_CHAR: usize = 5;

/// Number of Crockford characters needed to hold 128 bits: ceil(128 / 5).
pub const U128_ENCODED_LEN: usize = 26;

/// Encodes a byte slice into Crockford base32, writing output to `buf`.
///
/// The output is big-endian and left-padded with zero bits, so `buf` must be
/// exactly `ceil(input.len() * 8 / 5)` bytes long.
pub fn encode_base32(input: &[u8], buf: &mut [u8]) {
    let input_bits = input.len() * 8;
    let total_bits = buf.len() * BITS_PER_CHAR;
    debug_assert!(total_bits >= input_bits && total_bits - input_bits < BITS_PER_CHAR);

    let mut bits = total_bits - input_bits;
    let mut acc = 0_u16;
    let mask = 0x1F;

    let mut out = 0;
    for &b in input {
        acc = (acc << 8) | u16::from(b);
        bits += 8;
        while bits >= BITS_PER_CHAR {
            bits -= BITS_PER_CHAR;
            buf[out] = ALPHABET[((acc >> bits) & mask) as usize];
            out += 1;
        }
    }
}

/// Encodes a `u128` as a 26-character Crockford base32 string.
pub fn encode_u128(value: u128) -> String {
    let mut buf = [0_u8; U128_ENCODED_LEN];
    encode_base32(&value.to_be_bytes(), &mut buf);
    // The alphabet is pure ASCII.
    buf.iter().map(|&b| b as char).collect()
}
