//! Packs/unpacks 12-bit word pairs into the 3-byte ROM wire format.

pub const ROM_BYTES: usize = 0xA80;

/// Packs two 12-bit words into three bytes: `bytes[0] = word1[11:4]`,
/// `bytes[1] = (word1[3:0] << 4) | word2[11:8]`, `bytes[2] = word2[7:0]`.
pub fn pack_pair(word1: u32, word2: u32) -> [u8; 3] {
    [
        ((word1 >> 4) & 0xff) as u8,
        (((word1 & 0xf) << 4) | ((word2 >> 8) & 0xf)) as u8,
        (word2 & 0xff) as u8,
    ]
}

/// Packs a full word stream. Assumes an even-length, `ROM_WORDS`-sized
/// input; pads an odd trailing word with zero.
pub fn pack(words: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() / 2 * 3 + 3);
    let mut iter = words.chunks(2);
    while let Some(chunk) = iter.next() {
        let w1 = chunk[0];
        let w2 = chunk.get(1).copied().unwrap_or(0);
        out.extend_from_slice(&pack_pair(w1, w2));
    }
    out
}

/// Unpacks a byte stream into 12-bit words, three bytes at a time. A
/// trailing partial triple is zero-padded before unpacking.
pub fn unpack(bytes: &[u8]) -> Vec<u32> {
    let mut out = Vec::with_capacity(bytes.len() / 3 * 2 + 2);
    for chunk in bytes.chunks(3) {
        let b0 = chunk[0] as u32;
        let b1 = chunk.get(1).copied().unwrap_or(0) as u32;
        let b2 = chunk.get(2).copied().unwrap_or(0) as u32;
        let word1 = (b0 << 4) | (b1 >> 4);
        let word2 = ((b1 & 0xf) << 8) | b2;
        out.push(word1);
        out.push(word2);
    }
    out
}

/// Renders bytes as a plain whitespace-separated hex dump, two digits per
/// byte, eight bytes per line.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(8).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let line: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        out.push_str(&line.join(" "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_then_unpack_is_identity_for_even_length() {
        let words: Vec<u32> = (0..crate::link::ROM_WORDS as u32).map(|i| i & 0xfff).collect();
        let bytes = pack(&words);
        assert_eq!(bytes.len(), ROM_BYTES);
        assert_eq!(unpack(&bytes), words);
    }

    #[test]
    fn unpack_then_pack_is_identity_for_arbitrary_bytes() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        let words = unpack(&bytes);
        let repacked = pack(&words);
        assert_eq!(repacked, bytes);
    }

    #[test]
    fn known_pair_packs_as_documented() {
        let packed = pack_pair(0xABC, 0xDEF);
        assert_eq!(packed, [0xAB, 0xCD, 0xEF]);
    }
}
