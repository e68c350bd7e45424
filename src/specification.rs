//! The informal specification of the V5 activation wire format.

// RPC frame, as seen by the dispatcher. Only the message type byte at
// offset 2 is interpreted at this layer; everything else belongs to the
// selected handler.
// ```text
// | .. | .. | msg_type | ...  |
// | 1B | 1B |    1B    |      |
// ```
pub(crate) const MSG_TYPE_OFFSET: usize = 2;
pub(crate) const MSG_TYPE_BIND: u8 = 0x0b;
pub(crate) const MSG_TYPE_REQUEST: u8 = 0x00;

// V5 request frame (integers little-endian):
// ```text
// | body_len1 | body_len2 | version | salt | encrypted | pad |
// |     4B    |     4B    |    4B   | 16B  | variable  |  4B |
// |           <- header ->          |       <- tail ->       |
// ```
// The cipher input is `salt ‖ encrypted ‖ pad`: the raw salt bytes are fed
// back through the decryptor as the first ciphertext block. The tail is
// everything past the 28-byte header; its length is only ever computed
// behind the header-length guard, never by unchecked subtraction.
pub(crate) const REQ_LEN_FIELDS_LEN: usize = 4 + 4; // 8
pub(crate) const REQ_HDR_LEN: usize = REQ_LEN_FIELDS_LEN + VERSION_LEN + SALT_LEN; // 28
pub(crate) const REQ_PAD_LEN: usize = 4;

// V5 response frame (integers little-endian):
// ```text
// | body_len | reserved | body_len2 | version | salt | encrypted | padding |
// |    4B    |    4B    |     4B    |    4B   | 16B  | variable  |  0..3B  |
// |                                 |       <- body ->           |
// ```
// `body_len` counts version + salt + encrypted; `padding` aligns the body
// to 4 bytes and is always empty for V5, where the ciphertext length is a
// multiple of the AES block.
pub(crate) const RES_PREFIX_LEN: usize = 4 + 4 + 4; // 12
pub(crate) const RES_RESERVED: [u8; 4] = [0x00, 0x00, 0x02, 0x00];

pub(crate) const VERSION_LEN: usize = 4;
pub(crate) const SALT_LEN: usize = 16;
pub(crate) const HASH_LEN: usize = 32;

/// Alignment padding appended after the response body.
pub(crate) const fn response_padding_len(body_len: usize) -> usize {
    ((!body_len & 3) + 1) & 3
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_response_padding_alignment() {
        for body_len in 0..64 {
            let padded = body_len + response_padding_len(body_len);
            assert_eq!(padded % 4, 0);
            assert!(padded - body_len < 4);
        }
    }

    #[test]
    fn test_v5_body_never_padded() {
        // version + salt + any whole number of AES blocks.
        for blocks in 1..8 {
            let body_len = VERSION_LEN + SALT_LEN + blocks * 16;
            assert_eq!(response_padding_len(body_len), 0);
        }
    }
}
