// src/stream/decode.rs

//! Best-effort incremental UTF-8 decoding of chunk payloads.
//!
//! Invalid byte sequences are dropped. A multi-byte character split across
//! two chunks of the same origin is carried over and decoded whole once the
//! next chunk arrives; whatever is still incomplete at the end is dropped.

#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes` (prefixed by any carried-over tail) and append the text
    /// to `out`.
    pub fn decode_into(&mut self, bytes: &[u8], out: &mut String) {
        let mut data = std::mem::take(&mut self.pending);
        data.extend_from_slice(bytes);

        let mut rest = data.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&rest[..valid]) {
                        out.push_str(text);
                    }
                    match e.error_len() {
                        Some(len) => rest = &rest[valid + len..],
                        None => {
                            // Incomplete sequence at the very end.
                            self.pending = rest[valid..].to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Whether an incomplete sequence is waiting for more bytes.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drop any incomplete trailing sequence.
    pub fn finish(&mut self) {
        self.pending.clear();
    }
}
