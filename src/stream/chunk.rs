// src/stream/chunk.rs

/// Which pipe of the child a chunk was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Stdout,
    Stderr,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Stdout => "stdout",
            Origin::Stderr => "stderr",
        }
    }
}

/// One non-empty slice of bytes read from the child, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    origin: Origin,
    bytes: Vec<u8>,
}

impl OutputChunk {
    /// Returns `None` for an empty payload; chunks always carry data.
    pub fn new(origin: Origin, bytes: Vec<u8>) -> Option<Self> {
        if bytes.is_empty() {
            None
        } else {
            Some(Self { origin, bytes })
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_stderr(&self) -> bool {
        self.origin == Origin::Stderr
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
