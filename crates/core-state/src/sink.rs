//! Transcoding sinks for completed lines.
//!
//! A sink models the caller's fixed-size read buffer: it copies as much of a
//! line as fits, whole code points only, and hands back what did not fit.

pub trait TranscodingSink {
    /// Copy a prefix of `input`; return the unconsumed remainder.
    fn consume<'a>(&mut self, input: &'a str) -> &'a str;
    /// Bytes written so far.
    fn bytes_written(&self) -> usize;
}

/// UTF-8 sink bounded by `capacity` bytes.
#[derive(Debug, Clone)]
pub struct Utf8Sink {
    buf: Vec<u8>,
    capacity: usize,
}

impl Utf8Sink {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn as_str(&self) -> &str {
        // Only whole code points are ever appended.
        std::str::from_utf8(&self.buf).unwrap_or_default()
    }

    pub fn into_string(self) -> String {
        String::from_utf8(self.buf).unwrap_or_default()
    }
}

impl TranscodingSink for Utf8Sink {
    fn consume<'a>(&mut self, input: &'a str) -> &'a str {
        let room = self.capacity - self.buf.len();
        let mut end = input.len().min(room);
        while !input.is_char_boundary(end) {
            end -= 1;
        }
        self.buf.extend_from_slice(&input.as_bytes()[..end]);
        &input[end..]
    }

    fn bytes_written(&self) -> usize {
        self.buf.len()
    }
}

/// UTF-16LE sink bounded by `capacity` bytes. A surrogate pair is never split.
#[derive(Debug, Clone)]
pub struct Utf16Sink {
    units: Vec<u16>,
    capacity: usize,
}

impl Utf16Sink {
    pub fn new(capacity: usize) -> Self {
        Self {
            units: Vec::with_capacity(capacity / 2),
            capacity,
        }
    }

    pub fn units(&self) -> &[u16] {
        &self.units
    }

    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.units.iter().flat_map(|u| u.to_le_bytes()).collect()
    }
}

impl TranscodingSink for Utf16Sink {
    fn consume<'a>(&mut self, input: &'a str) -> &'a str {
        let mut room = (self.capacity - self.bytes_written()) / 2;
        for (i, c) in input.char_indices() {
            let need = c.len_utf16();
            if need > room {
                return &input[i..];
            }
            let mut pair = [0u16; 2];
            self.units.extend_from_slice(c.encode_utf16(&mut pair));
            room -= need;
        }
        ""
    }

    fn bytes_written(&self) -> usize {
        self.units.len() * 2
    }
}
