//! PHP `serialize()` decoder.

use super::error::PhpError;
use crate::{Key, SerializedValue};

/// Default limit on array/object nesting.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// PHP `serialize()` decoder.
///
/// Declared string lengths and entry counts are authoritative: any mismatch
/// with the actual content is an error. Nesting is limited by `max_depth` so
/// hostile input cannot exhaust the stack.
#[derive(Debug, Clone)]
pub struct PhpDecoder {
    pub max_depth: usize,
}

impl Default for PhpDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PhpDecoder {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Decodes one value from the start of `data`, ignoring trailing bytes.
    pub fn decode(&self, data: &[u8]) -> Result<SerializedValue, PhpError> {
        self.decode_with_consumed(data).map(|(value, _)| value)
    }

    /// Decodes one value and returns it with the number of bytes consumed, so
    /// consecutive values can be read from one buffer.
    pub fn decode_with_consumed(&self, data: &[u8]) -> Result<(SerializedValue, usize), PhpError> {
        let mut reader = Reader {
            uint8: data,
            x: 0,
            max_depth: self.max_depth,
        };
        let value = reader.read_any(0)?;
        Ok((value, reader.x))
    }
}

struct Reader<'a> {
    uint8: &'a [u8],
    x: usize,
    max_depth: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.uint8.len() - self.x
    }

    fn peek(&self) -> Result<u8, PhpError> {
        self.uint8
            .get(self.x)
            .copied()
            .ok_or(PhpError::UnexpectedEof(self.x))
    }

    fn u8(&mut self) -> Result<u8, PhpError> {
        let byte = self.peek()?;
        self.x += 1;
        Ok(byte)
    }

    fn expect(&mut self, expected: u8) -> Result<(), PhpError> {
        let offset = self.x;
        let found = self.u8()?;
        if found != expected {
            return Err(PhpError::Expected {
                offset,
                expected: expected as char,
                found: found as char,
            });
        }
        Ok(())
    }

    fn buf(&mut self, size: usize) -> Result<&'a [u8], PhpError> {
        let end = self
            .x
            .checked_add(size)
            .filter(|end| *end <= self.uint8.len())
            .ok_or(PhpError::UnexpectedEof(self.uint8.len()))?;
        let bin = &self.uint8[self.x..end];
        self.x = end;
        Ok(bin)
    }

    /// Returns the bytes up to `terminator` and consumes the terminator.
    fn until(&mut self, terminator: u8) -> Result<&'a [u8], PhpError> {
        let rest = &self.uint8[self.x..];
        let len = rest
            .iter()
            .position(|&b| b == terminator)
            .ok_or(PhpError::UnexpectedEof(self.uint8.len()))?;
        let literal = &rest[..len];
        self.x += len + 1;
        Ok(literal)
    }

    fn int_until(&mut self, terminator: u8) -> Result<i64, PhpError> {
        let offset = self.x;
        let literal = self.until(terminator)?;
        std::str::from_utf8(literal)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or(PhpError::InvalidInt(offset))
    }

    fn len_until(&mut self, terminator: u8) -> Result<usize, PhpError> {
        let offset = self.x;
        let literal = self.until(terminator)?;
        std::str::from_utf8(literal)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or(PhpError::InvalidLength(offset))
    }

    fn float_until(&mut self, terminator: u8) -> Result<f64, PhpError> {
        let offset = self.x;
        match self.until(terminator)? {
            b"INF" => Ok(f64::INFINITY),
            b"-INF" => Ok(f64::NEG_INFINITY),
            b"NAN" => Ok(f64::NAN),
            literal => std::str::from_utf8(literal)
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or(PhpError::InvalidFloat(offset)),
        }
    }

    /// Reads `<len>:"<text>"` and returns the text between the quotes.
    fn quoted(&mut self) -> Result<String, PhpError> {
        let len = self.len_until(b':')?;
        self.expect(b'"')?;
        let at = self.x;
        let bytes = self.buf(len)?;
        self.expect(b'"')?;
        String::from_utf8(bytes.to_vec()).map_err(|_| PhpError::InvalidUtf8(at))
    }

    fn read_any(&mut self, depth: usize) -> Result<SerializedValue, PhpError> {
        let offset = self.x;
        let discriminator = self.u8()?;
        if discriminator == b'N' {
            self.expect(b';')?;
            return Ok(SerializedValue::Null);
        }
        self.expect(b':')?;
        match discriminator {
            b'b' => {
                let at = self.x;
                match self.until(b';')? {
                    b"0" => Ok(SerializedValue::Bool(false)),
                    b"1" => Ok(SerializedValue::Bool(true)),
                    _ => Err(PhpError::InvalidBool(at)),
                }
            }
            b'i' => Ok(SerializedValue::Int(self.int_until(b';')?)),
            b'd' => Ok(SerializedValue::Float(self.float_until(b';')?)),
            b's' => {
                let text = self.quoted()?;
                self.expect(b';')?;
                Ok(SerializedValue::Text(text))
            }
            b'a' => {
                let depth = self.enter(offset, depth)?;
                let count = self.len_until(b':')?;
                Ok(SerializedValue::List(self.read_entries(count, depth)?))
            }
            b'O' => {
                let depth = self.enter(offset, depth)?;
                let class = self.quoted()?;
                self.expect(b':')?;
                let count = self.len_until(b':')?;
                let fields = self.read_entries(count, depth)?;
                Ok(SerializedValue::Object { class, fields })
            }
            other => Err(PhpError::UnknownType {
                offset,
                found: other as char,
            }),
        }
    }

    fn enter(&self, offset: usize, depth: usize) -> Result<usize, PhpError> {
        let depth = depth + 1;
        if depth > self.max_depth {
            return Err(PhpError::DepthExceeded {
                offset,
                max_depth: self.max_depth,
            });
        }
        Ok(depth)
    }

    fn read_entries(
        &mut self,
        count: usize,
        depth: usize,
    ) -> Result<Vec<(Key, SerializedValue)>, PhpError> {
        self.expect(b'{')?;
        // Smallest possible entry is `i:0;N;`; do not trust the declared count
        // for preallocation.
        let mut entries = Vec::with_capacity(count.min(self.remaining() / 6));
        for found in 0..count {
            if self.peek()? == b'}' {
                return Err(PhpError::CountMismatch {
                    offset: self.x,
                    declared: count,
                    found,
                });
            }
            let key = self.read_key(depth)?;
            let value = self.read_any(depth)?;
            entries.push((key, value));
        }
        self.expect(b'}')?;
        Ok(entries)
    }

    fn read_key(&mut self, depth: usize) -> Result<Key, PhpError> {
        let offset = self.x;
        if !matches!(self.peek()?, b'i' | b's') {
            return Err(PhpError::InvalidKey(offset));
        }
        match self.read_any(depth)? {
            SerializedValue::Int(i) => Ok(Key::Int(i)),
            SerializedValue::Text(s) => Ok(Key::Text(s)),
            _ => Err(PhpError::InvalidKey(offset)),
        }
    }
}
