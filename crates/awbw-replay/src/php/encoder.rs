//! PHP `serialize()` encoder.

use crate::{Key, SerializedValue};

/// PHP `serialize()` encoder.
///
/// Produces exactly the grammar [`super::PhpDecoder`] accepts. Used to build
/// fixtures; the replay service itself only ever hands us encoded data.
pub struct PhpEncoder {
    out: Vec<u8>,
}

impl Default for PhpEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PhpEncoder {
    pub fn new() -> Self {
        Self { out: Vec::new() }
    }

    pub fn encode(&mut self, value: &SerializedValue) -> Vec<u8> {
        self.out.clear();
        self.write_any(value);
        std::mem::take(&mut self.out)
    }

    pub fn write_any(&mut self, value: &SerializedValue) {
        match value {
            SerializedValue::Null => self.out.extend_from_slice(b"N;"),
            SerializedValue::Bool(b) => self.write_literal(b'b', if *b { "1" } else { "0" }),
            SerializedValue::Int(i) => self.write_literal(b'i', &i.to_string()),
            SerializedValue::Float(f) => self.write_float(*f),
            SerializedValue::Text(s) => self.write_str(s),
            SerializedValue::List(entries) => {
                self.out.extend_from_slice(b"a:");
                self.write_entries(entries);
            }
            SerializedValue::Object { class, fields } => {
                self.out.extend_from_slice(b"O:");
                self.write_quoted(class.as_bytes());
                self.out.push(b':');
                self.write_entries(fields);
            }
        }
    }

    pub fn write_str(&mut self, s: &str) {
        self.out.extend_from_slice(b"s:");
        self.write_quoted(s.as_bytes());
        self.out.push(b';');
    }

    fn write_literal(&mut self, discriminator: u8, literal: &str) {
        self.out.push(discriminator);
        self.out.push(b':');
        self.out.extend_from_slice(literal.as_bytes());
        self.out.push(b';');
    }

    fn write_float(&mut self, f: f64) {
        let literal = if f.is_nan() {
            "NAN".to_owned()
        } else if f == f64::INFINITY {
            "INF".to_owned()
        } else if f == f64::NEG_INFINITY {
            "-INF".to_owned()
        } else {
            // Debug formatting is the shortest representation that parses back
            // to the same bits.
            format!("{f:?}")
        };
        self.write_literal(b'd', &literal);
    }

    fn write_quoted(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes.len().to_string().as_bytes());
        self.out.extend_from_slice(b":\"");
        self.out.extend_from_slice(bytes);
        self.out.push(b'"');
    }

    fn write_key(&mut self, key: &Key) {
        match key {
            Key::Int(i) => self.write_literal(b'i', &i.to_string()),
            Key::Text(s) => self.write_str(s),
        }
    }

    fn write_entries(&mut self, entries: &[(Key, SerializedValue)]) {
        self.out
            .extend_from_slice(entries.len().to_string().as_bytes());
        self.out.extend_from_slice(b":{");
        for (key, value) in entries {
            self.write_key(key);
            self.write_any(value);
        }
        self.out.push(b'}');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_matrix() {
        let mut enc = PhpEncoder::new();
        assert_eq!(enc.encode(&SerializedValue::Null), b"N;");
        assert_eq!(enc.encode(&SerializedValue::Bool(true)), b"b:1;");
        assert_eq!(enc.encode(&SerializedValue::Int(-5)), b"i:-5;");
        assert_eq!(enc.encode(&SerializedValue::Float(0.25)), b"d:0.25;");
        assert_eq!(enc.encode(&SerializedValue::Float(f64::INFINITY)), b"d:INF;");
        assert_eq!(
            enc.encode(&SerializedValue::Text("✅".into())),
            "s:3:\"✅\";".as_bytes()
        );
        assert_eq!(
            enc.encode(&SerializedValue::List(vec![
                (Key::Int(0), SerializedValue::Text("x".into())),
                (Key::from("k"), SerializedValue::Bool(false)),
            ])),
            br#"a:2:{i:0;s:1:"x";s:1:"k";b:0;}"#
        );
        assert_eq!(
            enc.encode(&SerializedValue::Object {
                class: "stdClass".into(),
                fields: vec![(Key::from("foo"), SerializedValue::Int(1))],
            }),
            br#"O:8:"stdClass":1:{s:3:"foo";i:1;}"#
        );
    }
}
