//! Action-stream line parsing.
//!
//! Each line of the action-stream member records one turn:
//!
//! ```text
//! p:<player id>;d:<day>;a:<PHP array of JSON texts>
//! ```
//!
//! The turn number is implicit: it is the line's position in the member.

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::php::{PhpDecoder, PhpError};
use crate::sanitize::sanitize;
use crate::{Key, Value};

/// Error for a line that does not follow the `p:..;d:..;a:..` layout.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionLineError {
    #[error("expected `{token}` at column {column}")]
    MissingToken { token: &'static str, column: usize },
    #[error("invalid {field} at column {column}")]
    InvalidInteger { field: &'static str, column: usize },
    #[error("expected an array of actions, found {found}")]
    NotAnArray { found: &'static str },
    #[error("invalid action array: {0}")]
    Value(#[from] PhpError),
}

/// One JSON action document. Always a JSON object with a string `"action"`
/// member naming the action type.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord(Map<String, JsonValue>);

impl ActionRecord {
    /// Wraps a parsed JSON document, or returns `None` if it is not an object
    /// with a string `"action"` member.
    pub fn from_json(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Object(map) if map.get("action").is_some_and(JsonValue::is_string) => {
                Some(Self(map))
            }
            _ => None,
        }
    }

    /// The action type label, e.g. `"Fire"` or `"End"`.
    pub fn kind(&self) -> &str {
        self.0
            .get("action")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    pub fn into_json(self) -> JsonValue {
        JsonValue::Object(self.0)
    }
}

impl From<ActionRecord> for JsonValue {
    fn from(record: ActionRecord) -> Self {
        record.into_json()
    }
}

impl PartialEq<JsonValue> for ActionRecord {
    fn eq(&self, other: &JsonValue) -> bool {
        matches!(other, JsonValue::Object(map) if *map == self.0)
    }
}

/// All actions one player took in one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTurn {
    pub player_id: i64,
    pub day: i64,
    pub actions: Vec<ActionRecord>,
}

/// Parses action-stream lines.
#[derive(Debug, Clone, Default)]
pub struct ActionLineParser {
    pub decoder: PhpDecoder,
}

impl ActionLineParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decoder(decoder: PhpDecoder) -> Self {
        Self { decoder }
    }

    /// Parses one line into a [`RawTurn`].
    ///
    /// Array entries that are not JSON action documents are skipped with a
    /// diagnostic; the rest of the turn is kept.
    pub fn parse(&self, line: &str) -> Result<RawTurn, ActionLineError> {
        let mut cursor = LineCursor { rest: line, column: 0 };
        cursor.token("p:")?;
        let player_id = cursor.int("player id")?;
        cursor.token(";d:")?;
        let day = cursor.int("day")?;
        cursor.token(";a:")?;

        let decoded = self.decoder.decode(cursor.rest.as_bytes())?;
        let (value, _) = sanitize(decoded);
        let actions = collect_actions(&value)?;
        Ok(RawTurn {
            player_id,
            day,
            actions,
        })
    }
}

/// Parses one action-stream line with default decoder settings.
pub fn parse_action_line(line: &str) -> Result<RawTurn, ActionLineError> {
    ActionLineParser::new().parse(line)
}

struct LineCursor<'a> {
    rest: &'a str,
    column: usize,
}

impl LineCursor<'_> {
    fn token(&mut self, token: &'static str) -> Result<(), ActionLineError> {
        match self.rest.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                self.column += token.len();
                Ok(())
            }
            None => Err(ActionLineError::MissingToken {
                token,
                column: self.column,
            }),
        }
    }

    fn int(&mut self, field: &'static str) -> Result<i64, ActionLineError> {
        let bytes = self.rest.as_bytes();
        let sign = usize::from(bytes.first() == Some(&b'-'));
        let digits = bytes[sign..].iter().take_while(|b| b.is_ascii_digit()).count();
        let len = sign + digits;
        let parsed = if digits == 0 {
            None
        } else {
            self.rest[..len].parse::<i64>().ok()
        };
        let value = parsed.ok_or(ActionLineError::InvalidInteger {
            field,
            column: self.column,
        })?;
        self.rest = &self.rest[len..];
        self.column += len;
        Ok(value)
    }
}

/// The service nests the JSON texts under key `2` of the outer array; plain
/// arrays of JSON texts are accepted as well.
fn action_entries(value: &Value) -> Result<&[(Key, Value)], ActionLineError> {
    let entries = value.as_list().ok_or(ActionLineError::NotAnArray {
        found: kind_name(value),
    })?;
    match value.get(Key::Int(2)) {
        Some(Value::List(nested)) => Ok(nested.as_slice()),
        _ => Ok(entries),
    }
}

fn collect_actions(value: &Value) -> Result<Vec<ActionRecord>, ActionLineError> {
    let mut actions = Vec::new();
    for (key, entry) in action_entries(value)? {
        let Value::Text(text) = entry else {
            tracing::debug!("Skipping non-text action entry at key {}", key);
            continue;
        };
        if !text.contains("action") {
            tracing::debug!("Skipping invalid action string at key {}", key);
            continue;
        }
        let json = match serde_json::from_str::<JsonValue>(text) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Skipping malformed action JSON at key {}: {}", key, e);
                continue;
            }
        };
        match ActionRecord::from_json(json) {
            Some(record) => actions.push(record),
            None => tracing::debug!("Skipping action without an \"action\" type at key {}", key),
        }
    }
    Ok(actions)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::Text(_) => "string",
        Value::List(_) => "array",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::php::PhpEncoder;
    use crate::SerializedValue;
    use serde_json::json;

    fn texts(items: &[&str]) -> String {
        let list = SerializedValue::List(
            items
                .iter()
                .enumerate()
                .map(|(i, s)| (Key::Int(i as i64), SerializedValue::Text((*s).into())))
                .collect(),
        );
        String::from_utf8(PhpEncoder::new().encode(&list)).unwrap()
    }

    #[test]
    fn parses_header_and_actions() {
        let line = format!(
            "p:3;d:12;a:{}",
            texts(&[r#"{"action":"Move","unit":7}"#, r#"{"action":"End"}"#])
        );
        let turn = parse_action_line(&line).unwrap();
        assert_eq!(turn.player_id, 3);
        assert_eq!(turn.day, 12);
        assert_eq!(turn.actions.len(), 2);
        assert_eq!(turn.actions[0], json!({"action": "Move", "unit": 7}));
        assert_eq!(turn.actions[1].kind(), "End");
    }

    #[test]
    fn entry_without_action_is_skipped() {
        let line = format!(
            "p:0;d:1;a:{}",
            texts(&[r#"{"unit":3}"#, r#"{"action":"Fire"}"#])
        );
        let turn = parse_action_line(&line).unwrap();
        assert_eq!(turn.actions.len(), 1);
        assert_eq!(turn.actions[0].kind(), "Fire");
    }

    #[test]
    fn non_object_and_broken_json_are_skipped() {
        let line = format!(
            "p:0;d:1;a:{}",
            texts(&[r#""action""#, r#"{"action":"#, r#"{"action":5}"#, r#"{"action":"End"}"#])
        );
        let turn = parse_action_line(&line).unwrap();
        assert_eq!(turn.actions.len(), 1);
    }

    #[test]
    fn nested_action_list_under_key_two() {
        let inner = SerializedValue::List(vec![(
            Key::Int(0),
            SerializedValue::Text(r#"{"action":"Build"}"#.into()),
        )]);
        let outer = SerializedValue::List(vec![
            (Key::Int(0), SerializedValue::Int(3)),
            (Key::Int(1), SerializedValue::Int(12)),
            (Key::Int(2), inner),
        ]);
        let line = format!(
            "p:3;d:12;a:{}",
            String::from_utf8(PhpEncoder::new().encode(&outer)).unwrap()
        );
        let turn = parse_action_line(&line).unwrap();
        assert_eq!(turn.actions.len(), 1);
        assert_eq!(turn.actions[0].kind(), "Build");
    }

    #[test]
    fn empty_array_yields_empty_turn() {
        let turn = parse_action_line("p:-1;d:0;a:a:0:{}").unwrap();
        assert_eq!(turn.player_id, -1);
        assert!(turn.actions.is_empty());
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(
            parse_action_line("x:1;d:1;a:a:0:{}"),
            Err(ActionLineError::MissingToken {
                token: "p:",
                column: 0
            })
        );
        assert_eq!(
            parse_action_line("p:abc;d:1;a:a:0:{}"),
            Err(ActionLineError::InvalidInteger {
                field: "player id",
                column: 2
            })
        );
        assert_eq!(
            parse_action_line("p:1;d:2a:a:0:{}"),
            Err(ActionLineError::MissingToken {
                token: ";a:",
                column: 7
            })
        );
        assert_eq!(
            parse_action_line("p:1;d:2;a:i:5;"),
            Err(ActionLineError::NotAnArray { found: "int" })
        );
        assert!(matches!(
            parse_action_line("p:1;d:2;a:a:1:{"),
            Err(ActionLineError::Value(_))
        ));
    }
}
