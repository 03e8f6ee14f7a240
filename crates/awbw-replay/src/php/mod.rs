//! PHP `serialize()` encoding/decoding.
//!
//! Grammar handled here:
//!
//! | Type   | Encoding                                   |
//! |--------|--------------------------------------------|
//! | null   | `N;`                                       |
//! | bool   | `b:1;`                                     |
//! | int    | `i:-42;`                                   |
//! | float  | `d:0.5;` (also `INF`, `-INF`, `NAN`)       |
//! | string | `s:5:"hello";` (length in bytes)           |
//! | array  | `a:2:{i:0;s:1:"x";s:1:"k";b:0;}`           |
//! | object | `O:8:"stdClass":1:{s:3:"foo";i:1;}`        |

mod decoder;
mod encoder;
mod error;

pub use decoder::{PhpDecoder, DEFAULT_MAX_DEPTH};
pub use encoder::PhpEncoder;
pub use error::PhpError;

use crate::SerializedValue;

/// Decodes one value from the start of `data` with the default depth limit.
///
/// Trailing bytes after the value are ignored.
pub fn decode(data: &[u8]) -> Result<SerializedValue, PhpError> {
    PhpDecoder::new().decode(data)
}

/// Encodes a value into PHP `serialize()` form.
pub fn encode(value: &SerializedValue) -> Vec<u8> {
    PhpEncoder::new().encode(value)
}
