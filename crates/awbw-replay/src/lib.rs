//! Decoder for Advance Wars By Web replay archives.
//!
//! A replay download is a zip archive holding two gzip-compressed members:
//! the initial game state, PHP-serialized, and an action stream with one line
//! per turn whose payload is a PHP array of JSON action documents.
//!
//! # Overview
//!
//! - [`php`] - PHP `serialize()` decoder and encoder producing [`SerializedValue`]
//! - [`sanitize`](sanitize::sanitize) - flattens PHP objects into lists, collecting a [`TypeManifest`]
//! - [`action`] - parser for `p:<player>;d:<day>;a:<array>` action lines
//! - [`ReplayArchive`] - opens an archive and drives the above
//! - [`find_containers`] - locate values in a decoded tree for diagnostics
//!
//! # Example
//!
//! ```no_run
//! use awbw_replay::ReplayArchive;
//!
//! let replay = ReplayArchive::open("52963.zip")?;
//! if let Some(actions) = replay.actions() {
//!     for action in actions {
//!         println!("{}", action.kind());
//!     }
//! }
//! # Ok::<(), awbw_replay::ReplayError>(())
//! ```

mod archive;
mod error;
mod options;
mod value;

pub mod action;
pub mod find;
pub mod php;
pub mod sanitize;

pub use action::{parse_action_line, ActionLineError, ActionLineParser, ActionRecord, RawTurn};
pub use archive::{classify_member, ArchiveMember, MemberRole, ReplayArchive};
pub use error::ReplayError;
pub use find::find_containers;
pub use options::ReplayOptions;
pub use php::{PhpDecoder, PhpEncoder, PhpError};
pub use sanitize::{sanitize, sanitize_ref, TypeManifest};
pub use value::{Key, SerializedValue, Value};
