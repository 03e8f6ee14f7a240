//! Replay archive error type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use zip::result::ZipError;

use crate::action::ActionLineError;
use crate::php::PhpError;

/// Errors that abort opening a replay archive.
///
/// Content-level oddities inside an otherwise well-formed member (an action
/// entry that is not a JSON action, a missing member role) are logged and
/// never surface here.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("not a valid replay archive: {0}")]
    Archive(#[from] ZipError),
    #[error("failed to decompress member `{member}`: {source}")]
    Decompression {
        member: String,
        #[source]
        source: io::Error,
    },
    #[error("member `{member}` decompresses to more than {limit} bytes")]
    MemberTooLarge { member: String, limit: u64 },
    #[error("member `{member}` is not valid UTF-8 text")]
    InvalidText { member: String },
    #[error("malformed action line {line} in `{member}`: {source}")]
    Format {
        member: String,
        line: usize,
        #[source]
        source: ActionLineError,
    },
    #[error("malformed serialized value in `{member}`{}: {source}", at_line(.line))]
    Serialization {
        member: String,
        line: Option<usize>,
        #[source]
        source: PhpError,
    },
    #[error("value in `{member}`{} nests deeper than {max_depth} levels (offset {offset})", at_line(.line))]
    DepthExceeded {
        member: String,
        line: Option<usize>,
        offset: usize,
        max_depth: usize,
    },
}

impl ReplayError {
    pub(crate) fn value(member: &str, line: Option<usize>, err: PhpError) -> Self {
        match err {
            PhpError::DepthExceeded { offset, max_depth } => ReplayError::DepthExceeded {
                member: member.to_owned(),
                line,
                offset,
                max_depth,
            },
            source => ReplayError::Serialization {
                member: member.to_owned(),
                line,
                source,
            },
        }
    }

    pub(crate) fn action_line(member: &str, line: usize, err: ActionLineError) -> Self {
        match err {
            ActionLineError::Value(source) => Self::value(member, Some(line), source),
            source => ReplayError::Format {
                member: member.to_owned(),
                line,
                source,
            },
        }
    }
}

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" line {line}"),
        None => String::new(),
    }
}
