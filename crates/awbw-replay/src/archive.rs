//! Replay archive loading.
//!
//! A replay is a zip archive with two gzip-compressed members:
//!
//! - `<game id>`: PHP-serialized initial game state (funds, map, units,
//!   players).
//! - `a<game id>`: the action stream, one line per turn.
//!
//! Everything is read, decompressed and decoded eagerly while opening. The
//! zip handle never outlives [`ReplayArchive::open`], including when opening
//! fails.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use zip::ZipArchive;

use crate::action::{ActionLineParser, ActionRecord, RawTurn};
use crate::error::ReplayError;
use crate::options::ReplayOptions;
use crate::php::PhpDecoder;
use crate::sanitize::{sanitize_ref, TypeManifest};
use crate::{SerializedValue, Value};

/// What an archive member holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    ActionStream,
    Metadata,
}

/// Decides a member's role from its name.
///
/// Any name containing an `a` is the action stream; everything else is
/// metadata. This is a substring test, not a prefix test, so a game id that
/// itself contained an `a` would be misclassified.
pub fn classify_member(name: &str) -> MemberRole {
    if name.contains('a') {
        MemberRole::ActionStream
    } else {
        MemberRole::Metadata
    }
}

/// One decompressed archive member.
#[derive(Debug, Clone)]
pub struct ArchiveMember {
    name: String,
    role: MemberRole,
    data: Vec<u8>,
}

impl ArchiveMember {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> MemberRole {
        self.role
    }

    /// Decompressed payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A fully decoded replay.
///
/// ```no_run
/// use awbw_replay::ReplayArchive;
///
/// let replay = ReplayArchive::open("52963.zip")?;
/// if let Some(kinds) = replay.action_summaries() {
///     println!("{}", kinds.collect::<Vec<_>>().join(" "));
/// }
/// # Ok::<(), awbw_replay::ReplayError>(())
/// ```
#[derive(Debug)]
pub struct ReplayArchive {
    path: PathBuf,
    members: Vec<ArchiveMember>,
    raw_game_info: Option<SerializedValue>,
    game_info: Option<Value>,
    type_manifest: TypeManifest,
    turns: Option<Vec<RawTurn>>,
}

impl ReplayArchive {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        Self::open_with(path, &ReplayOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: &ReplayOptions) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        tracing::debug!("Opening {}", path.display());
        let file = File::open(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader_with(BufReader::new(file), path, options)
    }

    /// Reads a replay from any seekable source. `path` is only used for
    /// reporting.
    pub fn from_reader<R: Read + Seek>(
        reader: R,
        path: impl Into<PathBuf>,
    ) -> Result<Self, ReplayError> {
        Self::from_reader_with(reader, path, &ReplayOptions::default())
    }

    pub fn from_reader_with<R: Read + Seek>(
        reader: R,
        path: impl Into<PathBuf>,
        options: &ReplayOptions,
    ) -> Result<Self, ReplayError> {
        let mut zip = ZipArchive::new(reader)?;
        let decoder = PhpDecoder::with_max_depth(options.max_depth);
        let parser = ActionLineParser::with_decoder(decoder.clone());

        let mut replay = ReplayArchive {
            path: path.into(),
            members: Vec::with_capacity(zip.len()),
            raw_game_info: None,
            game_info: None,
            type_manifest: TypeManifest::new(),
            turns: None,
        };

        for index in 0..zip.len() {
            let (name, data) = {
                let mut entry = zip.by_index(index)?;
                let name = entry.name().to_owned();
                let mut raw = Vec::new();
                entry
                    .read_to_end(&mut raw)
                    .map_err(|e| ReplayError::Archive(e.into()))?;
                (name, raw)
            };
            let data = gunzip(&name, &data, options.max_member_size)?;
            let role = classify_member(&name);
            match role {
                MemberRole::ActionStream => {
                    let turns = parse_action_stream(&name, &data, &parser)?;
                    if replay.turns.replace(turns).is_some() {
                        tracing::warn!("Multiple action streams; keeping `{}`", name);
                    }
                }
                MemberRole::Metadata => {
                    let raw = decoder
                        .decode(&data)
                        .map_err(|e| ReplayError::value(&name, None, e))?;
                    let (game, manifest) = sanitize_ref(&raw);
                    if replay.game_info.replace(game).is_some() {
                        tracing::warn!("Multiple metadata members; keeping `{}`", name);
                    }
                    replay.raw_game_info = Some(raw);
                    replay.type_manifest = manifest;
                }
            }
            replay.members.push(ArchiveMember { name, role, data });
        }

        if replay.turns.is_none() {
            tracing::warn!(
                "No actions file found in {:?}. Individual actions will be unavailable",
                replay.member_names().collect::<Vec<_>>()
            );
        }
        if replay.game_info.is_none() {
            tracing::warn!(
                "No game state file found in {:?}. Game info will be unavailable",
                replay.member_names().collect::<Vec<_>>()
            );
        }
        Ok(replay)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Member names in archive order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.iter().map(ArchiveMember::name)
    }

    pub fn members(&self) -> &[ArchiveMember] {
        &self.members
    }

    /// Decompressed bytes of the named member.
    pub fn member_data(&self, name: &str) -> Option<&[u8]> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .map(ArchiveMember::data)
    }

    /// Initial game state with PHP objects flattened into lists.
    pub fn game_info(&self) -> Option<&Value> {
        self.game_info.as_ref()
    }

    /// Initial game state as decoded, class names included.
    pub fn raw_game_info(&self) -> Option<&SerializedValue> {
        self.raw_game_info.as_ref()
    }

    /// PHP classes found in the game state.
    pub fn type_manifest(&self) -> &TypeManifest {
        &self.type_manifest
    }

    /// Turns in play order.
    pub fn turns(&self) -> Option<&[RawTurn]> {
        if self.turns.is_none() {
            tracing::warn!("No actions file for {}", self.path.display());
        }
        self.turns.as_deref()
    }

    /// Every action in play order. Each call starts a fresh iterator.
    pub fn actions(&self) -> Option<impl Iterator<Item = &ActionRecord> + '_> {
        Some(self.turns()?.iter().flat_map(|turn| turn.actions.iter()))
    }

    /// The `"action"` label of every action in play order.
    pub fn action_summaries(&self) -> Option<impl Iterator<Item = &str> + '_> {
        Some(self.actions()?.map(ActionRecord::kind))
    }
}

fn gunzip(member: &str, raw: &[u8], limit: Option<u64>) -> Result<Vec<u8>, ReplayError> {
    let mut data = Vec::new();
    let mut decoder = GzDecoder::new(raw);
    let read = match limit {
        Some(limit) => decoder
            .by_ref()
            .take(limit.saturating_add(1))
            .read_to_end(&mut data),
        None => decoder.read_to_end(&mut data),
    };
    read.map_err(|source| ReplayError::Decompression {
        member: member.to_owned(),
        source,
    })?;
    if let Some(limit) = limit {
        if data.len() as u64 > limit {
            return Err(ReplayError::MemberTooLarge {
                member: member.to_owned(),
                limit,
            });
        }
    }
    Ok(data)
}

fn parse_action_stream(
    member: &str,
    data: &[u8],
    parser: &ActionLineParser,
) -> Result<Vec<RawTurn>, ReplayError> {
    let text = std::str::from_utf8(data).map_err(|_| ReplayError::InvalidText {
        member: member.to_owned(),
    })?;
    let mut turns = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let turn = parser
            .parse(line)
            .map_err(|e| ReplayError::action_line(member, index + 1, e))?;
        turns.push(turn);
    }
    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_a_substring_test() {
        assert_eq!(classify_member("a52963"), MemberRole::ActionStream);
        assert_eq!(classify_member("52963"), MemberRole::Metadata);
        assert_eq!(classify_member("game_52963"), MemberRole::ActionStream);
        assert_eq!(classify_member("A52963"), MemberRole::Metadata);
    }

    #[test]
    fn gunzip_rejects_plain_bytes() {
        let err = gunzip("52963", b"not gzip", None).unwrap_err();
        assert!(matches!(err, ReplayError::Decompression { ref member, .. } if member == "52963"));
    }
}
