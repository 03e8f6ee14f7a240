#![allow(dead_code)]

use std::io::{Cursor, Write};

use awbw_replay::{Key, PhpEncoder, SerializedValue};
use flate2::write::GzEncoder;
use flate2::Compression;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// Zip archive whose members are stored as given, without gzip.
pub fn zip_raw(members: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, data) in members {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Replay-shaped archive: every member gzip-compressed.
pub fn replay_zip(members: &[(&str, &[u8])]) -> Vec<u8> {
    let gzipped: Vec<(&str, Vec<u8>)> = members
        .iter()
        .map(|(name, data)| (*name, gzip(data)))
        .collect();
    zip_raw(&gzipped)
}

pub fn php(value: &SerializedValue) -> String {
    String::from_utf8(PhpEncoder::new().encode(value)).unwrap()
}

/// `p:<player>;d:<day>;a:<array of the given JSON texts>`
pub fn action_line(player: i64, day: i64, json: &[&str]) -> String {
    let list = SerializedValue::List(
        json.iter()
            .enumerate()
            .map(|(i, s)| (Key::Int(i as i64), SerializedValue::Text((*s).to_owned())))
            .collect(),
    );
    format!("p:{player};d:{day};a:{}", php(&list))
}

pub fn object(class: &str, fields: Vec<(&str, SerializedValue)>) -> SerializedValue {
    SerializedValue::Object {
        class: class.to_owned(),
        fields: fields
            .into_iter()
            .map(|(k, v)| (Key::from(k), v))
            .collect(),
    }
}

/// Game state with one `Game` object holding two `Player` objects.
pub fn game_state() -> SerializedValue {
    let player = |id: i64, funds: i64| {
        object(
            "Player",
            vec![
                ("players_id", SerializedValue::Int(id)),
                ("players_funds", SerializedValue::Int(funds)),
                ("players_eliminated", SerializedValue::Text("N".into())),
            ],
        )
    };
    object(
        "Game",
        vec![
            ("games_id", SerializedValue::Int(52963)),
            ("day", SerializedValue::Int(1)),
            (
                "players",
                SerializedValue::List(vec![
                    (Key::Int(0), player(7, 1000)),
                    (Key::Int(1), player(8, 0)),
                ]),
            ),
        ],
    )
}
