//! # Content Module
//!
//! Read-only game content decoded from a compact text format.
//!
//! A content source holds zero or more blocks. Each block starts with a
//! bracketed tag line such as `[ENEMY]` and continues with `key=value` lines
//! until the next bracketed line or the end of the source:
//!
//! ```text
//! [ENEMY]
//! id=3
//! name=Cave Bat
//! hp=14
//! ```
//!
//! Nothing is cached. Every lookup scans the source again, and a record is
//! only accepted once its block has ended. Decoding never fails: unknown keys
//! are skipped, malformed numbers read as zero and long strings are cut to
//! their storage width.

pub mod library;
pub mod records;

pub use library::*;
pub use records::*;

use crate::config::{MAP_HEIGHT, MAP_WIDTH};
use std::marker::PhantomData;
use std::str::{FromStr, Lines};

/// A content record that can be decoded from a tagged block.
pub trait Record: Default {
    /// Tag line that opens a block of this record type, brackets included.
    const TAG: &'static str;

    /// Human readable record kind, used in log and error messages.
    const KIND: &'static str;

    /// Identifier accumulated so far.
    fn id(&self) -> u16;

    /// Applies one `key=value` line. Unknown keys must be ignored.
    fn apply(&mut self, key: &str, value: &str);
}

/// Iterator over every complete record of type `R` in a source.
///
/// A record is yielded when its block is closed by another bracketed line or
/// by the end of the source.
pub struct RecordIter<'a, R: Record> {
    lines: Lines<'a>,
    current: Option<R>,
    finished: bool,
    _marker: PhantomData<R>,
}

impl<'a, R: Record> RecordIter<'a, R> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines(),
            current: None,
            finished: false,
            _marker: PhantomData,
        }
    }
}

impl<R: Record> Iterator for RecordIter<'_, R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        if self.finished {
            return None;
        }

        for raw in self.lines.by_ref() {
            let line = raw.trim();

            if line == R::TAG {
                let closed = self.current.replace(R::default());
                if closed.is_some() {
                    return closed;
                }
                continue;
            }

            let Some(record) = self.current.as_mut() else {
                continue;
            };

            if line.starts_with('[') {
                return self.current.take();
            }

            if let Some((key, value)) = split_key_value(line) {
                record.apply(key, value);
            }
        }

        self.finished = true;
        self.current.take()
    }
}

/// Iterates over all records of type `R` in `source`.
pub fn records<R: Record>(source: &str) -> RecordIter<'_, R> {
    RecordIter::new(source)
}

/// Finds the record of type `R` whose `id` equals `id`.
///
/// # Examples
///
/// ```
/// use descent::{find, Spell};
///
/// let source = "[SPELL]\nid=1\nname=Spark\n[SPELL]\nid=2\nname=Mend\n";
/// let spell: Spell = find(source, 2).unwrap();
/// assert_eq!(spell.name, "Mend");
/// assert!(find::<Spell>(source, 9).is_none());
/// ```
pub fn find<R: Record>(source: &str, id: u16) -> Option<R> {
    records::<R>(source).find(|record| record.id() == id)
}

/// Splits a `key=value` line at the first `=`.
///
/// The key is taken verbatim, the value is trimmed. Lines without `=` yield
/// `None`.
pub fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    Some((key, value.trim()))
}

/// Parses a decimal field, reading malformed input as zero.
///
/// # Examples
///
/// ```
/// use descent::parse_number;
///
/// assert_eq!(parse_number::<u16>("42"), 42);
/// assert_eq!(parse_number::<u16>("4x2"), 0);
/// assert_eq!(parse_number::<i16>("-3"), -3);
/// assert_eq!(parse_number::<u8>("300"), 0);
/// ```
pub fn parse_number<T: FromStr + Default>(value: &str) -> T {
    value.trim().parse().unwrap_or_default()
}

/// Cuts a string field to at most `width` characters.
pub fn truncate_field(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

/// Parses a comma separated id list, keeping at most `capacity` entries.
pub fn parse_id_list(value: &str, capacity: usize) -> Vec<u16> {
    value
        .split(',')
        .take(capacity)
        .map(parse_number::<u16>)
        .collect()
}

/// Raw tile codes of one dungeon floor, row-major.
pub type FloorCodes = [[u8; MAP_WIDTH]; MAP_HEIGHT];

/// Decodes the `[FLOORn]` section of a dungeon source into `codes`.
///
/// The grid is cleared to zero first. Each `map=` line fills the next row;
/// a row shorter than the map width leaves the remaining cells untouched and
/// rows beyond the map height are ignored. Characters other than decimal
/// digits decode as zero. Returns `true` if at least one row was read.
pub fn decode_floor(source: &str, floor: u8, codes: &mut FloorCodes) -> bool {
    let section = format!("[FLOOR{}]", floor);
    let mut in_section = false;
    let mut row = 0;

    for row_codes in codes.iter_mut() {
        *row_codes = [0; MAP_WIDTH];
    }

    for raw in source.lines() {
        let line = raw.trim();
        if line == section {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if line.starts_with('[') {
            break;
        }

        if let Some(map_row) = line.strip_prefix("map=") {
            if row < MAP_HEIGHT {
                for (cell, ch) in codes[row].iter_mut().zip(map_row.chars()) {
                    *cell = ch.to_digit(10).map(|d| d as u8).unwrap_or(0);
                }
                row += 1;
            }
        }
    }

    row > 0
}

/// Looks up the experience total required to reach `level`.
///
/// The curve holds `level=xp` lines. A missing level falls back to
/// `level * 100`.
///
/// # Examples
///
/// ```
/// use descent::xp_for_level;
///
/// let curve = "[LEVELS]\n2=20\n3=55\n";
/// assert_eq!(xp_for_level(curve, 3), 55);
/// assert_eq!(xp_for_level(curve, 7), 700);
/// ```
pub fn xp_for_level(source: &str, level: u8) -> u32 {
    let key = level.to_string();
    source
        .lines()
        .filter_map(|line| split_key_value(line.trim()))
        .find(|(k, _)| *k == key)
        .map(|(_, value)| parse_number(value))
        .unwrap_or(level as u32 * 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Probe {
        id: u16,
        label: String,
    }

    impl Record for Probe {
        const TAG: &'static str = "[PROBE]";
        const KIND: &'static str = "probe";

        fn id(&self) -> u16 {
            self.id
        }

        fn apply(&mut self, key: &str, value: &str) {
            match key {
                "id" => self.id = parse_number(value),
                "label" => self.label = truncate_field(value, 4),
                _ => {}
            }
        }
    }

    #[test]
    fn test_find_reads_last_block_at_end_of_source() {
        let source = "[PROBE]\nid=1\nlabel=a\n[PROBE]\nid=2\nlabel=b";
        let probe: Probe = find(source, 2).unwrap();
        assert_eq!(probe.label, "b");
    }

    #[test]
    fn test_other_tags_close_a_block() {
        let source = "[PROBE]\nid=1\n[OTHER]\nid=2\nlabel=zz\n[PROBE]\nid=3\n";
        let all: Vec<Probe> = records(source).collect();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], Probe { id: 1, label: String::new() });
        assert_eq!(all[1].id, 3);
        assert!(find::<Probe>(source, 2).is_none());
    }

    #[test]
    fn test_lines_before_first_tag_are_ignored() {
        let source = "id=5\nlabel=stray\n[PROBE]\nid=5\n";
        let probe: Probe = find(source, 5).unwrap();
        assert_eq!(probe.label, "");
    }

    #[test]
    fn test_values_are_trimmed_and_truncated() {
        let source = "  [PROBE]  \r\nid= 7 \r\nlabel=  longer  \r\nmystery=1\r\n";
        let probe: Probe = find(source, 7).unwrap();
        assert_eq!(probe.label, "long");
    }

    #[test]
    fn test_malformed_numbers_read_as_zero() {
        assert_eq!(parse_number::<u16>(""), 0);
        assert_eq!(parse_number::<u16>("abc"), 0);
        assert_eq!(parse_number::<u16>("-1"), 0);
        assert_eq!(parse_number::<u32>(" 120 "), 120);
    }

    #[test]
    fn test_id_list_is_bounded() {
        assert_eq!(parse_id_list("1,2,3", 8), vec![1, 2, 3]);
        assert_eq!(parse_id_list("1,2,3,4,5,6,7,8,9,10", 8).len(), 8);
        assert_eq!(parse_id_list("4,x,6", 8), vec![4, 0, 6]);
    }

    #[test]
    fn test_decode_floor_short_rows_and_bad_cells() {
        let source = "[INFO]\nid=1\n[FLOOR1]\nmap=1111\nmap=19a3111111111111111\n[FLOOR2]\nmap=5\n";
        let mut codes = [[7u8; MAP_WIDTH]; MAP_HEIGHT];
        assert!(decode_floor(source, 1, &mut codes));
        assert_eq!(&codes[0][..5], &[1, 1, 1, 1, 0]);
        assert_eq!(&codes[1][..4], &[1, 9, 0, 3]);
        assert_eq!(codes[1][15], 1);
        assert_eq!(codes[2], [0; MAP_WIDTH]);
    }

    #[test]
    fn test_decode_missing_floor() {
        let mut codes = [[1u8; MAP_WIDTH]; MAP_HEIGHT];
        assert!(!decode_floor("[FLOOR1]\nmap=1\n", 4, &mut codes));
        assert_eq!(codes[0][0], 0);
    }

    #[test]
    fn test_decode_floor_ignores_extra_rows() {
        let mut source = String::from("[FLOOR1]\n");
        for _ in 0..14 {
            source.push_str("map=2222222222222222\n");
        }
        let mut codes = [[0u8; MAP_WIDTH]; MAP_HEIGHT];
        assert!(decode_floor(&source, 1, &mut codes));
        assert!(codes.iter().all(|row| row.iter().all(|&c| c == 2)));
    }

    #[test]
    fn test_xp_curve_fallback() {
        assert_eq!(xp_for_level("", 5), 500);
        assert_eq!(xp_for_level("5=bad", 5), 0);
    }
}
