use regex::Regex;
use std::sync::OnceLock;

/// Largest column number a worksheet accepts (XFD)
pub const MAX_COLUMN: u32 = 16_384;
/// Largest row number a worksheet accepts
pub const MAX_ROW: u32 = 1_048_576;

fn cell_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\$?([A-Za-z]{1,3})\$?([0-9]{1,7})$").expect("cell pattern is valid")
    })
}

/// Convert column index (0-based) to column letters (A, B, ..., Z, AA, AB, ...)
pub fn column_index_to_letter(index: u32) -> String {
    let mut result = String::new();
    let mut n = index + 1;

    while n > 0 {
        n -= 1;
        let c = (b'A' + (n % 26) as u8) as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Convert column letters to a 1-based column number
pub fn column_letter_to_number(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }

    let mut number: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        number = number * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }

    (number <= MAX_COLUMN).then_some(number)
}

/// Format a 1-based (column, row) pair as an A1 coordinate
pub fn to_a1(col: u32, row: u32) -> String {
    format!("{}{}", column_index_to_letter(col.saturating_sub(1)), row)
}

/// Parse an A1 coordinate (absolute markers allowed) into 1-based (column, row)
pub fn parse_cell(coordinate: &str) -> Option<(u32, u32)> {
    let caps = cell_pattern().captures(coordinate.trim())?;
    let col = column_letter_to_number(&caps[1])?;
    let row: u32 = caps[2].parse().ok()?;

    if row == 0 || row > MAX_ROW {
        return None;
    }

    Some((col, row))
}

/// A rectangular cell range with 1-based inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: (u32, u32),
    pub end: (u32, u32),
}

impl CellRange {
    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.start.0 <= other.end.0
            && other.start.0 <= self.end.0
            && self.start.1 <= other.end.1
            && other.start.1 <= self.end.1
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }
}

impl std::fmt::Display for CellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}",
            to_a1(self.start.0, self.start.1),
            to_a1(self.end.0, self.end.1)
        )
    }
}

/// Parse `A1:B2` (or a single `A1`) into a normalized range
pub fn parse_range(range: &str) -> Option<CellRange> {
    let range = range.rsplit('!').next()?.trim();
    let (first, second) = match range.split_once(':') {
        Some((a, b)) => (parse_cell(a)?, parse_cell(b)?),
        None => {
            let cell = parse_cell(range)?;
            (cell, cell)
        }
    };

    Some(CellRange {
        start: (first.0.min(second.0), first.1.min(second.1)),
        end: (first.0.max(second.0), first.1.max(second.1)),
    })
}
