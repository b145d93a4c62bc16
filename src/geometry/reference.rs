//! Conversion between 0-based indexes and Excel-style references ("A1", "BC32").

/// Converts column letters to a 0-based column index: A = 0, Z = 25, AA = 26, ...
/// Returns None for empty, non-alphabetic or oversized input.
pub fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|char| char.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .chars()
        .map(|char| char as usize - 'A' as usize + 1)
        .try_fold(0usize, |index, digit| index.checked_mul(26)?.checked_add(digit))
        .map(|col| col - 1)
}

/// Converts a 1-based row number string to a 0-based row index.
pub fn row_to_index(number: &str) -> Option<usize> {
    number
        .parse::<usize>()
        .ok()
        .filter(|row| *row > 0)
        .map(|row| row - 1)
}

/// Converts a 0-based column index to column letters.
pub fn index_to_col(col: usize) -> String {
    let mut col = col + 1;
    let mut letters = String::new();
    while col > 0 {
        col -= 1;
        letters.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }
    letters
}

/// Converts 0-based row & column indexes to an Excel-style reference.
pub fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row + 1)
}
