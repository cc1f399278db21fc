//! Splitting of pipe-delimited example rows into cells.

/// Split a table row into trimmed cells.
///
/// Cells are delimited by `|` characters not preceded by a backslash; text
/// before the first and after the last delimiter is discarded and `\|`
/// inside a cell becomes `|`.
///
/// # Examples
/// ```
/// use bdd_outline_patterns::split_cells;
///
/// assert_eq!(split_cells("| a | b\\|c |"), vec!["a", "b|c"]);
/// assert!(split_cells("no pipes").is_empty());
/// ```
#[must_use]
pub fn split_cells(line: &str) -> Vec<String> {
    let bytes = line.as_bytes();
    let mut pipe_positions = Vec::new();
    for (idx, b) in bytes.iter().enumerate() {
        if *b == b'|' && (idx == 0 || bytes.get(idx - 1) != Some(&b'\\')) {
            pipe_positions.push(idx);
        }
    }

    let mut cells = Vec::with_capacity(pipe_positions.len().saturating_sub(1));
    for window in pipe_positions.windows(2) {
        let &[left, right] = window else {
            continue;
        };
        let cell = line.get(left + 1..right).unwrap_or_default();
        cells.push(cell.replace("\\|", "|").trim().to_string());
    }
    cells
}
