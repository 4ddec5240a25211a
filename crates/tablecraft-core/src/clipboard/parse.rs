//! Pure parsers for the two clipboard formats this workspace accepts: an
//! HTML-table parser that expands `rowspan`/`colspan` into normalized
//! leading-cell records, and a TSV matrix parser. Neither parser touches a
//! [`crate::model::TableModel`]; `crate::clipboard::paste` does that.

use std::collections::HashSet;

use scraper::{Html, Selector};

/// One normalized leading-cell record produced by [`parse_html_table`].
/// `r`/`c` are source-table coordinates (not yet offset by a paste target).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCell {
    pub r: u32,
    pub c: u32,
    pub value: String,
    pub row_span: u32,
    pub col_span: u32,
}

/// The result of [`parse_html_table`]: `success` is false when the fragment
/// has no `<table>` or the table has no rows, in which case `rows`/`cols`
/// are `0` and `cells` is empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedTable {
    pub success: bool,
    pub rows: u32,
    pub cols: u32,
    pub cells: Vec<ParsedCell>,
}

/// Parse the first `<table>` in an HTML fragment into a [`ParsedTable`].
///
/// Tracks an occupancy set of `(row, col)` pairs already claimed by an
/// earlier cell's `rowspan`/`colspan` so that placing a cell in a later row
/// advances its column cursor past anything a previous row already reserved.
/// `cols` is the maximum column cursor reached across every row; `rows` is
/// the number of source `<tr>` rows, widened if a `rowspan` extends a cell
/// past the last row (so `r + row_span <= rows` always holds on the
/// returned value).
pub fn parse_html_table(html: &str) -> ParsedTable {
    let fragment = Html::parse_fragment(html);
    let table_sel = Selector::parse("table").expect("'table' is a valid selector");
    let Some(table) = fragment.select(&table_sel).next() else {
        return ParsedTable::default();
    };

    let row_sel = Selector::parse("tr").expect("'tr' is a valid selector");
    let cell_sel = Selector::parse("td, th").expect("'td, th' is a valid selector");
    let rows: Vec<_> = table.select(&row_sel).collect();
    if rows.is_empty() {
        return ParsedTable::default();
    }

    let mut occupied: HashSet<(u32, u32)> = HashSet::new();
    let mut cells = Vec::new();
    let mut max_col_cursor = 0u32;
    let mut max_row_extent = rows.len() as u32;

    for (r_idx, row) in rows.iter().enumerate() {
        let r = r_idx as u32;
        let mut col_cursor = 0u32;
        for cell_ref in row.select(&cell_sel) {
            while occupied.contains(&(r, col_cursor)) {
                col_cursor += 1;
            }
            let c = col_cursor;
            let row_span = positive_attr(&cell_ref, "rowspan");
            let col_span = positive_attr(&cell_ref, "colspan");
            let value: String = cell_ref.text().collect::<Vec<_>>().join("").trim().to_string();

            for dr in 0..row_span {
                for dc in 0..col_span {
                    occupied.insert((r + dr, c + dc));
                }
            }

            col_cursor = c + col_span;
            max_col_cursor = max_col_cursor.max(col_cursor);
            max_row_extent = max_row_extent.max(r + row_span);
            cells.push(ParsedCell { r, c, value, row_span, col_span });
        }
    }

    ParsedTable { success: true, rows: max_row_extent, cols: max_col_cursor, cells }
}

fn positive_attr(cell: &scraper::ElementRef<'_>, name: &str) -> u32 {
    cell.value()
        .attr(name)
        .and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

/// Split plaintext clipboard content into a string matrix: `\r` is dropped
/// (so `\r\n` and bare `\r` line endings both collapse to `\n`), the text is
/// split on `\n`, a single trailing empty line is tolerated and dropped, and
/// each remaining line is split on `\t`. The result may be ragged (rows of
/// differing column counts) — the caller decides how to pad it.
pub fn parse_tsv(text: &str) -> Vec<Vec<String>> {
    let normalized = text.replace('\r', "");
    let mut lines: Vec<&str> = normalized.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines.into_iter().map(|line| line.split('\t').map(str::to_string).collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_table_yields_failure() {
        let parsed = parse_html_table("<div>no table here</div>");
        assert!(!parsed.success);
    }

    #[test]
    fn empty_table_yields_failure() {
        let parsed = parse_html_table("<table></table>");
        assert!(!parsed.success);
    }

    #[test]
    fn simple_table_has_expected_dimensions() {
        let parsed = parse_html_table("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>");
        assert!(parsed.success);
        assert_eq!((parsed.rows, parsed.cols), (2, 2));
        assert_eq!(parsed.cells.len(), 4);
    }

    #[test]
    fn rowspan_reserves_the_column_in_the_next_row() {
        let html = "<table>\
            <tr><td rowspan=\"2\">X</td><td>R</td></tr>\
            <tr><td>after-span</td></tr>\
        </table>";
        let parsed = parse_html_table(html);
        assert!(parsed.success);
        // second row's single cell lands in column 1, not column 0, because
        // column 0 is still reserved by the first row's rowspan.
        let second_row_cell = parsed.cells.iter().find(|c| c.r == 1).unwrap();
        assert_eq!(second_row_cell.c, 1);
    }

    #[test]
    fn colspan_and_rowspan_widen_the_invariant_8_bounds() {
        let html = "<table><tr><td rowspan=\"2\" colspan=\"2\">X</td></tr><tr></tr></table>";
        let parsed = parse_html_table(html);
        assert!(parsed.success);
        for cell in &parsed.cells {
            assert!(cell.r + cell.row_span <= parsed.rows);
            assert!(cell.c + cell.col_span <= parsed.cols);
        }
    }

    #[test]
    fn tsv_drops_trailing_empty_line_and_splits_on_tab() {
        let matrix = parse_tsv("a\tb\nc\td\n");
        assert_eq!(matrix, vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string(), "d".to_string()]]);
    }

    #[test]
    fn tsv_normalizes_crlf() {
        let matrix = parse_tsv("a\tb\r\nc\td");
        assert_eq!(matrix.len(), 2);
    }
}
