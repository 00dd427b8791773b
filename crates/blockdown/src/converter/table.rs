//! Table grid reconstruction.
//!
//! Markdown pipe tables have no row or column spans, so a `<table>` is first
//! expanded into a dense grid: each cell's text sits at its anchor position and
//! every other position it covers holds an empty placeholder. The grid is then
//! rendered with padded columns, using the first non-blank row as the header.
//!
//! Span attributes predicted by layout models are not always consistent. A
//! span that runs off the grid is clipped (and logged); it never moves or
//! overwrites a cell that has already been placed.

use crate::converter::inline::TABLE_LINE_BREAK;
use crate::converter::main::{Context, convert_children};
use crate::dom::{Child, Node, Tag};
use crate::options::ConversionOptions;
use crate::text;

/// Upper bound for `colspan`, as in the HTML table model.
const MAX_COLSPAN: usize = 1000;
/// Upper bound for `rowspan`, as in the HTML table model.
const MAX_ROWSPAN: usize = 65534;

/// A real cell placed at its anchor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Single-line cell text.
    pub text: String,
    /// Rows covered, clipped to the grid.
    pub rowspan: usize,
    /// Columns covered, clipped to the grid.
    pub colspan: usize,
}

/// Content of one grid position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridSlot {
    /// Top-left position of a cell.
    Anchor(Cell),
    /// Position covered by another cell's span.
    Placeholder,
}

/// Dense `rows × cols` grid. Positions no cell reached stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    slots: Vec<Vec<Option<GridSlot>>>,
    cols: usize,
}

impl Grid {
    /// An empty grid of the given size.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            slots: vec![vec![None; cols]; rows],
            cols,
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of columns.
    pub const fn col_count(&self) -> usize {
        self.cols
    }

    /// Slot at `(row, col)`, `None` when empty or out of range.
    pub fn slot(&self, row: usize, col: usize) -> Option<&GridSlot> {
        self.slots.get(row)?.get(col)?.as_ref()
    }

    /// Printed text at `(row, col)`; placeholders and empty positions print as `""`.
    pub fn text(&self, row: usize, col: usize) -> &str {
        match self.slot(row, col) {
            Some(GridSlot::Anchor(cell)) => &cell.text,
            _ => "",
        }
    }

    fn is_free(&self, row: usize, col: usize) -> bool {
        self.slots.get(row).and_then(|cells| cells.get(col)).is_some_and(Option::is_none)
    }

    fn set(&mut self, row: usize, col: usize, slot: GridSlot) {
        if let Some(position) = self.slots.get_mut(row).and_then(|cells| cells.get_mut(col)) {
            *position = Some(slot);
        }
    }

    fn row_is_blank(&self, row: usize) -> bool {
        (0..self.cols).all(|col| self.text(row, col).is_empty())
    }
}

/// `<table>`: a padded pipe table, or the original markup when HTML tables
/// are requested.
pub(crate) fn convert_table(node: &Node, options: &ConversionOptions, ctx: Context) -> String {
    if options.html_tables_in_markdown {
        return format!("\n\n{}\n\n", node.to_html());
    }

    let grid = build_grid(node, options);
    if grid.row_count() == 0 {
        // No rows at all: render whatever the table holds as a plain container.
        let text = convert_children(node, options, ctx.enter(&node.tag));
        return if text.trim().is_empty() {
            String::new()
        } else {
            format!("{text}\n\n")
        };
    }

    let rendered = render_grid(&grid);
    if rendered.is_empty() {
        return String::new();
    }
    format!("\n\n{rendered}\n\n")
}

/// Expand `table` into a dense grid.
pub fn build_grid(table: &Node, options: &ConversionOptions) -> Grid {
    let cells_by_row: Vec<Vec<&Node>> = table_rows(table).into_iter().map(row_cells).collect();
    let total_rows = cells_by_row.len();
    let total_cols = count_columns(&cells_by_row);

    let mut grid = Grid::new(total_rows, total_cols);

    for (row_idx, cells) in cells_by_row.iter().enumerate() {
        let mut col_idx = 0;
        for cell in cells {
            while col_idx < total_cols && !grid.is_free(row_idx, col_idx) {
                col_idx += 1;
            }

            let (rowspan, colspan) = cell_spans(cell);
            if col_idx >= total_cols {
                log::info!(
                    "Skipping table cell in row {row_idx}: no free column left ({total_cols} columns)"
                );
                continue;
            }

            let rows_in = rowspan.min(total_rows - row_idx);
            let cols_in = colspan.min(total_cols - col_idx);
            let overflow = rowspan.saturating_mul(colspan) - rows_in * cols_in;
            if overflow > 0 {
                log::info!(
                    "Overflow in table spans at row {row_idx}, column {col_idx}: \
                     {rowspan}x{colspan} exceeds {total_rows}x{total_cols}, {overflow} positions skipped"
                );
            }

            for r in 0..rows_in {
                for c in 0..cols_in {
                    if (r, c) != (0, 0) && grid.is_free(row_idx + r, col_idx + c) {
                        grid.set(row_idx + r, col_idx + c, GridSlot::Placeholder);
                    }
                }
            }

            grid.set(
                row_idx,
                col_idx,
                GridSlot::Anchor(Cell {
                    text: format_cell_text(cell, options),
                    rowspan: rows_in,
                    colspan: cols_in,
                }),
            );

            col_idx += colspan;
        }
    }

    grid
}

/// Width of the widest row, counting columns carried down by earlier rowspans.
fn count_columns(row_cells: &[Vec<&Node>]) -> usize {
    let mut carried = vec![0usize; row_cells.len()];
    let mut widest = 0;

    for (row_idx, cells) in row_cells.iter().enumerate() {
        let mut row_cols = carried[row_idx];
        for cell in cells {
            let (rowspan, colspan) = cell_spans(cell);
            row_cols = row_cols.saturating_add(colspan);
            for later in carried.iter_mut().skip(row_idx + 1).take(rowspan - 1) {
                *later = later.saturating_add(colspan);
            }
        }
        widest = widest.max(row_cols);
    }

    widest
}

/// Every `<tr>` of the table, however deeply wrapped, excluding nested tables.
fn table_rows(table: &Node) -> Vec<&Node> {
    table.descendants_where(&|tag| *tag == Tag::Tr, &|tag| *tag == Tag::Table)
}

/// Every `<td>`/`<th>` of a row, excluding cells of nested tables.
fn row_cells(row: &Node) -> Vec<&Node> {
    row.descendants_where(&|tag| matches!(tag, Tag::Td | Tag::Th), &|tag| {
        matches!(tag, Tag::Table | Tag::Td | Tag::Th)
    })
}

/// `(rowspan, colspan)`, each at least 1. Unparseable values count as 1.
fn cell_spans(cell: &Node) -> (usize, usize) {
    (
        span_attr(cell, "rowspan", MAX_ROWSPAN),
        span_attr(cell, "colspan", MAX_COLSPAN),
    )
}

fn span_attr(cell: &Node, name: &str, max: usize) -> usize {
    cell.attr(name)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|&span| span > 0)
        .map_or(1, |span| span.min(max))
}

/// Single-line text of a cell.
///
/// Text runs are trimmed and escaped, and `<br>` is kept as a literal marker.
/// Math always uses `$` whatever the configured delimiters. Any other element
/// is kept as HTML. Pieces are joined with single spaces except next to a `<br>`.
fn format_cell_text(cell: &Node, options: &ConversionOptions) -> String {
    let mut pieces: Vec<String> = Vec::new();
    for child in &cell.children {
        match child {
            Child::Text(raw) => {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    let normalized = text::normalize_whitespace(trimmed);
                    pieces.push(text::escape(&normalized, options).into_owned());
                }
            }
            Child::Element(node) => match node.tag {
                Tag::Br => pieces.push(TABLE_LINE_BREAK.to_string()),
                Tag::Math => pieces.push(format!("${}$", node.text_content().trim())),
                _ => pieces.push(text::escape_dollars(&node.to_html(), options).into_owned()),
            },
        }
    }

    let mut joined = String::new();
    for (idx, piece) in pieces.iter().enumerate() {
        let after_break = idx > 0 && pieces[idx - 1] == TABLE_LINE_BREAK;
        if idx > 0 && piece != TABLE_LINE_BREAK && !after_break {
            joined.push(' ');
        }
        joined.push_str(piece);
    }

    joined.replace('\n', " ").replace('|', " ").trim().to_string()
}

/// Render a grid as a pipe table. Leading blank rows are skipped so the header
/// slot goes to the first row with content.
pub fn render_grid(grid: &Grid) -> String {
    let cols = grid.col_count();
    if cols == 0 {
        return String::new();
    }

    let widths: Vec<usize> = (0..cols)
        .map(|col| {
            (0..grid.row_count())
                .map(|row| grid.text(row, col).chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(grid.row_count() + 1);
    let mut added_header = false;

    for row in 0..grid.row_count() {
        if !added_header && grid.row_is_blank(row) {
            continue;
        }

        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(col, &width)| format!(" {:<width$} ", grid.text(row, col)))
            .collect();
        lines.push(format!("|{}|", cells.join("|")));

        if !added_header {
            let separator: Vec<String> = widths.iter().map(|width| "-".repeat(width + 2)).collect();
            lines.push(format!("|{}|", separator.join("|")));
            added_header = true;
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;

    fn table(html: &str) -> Node {
        let root = parse_document(html).unwrap();
        root.element_children().next().unwrap().clone()
    }

    fn grid_texts(grid: &Grid) -> Vec<Vec<&str>> {
        (0..grid.row_count())
            .map(|row| (0..grid.col_count()).map(|col| grid.text(row, col)).collect())
            .collect()
    }

    #[test]
    fn test_rowspan_leaves_placeholder() {
        let node = table(r#"<table><tr><td rowspan="2">A</td><td>B</td></tr><tr><td>C</td></tr></table>"#);
        let grid = build_grid(&node, &ConversionOptions::default());

        assert_eq!(grid.col_count(), 2);
        assert_eq!(grid_texts(&grid), vec![vec!["A", "B"], vec!["", "C"]]);
        assert_eq!(grid.slot(1, 0), Some(&GridSlot::Placeholder));
        assert_eq!(render_grid(&grid), "| A | B |\n|---|---|\n|   | C |");
    }

    #[test]
    fn test_colspan_widens_grid() {
        let node = table(r#"<table><tr><th colspan="2">Head</th></tr><tr><td>x</td><td>yy</td></tr></table>"#);
        let grid = build_grid(&node, &ConversionOptions::default());

        assert_eq!(grid_texts(&grid), vec![vec!["Head", ""], vec!["x", "yy"]]);
        assert_eq!(
            render_grid(&grid),
            "| Head |    |\n|------|----|\n| x    | yy |"
        );
    }

    #[test]
    fn test_anchor_records_clipped_spans() {
        let node = table(r#"<table><tr><td rowspan="5" colspan="3">A</td><td>B</td></tr><tr><td>C</td></tr></table>"#);
        let grid = build_grid(&node, &ConversionOptions::default());
        match grid.slot(0, 0) {
            Some(GridSlot::Anchor(cell)) => {
                assert_eq!(cell.rowspan, 2);
                assert_eq!(cell.colspan, 3);
            }
            other => panic!("expected anchor, got {other:?}"),
        }
    }

    #[test]
    fn test_carried_rowspan_widens_later_row() {
        let node = table(
            r#"<table><tr><td rowspan="2">A</td><td>B</td></tr><tr><td>C</td><td>D</td><td>E</td></tr></table>"#,
        );
        let grid = build_grid(&node, &ConversionOptions::default());
        assert_eq!(grid.col_count(), 4);
        assert_eq!(grid_texts(&grid), vec![vec!["A", "B", "", ""], vec!["", "C", "D", "E"]]);
    }

    #[test]
    fn test_placed_cells_are_never_overwritten() {
        let node = table(
            r#"<table><tr><td>A</td><td rowspan="2">B</td></tr><tr><td colspan="3">C</td></tr></table>"#,
        );
        let grid = build_grid(&node, &ConversionOptions::default());
        assert_eq!(grid.text(0, 1), "B");
        assert_eq!(grid.slot(1, 1), Some(&GridSlot::Placeholder));
        assert_eq!(grid.text(1, 0), "C");
    }

    #[test]
    fn test_leading_blank_rows_skipped() {
        let node = table("<table><tr><td></td><td> </td></tr><tr><td>H1</td><td>H2</td></tr><tr><td></td><td>v</td></tr></table>");
        let grid = build_grid(&node, &ConversionOptions::default());
        assert_eq!(
            render_grid(&grid),
            "| H1 | H2 |\n|----|----|\n|    | v  |"
        );
    }

    #[test]
    fn test_cell_text_formatting() {
        let node = table(
            "<table><tr><td>line one<br>line two</td><td>a | b\nc</td><td>cost <math>x^2</math> $5</td><td><b>bold</b> *</td></tr></table>",
        );
        let grid = build_grid(&node, &ConversionOptions::default());
        assert_eq!(grid.text(0, 0), "line one<br>line two");
        assert_eq!(grid.text(0, 1), "a   b c");
        assert_eq!(grid.text(0, 2), r"cost $x^2$ \$5");
        assert_eq!(grid.text(0, 3), r"<b>bold</b> \*");
    }

    #[test]
    fn test_cell_math_ignores_custom_delimiters() {
        let node = table("<table><tr><td>area <math>r^2</math></td></tr></table>");
        let options = ConversionOptions::default()
            .with_inline_math_delimiters(crate::options::MathDelimiters::new(r"\(", r"\)"));
        let grid = build_grid(&node, &options);
        assert_eq!(grid.text(0, 0), "area $r^2$");
    }

    #[test]
    fn test_invalid_spans_default_to_one() {
        let node = table(r#"<table><tr><td colspan="zero">A</td><td rowspan="0">B</td></tr></table>"#);
        let grid = build_grid(&node, &ConversionOptions::default());
        assert_eq!(grid_texts(&grid), vec![vec!["A", "B"]]);
    }

    #[test]
    fn test_rows_inside_sections_are_found() {
        let node = table("<table><thead><tr><th>H</th></tr></thead><tbody><tr><td>v</td></tr></tbody></table>");
        let grid = build_grid(&node, &ConversionOptions::default());
        assert_eq!(grid_texts(&grid), vec![vec!["H"], vec!["v"]]);
    }

    #[test]
    fn test_html_passthrough() {
        let node = table("<table><tr><td>A</td></tr></table>");
        let options = ConversionOptions::default().with_html_tables(true);
        assert_eq!(
            convert_table(&node, &options, Context::default()),
            "\n\n<table><tr><td>A</td></tr></table>\n\n"
        );
    }

    #[test]
    fn test_empty_table_emits_nothing() {
        let node = table("<table></table>");
        assert_eq!(convert_table(&node, &ConversionOptions::default(), Context::default()), "");
    }

    #[test]
    fn test_table_without_rows_renders_children() {
        let node = table("<table>Loose<br>text</table>");
        assert_eq!(
            convert_table(&node, &ConversionOptions::default(), Context::default()),
            "Loose<br>text\n\n"
        );
    }
}
