//! Table structures for grid-table layout.

use crate::error::{Error, Result};

/// A table as authored: rows of cells with span counts.
///
/// Rows may under-specify columns because spanned cells from earlier rows
/// are not repeated; [`Table::expand`] reconstructs the full grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Table rows
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Creates a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the nominal column count: the span sum of the first row.
    pub fn column_count(&self) -> usize {
        self.rows
            .first()
            .map(|r| r.cells.iter().map(|c| c.h_span).sum())
            .unwrap_or(0)
    }

    /// Expands the table into a rectangular grid.
    ///
    /// Every position of the footprint of a spanned cell other than its
    /// top-left origin is filled with a covered cell. Covered cells to the
    /// right of the origin lose their left wall, covered cells below it lose
    /// their top wall.
    pub fn expand(&self) -> Result<Grid> {
        let num_columns = self.column_count();
        let num_rows = self.rows.len();
        let mut slots: Vec<Vec<Option<TableCell>>> = vec![vec![None; num_columns]; num_rows];

        for (row_index, row) in self.rows.iter().enumerate() {
            let mut column_index = 0;

            for cell in &row.cells {
                while column_index < num_columns && slots[row_index][column_index].is_some() {
                    column_index += 1;
                }

                if cell.h_span == 0 || cell.v_span == 0 {
                    return Err(Error::MalformedTable(format!(
                        "cell at row {} has a zero span",
                        row_index
                    )));
                }
                if column_index + cell.h_span > num_columns {
                    return Err(Error::MalformedTable(format!(
                        "row {} needs {} columns but the table has {}",
                        row_index,
                        column_index + cell.h_span,
                        num_columns
                    )));
                }
                if row_index + cell.v_span > num_rows {
                    return Err(Error::MalformedTable(format!(
                        "cell at row {}, column {} spans {} rows but only {} remain",
                        row_index,
                        column_index,
                        cell.v_span,
                        num_rows - row_index
                    )));
                }

                for extra_row in 0..cell.v_span {
                    for extra_column in 0..cell.h_span {
                        let slot = &mut slots[row_index + extra_row][column_index + extra_column];
                        if slot.is_some() {
                            return Err(Error::MalformedTable(format!(
                                "overlapping spans at row {}, column {}",
                                row_index + extra_row,
                                column_index + extra_column
                            )));
                        }

                        *slot = Some(if extra_row == 0 && extra_column == 0 {
                            cell.clone()
                        } else {
                            TableCell::placeholder(extra_row == 0, extra_column == 0)
                        });
                    }
                }

                column_index += cell.h_span;
            }
        }

        let mut rows = Vec::with_capacity(num_rows);
        for (row_index, (row, cells)) in self.rows.iter().zip(slots).enumerate() {
            let cells = cells
                .into_iter()
                .enumerate()
                .map(|(column_index, slot)| {
                    slot.ok_or_else(|| {
                        Error::MalformedTable(format!(
                            "row {} leaves column {} empty",
                            row_index, column_index
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            rows.push(TableRow {
                cells,
                is_header: row.is_header,
            });
        }

        Ok(Grid {
            rows,
            num_columns,
        })
    }
}

/// A row in a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    /// Cells in this row
    pub cells: Vec<TableCell>,
    /// Whether this row came from a header-rows block
    pub is_header: bool,
}

impl TableRow {
    /// Creates a new empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a header row.
    pub fn header() -> Self {
        Self {
            cells: Vec::new(),
            is_header: true,
        }
    }

    /// Appends a cell and returns self.
    pub fn with_cell(mut self, cell: TableCell) -> Self {
        self.cells.push(cell);
        self
    }
}

/// A cell in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    /// Number of columns this cell spans (default: 1)
    pub h_span: usize,
    /// Number of rows this cell spans (default: 1)
    pub v_span: usize,
    /// Escaped single-line text
    pub text: String,
    /// True for placeholders synthesized by grid expansion
    pub covered: bool,
    /// Whether a border segment is drawn above this cell
    pub top_wall: bool,
    /// Whether a border segment is drawn left of this cell
    pub left_wall: bool,
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            h_span: 1,
            v_span: 1,
            text: String::new(),
            covered: false,
            top_wall: true,
            left_wall: true,
        }
    }
}

impl TableCell {
    /// Creates a cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Creates a cell spanning rows and columns.
    pub fn merged(text: impl Into<String>, h_span: usize, v_span: usize) -> Self {
        Self {
            h_span,
            v_span,
            text: text.into(),
            ..Default::default()
        }
    }

    fn placeholder(top_wall: bool, left_wall: bool) -> Self {
        Self {
            covered: true,
            top_wall,
            left_wall,
            ..Default::default()
        }
    }

    /// Returns the display width of the text in characters.
    pub fn text_width(&self) -> usize {
        self.text.chars().count()
    }
}

/// A rectangular table grid produced by [`Table::expand`].
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Rows, each holding exactly `num_columns` cells
    pub rows: Vec<TableRow>,
    /// Column count shared by every row
    pub num_columns: usize,
}

impl Grid {
    /// Iterates origin cells with their row and column positions.
    pub fn origins(&self) -> impl Iterator<Item = (usize, usize, &TableCell)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| !cell.covered)
                .map(move |(c, cell)| (r, c, cell))
        })
    }
}

/// Escapes the characters that are structural in a grid table.
pub fn escape_cell_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        if matches!(ch, '+' | '-' | '|') {
            result.push('\\');
        }
        result.push(ch);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: Vec<TableCell>) -> TableRow {
        TableRow {
            cells,
            is_header: false,
        }
    }

    #[test]
    fn test_expand_plain_grid() {
        let table = Table {
            rows: vec![
                row(vec![TableCell::text("a"), TableCell::text("bb")]),
                row(vec![TableCell::text("ccc"), TableCell::text("d")]),
            ],
        };

        let grid = table.expand().unwrap();
        assert_eq!(grid.num_columns, 2);
        assert!(grid.rows.iter().all(|r| r.cells.len() == 2));
        assert!(grid.rows.iter().flat_map(|r| &r.cells).all(|c| !c.covered));
    }

    #[test]
    fn test_expand_horizontal_span() {
        let table = Table {
            rows: vec![
                row(vec![TableCell::merged("wide", 2, 1), TableCell::text("x")]),
                row(vec![
                    TableCell::text("a"),
                    TableCell::text("b"),
                    TableCell::text("c"),
                ]),
            ],
        };

        let grid = table.expand().unwrap();
        let covered = &grid.rows[0].cells[1];
        assert!(covered.covered);
        assert!(covered.text.is_empty());
        assert!(covered.top_wall);
        assert!(!covered.left_wall);
        assert_eq!(grid.rows[0].cells[2].text, "x");
    }

    #[test]
    fn test_expand_vertical_span_shifts_next_cells() {
        let table = Table {
            rows: vec![
                row(vec![TableCell::merged("tall", 1, 2), TableCell::text("b")]),
                row(vec![TableCell::text("d")]),
            ],
        };

        let grid = table.expand().unwrap();
        let covered = &grid.rows[1].cells[0];
        assert!(covered.covered);
        assert!(!covered.top_wall);
        assert!(covered.left_wall);
        assert_eq!(grid.rows[1].cells[1].text, "d");
    }

    #[test]
    fn test_expand_block_span_walls_per_axis() {
        let table = Table {
            rows: vec![
                row(vec![TableCell::merged("big", 2, 2), TableCell::text("c")]),
                row(vec![TableCell::text("f")]),
            ],
        };

        let grid = table.expand().unwrap();
        let right = &grid.rows[0].cells[1];
        let below = &grid.rows[1].cells[0];
        let diagonal = &grid.rows[1].cells[1];

        assert!(right.top_wall && !right.left_wall);
        assert!(!below.top_wall && below.left_wall);
        assert!(!diagonal.top_wall && !diagonal.left_wall);
        assert_eq!(grid.rows[1].cells[2].text, "f");
    }

    #[test]
    fn test_expand_rejects_span_past_last_row() {
        let table = Table {
            rows: vec![row(vec![TableCell::merged("tall", 1, 3)])],
        };

        assert!(matches!(table.expand(), Err(Error::MalformedTable(_))));
    }

    #[test]
    fn test_expand_rejects_short_row() {
        let table = Table {
            rows: vec![
                row(vec![TableCell::text("a"), TableCell::text("b")]),
                row(vec![TableCell::text("c")]),
            ],
        };

        assert!(matches!(table.expand(), Err(Error::MalformedTable(_))));
    }

    #[test]
    fn test_expand_rejects_too_many_columns() {
        let table = Table {
            rows: vec![
                row(vec![TableCell::text("a")]),
                row(vec![TableCell::text("b"), TableCell::text("c")]),
            ],
        };

        assert!(matches!(table.expand(), Err(Error::MalformedTable(_))));
    }

    #[test]
    fn test_expand_keeps_header_flag() {
        let mut header = TableRow::header();
        header.cells.push(TableCell::text("h"));
        let table = Table {
            rows: vec![header, row(vec![TableCell::text("b")])],
        };

        let grid = table.expand().unwrap();
        assert!(grid.rows[0].is_header);
        assert!(!grid.rows[1].is_header);
    }

    #[test]
    fn test_escape_cell_text() {
        assert_eq!(escape_cell_text("a+b-c|d"), "a\\+b\\-c\\|d");
        assert_eq!(escape_cell_text("plain"), "plain");
    }

    #[test]
    fn test_origins_skip_covered() {
        let table = Table {
            rows: vec![row(vec![TableCell::merged("w", 2, 1)])],
        };
        let grid = table.expand().unwrap();
        let origins: Vec<_> = grid.origins().collect();
        assert_eq!(origins.len(), 1);
        assert_eq!(origins[0].2.text, "w");
    }
}
