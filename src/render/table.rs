//! Grid-table layout: column widths and border drawing.

use crate::error::Result;
use crate::model::{Grid, Table};

/// Computes column widths so every origin cell fits its text plus one space
/// of padding on each side.
///
/// A cell spanning `n` columns has `n - 1` separator characters of extra room.
/// When a cell does not fit, every column it spans grows by the deficit
/// divided by `n`, rounded up. Widths never shrink, so running the pass again
/// over the same grid changes nothing.
pub fn column_widths(grid: &Grid) -> Vec<usize> {
    grow_column_widths(grid, Vec::new())
}

/// Grows `widths` until every origin cell of `grid` fits.
pub fn grow_column_widths(grid: &Grid, mut widths: Vec<usize>) -> Vec<usize> {
    for (_, column, cell) in grid.origins() {
        let end = column + cell.h_span;
        if widths.len() < end {
            widths.resize(end, 0);
        }

        let available: usize = widths[column..end].iter().sum::<usize>() + cell.h_span - 1;
        let required = cell.text_width() + 2;

        if required > available {
            let addition = (required - available).div_ceil(cell.h_span);
            for width in &mut widths[column..end] {
                *width += addition;
            }
        }
    }

    widths
}

/// Renders an expanded grid as grid-table lines, each terminated by `\n`.
///
/// The closing border repeats the first row's top border.
pub fn render_grid(grid: &Grid, widths: &[usize]) -> String {
    let mut output = String::new();
    let mut bottom = String::new();
    let mut previous_header = false;

    for (row_index, row) in grid.rows.iter().enumerate() {
        let mut top = String::new();
        let mut body = String::new();
        let rule = if previous_header { '=' } else { '-' };
        let mut column = 0;

        while column < row.cells.len() {
            let cell = &row.cells[column];

            if cell.covered {
                let cross = if cell.top_wall || cell.left_wall { '+' } else { ' ' };
                let fill = if cell.top_wall { rule } else { ' ' };
                let wall = if cell.left_wall { '|' } else { ' ' };

                top.push(cross);
                push_repeated(&mut top, fill, widths[column]);
                body.push(wall);
                push_repeated(&mut body, ' ', widths[column]);

                column += 1;
                continue;
            }

            let end = column + cell.h_span;
            for (covered, width) in row.cells[column..end].iter().zip(&widths[column..end]) {
                top.push('+');
                push_repeated(&mut top, if covered.top_wall { rule } else { ' ' }, *width);
            }

            let span_width: usize = widths[column..end].iter().sum::<usize>() + cell.h_span - 1;
            body.push_str("| ");
            body.push_str(&cell.text);
            push_repeated(&mut body, ' ', span_width.saturating_sub(cell.text_width() + 2));
            body.push(' ');

            column = end;
        }

        top.push_str("+\n");
        body.push_str("|\n");

        if row_index == 0 {
            bottom = top.clone();
        }

        output.push_str(&top);
        output.push_str(&body);

        previous_header = row.is_header;
    }

    output.push_str(&bottom);
    output
}

/// Expands, sizes and renders a table.
pub fn render_table(table: &Table) -> Result<String> {
    let grid = table.expand()?;
    let widths = column_widths(&grid);
    Ok(render_grid(&grid, &widths))
}

fn push_repeated(output: &mut String, ch: char, count: usize) {
    output.extend(std::iter::repeat(ch).take(count));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{TableCell, TableRow};

    fn row(cells: Vec<TableCell>) -> TableRow {
        TableRow {
            cells,
            is_header: false,
        }
    }

    fn simple_table() -> Table {
        Table {
            rows: vec![
                row(vec![TableCell::text("a"), TableCell::text("bb")]),
                row(vec![TableCell::text("ccc"), TableCell::text("d")]),
            ],
        }
    }

    #[test]
    fn test_widths_fit_widest_cell() {
        let grid = simple_table().expand().unwrap();
        assert_eq!(column_widths(&grid), vec![5, 4]);
    }

    #[test]
    fn test_span_deficit_grows_every_column() {
        let table = Table {
            rows: vec![
                row(vec![TableCell::text("a"), TableCell::text("b")]),
                row(vec![TableCell::merged("long text", 2, 1)]),
            ],
        };
        let grid = table.expand().unwrap();

        // 3 + 3 + 1 available, 11 required: each column grows by ceil(4 / 2)
        assert_eq!(column_widths(&grid), vec![5, 5]);
    }

    #[test]
    fn test_widths_idempotent() {
        let table = Table {
            rows: vec![
                row(vec![TableCell::text("x"), TableCell::text("yy"), TableCell::text("z")]),
                row(vec![TableCell::merged("spanning cell", 3, 1)]),
                row(vec![TableCell::merged("middle", 2, 1), TableCell::text("q")]),
            ],
        };
        let grid = table.expand().unwrap();
        let widths = column_widths(&grid);

        assert_eq!(grow_column_widths(&grid, widths.clone()), widths);
    }

    #[test]
    fn test_widths_sufficient_for_every_origin() {
        let table = Table {
            rows: vec![
                row(vec![
                    TableCell::merged("header over two", 2, 1),
                    TableCell::merged("tall", 1, 2),
                ]),
                row(vec![TableCell::text("α"), TableCell::text("longer one")]),
            ],
        };
        let grid = table.expand().unwrap();
        let widths = column_widths(&grid);

        for (_, column, cell) in grid.origins() {
            let room: usize = widths[column..column + cell.h_span].iter().sum::<usize>()
                + cell.h_span
                - 1;
            assert!(cell.text_width() + 2 <= room, "{:?} does not fit", cell.text);
        }
    }

    #[test]
    fn test_render_simple_table() {
        let output = render_table(&simple_table()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines,
            vec![
                "+-----+----+",
                "| a   | bb |",
                "+-----+----+",
                "| ccc | d  |",
                "+-----+----+",
            ]
        );
    }

    #[test]
    fn test_render_header_separator() {
        let mut table = simple_table();
        table.rows[0].is_header = true;
        let output = render_table(&table).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[2], "+=====+====+");
        assert_eq!(lines[0], "+-----+----+");
        assert_eq!(lines[4], lines[0]);
    }

    #[test]
    fn test_render_horizontal_merge() {
        let table = Table {
            rows: vec![
                row(vec![TableCell::merged("wide", 2, 1)]),
                row(vec![TableCell::text("a"), TableCell::text("b")]),
            ],
        };
        let output = render_table(&table).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines,
            vec![
                "+---+---+",
                "| wide  |",
                "+---+---+",
                "| a | b |",
                "+---+---+",
            ]
        );
    }

    #[test]
    fn test_render_vertical_merge() {
        let table = Table {
            rows: vec![
                row(vec![TableCell::merged("tall", 1, 2), TableCell::text("b")]),
                row(vec![TableCell::text("c")]),
            ],
        };
        let output = render_table(&table).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines,
            vec![
                "+------+---+",
                "| tall | b |",
                "+      +---+",
                "|      | c |",
                "+------+---+",
            ]
        );
    }

    #[test]
    fn test_render_block_merge_has_no_interior_cross() {
        let table = Table {
            rows: vec![
                row(vec![TableCell::merged("block", 2, 2), TableCell::text("c")]),
                row(vec![TableCell::text("f")]),
            ],
        };
        let output = render_table(&table).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        // "block" needs 7 with 1 available: each column grows by ceil(6 / 2)
        assert_eq!(lines[0], "+---+---+---+");
        assert_eq!(lines[1], "| block | c |");
        assert_eq!(lines[2], "+       +---+");
        assert_eq!(lines[3], "|       | f |");
        assert_eq!(lines[4], lines[0]);
    }

    #[test]
    fn test_every_line_terminated() {
        let output = render_table(&simple_table()).unwrap();
        for line in output.lines() {
            assert!(line.ends_with('+') || line.ends_with('|'));
        }
        assert_eq!(output.lines().count(), 5);
    }

    #[test]
    fn test_malformed_table_propagates() {
        let table = Table {
            rows: vec![row(vec![TableCell::merged("x", 1, 2)])],
        };
        assert!(matches!(
            render_table(&table),
            Err(Error::MalformedTable(_))
        ));
    }
}
