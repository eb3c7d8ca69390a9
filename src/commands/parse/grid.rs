use crate::document::{Cell, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPair<'a> {
    pub top: &'a Cell,
    pub bottom: Option<&'a Cell>,
    pub position: u32,
}

pub fn cell_pairs(table: &Table) -> impl Iterator<Item = CellPair<'_>> + '_ {
    let row_count = table.row_count();
    let data_columns = table.column_count.div_ceil(2);

    (0..table.column_count)
        .step_by(2)
        .enumerate()
        .flat_map(move |(data_column, column)| {
            (0..row_count).step_by(2).filter_map(move |row| {
                let top = table.cell(row, column)?;
                let position = data_column + 1 + (row / 2) * data_columns;
                Some(CellPair {
                    top,
                    bottom: table.cell(row + 1, column),
                    position: u32::try_from(position).unwrap_or(u32::MAX),
                })
            })
        })
}
