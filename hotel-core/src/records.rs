/// How a SQL NULL is represented once a cell is turned into text
pub const NULL_CELL: &str = "null";

/// The rows of a result, every cell in its text form.
///
/// Columns are only known once a row has been seen, so an empty result
/// has neither columns nor rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: vec![],
        }
    }

    /// Builds a result from borrowed cells
    pub fn from_parts(columns: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first column of the first row, the usual shape of a scalar lookup
    pub fn first_cell(&self) -> Option<&str> {
        self.rows.first().and_then(|r| r.first()).map(String::as_str)
    }

    /// Keeps only the rows matching the predicate
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[String]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Renders a tab separated table. The header is emitted once, and only
    /// if there is at least one row.
    pub fn render_lines(&self) -> Vec<String> {
        if self.rows.is_empty() {
            return vec![];
        }

        std::iter::once(self.columns.join("\t"))
            .chain(self.rows.iter().map(|row| row.join("\t")))
            .collect()
    }
}
