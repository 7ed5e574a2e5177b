pub mod io;

/// In-memory CSV table: ordered headers, ordered rows, every cell raw text.
///
/// Empty string is a valid cell value and is never promoted to a null marker.
/// The reader guarantees every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Copy column `src` verbatim into a column named `new_name`, overwriting
    /// it if it already exists, otherwise appending it. Returns the index of
    /// the destination column.
    pub fn duplicate_column(&mut self, src: usize, new_name: &str) -> usize {
        if let Some(dst) = self.column_index(new_name) {
            for row in &mut self.rows {
                row[dst] = row[src].clone();
            }
            dst
        } else {
            self.headers.push(new_name.to_string());
            for row in &mut self.rows {
                let value = row[src].clone();
                row.push(value);
            }
            self.headers.len() - 1
        }
    }

    /// Apply a pure transform to every cell of one column.
    pub fn apply_to_column<F>(&mut self, idx: usize, f: F)
    where
        F: Fn(&str) -> String,
    {
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
    }

    /// Apply a pure transform to every cell of every column.
    pub fn apply_to_all<F>(&mut self, f: F)
    where
        F: Fn(&str) -> String,
    {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                *cell = f(cell);
            }
        }
    }

    /// Drop rows failing the predicate; surviving rows are untouched.
    /// Returns the number of rows removed.
    pub fn retain_rows<F>(&mut self, pred: F) -> usize
    where
        F: Fn(&[String]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| pred(row));
        before - self.rows.len()
    }
}
