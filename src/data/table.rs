//! Tabular data returned by the historical provider.
//!
//! A [`Table`] has named, ordered columns and typed cells. Reshaping to
//! JSON is a direct row walk: each row becomes a flat record whose field
//! order follows the column order.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// A flat JSON record (column name → cell), in column order.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Infer a cell from scraped text. Thousands separators are ignored
    /// for numbers; blank text is `Empty`.
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() {
            return Cell::Empty;
        }
        let numeric = text.replace(',', "");
        if let Ok(i) = numeric.parse::<i64>() {
            return Cell::Int(i);
        }
        if let Ok(f) = numeric.parse::<f64>() {
            if f.is_finite() {
                return Cell::Float(f);
            }
        }
        Cell::Text(text.to_string())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text view used for name matching; numbers are rendered as-is.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Cell::Empty => Value::Null,
            Cell::Int(i) => Value::from(*i),
            Cell::Float(f) => Value::from(*f),
            Cell::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

/// Case-insensitive substring containment.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (`row`, `column`), if both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Append rows of `other`, aligning by column name. Columns only
    /// `other` has are added at the end.
    pub fn append(&mut self, other: Table) {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return;
        }
        for col in &other.columns {
            if !self.has_column(col) {
                self.columns.push(col.clone());
                for row in &mut self.rows {
                    row.push(Cell::Empty);
                }
            }
        }
        let mapping: Vec<usize> = other
            .columns
            .iter()
            .filter_map(|c| self.column_index(c))
            .collect();
        for row in other.rows {
            let mut aligned = vec![Cell::Empty; self.columns.len()];
            for (cell, target) in row.into_iter().zip(&mapping) {
                aligned[*target] = cell;
            }
            self.rows.push(aligned);
        }
    }

    /// Insert a column at `index` holding the same value in every row.
    pub fn insert_constant_column(&mut self, index: usize, name: &str, value: Cell) {
        let index = index.min(self.columns.len());
        self.columns.insert(index, name.to_string());
        for row in &mut self.rows {
            row.insert(index, value.clone());
        }
    }

    /// Rows matching `predicate`, keeping the column layout.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Table
    where
        F: FnMut(&Table, usize) -> bool,
    {
        let rows = (0..self.rows.len())
            .filter(|i| predicate(self, *i))
            .map(|i| self.rows[i].clone())
            .collect();
        Table { columns: self.columns.clone(), rows }
    }

    /// Rows whose `column` contains `query`, ignoring case. A missing
    /// column matches nothing.
    pub fn filter_contains(&self, column: &str, query: &str) -> Table {
        let Some(col) = self.column_index(column) else {
            return Table::new(self.columns.clone());
        };
        self.filter_rows(|t, i| contains_ignore_case(&t.rows[i][col].text(), query))
    }

    /// The `n` rows with the largest numeric value in `column`, highest
    /// first. Rows without a number in that column are dropped; ties keep
    /// their original order.
    pub fn top_n_by(&self, column: &str, n: usize) -> Option<Table> {
        let col = self.column_index(column)?;
        let mut ranked: Vec<(f64, &Vec<Cell>)> = self
            .rows
            .iter()
            .filter_map(|r| r[col].as_f64().map(|v| (v, r)))
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        let rows = ranked.into_iter().take(n).map(|(_, r)| r.clone()).collect();
        Some(Table { columns: self.columns.clone(), rows })
    }

    pub fn to_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(name, cell)| (name.clone(), cell.to_json()))
                    .collect()
            })
            .collect()
    }
}
