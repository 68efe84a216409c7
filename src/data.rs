use std::fmt;

use serde::Serialize;

use crate::error::EtlError;

/// Cell spellings read as "no value" in addition to the empty string.
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// A single table cell; `None` is the missing value.
pub type Cell = Option<Value>;

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Float => "REAL",
            ColumnKind::Text => "TEXT",
        }
    }
}

pub fn is_missing_marker(raw: &str) -> bool {
    raw.is_empty() || MISSING_MARKERS.contains(&raw)
}

/// Picks the narrowest kind that every present raw value of a column parses as.
pub fn infer_column_kind<'a, I>(values: I) -> ColumnKind
where
    I: IntoIterator<Item = &'a str>,
{
    let mut kind = ColumnKind::Integer;
    let mut seen = false;
    for raw in values.into_iter().filter(|raw| !is_missing_marker(raw)) {
        seen = true;
        let trimmed = raw.trim();
        match kind {
            ColumnKind::Integer if trimmed.parse::<i64>().is_ok() => {}
            ColumnKind::Integer | ColumnKind::Float if trimmed.parse::<f64>().is_ok() => {
                kind = ColumnKind::Float;
            }
            _ => return ColumnKind::Text,
        }
    }
    if seen { kind } else { ColumnKind::Text }
}

pub fn parse_cell(raw: &str, kind: ColumnKind) -> Cell {
    if is_missing_marker(raw) {
        return None;
    }
    let value = match kind {
        ColumnKind::Integer => raw
            .trim()
            .parse()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(raw.to_string())),
        ColumnKind::Float => raw
            .trim()
            .parse()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::Text(raw.to_string())),
        ColumnKind::Text => Value::Text(raw.to_string()),
    };
    Some(value)
}

/// Ordered rows sharing one named column schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding short rows with missing cells and dropping surplus cells.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
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

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == column)
    }

    pub fn require_column(&self, column: &str) -> Result<usize, EtlError> {
        self.column_index(column).ok_or_else(|| {
            EtlError::transform(&self.name, format!("column '{column}' not found"))
        })
    }

    pub fn require_columns(&self, columns: &[&str]) -> Result<(), EtlError> {
        let missing = columns
            .iter()
            .filter(|column| self.column_index(column).is_none())
            .copied()
            .collect::<Vec<_>>();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(EtlError::transform(
                &self.name,
                format!("missing required column(s): {}", missing.join(", ")),
            ))
        }
    }

    pub fn column(&self, column: &str) -> Result<impl Iterator<Item = &Cell> + '_, EtlError> {
        let idx = self.require_column(column)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn missing_count(&self, column: &str) -> Result<usize, EtlError> {
        Ok(self.column(column)?.filter(|cell| cell.is_none()).count())
    }

    /// Replaces every cell of `column` with the result of `f`.
    pub fn map_column<F>(mut self, column: &str, mut f: F) -> Result<Self, EtlError>
    where
        F: FnMut(Cell) -> Cell,
    {
        let idx = self.require_column(column)?;
        for row in &mut self.rows {
            let cell = row[idx].take();
            row[idx] = f(cell);
        }
        Ok(self)
    }

    /// Trims and lower-cases every header.
    pub fn normalize_headers(mut self) -> Result<Self, EtlError> {
        let normalized = self
            .headers
            .iter()
            .map(|header| header.trim().to_lowercase())
            .collect::<Vec<_>>();
        for (idx, header) in normalized.iter().enumerate() {
            if normalized[..idx].contains(header) {
                return Err(EtlError::transform(
                    &self.name,
                    format!("duplicate column '{header}' after header normalization"),
                ));
            }
        }
        self.headers = normalized;
        Ok(self)
    }

    /// Narrowest kind covering the present cells of a column.
    pub fn column_kind(&self, idx: usize) -> ColumnKind {
        let mut kind = None;
        for value in self.rows.iter().filter_map(|row| row[idx].as_ref()) {
            kind = match (kind, value) {
                (_, Value::Text(_)) => return ColumnKind::Text,
                (None | Some(ColumnKind::Integer), Value::Integer(_)) => Some(ColumnKind::Integer),
                _ => Some(ColumnKind::Float),
            };
        }
        kind.unwrap_or(ColumnKind::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new("sample", vec![" Name ".to_string(), "PRICE".to_string()]);
        table.push_row(vec![Some(Value::Text("a".into())), Some(Value::Integer(1))]);
        table.push_row(vec![Some(Value::Text("b".into()))]);
        table
    }

    #[test]
    fn infer_column_kind_widens_to_text() {
        assert_eq!(infer_column_kind(["1", " 2 ", ""]), ColumnKind::Integer);
        assert_eq!(infer_column_kind(["1", "2.5"]), ColumnKind::Float);
        assert_eq!(infer_column_kind(["1", "abc", "2.5"]), ColumnKind::Text);
        assert_eq!(infer_column_kind(["", "NA"]), ColumnKind::Text);
    }

    #[test]
    fn parse_cell_treats_markers_as_missing() {
        assert_eq!(parse_cell("", ColumnKind::Integer), None);
        assert_eq!(parse_cell("NULL", ColumnKind::Text), None);
        assert_eq!(parse_cell("7", ColumnKind::Integer), Some(Value::Integer(7)));
        assert_eq!(
            parse_cell(" phone ", ColumnKind::Text),
            Some(Value::Text(" phone ".into()))
        );
    }

    #[test]
    fn push_row_pads_short_rows() {
        let table = sample();
        assert_eq!(table.rows()[1], vec![Some(Value::Text("b".into())), None]);
        assert_eq!(table.missing_count("PRICE").unwrap(), 1);
    }

    #[test]
    fn normalize_headers_trims_and_lowercases() {
        let table = sample().normalize_headers().unwrap();
        assert_eq!(table.headers(), ["name", "price"]);
    }

    #[test]
    fn normalize_headers_rejects_collisions() {
        let table = Table::new("dup", vec!["Name".to_string(), " name".to_string()]);
        assert!(matches!(
            table.normalize_headers(),
            Err(EtlError::Transform { .. })
        ));
    }

    #[test]
    fn column_kind_reflects_present_cells() {
        let table = sample();
        assert_eq!(table.column_kind(0), ColumnKind::Text);
        assert_eq!(table.column_kind(1), ColumnKind::Integer);
    }

    #[test]
    fn float_display_keeps_decimal_point() {
        assert_eq!(Value::Float(100.0).as_display(), "100.0");
        assert_eq!(Value::Float(12.5).as_display(), "12.5");
    }
}
