use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use freight_core::{format_decimal, Cell, OutputRow, Record};

use crate::TableError;

pub const TEMPLATE_FILENAME: &str = "modelo_cotacao_massa.xlsx";

/// Input rows in sheet order, each keyed by the header row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputTable {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl InputTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn from_rows(mut rows: impl Iterator<Item = Vec<String>>) -> Result<Self, TableError> {
        let columns: Vec<String> = rows
            .next()
            .ok_or(TableError::MissingHeader)?
            .into_iter()
            .map(|c| c.trim().to_string())
            .collect();
        if columns.iter().all(String::is_empty) {
            return Err(TableError::MissingHeader);
        }

        let records = rows
            .filter(|cells| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|cells| {
                let mut record = Record::new();
                for (index, column) in columns.iter().enumerate() {
                    if column.is_empty() {
                        continue;
                    }
                    let value = cells.get(index).cloned().unwrap_or_default();
                    record.push(column.clone(), value);
                }
                record
            })
            .collect();
        Ok(Self { columns, records })
    }
}

/// Reads an uploaded table, choosing the decoder from the file extension.
pub fn read_table(source_name: &str, bytes: &[u8]) -> Result<InputTable, TableError> {
    let extension = Path::new(source_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" | "xlsm" => read_xlsx(bytes),
        "csv" => read_csv(bytes),
        _ => Err(TableError::UnsupportedFormat(extension)),
    }
}

fn read_csv(bytes: &[u8]) -> Result<InputTable, TableError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    InputTable::from_rows(rows.into_iter())
}

fn read_xlsx(bytes: &[u8]) -> Result<InputTable, TableError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(TableError::NoWorksheet)??;
    InputTable::from_rows(range.rows().map(|row| row.iter().map(cell_text).collect()))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::Float(value) => format_decimal(*value),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        other => other.to_string(),
    }
}

/// Serializes result rows into a single-sheet workbook.
///
/// Columns are the union of every row's columns in first-appearance order;
/// a row lacking a column leaves that cell blank.
pub fn write_workbook(rows: &[OutputRow]) -> Result<Vec<u8>, TableError> {
    let mut columns: Vec<&str> = Vec::new();
    let mut positions: HashMap<&str, u16> = HashMap::new();
    for row in rows {
        for column in row.columns() {
            if !positions.contains_key(column) {
                positions.insert(column, columns.len() as u16);
                columns.push(column);
            }
        }
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (index, column) in columns.iter().enumerate() {
        sheet.write_string(0, index as u16, *column)?;
    }
    for (index, row) in rows.iter().enumerate() {
        let line = index as u32 + 1;
        for (column, cell) in row.cells() {
            let Some(&position) = positions.get(column.as_str()) else {
                continue;
            };
            match cell {
                Cell::Text(text) if text.is_empty() => {}
                Cell::Text(text) => {
                    sheet.write_string(line, position, text.as_str())?;
                }
                Cell::Number(value) => {
                    sheet.write_number(line, position, *value)?;
                }
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

/// Blank input spreadsheet with one example row, matching what `read_table` expects.
pub fn template_workbook() -> Result<Vec<u8>, TableError> {
    let example: [(&str, Cell); 17] = [
        ("id_contrato_transportadora_segmento", Cell::Number(1.0)),
        ("cnpj_origem", Cell::text("48.566.347/0001-22")),
        ("cep_origem", Cell::text("88504-357")),
        ("estado_origem", Cell::text("SC")),
        ("cidade_origem", Cell::text("Lages")),
        ("cnpj_destino", Cell::text("11.417.744/0001-22")),
        ("cep_destino", Cell::text("89660-000")),
        ("estado_destino", Cell::text("SC")),
        ("cidade_destino", Cell::text("LACERDOPOLIS")),
        ("descricao", Cell::text("Produto 1")),
        ("quantidade", Cell::Number(1.0)),
        ("peso", Cell::Number(20.5)),
        ("altura", Cell::Number(0.3)),
        ("largura", Cell::Number(0.4)),
        ("profundidade", Cell::Number(0.5)),
        ("valor", Cell::Number(500.0)),
        ("observacao", Cell::text("Embalagem frágil")),
    ];
    let mut row = OutputRow::default();
    for (column, cell) in example {
        row.set(column, cell);
    }
    write_workbook(&[row])
}
