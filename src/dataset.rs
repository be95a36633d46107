//! Loading scraped place tables and writing filtered results.

use calamine::{open_workbook_auto, Data, Reader};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::constants::*;
use crate::error::{PrepError, Result};
use crate::observability::metrics;
use crate::types::{FieldValue, FilteredRecord, PlaceRecord};

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Which input headers hold the place name and address
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    pub name: String,
    pub address: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            name: NAME_COLUMN.to_string(),
            address: ADDRESS_COLUMN.to_string(),
        }
    }
}

impl From<&PipelineConfig> for ColumnMap {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            name: config.name_column.clone(),
            address: config.address_column.clone(),
        }
    }
}

/// A loaded table: the header row as read plus one record per data row
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub records: Vec<PlaceRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Input headers followed by whichever of lat, lon and geometry the input
    /// did not already have.
    pub fn output_headers(&self) -> Vec<String> {
        let mut headers = self.headers.clone();
        for column in [LAT_COLUMN, LON_COLUMN, GEOMETRY_COLUMN] {
            if !headers.iter().any(|h| h == column) {
                headers.push(column.to_string());
            }
        }
        headers
    }
}

struct Cell {
    text: String,
    value: FieldValue,
}

impl Cell {
    fn from_csv(raw: &str) -> Self {
        Self {
            text: raw.to_string(),
            value: FieldValue::from_cell(raw),
        }
    }

    fn from_spreadsheet(data: &Data) -> Self {
        match data {
            Data::Empty => Self {
                text: String::new(),
                value: FieldValue::Missing,
            },
            Data::Float(f) => Self {
                text: f.to_string(),
                value: FieldValue::Number(*f),
            },
            Data::Int(i) => Self {
                text: i.to_string(),
                value: FieldValue::Number(*i as f64),
            },
            Data::String(s) => Self::from_csv(s),
            other => {
                let text = other.to_string();
                Self {
                    value: FieldValue::Text(text.clone()),
                    text,
                }
            }
        }
    }

    fn into_text(self) -> Option<String> {
        if self.text.trim().is_empty() {
            None
        } else {
            Some(self.text)
        }
    }
}

struct HeaderIndex {
    name: usize,
    address: usize,
    place_type: Option<usize>,
    comment: Option<usize>,
    rating: Option<usize>,
    count: Option<usize>,
    extra: Vec<(usize, String)>,
}

impl HeaderIndex {
    fn new(headers: &[String], columns: &ColumnMap) -> Result<Self> {
        let position = |column: &str| headers.iter().position(|h| h == column);

        let name = position(columns.name.as_str())
            .ok_or_else(|| PrepError::MissingColumn(columns.name.clone()))?;
        let address = position(columns.address.as_str())
            .ok_or_else(|| PrepError::MissingColumn(columns.address.clone()))?;

        let known = [
            columns.name.as_str(),
            columns.address.as_str(),
            TYPE_COLUMN,
            COMMENT_COLUMN,
            RATING_COLUMN,
            COUNT_COLUMN,
            LAT_COLUMN,
            LON_COLUMN,
            GEOMETRY_COLUMN,
        ];
        let extra = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !known.contains(&h.as_str()))
            .map(|(i, h)| (i, h.clone()))
            .collect();

        Ok(Self {
            name,
            address,
            place_type: position(TYPE_COLUMN),
            comment: position(COMMENT_COLUMN),
            rating: position(RATING_COLUMN),
            count: position(COUNT_COLUMN),
            extra,
        })
    }

    fn record(&self, mut cells: Vec<Option<Cell>>) -> PlaceRecord {
        let mut take = |index: Option<usize>| {
            index.and_then(|i| cells.get_mut(i).and_then(Option::take))
        };

        let name = take(Some(self.name)).and_then(Cell::into_text).unwrap_or_default();
        let address = take(Some(self.address)).and_then(Cell::into_text);
        let place_type = take(self.place_type).and_then(Cell::into_text);
        let comment = take(self.comment).and_then(Cell::into_text);
        let rating = take(self.rating).map(|c| c.value).unwrap_or_default();
        let count = take(self.count).map(|c| c.value).unwrap_or_default();

        let mut extra = BTreeMap::new();
        for (i, header) in &self.extra {
            let text = take(Some(*i)).map(|c| c.text).unwrap_or_default();
            extra.insert(header.clone(), text);
        }

        PlaceRecord {
            name,
            address,
            place_type,
            comment,
            rating,
            count,
            extra,
        }
    }
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SPREADSHEET_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Load a CSV (UTF-8) or spreadsheet (first sheet) into a [`Dataset`].
pub fn load_dataset(path: impl AsRef<Path>, columns: &ColumnMap) -> Result<Dataset> {
    let path = path.as_ref();
    let dataset = if is_spreadsheet(path) {
        load_spreadsheet(path, columns)?
    } else {
        load_csv(path, columns)?
    };
    info!("Loaded {} rows from {}", dataset.len(), path.display());
    metrics::load::rows_loaded(dataset.len());
    Ok(dataset)
}

fn load_csv(path: &Path, columns: &ColumnMap) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let index = HeaderIndex::new(&headers, columns)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cells = row.iter().map(|raw| Some(Cell::from_csv(raw))).collect();
        records.push(index.record(cells));
    }

    Ok(Dataset { headers, records })
}

fn load_spreadsheet(path: &Path, columns: &ColumnMap) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or_else(|| {
        PrepError::Config(format!("{} has no worksheets", path.display()))
    })??;
    dataset_from_rows(range.rows(), columns)
}

/// First row is the header; rows with only empty cells are skipped.
fn dataset_from_rows<'a>(
    mut rows: impl Iterator<Item = &'a [Data]>,
    columns: &ColumnMap,
) -> Result<Dataset> {
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|c| c.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    let index = HeaderIndex::new(&headers, columns)?;

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            debug!("Skipping empty spreadsheet row");
            continue;
        }
        let cells = row.iter().map(|c| Some(Cell::from_spreadsheet(c))).collect();
        records.push(index.record(cells));
    }

    Ok(Dataset { headers, records })
}

/// Whole numbers keep a trailing `.0` so float columns read back as floats.
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{:.1}", n)
    } else {
        n.to_string()
    }
}

fn cell_for(header: &str, columns: &ColumnMap, filtered: &FilteredRecord) -> String {
    let record = &filtered.record;
    if header == columns.name {
        return record.name.clone();
    }
    if header == columns.address {
        return record.address.clone().unwrap_or_default();
    }
    match header {
        TYPE_COLUMN => record.place_type.clone().unwrap_or_default(),
        COMMENT_COLUMN => record.comment.clone(),
        RATING_COLUMN => format_number(record.rating),
        COUNT_COLUMN => format_number(record.count),
        LAT_COLUMN => format_number(record.lat),
        LON_COLUMN => format_number(record.lon),
        GEOMETRY_COLUMN => filtered.geometry_wkt(),
        other => record.extra.get(other).cloned().unwrap_or_default(),
    }
}

/// Write filtered records as UTF-8 CSV with the given header order.
pub fn save_csv(
    path: impl AsRef<Path>,
    headers: &[String],
    columns: &ColumnMap,
    records: &[FilteredRecord],
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(headers)?;
    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|h| cell_for(h, columns, record))
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;

    info!("Saved {} rows to {}", records.len(), path.display());
    Ok(())
}
