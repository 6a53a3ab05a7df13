use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, instrument};

use crate::constants::columns;
use crate::error::{ReportError, Result};
use crate::types::RawRecord;

const DATE_FORMAT: &str = "%m/%d/%Y";

/// Compression of a source file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Bzip2,
    Gzip,
    Plain,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("bz2") => Compression::Bzip2,
            Some(ext) if ext.eq_ignore_ascii_case("gz") => Compression::Gzip,
            _ => Compression::Plain,
        }
    }
}

/// Open `path` with the matching decompressor.
pub fn open_source(path: &Path) -> Result<Box<dyn Read>> {
    let file = BufReader::new(File::open(path)?);
    let reader: Box<dyn Read> = match Compression::from_path(path) {
        Compression::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(file)),
        Compression::Gzip => Box::new(flate2::read::MultiGzDecoder::new(file)),
        Compression::Plain => Box::new(file),
    };
    Ok(reader)
}

/// Load every row of the storm data file at `path`.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let records = read_records(open_source(path)?)?;
    info!(records = records.len(), "Loaded source records");
    Ok(records)
}

/// Positions of the consumed columns within the header row
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    begin_date: usize,
    state: usize,
    event_type: usize,
    fatalities: usize,
    injuries: usize,
    property_damage: usize,
    property_damage_exp: usize,
    crop_damage: usize,
    crop_damage_exp: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| ReportError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            begin_date: find(columns::BEGIN_DATE)?,
            state: find(columns::STATE)?,
            event_type: find(columns::EVENT_TYPE)?,
            fatalities: find(columns::FATALITIES)?,
            injuries: find(columns::INJURIES)?,
            property_damage: find(columns::PROPERTY_DAMAGE)?,
            property_damage_exp: find(columns::PROPERTY_DAMAGE_EXP)?,
            crop_damage: find(columns::CROP_DAMAGE)?,
            crop_damage_exp: find(columns::CROP_DAMAGE_EXP)?,
        })
    }
}

/// Decode CSV rows from `reader`. Columns are found by header name; any other
/// columns are ignored.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut csv = ReaderBuilder::new().flexible(true).from_reader(reader);
    let index = ColumnIndex::from_headers(csv.headers()?)?;

    let mut records = Vec::new();
    let mut row = StringRecord::new();
    while csv.read_record(&mut row)? {
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        records.push(parse_row(&row, &index, line)?);
    }
    Ok(records)
}

fn parse_row(row: &StringRecord, index: &ColumnIndex, line: u64) -> Result<RawRecord> {
    let field = |position: usize| row.get(position).unwrap_or("").trim();

    Ok(RawRecord {
        observed_at: parse_date(field(index.begin_date), line)?,
        region: field(index.state).to_string(),
        raw_category: field(index.event_type).to_string(),
        fatalities: parse_count(field(index.fatalities), columns::FATALITIES, line)?,
        injuries: parse_count(field(index.injuries), columns::INJURIES, line)?,
        property_damage_magnitude: parse_amount(
            field(index.property_damage),
            columns::PROPERTY_DAMAGE,
            line,
        )?,
        property_damage_unit: field(index.property_damage_exp).to_string(),
        crop_damage_magnitude: parse_amount(field(index.crop_damage), columns::CROP_DAMAGE, line)?,
        crop_damage_unit: field(index.crop_damage_exp).to_string(),
    })
}

/// `M/D/YYYY H:MM:SS`; only the date part is kept.
fn parse_date(value: &str, line: u64) -> Result<NaiveDate> {
    let date_part = value.split_whitespace().next().unwrap_or("");
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|e| ReportError::Parse {
        line,
        message: format!("{} {:?}: {}", columns::BEGIN_DATE, value, e),
    })
}

/// Whole non-negative counts; the export sometimes writes them as `3.00`.
fn parse_count(value: &str, column: &str, line: u64) -> Result<u32> {
    if value.is_empty() {
        return Ok(0);
    }
    if let Ok(count) = value.parse::<u32>() {
        return Ok(count);
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => {
            Ok(n as u32)
        }
        _ => Err(ReportError::Parse {
            line,
            message: format!("{} {:?} is not a non-negative count", column, value),
        }),
    }
}

/// Damage magnitude; an empty field is zero.
fn parse_amount(value: &str, column: &str, line: u64) -> Result<f64> {
    if value.is_empty() {
        return Ok(0.0);
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Ok(n),
        _ => Err(ReportError::Parse {
            line,
            message: format!("{} {:?} is not a non-negative number", column, value),
        }),
    }
}
