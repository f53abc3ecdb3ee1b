//! CSV record decoder - Turns a POS export payload into structured sale rows.
//!
//! The payload is either base64-encoded or raw CSV text; base64 decoding is
//! attempted first with a fallback to raw UTF-8. Column headers are matched
//! case-insensitively against a static alias table per logical field, so
//! exports from different POS systems map onto the same record shape.
//!
//! A structurally invalid document (undecodable payload, unreadable table,
//! or a header row missing a required column) is a fatal error that aborts
//! the whole import. Individual data rows that fail to parse are dropped
//! with a warning; they still consume their 1-based line number so surviving
//! rows keep stable ordinals.

use crate::errors::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

/// One parsed sale row from the POS export.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    /// 1-based CSV data-row ordinal (header excluded)
    pub line_number: i32,
    /// Date of the sale
    pub sale_date: DateTime<Utc>,
    /// Item barcode as exported by the POS
    pub barcode: String,
    /// Item display name, when the export carries one
    pub item_name: Option<String>,
    /// Quantity sold; sign is not validated here
    pub quantity_sold: i32,
    /// Unit price, when the export carries one
    pub unit_price: Option<f64>,
}

// Accepted header spellings per logical field, compared case-insensitively
// after trimming.
const DATE_HEADERS: &[&str] = &["saledate", "date", "transaction date", "sale date"];
const BARCODE_HEADERS: &[&str] = &["barcode", "itemcode", "item code", "product code"];
const NAME_HEADERS: &[&str] = &["itemname", "item name", "product name", "description"];
const QUANTITY_HEADERS: &[&str] = &["quantitysold", "quantity", "qty", "quantity sold"];
const PRICE_HEADERS: &[&str] = &["unitprice", "price", "unit price", "amount"];

/// Resolved column indices for one document's header row.
struct ColumnMap {
    date: usize,
    barcode: usize,
    name: Option<usize>,
    quantity: usize,
    price: Option<usize>,
}

/// Decodes a base64-or-raw payload into CSV text bytes.
///
/// Strict base64 decoding is attempted first; any failure means the payload
/// is treated as raw text. Raw CSV text contains commas or newlines outside
/// the base64 alphabet, so real CSV never decodes by accident.
fn decode_payload(payload: &str) -> Vec<u8> {
    match BASE64.decode(payload.trim()) {
        Ok(bytes) => bytes,
        Err(_) => payload.as_bytes().to_vec(),
    }
}

/// Parses a date string in any of the accepted POS export formats.
fn parse_sale_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }
    None
}

/// Finds the index of the first header matching any accepted alias.
fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.contains(&h.trim().to_lowercase().as_str()))
}

/// Resolves the header row into a column map, or fails the document when a
/// required logical column has no accepted spelling present.
fn resolve_columns(headers: &csv::StringRecord) -> Result<ColumnMap> {
    let require = |aliases: &[&str], field: &str| -> Result<usize> {
        find_column(headers, aliases).ok_or_else(|| Error::InvalidCsv {
            message: format!("missing required column for {field}"),
        })
    };

    Ok(ColumnMap {
        date: require(DATE_HEADERS, "sale date")?,
        barcode: require(BARCODE_HEADERS, "barcode")?,
        name: find_column(headers, NAME_HEADERS),
        quantity: require(QUANTITY_HEADERS, "quantity")?,
        price: find_column(headers, PRICE_HEADERS),
    })
}

/// Parses one data row into a [`SaleRecord`], or explains why it cannot.
fn parse_row(
    record: &csv::StringRecord,
    columns: &ColumnMap,
    line_number: i32,
) -> std::result::Result<SaleRecord, String> {
    let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or_default();

    let date_raw = field(columns.date);
    let sale_date =
        parse_sale_date(date_raw).ok_or_else(|| format!("unparseable sale date '{date_raw}'"))?;

    let barcode = field(columns.barcode);
    if barcode.is_empty() {
        return Err("missing barcode".to_string());
    }

    let quantity_raw = field(columns.quantity);
    let quantity_sold: i32 = quantity_raw
        .parse()
        .map_err(|_| format!("unparseable quantity '{quantity_raw}'"))?;

    // Optional fields never fail a row; unparseable values degrade to None.
    let item_name = columns
        .name
        .map(field)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string);
    let unit_price = columns.price.map(field).and_then(|price| price.parse().ok());

    Ok(SaleRecord {
        line_number,
        sale_date,
        barcode: barcode.to_string(),
        item_name,
        quantity_sold,
        unit_price,
    })
}

/// Decodes a POS sales payload into sale records.
///
/// Decoding is deterministic: the same payload always yields identical
/// records, in file order, each carrying its original line number.
///
/// # Errors
/// Returns [`Error::InvalidCsv`] when the payload decodes to invalid UTF-8,
/// the table cannot be read, or the header row is missing a required column.
pub fn decode_sales_csv(payload: &str) -> Result<Vec<SaleRecord>> {
    let bytes = decode_payload(payload);
    let text = String::from_utf8(bytes).map_err(|e| Error::InvalidCsv {
        message: format!("payload is not valid UTF-8: {e}"),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::InvalidCsv {
            message: format!("unreadable header row: {e}"),
        })?
        .clone();
    let columns = resolve_columns(&headers)?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let line_number = i32::try_from(index + 1).unwrap_or(i32::MAX);
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(line_number, "Skipping unreadable CSV row: {e}");
                continue;
            }
        };

        match parse_row(&row, &columns, line_number) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(line_number, "Skipping CSV row: {reason}");
            }
        }
    }

    Ok(records)
}
