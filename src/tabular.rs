//! Tabular readers: one inventory file on disk to a [`RawTable`].
//!
//! | Extension | Reader |
//! |-----------|--------|
//! | `xlsx` | OOXML zip, first worksheet, parsed with `quick-xml` |
//! | `xls`  | legacy BIFF workbook via `calamine`, first worksheet |
//! | `csv`  | comma-delimited text via `csv` |
//!
//! The first non-empty row becomes the header row and fully empty rows are
//! dropped. Cell text is kept verbatim; interpretation is the normalizer's
//! job.
//!
//! Reading never panics. Any failure is a [`ReadError`] and the loader skips
//! the file.

use std::io::{Cursor, Read};
use std::path::Path;

use catalog_core::models::RawTable;
use catalog_core::normalize::SourceKind;
use quick_xml::events::Event;

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;
/// Maximum cells to accept from one worksheet.
const XLSX_MAX_CELLS: usize = 500_000;

/// Last column index Excel allows (`XFD`).
const MAX_COLUMN: usize = 16_383;

const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const WORKSHEET_PREFIX: &str = "xl/worksheets/sheet";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported file format: {0}")]
    Unsupported(String),
    #[error("malformed xlsx workbook: {0}")]
    Ooxml(String),
    #[error("xls decode failed: {0}")]
    Xls(String),
    #[error("CSV decode failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook has no worksheets")]
    NoWorksheet,
}

fn ooxml(e: impl std::fmt::Display) -> ReadError {
    ReadError::Ooxml(e.to_string())
}

/// File formats the loader knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 3] = [SourceFormat::Xlsx, SourceFormat::Xls, SourceFormat::Csv];

    /// Case-insensitive, with or without a leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "xlsx" => Some(SourceFormat::Xlsx),
            "xls" => Some(SourceFormat::Xls),
            "csv" => Some(SourceFormat::Csv),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Xlsx => "xlsx",
            SourceFormat::Xls => "xls",
            SourceFormat::Csv => "csv",
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceFormat::Xlsx | SourceFormat::Xls => SourceKind::Spreadsheet,
            SourceFormat::Csv => SourceKind::DelimitedText,
        }
    }
}

/// Read a file, choosing the reader from its extension.
pub fn read_table(path: &Path) -> Result<RawTable, ReadError> {
    let format = SourceFormat::from_path(path)
        .ok_or_else(|| ReadError::Unsupported(path.display().to_string()))?;
    read_table_as(path, format)
}

pub fn read_table_as(path: &Path, format: SourceFormat) -> Result<RawTable, ReadError> {
    match format {
        SourceFormat::Xlsx => read_xlsx(&std::fs::read(path)?),
        SourceFormat::Xls => read_xls(path),
        SourceFormat::Csv => read_csv(&std::fs::read(path)?),
    }
}

/// Split grid rows into a header row and data rows.
fn into_table(rows: Vec<Vec<String>>) -> RawTable {
    let mut rows = rows
        .into_iter()
        .filter(|r| r.iter().any(|c| !c.trim().is_empty()));
    let headers = rows.next().unwrap_or_default();
    RawTable::new(headers, rows.collect())
}

// ============ csv ============

/// Parse comma-delimited bytes. Ragged rows are accepted and invalid UTF-8
/// is decoded lossily.
pub fn read_csv(bytes: &[u8]) -> Result<RawTable, ReadError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
        );
    }
    Ok(into_table(rows))
}

// ============ xls ============

fn read_xls(path: &Path) -> Result<RawTable, ReadError> {
    use calamine::{open_workbook, Reader, Xls};

    let mut workbook: Xls<_> =
        open_workbook(path).map_err(|e: calamine::XlsError| ReadError::Xls(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ReadError::NoWorksheet)?
        .map_err(|e| ReadError::Xls(e.to_string()))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();
    Ok(into_table(rows))
}

// ============ xlsx ============

/// Parse an xlsx workbook held in memory. Only the first worksheet in tab
/// order is read.
pub fn read_xlsx(bytes: &[u8]) -> Result<RawTable, ReadError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(ooxml)?;
    let shared_strings = read_shared_strings(&mut archive)?;
    let sheet = first_worksheet_name(&mut archive)?.ok_or(ReadError::NoWorksheet)?;
    let sheet_xml = read_zip_entry_bounded(&mut archive, &sheet, MAX_XML_ENTRY_BYTES)?;
    let rows = parse_sheet_rows(&sheet_xml, &shared_strings)?;
    Ok(into_table(rows))
}

fn read_zip_entry_bounded(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
    max_bytes: u64,
) -> Result<Vec<u8>, ReadError> {
    let entry = archive.by_name(name).map_err(ooxml)?;
    let mut out = Vec::new();
    entry.take(max_bytes).read_to_end(&mut out)?;
    if out.len() as u64 >= max_bytes {
        return Err(ReadError::Ooxml(format!(
            "ZIP entry {} exceeds size limit ({} bytes)",
            name, max_bytes
        )));
    }
    Ok(out)
}

fn has_entry(archive: &zip::ZipArchive<Cursor<&[u8]>>, name: &str) -> bool {
    archive.file_names().any(|n| n == name)
}

/// First tab of the workbook, resolved through `workbook.xml` and its
/// relationships. Workbooks without those parts fall back to the
/// lowest-numbered `sheetN.xml`.
fn first_worksheet_name(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
) -> Result<Option<String>, ReadError> {
    if let Some(name) = first_sheet_from_workbook(archive)? {
        return Ok(Some(name));
    }
    Ok(archive
        .file_names()
        .filter(|n| n.starts_with(WORKSHEET_PREFIX) && n.ends_with(".xml"))
        .min_by_key(|name| {
            name.trim_start_matches(WORKSHEET_PREFIX)
                .trim_end_matches(".xml")
                .parse::<u32>()
                .unwrap_or(u32::MAX)
        })
        .map(str::to_string))
}

fn first_sheet_from_workbook(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
) -> Result<Option<String>, ReadError> {
    if !has_entry(archive, WORKBOOK) || !has_entry(archive, WORKBOOK_RELS) {
        return Ok(None);
    }
    let workbook = read_zip_entry_bounded(archive, WORKBOOK, MAX_XML_ENTRY_BYTES)?;
    let Some(rel_id) = first_element_attr(&workbook, b"sheet", |key, _| key == b"id")? else {
        return Ok(None);
    };

    let rels = read_zip_entry_bounded(archive, WORKBOOK_RELS, MAX_XML_ENTRY_BYTES)?;
    let target = first_relationship_target(&rels, &rel_id)?;
    let Some(target) = target else {
        return Ok(None);
    };

    // Targets are relative to `xl/` unless absolute within the package.
    let path = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    };
    Ok(has_entry(archive, &path).then_some(path))
}

/// Value of the first attribute accepted by `pick` on the first element
/// named `element`.
fn first_element_attr(
    xml: &[u8],
    element: &[u8],
    pick: impl Fn(&[u8], &str) -> bool,
) -> Result<Option<String>, ReadError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(ooxml)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == element => {
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().map_err(ooxml)?;
                    if pick(attr.key.local_name().as_ref(), &value) {
                        return Ok(Some(value.into_owned()));
                    }
                }
                return Ok(None);
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

fn first_relationship_target(rels: &[u8], rel_id: &str) -> Result<Option<String>, ReadError> {
    let mut reader = quick_xml::Reader::from_reader(rels);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(ooxml)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().map_err(ooxml)?.into_owned();
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }
                if id.as_deref() == Some(rel_id) {
                    return Ok(target);
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

/// Shared string table. Rich-text runs inside one `<si>` are concatenated;
/// phonetic hints (`<rPh>`) are ignored. A workbook without the part has no
/// shared strings.
fn read_shared_strings(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
) -> Result<Vec<String>, ReadError> {
    if !archive.file_names().any(|n| n == SHARED_STRINGS) {
        return Ok(Vec::new());
    }
    let xml = read_zip_entry_bounded(archive, SHARED_STRINGS, MAX_XML_ENTRY_BYTES)?;

    let mut strings = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf).map_err(ooxml)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"rPh" => in_phonetic = true,
                b"t" if !in_phonetic => in_t = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(te) if in_t => current.push_str(&te.unescape().map_err(ooxml)?),
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"rPh" => in_phonetic = false,
                b"si" => strings.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// Zero-based column index from a cell reference such as `"AB12"`.
/// References past `XFD` are rejected.
fn column_index(cell_ref: &str) -> Result<Option<usize>, ReadError> {
    let mut n = 0usize;
    let mut seen = false;
    for b in cell_ref.bytes().take_while(u8::is_ascii_alphabetic) {
        seen = true;
        n = n
            .checked_mul(26)
            .and_then(|n| n.checked_add((b.to_ascii_uppercase() - b'A' + 1) as usize))
            .filter(|n| *n <= MAX_COLUMN + 1)
            .ok_or_else(|| {
                ReadError::Ooxml(format!("cell reference {} is beyond column XFD", cell_ref))
            })?;
    }
    Ok(seen.then(|| n - 1))
}

fn bounded_column(column: usize) -> Result<usize, ReadError> {
    if column > MAX_COLUMN {
        return Err(ReadError::Ooxml(
            "worksheet has cells beyond column XFD".to_string(),
        ));
    }
    Ok(column)
}

/// Numeric cells are stored at up to 17 significant digits
/// (`1.1000000000000001`); render them in shortest round-trip form.
fn canonical_number(raw: &str) -> String {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v.to_string(),
        _ => raw.to_string(),
    }
}

/// Cell currently being read inside `<c>`.
#[derive(Default)]
struct PendingCell {
    column: usize,
    cell_type: String,
    value: String,
}

impl PendingCell {
    fn resolve(self, shared_strings: &[String]) -> (usize, String) {
        let text = match self.cell_type.as_str() {
            "s" => self
                .value
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|i| shared_strings.get(i))
                .cloned()
                .unwrap_or_default(),
            "b" => {
                if self.value.trim() == "1" {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
            "inlineStr" | "str" => self.value,
            "" | "n" => canonical_number(self.value.trim()),
            _ => self.value.trim().to_string(),
        };
        (self.column, text)
    }
}

fn finish_row(cells: Vec<(usize, String)>) -> Vec<String> {
    let width = cells.iter().map(|(c, _)| c + 1).max().unwrap_or(0);
    let mut row = vec![String::new(); width];
    for (column, text) in cells {
        row[column] = text;
    }
    row
}

fn parse_sheet_rows(xml: &[u8], shared_strings: &[String]) -> Result<Vec<Vec<String>>, ReadError> {
    let mut rows = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut row_cells: Vec<(usize, String)> = Vec::new();
    let mut next_column = 0usize;
    let mut pending: Option<PendingCell> = None;
    let mut in_value = false;
    let mut cell_count = 0usize;

    loop {
        match reader.read_event_into(&mut buf).map_err(ooxml)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    row_cells.clear();
                    next_column = 0;
                }
                b"c" => {
                    let mut cell = PendingCell {
                        column: next_column,
                        ..PendingCell::default()
                    };
                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value);
                        match attr.key.as_ref() {
                            b"r" => {
                                if let Some(col) = column_index(&value)? {
                                    cell.column = col;
                                }
                            }
                            b"t" => cell.cell_type = value.into_owned(),
                            _ => {}
                        }
                    }
                    cell.column = bounded_column(cell.column)?;
                    pending = Some(cell);
                }
                b"v" | b"t" => in_value = pending.is_some(),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => rows.push(Vec::new()),
                b"c" => {
                    let mut column = next_column;
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"r" {
                            if let Some(col) = column_index(&String::from_utf8_lossy(&attr.value))? {
                                column = col;
                            }
                        }
                    }
                    next_column = bounded_column(column)? + 1;
                }
                _ => {}
            },
            Event::Text(te) if in_value => {
                if let Some(cell) = pending.as_mut() {
                    cell.value.push_str(&te.unescape().map_err(ooxml)?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    if let Some(cell) = pending.take() {
                        cell_count += 1;
                        if cell_count > XLSX_MAX_CELLS {
                            return Err(ReadError::Ooxml(format!(
                                "worksheet exceeds {} cells",
                                XLSX_MAX_CELLS
                            )));
                        }
                        let (column, text) = cell.resolve(shared_strings);
                        next_column = column + 1;
                        row_cells.push((column, text));
                    }
                }
                b"row" => rows.push(finish_row(std::mem::take(&mut row_cells))),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn xlsx_with(shared: Option<&str>, sheets: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let opts = zip::write::SimpleFileOptions::default();
            if let Some(shared) = shared {
                zip.start_file(SHARED_STRINGS, opts).unwrap();
                zip.write_all(shared.as_bytes()).unwrap();
            }
            for (name, xml) in sheets {
                zip.start_file(*name, opts).unwrap();
                zip.write_all(xml.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    const SHARED: &str = r#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><si><t>Producto</t></si><si><t>Stock</t></si><si><t>Precio</t></si><si><r><t>Paracetamol </t></r><r><t>TAB 500mg</t></r></si><si><t>$1,000</t></si></sst>"#;

    #[test]
    fn xlsx_shared_strings_and_numbers() {
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="s"><v>2</v></c></row>
            <row r="2"><c r="A2" t="s"><v>3</v></c><c r="B2"><v>10</v></c><c r="C2" t="s"><v>4</v></c></row>
        </sheetData></worksheet>"#;
        let bytes = xlsx_with(Some(SHARED), &[("xl/worksheets/sheet1.xml", sheet)]);

        let table = read_xlsx(&bytes).unwrap();
        assert_eq!(table.headers, vec!["Producto", "Stock", "Precio"]);
        assert_eq!(
            table.rows,
            vec![vec!["Paracetamol TAB 500mg", "10", "$1,000"]]
        );
    }

    #[test]
    fn xlsx_inline_strings_gaps_and_booleans() {
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="inlineStr"><is><t>Nombre</t></is></c><c r="C1" t="inlineStr"><is><t>Activo</t></is></c></row>
            <row r="2"><c r="A2" t="inlineStr"><is><t>Gasas &amp; vendas</t></is></c><c r="C2" t="b"><v>1</v></c></row>
            <row r="3"/>
            <row r="4"><c r="A4"/><c r="B4" t="inlineStr"><is><t>  </t></is></c></row>
        </sheetData></worksheet>"#;
        let bytes = xlsx_with(None, &[("xl/worksheets/sheet1.xml", sheet)]);

        let table = read_xlsx(&bytes).unwrap();
        assert_eq!(table.headers, vec!["Nombre", "", "Activo"]);
        assert_eq!(table.rows, vec![vec!["Gasas & vendas", "", "TRUE"]]);
    }

    #[test]
    fn xlsx_without_workbook_reads_lowest_numbered_sheet() {
        let second = r#"<worksheet><sheetData><row><c t="inlineStr"><is><t>second</t></is></c></row></sheetData></worksheet>"#;
        let first = r#"<worksheet><sheetData><row><c t="inlineStr"><is><t>first</t></is></c></row></sheetData></worksheet>"#;
        let bytes = xlsx_with(
            None,
            &[
                ("xl/worksheets/sheet2.xml", second),
                ("xl/worksheets/sheet1.xml", first),
            ],
        );
        assert_eq!(read_xlsx(&bytes).unwrap().headers, vec!["first"]);
    }

    #[test]
    fn xlsx_without_worksheet_is_an_error() {
        let bytes = xlsx_with(Some(SHARED), &[]);
        assert!(matches!(read_xlsx(&bytes), Err(ReadError::NoWorksheet)));
    }

    #[test]
    fn invalid_zip_is_an_error() {
        assert!(matches!(read_xlsx(b"not a zip"), Err(ReadError::Ooxml(_))));
    }

    #[test]
    fn column_refs() {
        assert_eq!(column_index("A1").unwrap(), Some(0));
        assert_eq!(column_index("Z9").unwrap(), Some(25));
        assert_eq!(column_index("AA10").unwrap(), Some(26));
        assert_eq!(column_index("ab3").unwrap(), Some(27));
        assert_eq!(column_index("XFD1").unwrap(), Some(16_383));
        assert_eq!(column_index("12").unwrap(), None);
        assert!(matches!(column_index("XFE1"), Err(ReadError::Ooxml(_))));
        assert!(matches!(column_index("ZZZZZZZ1"), Err(ReadError::Ooxml(_))));
        assert!(matches!(
            column_index("AAAAAAAAAAAAAAAA1"),
            Err(ReadError::Ooxml(_))
        ));
    }

    #[test]
    fn oversized_cell_reference_is_an_error() {
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="inlineStr"><is><t>Nombre</t></is></c></row>
            <row r="2"><c r="AAAAAAAAAAAAAAAA2" t="inlineStr"><is><t>x</t></is></c></row>
        </sheetData></worksheet>"#;
        let bytes = xlsx_with(None, &[("xl/worksheets/sheet1.xml", sheet)]);
        assert!(matches!(read_xlsx(&bytes), Err(ReadError::Ooxml(_))));

        let empty_cell = r#"<worksheet><sheetData><row r="1"><c r="ZZZZZZZ1"/></row></sheetData></worksheet>"#;
        let bytes = xlsx_with(None, &[("xl/worksheets/sheet1.xml", empty_cell)]);
        assert!(matches!(read_xlsx(&bytes), Err(ReadError::Ooxml(_))));
    }

    #[test]
    fn xlsx_numbers_use_shortest_form() {
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="inlineStr"><is><t>Nombre</t></is></c><c r="B1" t="inlineStr"><is><t>Stock</t></is></c><c r="C1" t="inlineStr"><is><t>Precio</t></is></c></row>
            <row r="2"><c r="A2" t="inlineStr"><is><t>Gasas</t></is></c><c r="B2" t="n"><v>4</v></c><c r="C2"><v>1.1000000000000001</v></c></row>
            <row r="3"><c r="A3" t="inlineStr"><is><t>Algodon</t></is></c><c r="B3"><v>2.0</v></c><c r="C3" t="e"><v>#N/A</v></c></row>
        </sheetData></worksheet>"#;
        let bytes = xlsx_with(None, &[("xl/worksheets/sheet1.xml", sheet)]);

        let table = read_xlsx(&bytes).unwrap();
        assert_eq!(table.rows[0], vec!["Gasas", "4", "1.1"]);
        assert_eq!(table.rows[1], vec!["Algodon", "2", "#N/A"]);

        let normalized = catalog_core::normalize::normalize_source(
            &table,
            "bodega.xlsx",
            SourceKind::Spreadsheet,
        );
        assert_eq!(normalized.records[0].unit_price, 0.11);
        assert_eq!(normalized.records[0].available_quantity, 4);
    }

    const WORKBOOK_XML: &str = r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Inventario" sheetId="2" r:id="rId7"/><sheet name="Viejo" sheetId="1" r:id="rId3"/></sheets></workbook>"#;
    const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/></Relationships>"#;

    #[test]
    fn xlsx_follows_workbook_tab_order() {
        let old = r#"<worksheet><sheetData><row><c t="inlineStr"><is><t>old</t></is></c></row></sheetData></worksheet>"#;
        let current = r#"<worksheet><sheetData><row><c t="inlineStr"><is><t>current</t></is></c></row></sheetData></worksheet>"#;
        let bytes = xlsx_with(
            None,
            &[
                (WORKBOOK, WORKBOOK_XML),
                (WORKBOOK_RELS, WORKBOOK_RELS_XML),
                ("xl/worksheets/sheet1.xml", old),
                ("xl/worksheets/sheet2.xml", current),
            ],
        );
        assert_eq!(read_xlsx(&bytes).unwrap().headers, vec!["current"]);
    }

    #[test]
    fn dangling_workbook_relationship_falls_back_to_sheet_files() {
        let rels = r#"<Relationships><Relationship Id="rId7" Target="worksheets/missing.xml"/></Relationships>"#;
        let only = r#"<worksheet><sheetData><row><c t="inlineStr"><is><t>only</t></is></c></row></sheetData></worksheet>"#;
        let bytes = xlsx_with(
            None,
            &[
                (WORKBOOK, WORKBOOK_XML),
                (WORKBOOK_RELS, rels),
                ("xl/worksheets/sheet1.xml", only),
            ],
        );
        assert_eq!(read_xlsx(&bytes).unwrap().headers, vec!["only"]);
    }

    #[test]
    fn csv_with_bom_ragged_rows_and_blank_lines() {
        let data = "\u{feff}Nombre,Stock,Precio\nIbuprofeno,5\n,,\n\"Jarabe, FRASCO\",2,\"$1,200\"\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["Nombre", "Stock", "Precio"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["Ibuprofeno", "5"]);
        assert_eq!(table.rows[1], vec!["Jarabe, FRASCO", "2", "$1,200"]);
    }

    #[test]
    fn csv_latin1_bytes_are_decoded_lossily() {
        let mut data = b"Descripci".to_vec();
        data.push(0xF3); // latin-1 'ó'
        data.extend_from_slice(b"n,Stock\nGasas,1\n");
        let table = read_csv(&data).unwrap();
        assert!(table.headers[0].starts_with("Descripci"));
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn empty_csv_is_an_empty_table() {
        let table = read_csv(b"").unwrap();
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn formats_from_extension() {
        assert_eq!(SourceFormat::from_extension("XLSX"), Some(SourceFormat::Xlsx));
        assert_eq!(SourceFormat::from_extension(".csv"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_extension("ods"), None);
        assert_eq!(
            SourceFormat::from_path(Path::new("bodega.Xls")),
            Some(SourceFormat::Xls)
        );
        assert_eq!(SourceFormat::Csv.kind(), SourceKind::DelimitedText);
    }

    #[test]
    fn unsupported_path_is_rejected_before_io() {
        let err = read_table(Path::new("/definitely/missing/notes.txt")).unwrap_err();
        assert!(matches!(err, ReadError::Unsupported(_)));
    }

    #[test]
    fn xls_workbook_is_read_like_xlsx() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/bodega_legacy.xls");
        let table = read_table(&path).unwrap();

        assert_eq!(table.headers, vec!["Producto", "Stock", "Precio"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["Paracetamol TAB 500mg", "10", "$1,000"],
                vec!["Gasas CX10", "4", "1.1"],
            ]
        );

        let normalized = catalog_core::normalize::normalize_source(
            &table,
            "bodega_legacy.xls",
            SourceFormat::Xls.kind(),
        );
        assert_eq!(normalized.label, "bodega_legacy");
        assert_eq!(normalized.records[0].unit_price, 10.0);
        assert_eq!(normalized.records[0].presentation, "TAB 500mg");
        assert_eq!(normalized.records[1].unit_price, 0.11);
        assert_eq!(normalized.records[1].available_quantity, 4);
    }

    #[test]
    fn corrupt_xls_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roto.xls");
        std::fs::write(&path, b"garbage").unwrap();
        assert!(matches!(read_table(&path), Err(ReadError::Xls(_))));
    }
}
