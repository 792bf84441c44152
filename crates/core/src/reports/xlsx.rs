//! Workbook archive access for template injection.
//!
//! Templates are patched at the package level: every part is copied raw
//! except the worksheets receiving values, the workbook (flagged for full
//! recalculation on load) and the calculation chain, which is dropped along
//! with its relationship and content-type entries.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::error::ReportError;
use super::mapping::CellAddress;

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const CALC_CHAIN_SUFFIX: &str = "calcChain.xml";

/// Workbook children that must follow `calcPr`, in schema order.
const AFTER_CALC_PR: &[&[u8]] = &[
    b"oleSize",
    b"customWorkbookViews",
    b"pivotCaches",
    b"smartTagPr",
    b"smartTagTypes",
    b"webPublishing",
    b"fileRecoveryPr",
    b"webPublishObjects",
    b"extLst",
];

/// Values to write into one worksheet.
pub type CellPatches = BTreeMap<CellAddress, Decimal>;

/// A sheet declared in the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    /// Tab name.
    pub name: String,
    /// Part path inside the archive (e.g. `xl/worksheets/sheet1.xml`).
    pub path: String,
    /// False for chart sheets and other non-grid sheets.
    pub is_worksheet: bool,
}

/// A rectangular merged range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// Top-left (master) cell.
    pub first: CellAddress,
    /// Bottom-right cell.
    pub last: CellAddress,
}

impl CellRange {
    /// Returns true if the cell lies inside the range.
    #[must_use]
    pub fn contains(&self, cell: CellAddress) -> bool {
        (self.first.row..=self.last.row).contains(&cell.row)
            && (self.first.col..=self.last.col).contains(&cell.col)
    }
}

impl FromStr for CellRange {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (first, last) = s.split_once(':').unwrap_or((s, s));
        let first: CellAddress = first.parse()?;
        let last: CellAddress = last.parse()?;
        Ok(Self {
            first: CellAddress::new(first.row.min(last.row), first.col.min(last.col)),
            last: CellAddress::new(first.row.max(last.row), first.col.max(last.col)),
        })
    }
}

/// An opened template workbook.
pub struct TemplateWorkbook {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    sheets: Vec<SheetInfo>,
    active_tab: usize,
}

impl TemplateWorkbook {
    /// Opens a workbook, reading its sheet list.
    ///
    /// The file is loaded in memory so the output may overwrite it.
    pub fn open(path: &Path) -> Result<Self, ReportError> {
        let bytes = std::fs::read(path)?;
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let workbook_xml = read_part(&mut archive, WORKBOOK_PART)?;
        let rels_xml = read_part(&mut archive, WORKBOOK_RELS_PART)?;
        let relationships = parse_relationships(&rels_xml)?;
        let (declared, active_tab) = parse_workbook(&workbook_xml)?;

        let sheets = declared
            .into_iter()
            .filter_map(|(name, rid)| {
                relationships.get(&rid).map(|(target, is_worksheet)| SheetInfo {
                    name,
                    path: resolve_target(target),
                    is_worksheet: *is_worksheet,
                })
            })
            .collect();

        Ok(Self {
            archive,
            sheets,
            active_tab,
        })
    }

    /// Sheets in tab order.
    #[must_use]
    pub fn sheets(&self) -> &[SheetInfo] {
        &self.sheets
    }

    /// Looks up a worksheet by its exact tab name.
    #[must_use]
    pub fn worksheet(&self, name: &str) -> Option<&SheetInfo> {
        self.sheets.iter().find(|s| s.is_worksheet && s.name == name)
    }

    /// The sheet selected when the workbook was last saved.
    #[must_use]
    pub fn active_worksheet(&self) -> Option<&SheetInfo> {
        self.sheets
            .get(self.active_tab)
            .filter(|s| s.is_worksheet)
            .or_else(|| self.sheets.iter().find(|s| s.is_worksheet))
    }

    /// Merged ranges declared in a worksheet part.
    pub fn merged_ranges(&mut self, sheet_path: &str) -> Result<Vec<CellRange>, ReportError> {
        let xml = read_part(&mut self.archive, sheet_path)?;
        let mut reader = Reader::from_str(&xml);
        let mut ranges = Vec::new();
        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"mergeCell" => {
                    if let Some(range) = attr_value(&e, b"ref").and_then(|r| r.parse().ok()) {
                        ranges.push(range);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(ranges)
    }

    /// Writes the workbook to `output` with the given worksheet patches.
    ///
    /// `patches` is keyed by worksheet part path.
    pub fn save(
        mut self,
        output: &Path,
        patches: &HashMap<String, CellPatches>,
    ) -> Result<(), ReportError> {
        let mut writer = ZipWriter::new(File::create(output)?);

        for index in 0..self.archive.len() {
            let name = self.archive.by_index_raw(index)?.name().to_string();
            if name.ends_with(CALC_CHAIN_SUFFIX) {
                continue;
            }

            let rewritten = if let Some(cells) = patches.get(&name) {
                Some(patch_sheet_xml(&read_part(&mut self.archive, &name)?, cells)?)
            } else if name == WORKBOOK_PART {
                Some(force_full_calc(&read_part(&mut self.archive, &name)?)?)
            } else if name == WORKBOOK_RELS_PART {
                Some(drop_calc_chain(
                    &read_part(&mut self.archive, &name)?,
                    b"Relationship",
                    b"Target",
                )?)
            } else if name == CONTENT_TYPES_PART {
                Some(drop_calc_chain(
                    &read_part(&mut self.archive, &name)?,
                    b"Override",
                    b"PartName",
                )?)
            } else {
                None
            };

            match rewritten {
                Some(xml) => {
                    let options =
                        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
                    writer.start_file(name, options)?;
                    writer.write_all(xml.as_bytes())?;
                }
                None => {
                    let entry = self.archive.by_index_raw(index)?;
                    writer.raw_copy_file(entry)?;
                }
            }
        }

        writer.finish()?;
        Ok(())
    }
}

fn read_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Result<String, ReportError> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| ReportError::Zip(format!("'{name}': {e}")))?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

fn xml_error(err: impl std::fmt::Display) -> ReportError {
    ReportError::Xml(err.to_string())
}

fn attr_value(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Namespace prefix of an element, with its colon (`x:`), or empty.
fn prefix_of(element: &BytesStart<'_>) -> String {
    element
        .name()
        .prefix()
        .map(|p| format!("{}:", String::from_utf8_lossy(p.as_ref())))
        .unwrap_or_default()
}

/// Copy of an element without one attribute.
fn without_attribute(element: &BytesStart<'_>, key: &[u8]) -> BytesStart<'static> {
    let mut out = BytesStart::new(String::from_utf8_lossy(element.name().as_ref()).into_owned());
    out.extend_attributes(element.attributes().flatten().filter(|a| a.key.as_ref() != key));
    out
}

/// Archive path of a workbook relationship target.
fn resolve_target(target: &str) -> String {
    target
        .strip_prefix('/')
        .map_or_else(|| format!("xl/{target}"), ToString::to_string)
}

/// Relationship id → (target, is worksheet).
fn parse_relationships(xml: &str) -> Result<HashMap<String, (String, bool)>, ReportError> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = HashMap::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let (Some(id), Some(target)) = (attr_value(&e, b"Id"), attr_value(&e, b"Target"))
                else {
                    continue;
                };
                let is_worksheet = attr_value(&e, b"Type").is_some_and(|t| t.ends_with("/worksheet"));
                relationships.insert(id, (target, is_worksheet));
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(relationships)
}

/// Declared sheets as (name, relationship id), and the active tab index.
fn parse_workbook(xml: &str) -> Result<(Vec<(String, String)>, usize), ReportError> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();
    let mut active_tab = 0;
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sheet" => {
                    let mut name = None;
                    let mut rid = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"name" => {
                                let raw = String::from_utf8_lossy(&attr.value).into_owned();
                                name = Some(
                                    quick_xml::escape::unescape(&raw)
                                        .map_or_else(|_| raw.clone(), std::borrow::Cow::into_owned),
                                );
                            }
                            b"id" => rid = Some(String::from_utf8_lossy(&attr.value).into_owned()),
                            _ => {}
                        }
                    }
                    if let (Some(name), Some(rid)) = (name, rid) {
                        sheets.push((name, rid));
                    }
                }
                b"workbookView" => {
                    if let Some(tab) = attr_value(&e, b"activeTab").and_then(|v| v.parse().ok()) {
                        active_tab = tab;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok((sheets, active_tab))
}

/// Re-serializes an XML part, letting `handle` write each event.
fn rewrite_xml<F>(xml: &str, mut handle: F) -> Result<String, ReportError>
where
    F: FnMut(Event<'_>, &mut Writer<Vec<u8>>) -> Result<(), ReportError>,
{
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Eof => break,
            event => handle(event, &mut writer)?,
        }
    }
    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

/// Removes `element` entries whose `attribute` points at the calculation chain.
fn drop_calc_chain(xml: &str, element: &[u8], attribute: &[u8]) -> Result<String, ReportError> {
    let targets_chain = |e: &BytesStart<'_>| {
        e.local_name().as_ref() == element
            && attr_value(e, attribute).is_some_and(|v| v.ends_with(CALC_CHAIN_SUFFIX))
    };
    let mut skip_depth = 0usize;

    rewrite_xml(xml, |event, writer| {
        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                _ => {}
            }
            return Ok(());
        }
        match event {
            Event::Empty(ref e) if targets_chain(e) => Ok(()),
            Event::Start(ref e) if targets_chain(e) => {
                skip_depth = 1;
                Ok(())
            }
            other => writer.write_event(other).map_err(xml_error),
        }
    })
}

/// Sets `calcPr fullCalcOnLoad="1"`, inserting the element in schema order
/// when the workbook has none.
fn force_full_calc(xml: &str) -> Result<String, ReportError> {
    let mut depth = 0usize;
    let mut prefix = String::new();
    let mut done = false;

    let calc_pr = |prefix: &str| {
        let mut element = BytesStart::new(format!("{prefix}calcPr"));
        element.push_attribute(("fullCalcOnLoad", "1"));
        Event::Empty(element)
    };

    rewrite_xml(xml, |event, writer| {
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_start = matches!(event, Event::Start(_));
                if depth == 0 {
                    prefix = prefix_of(e);
                } else if depth == 1 && !done {
                    let name = e.local_name();
                    if name.as_ref() == b"calcPr" {
                        let mut patched = without_attribute(e, b"fullCalcOnLoad");
                        patched.push_attribute(("fullCalcOnLoad", "1"));
                        done = true;
                        if is_start {
                            depth += 1;
                        }
                        let patched = if is_start {
                            Event::Start(patched)
                        } else {
                            Event::Empty(patched)
                        };
                        return writer.write_event(patched).map_err(xml_error);
                    }
                    if AFTER_CALC_PR.contains(&name.as_ref()) {
                        writer.write_event(calc_pr(&prefix)).map_err(xml_error)?;
                        done = true;
                    }
                }
                if is_start {
                    depth += 1;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 && !done {
                    writer.write_event(calc_pr(&prefix)).map_err(xml_error)?;
                    done = true;
                }
            }
            _ => {}
        }
        writer.write_event(event).map_err(xml_error)
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SheetElement {
    SheetData,
    Row,
    Cell,
    Other,
}

impl SheetElement {
    fn of(local_name: &[u8]) -> Self {
        match local_name {
            b"sheetData" => Self::SheetData,
            b"row" => Self::Row,
            b"c" => Self::Cell,
            _ => Self::Other,
        }
    }
}

/// Streams a worksheet, replacing target cells and inserting missing ones.
struct SheetPatcher {
    writer: Writer<Vec<u8>>,
    /// Rows still to write, each with its remaining cells.
    pending: BTreeMap<u32, BTreeMap<u32, Decimal>>,
    /// Remaining cells of the current row, when it is patched.
    row_cells: Option<BTreeMap<u32, Decimal>>,
    prefix: String,
    in_sheet_data: bool,
    in_row: bool,
    last_row: u32,
    last_col: u32,
    skip_depth: usize,
}

impl SheetPatcher {
    fn new(capacity: usize, cells: &CellPatches) -> Self {
        let mut pending: BTreeMap<u32, BTreeMap<u32, Decimal>> = BTreeMap::new();
        for (cell, value) in cells {
            pending.entry(cell.row).or_default().insert(cell.col, *value);
        }
        Self {
            writer: Writer::new(Vec::with_capacity(capacity)),
            pending,
            row_cells: None,
            prefix: String::new(),
            in_sheet_data: false,
            in_row: false,
            last_row: 0,
            last_col: 0,
            skip_depth: 0,
        }
    }

    fn tag(&self, local: &str) -> String {
        format!("{}{local}", self.prefix)
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), ReportError> {
        self.writer.write_event(event).map_err(xml_error)
    }

    fn emit_start(&mut self, element: BytesStart<'_>, empty: bool) -> Result<(), ReportError> {
        if empty {
            self.emit(Event::Empty(element))
        } else {
            self.emit(Event::Start(element))
        }
    }

    fn handle(&mut self, event: Event<'_>) -> Result<(), ReportError> {
        if self.skip_depth > 0 {
            match event {
                Event::Start(_) => self.skip_depth += 1,
                Event::End(_) => self.skip_depth -= 1,
                _ => {}
            }
            return Ok(());
        }
        match event {
            Event::Start(e) => self.on_start(e, false),
            Event::Empty(e) => self.on_start(e, true),
            Event::End(e) => self.on_end(e),
            other => self.emit(other),
        }
    }

    fn on_start(&mut self, element: BytesStart<'_>, empty: bool) -> Result<(), ReportError> {
        let kind = SheetElement::of(element.local_name().as_ref());
        match kind {
            SheetElement::SheetData if !self.in_sheet_data => {
                self.prefix = prefix_of(&element);
                if empty {
                    let end = element.to_end().into_owned();
                    self.emit(Event::Start(element))?;
                    let rows = std::mem::take(&mut self.pending);
                    self.write_rows(rows)?;
                    self.emit(Event::End(end))
                } else {
                    self.in_sheet_data = true;
                    self.emit(Event::Start(element))
                }
            }
            SheetElement::Row if self.in_sheet_data && !self.in_row => self.on_row(element, empty),
            SheetElement::Cell if self.in_row => self.on_cell(element, empty),
            _ => self.emit_start(element, empty),
        }
    }

    fn on_row(&mut self, element: BytesStart<'_>, empty: bool) -> Result<(), ReportError> {
        let row = attr_value(&element, b"r")
            .and_then(|r| r.parse().ok())
            .unwrap_or(self.last_row + 1);
        self.last_row = row;
        self.last_col = 0;

        let later = self.pending.split_off(&row);
        let earlier = std::mem::replace(&mut self.pending, later);
        self.write_rows(earlier)?;

        match self.pending.remove(&row) {
            None => {
                self.in_row = !empty;
                self.row_cells = None;
                self.emit_start(element, empty)
            }
            Some(cells) => {
                // Span hints would no longer cover inserted cells.
                let start = without_attribute(&element, b"spans");
                self.emit(Event::Start(start))?;
                if empty {
                    self.write_cells(row, cells)?;
                    let end = self.tag("row");
                    self.emit(Event::End(BytesEnd::new(end)))
                } else {
                    self.in_row = true;
                    self.row_cells = Some(cells);
                    Ok(())
                }
            }
        }
    }

    fn on_cell(&mut self, element: BytesStart<'_>, empty: bool) -> Result<(), ReportError> {
        let col = attr_value(&element, b"r")
            .and_then(|r| r.parse::<CellAddress>().ok())
            .map_or(self.last_col + 1, |cell| cell.col);
        self.last_col = col;

        let Some(cells) = self.row_cells.as_mut() else {
            return self.emit_start(element, empty);
        };
        let later = cells.split_off(&col);
        let earlier = std::mem::replace(cells, later);
        let value = cells.remove(&col);
        self.write_cells(self.last_row, earlier)?;

        match value {
            Some(value) => {
                let style = attr_value(&element, b"s");
                self.write_value_cell(CellAddress::new(self.last_row, col), style.as_deref(), value)?;
                if !empty {
                    self.skip_depth = 1;
                }
                Ok(())
            }
            None => self.emit_start(element, empty),
        }
    }

    fn on_end(&mut self, element: BytesEnd<'_>) -> Result<(), ReportError> {
        let kind = SheetElement::of(element.local_name().as_ref());
        match kind {
            SheetElement::Row if self.in_row => {
                if let Some(cells) = self.row_cells.take() {
                    self.write_cells(self.last_row, cells)?;
                }
                self.in_row = false;
            }
            SheetElement::SheetData if self.in_sheet_data && !self.in_row => {
                let rows = std::mem::take(&mut self.pending);
                self.write_rows(rows)?;
                self.in_sheet_data = false;
            }
            _ => {}
        }
        self.emit(Event::End(element))
    }

    fn write_rows(&mut self, rows: BTreeMap<u32, BTreeMap<u32, Decimal>>) -> Result<(), ReportError> {
        for (row, cells) in rows {
            let name = self.tag("row");
            let mut start = BytesStart::new(name.as_str());
            start.push_attribute(("r", row.to_string().as_str()));
            self.emit(Event::Start(start))?;
            self.write_cells(row, cells)?;
            self.emit(Event::End(BytesEnd::new(name.as_str())))?;
        }
        Ok(())
    }

    fn write_cells(&mut self, row: u32, cells: BTreeMap<u32, Decimal>) -> Result<(), ReportError> {
        for (col, value) in cells {
            self.write_value_cell(CellAddress::new(row, col), None, value)?;
        }
        Ok(())
    }

    /// Writes `<c r=".." s=".."><v>value</v></c>`; formula and type are dropped.
    fn write_value_cell(
        &mut self,
        cell: CellAddress,
        style: Option<&str>,
        value: Decimal,
    ) -> Result<(), ReportError> {
        let c = self.tag("c");
        let v = self.tag("v");
        let reference = cell.to_string();

        let mut start = BytesStart::new(c.as_str());
        start.push_attribute(("r", reference.as_str()));
        if let Some(style) = style {
            start.push_attribute(("s", style));
        }
        self.emit(Event::Start(start))?;
        self.emit(Event::Start(BytesStart::new(v.as_str())))?;
        self.emit(Event::Text(BytesText::new(&value.normalize().to_string())))?;
        self.emit(Event::End(BytesEnd::new(v.as_str())))?;
        self.emit(Event::End(BytesEnd::new(c.as_str())))
    }

    fn finish(self) -> Result<String, ReportError> {
        String::from_utf8(self.writer.into_inner()).map_err(xml_error)
    }
}

/// Writes values into a worksheet part.
// TODO: re-home shared formulas whose master cell gets overwritten.
fn patch_sheet_xml(xml: &str, cells: &CellPatches) -> Result<String, ReportError> {
    let mut patcher = SheetPatcher::new(xml.len() + cells.len() * 48, cells);
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Eof => break,
            event => patcher.handle(event)?,
        }
    }
    patcher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="A1:E13"/><sheetData><row r="1" spans="1:5"><c r="A1" t="s"><v>0</v></c><c r="E1" s="3"><f>SUM(E2:E3)</f><v>0</v></c></row><row r="13" spans="1:5"><c r="C13"><v>7</v></c></row></sheetData><mergeCells count="1"><mergeCell ref="B5:D6"/></mergeCells></worksheet>"#;

    fn patches(data: &[(&str, Decimal)]) -> CellPatches {
        data.iter()
            .map(|(cell, value)| (cell.parse().unwrap(), *value))
            .collect()
    }

    #[test]
    fn test_replaces_formula_and_keeps_style() {
        let out = patch_sheet_xml(SHEET, &patches(&[("E1", dec!(1234.50))])).unwrap();

        assert!(out.contains(r#"<c r="E1" s="3"><v>1234.5</v></c>"#));
        assert!(!out.contains("<f>"));
        assert!(out.contains(r#"<c r="A1" t="s"><v>0</v></c>"#));
        assert!(out.contains(r#"<mergeCell ref="B5:D6"/>"#));
    }

    #[test]
    fn test_inserts_cells_in_column_order() {
        let out = patch_sheet_xml(SHEET, &patches(&[("B13", dec!(1)), ("E13", dec!(-2))])).unwrap();

        assert!(out.contains(
            r#"<row r="13"><c r="B13"><v>1</v></c><c r="C13"><v>7</v></c><c r="E13"><v>-2</v></c></row>"#
        ));
    }

    #[test]
    fn test_inserts_missing_rows_in_order() {
        let out = patch_sheet_xml(SHEET, &patches(&[("A5", dec!(5)), ("A20", dec!(20))])).unwrap();

        let row1 = out.find(r#"<row r="1""#).unwrap();
        let row5 = out.find(r#"<row r="5"><c r="A5"><v>5</v></c></row>"#).unwrap();
        let row13 = out.find(r#"<row r="13""#).unwrap();
        let row20 = out.find(r#"<row r="20"><c r="A20"><v>20</v></c></row>"#).unwrap();
        assert!(row1 < row5 && row5 < row13 && row13 < row20);
    }

    #[test]
    fn test_fills_empty_sheet_data() {
        let xml = r#"<worksheet xmlns="m"><sheetData/></worksheet>"#;
        let out = patch_sheet_xml(xml, &patches(&[("C2", dec!(3))])).unwrap();

        assert_eq!(
            out,
            r#"<worksheet xmlns="m"><sheetData><row r="2"><c r="C2"><v>3</v></c></row></sheetData></worksheet>"#
        );
    }

    #[test]
    fn test_keeps_namespace_prefix() {
        let xml = r#"<x:worksheet xmlns:x="m"><x:sheetData><x:row r="1"><x:c r="A1"><x:v>1</x:v></x:c></x:row></x:sheetData></x:worksheet>"#;
        let out = patch_sheet_xml(xml, &patches(&[("A1", dec!(9)), ("B1", dec!(8))])).unwrap();

        assert!(out.contains(r#"<x:row r="1"><x:c r="A1"><x:v>9</x:v></x:c><x:c r="B1"><x:v>8</x:v></x:c></x:row>"#));
    }

    #[test]
    fn test_merged_range_contains() {
        let range: CellRange = "B5:D6".parse().unwrap();
        assert!(range.contains(CellAddress::new(6, 3)));
        assert!(!range.contains(CellAddress::new(7, 3)));
        assert_eq!(range.first, CellAddress::new(5, 2));
    }

    #[test]
    fn test_full_calc_updates_existing_calc_pr() {
        let xml = r#"<workbook><sheets/><calcPr calcId="191029" fullCalcOnLoad="0"/></workbook>"#;
        let out = force_full_calc(xml).unwrap();
        assert_eq!(
            out,
            r#"<workbook><sheets/><calcPr calcId="191029" fullCalcOnLoad="1"/></workbook>"#
        );
    }

    #[test]
    fn test_full_calc_inserted_before_ext_lst() {
        let xml = r#"<workbook><sheets/><extLst><ext/></extLst></workbook>"#;
        let out = force_full_calc(xml).unwrap();
        assert_eq!(
            out,
            r#"<workbook><sheets/><calcPr fullCalcOnLoad="1"/><extLst><ext/></extLst></workbook>"#
        );
    }

    #[test]
    fn test_full_calc_appended_at_end() {
        let xml = r#"<workbook><sheets><sheet name="A"/></sheets></workbook>"#;
        let out = force_full_calc(xml).unwrap();
        assert_eq!(
            out,
            r#"<workbook><sheets><sheet name="A"/></sheets><calcPr fullCalcOnLoad="1"/></workbook>"#
        );
    }

    #[test]
    fn test_drop_calc_chain_entries() {
        let xml = r#"<Types><Override PartName="/xl/workbook.xml"/><Override PartName="/xl/calcChain.xml"/></Types>"#;
        let out = drop_calc_chain(xml, b"Override", b"PartName").unwrap();
        assert_eq!(out, r#"<Types><Override PartName="/xl/workbook.xml"/></Types>"#);
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_target("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn test_parse_workbook_sheets() {
        let xml = r#"<workbook xmlns:r="rel"><bookViews><workbookView activeTab="1"/></bookViews><sheets><sheet name="BILAN ACTIF" sheetId="1" r:id="rId1"/><sheet name="R&amp;D" sheetId="2" r:id="rId2"/></sheets></workbook>"#;
        let (sheets, active) = parse_workbook(xml).unwrap();

        assert_eq!(active, 1);
        assert_eq!(sheets[0], ("BILAN ACTIF".to_string(), "rId1".to_string()));
        assert_eq!(sheets[1].0, "R&D");
    }
}
