use std::collections::HashMap;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use quick_xml::Reader;
use quick_xml::events::Event;
use crate::core::error::{Error, Result};
use crate::extract::xml::{attribute, open_archive, read_entry, read_optional_entry};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const STYLES_PART: &str = "xl/styles.xml";

// Serial of 10000-01-01 in the 1900 date system.
const MAX_DATE_SERIAL: f64 = 2_958_466.0;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Every non-empty cell value of every sheet, sheets in workbook order and
/// cells row-major, joined by single spaces.
///
/// Formula cells contribute their cached result. Numbers contribute their
/// stored decimal form, except numbers styled as dates or times, which are
/// rendered as `YYYY-MM-DD HH:MM:SS` (or `HH:MM:SS` for a bare time).
pub fn extract(bytes: &[u8]) -> Result<String> {
    let mut archive = open_archive(bytes)?;

    let date_styles = match read_optional_entry(&mut archive, STYLES_PART)? {
        Some(xml) => date_styles(&xml)?,
        None => Vec::new(),
    };

    let shared = match read_optional_entry(&mut archive, SHARED_STRINGS_PART)? {
        Some(xml) => shared_strings(&xml)?,
        None => Vec::new(),
    };

    let workbook = read_entry(&mut archive, WORKBOOK_PART)?;
    let rels = read_entry(&mut archive, WORKBOOK_RELS_PART)?;
    let sheets = sheet_parts(&workbook, &rels)?;

    let mut values = Vec::new();
    for part in sheets {
        let xml = read_entry(&mut archive, &part)?;
        collect_cell_values(&xml, &shared, &date_styles, &mut values)?;
    }

    Ok(values.join(" "))
}

/// Archive paths of the worksheets, in the order the workbook lists them.
fn sheet_parts(workbook: &str, rels: &str) -> Result<Vec<String>> {
    let mut targets: HashMap<String, String> = HashMap::new();
    let mut reader = Reader::from_str(rels);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attribute(&e, b"Id")?, attribute(&e, b"Target")?) {
                    targets.insert(id, resolve_target(&target));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut parts = Vec::new();
    let mut reader = Reader::from_str(workbook);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let id = attribute(&e, b"id")?
                    .ok_or_else(|| Error::extraction("workbook sheet has no relationship id"))?;
                let part = targets.get(&id)
                    .ok_or_else(|| Error::extraction(format!("workbook sheet '{}' has no target", id)))?;
                parts.push(part.clone());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(parts)
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// Shared string table; rich-text runs are concatenated, phonetic hints dropped.
fn shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"rPh" => in_phonetic = true,
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(t) if in_text && !in_phonetic => {
                if let Some(s) = current.as_mut() {
                    s.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.extend(current.take()),
                b"rPh" => in_phonetic = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

/// One flag per `cellXfs` entry: does its number format show a date or time?
fn date_styles(xml: &str) -> Result<Vec<bool>> {
    let mut reader = Reader::from_str(xml);
    let mut custom: HashMap<u32, bool> = HashMap::new();
    let mut styles = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = true,
            Event::End(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = false,
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"numFmt" => {
                    let id = attribute(&e, b"numFmtId")?.and_then(|v| v.parse::<u32>().ok());
                    if let (Some(id), Some(code)) = (id, attribute(&e, b"formatCode")?) {
                        custom.insert(id, is_date_format(&code));
                    }
                }
                b"xf" if in_cell_xfs => {
                    let id = attribute(&e, b"numFmtId")?
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(0);
                    styles.push(custom.get(&id).copied().unwrap_or_else(|| is_builtin_date_format(id)));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(styles)
}

// Built-in date (14-22) and time (45-47) formats.
fn is_builtin_date_format(id: u32) -> bool {
    matches!(id, 14..=22 | 45..=47)
}

/// A custom format shows a date or time if a `d m y h s` placeholder survives
/// once quoted text, escaped and fill characters, and bracketed sections such
/// as colors and locales are removed. `[h]`, `[mm]`, `[ss]` count as time.
fn is_date_format(code: &str) -> bool {
    let mut chars = code.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for quoted in chars.by_ref() {
                    if quoted == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let section: String = chars.by_ref().take_while(|&b| b != ']').collect();
                if matches!(section.to_ascii_lowercase().as_str(), "h" | "hh" | "m" | "mm" | "s" | "ss") {
                    return true;
                }
            }
            c if matches!(c.to_ascii_lowercase(), 'd' | 'm' | 'y' | 'h' | 's') => return true,
            _ => {}
        }
    }
    false
}

/// 1900 date system serial → text. Serials below 60 shift by a day to undo
/// the fictitious 1900-02-29; fractions below one day are bare times.
fn serial_to_text(raw: &str) -> Option<String> {
    let value: f64 = raw.trim().parse().ok()?;
    if !(0.0..MAX_DATE_SERIAL).contains(&value) {
        return None;
    }

    let mut days = value.floor() as i64;
    let millis = ((value - value.floor()) * MILLIS_PER_DAY as f64).round() as i64;
    if value < 1.0 && millis < MILLIS_PER_DAY {
        let time = NaiveTime::from_num_seconds_from_midnight_opt((millis / 1000) as u32, 0)?;
        return Some(time.format("%H:%M:%S").to_string());
    }
    if value > 0.0 && value < 60.0 {
        days += 1;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let at = epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::milliseconds(millis))?;
    Some(at.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// `t="d"` cells hold ISO 8601 text.
fn iso_date_text(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(at) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return at.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d 00:00:00").to_string();
    }
    raw.to_string()
}

#[derive(Default)]
struct Cell {
    kind: String,
    style: Option<usize>,
    raw: String,
}

fn collect_cell_values(xml: &str, shared: &[String], date_styles: &[bool], out: &mut Vec<String>) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    let mut cell: Option<Cell> = None;
    let mut in_value = false;
    let mut in_inline_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"c" => {
                    cell = Some(Cell {
                        kind: attribute(&e, b"t")?.unwrap_or_else(|| "n".to_string()),
                        style: attribute(&e, b"s")?.and_then(|s| s.parse().ok()),
                        raw: String::new(),
                    });
                }
                b"v" => in_value = cell.is_some(),
                b"t" => in_inline_text = cell.as_ref().is_some_and(|c| c.kind == "inlineStr"),
                _ => {}
            },
            Event::Text(t) if in_value || in_inline_text => {
                if let Some(c) = cell.as_mut() {
                    c.raw.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"c" => {
                    if let Some(c) = cell.take() {
                        let value = cell_value(c, shared, date_styles)?;
                        if !value.is_empty() {
                            out.push(value);
                        }
                    }
                }
                b"v" => in_value = false,
                b"t" => in_inline_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(())
}

fn cell_value(cell: Cell, shared: &[String], date_styles: &[bool]) -> Result<String> {
    match cell.kind.as_str() {
        "s" => {
            if cell.raw.trim().is_empty() {
                return Ok(String::new());
            }
            let idx: usize = cell.raw.trim().parse()
                .map_err(|_| Error::extraction(format!("invalid shared string index '{}'", cell.raw)))?;
            shared.get(idx)
                .cloned()
                .ok_or_else(|| Error::extraction(format!("shared string {} out of range", idx)))
        }
        "b" => Ok(match cell.raw.trim() {
            "1" => "True".to_string(),
            "0" => "False".to_string(),
            other => other.to_string(),
        }),
        "d" => Ok(iso_date_text(&cell.raw)),
        "n" if cell.style.and_then(|s| date_styles.get(s)).copied().unwrap_or(false) => {
            Ok(serial_to_text(&cell.raw).unwrap_or(cell.raw))
        }
        _ => Ok(cell.raw),
    }
}
