use quick_xml::Reader;
use quick_xml::events::Event;
use crate::core::error::Result;
use crate::extract::xml::{open_archive, read_entry};

const DOCUMENT_PART: &str = "word/document.xml";

/// Body paragraphs in document order, joined by single spaces.
///
/// Paragraphs inside tables are not part of the body paragraph list and are skipped.
pub fn extract(bytes: &[u8]) -> Result<String> {
    let mut archive = open_archive(bytes)?;
    let xml = read_entry(&mut archive, DOCUMENT_PART)?;
    Ok(body_paragraphs(&xml)?.join(" "))
}

fn body_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();

    let mut current: Option<String> = None;
    let mut paragraph_depth = 0usize;
    let mut table_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"p" if table_depth == 0 => {
                    paragraph_depth += 1;
                    if paragraph_depth == 1 {
                        current = Some(String::new());
                    }
                }
                b"t" => in_text = current.is_some(),
                _ => {}
            },
            Event::Empty(e) => {
                if let Some(text) = current.as_mut() {
                    match e.local_name().as_ref() {
                        b"tab" => text.push('\t'),
                        b"br" | b"cr" => text.push('\n'),
                        _ => {}
                    }
                }
                // <w:p/> is an empty paragraph
                if table_depth == 0 && paragraph_depth == 0 && e.local_name().as_ref() == b"p" {
                    paragraphs.push(String::new());
                }
            }
            Event::Text(t) if in_text => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"p" if table_depth == 0 && paragraph_depth > 0 => {
                    paragraph_depth -= 1;
                    if paragraph_depth == 0 {
                        if let Some(text) = current.take() {
                            paragraphs.push(text);
                        }
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
