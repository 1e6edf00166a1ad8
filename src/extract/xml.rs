use std::io::{Cursor, Read};
use quick_xml::events::BytesStart;
use zip::ZipArchive;
use zip::result::ZipError;
use crate::core::error::{Error, Result};

pub(crate) type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

pub(crate) fn open_archive(bytes: &[u8]) -> Result<Archive<'_>> {
    Ok(ZipArchive::new(Cursor::new(bytes))?)
}

pub(crate) fn read_entry(archive: &mut Archive<'_>, name: &str) -> Result<String> {
    read_optional_entry(archive, name)?
        .ok_or_else(|| Error::extraction(format!("archive has no '{}' part", name)))
}

pub(crate) fn read_optional_entry(archive: &mut Archive<'_>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|e| Error::extraction(format!("reading '{}': {}", name, e)))?;
    Ok(Some(xml))
}

/// Value of the attribute whose local name (prefix ignored) is `local`.
pub(crate) fn attribute(element: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::extraction(format!("malformed XML attribute: {}", e)))?;
        if attr.key.local_name().as_ref() == local {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
