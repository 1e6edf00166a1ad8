use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, Result};
use crate::core::types::{Position, Token};

const MAGIC: &[u8; 4] = b"DDXI";
const VERSION: u16 = 1;
const HEADER_LEN: usize = 4 + 2 + 4;

/// Persisted form of a positional index.
///
/// JSON shape: `{ "index": { token: [positions] }, "document": [tokens] }`.
/// Either field may be absent in stored data; absence is resolved when the
/// blob is turned back into an index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexBlob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<BTreeMap<Token, Vec<Position>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Vec<Token>>,
}

impl IndexBlob {
    pub fn new(index: BTreeMap<Token, Vec<Position>>, document: Vec<Token>) -> Self {
        IndexBlob {
            index: Some(index),
            document: Some(document),
        }
    }

    pub fn token_count(&self) -> usize {
        self.document.as_ref().map_or(0, Vec::len)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Binary framing: magic, version, CRC32 of the payload, bincode payload.
    ///
    /// The payload is the `(index, document)` pair; bincode cannot skip absent
    /// fields the way the JSON form does.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(&(&self.index, &self.document))?;
        let checksum = crc32fast::hash(&payload);

        let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&checksum.to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
            return Err(Error::malformed_index("not a binary index blob"));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(Error::malformed_index(format!(
                "unsupported blob version {} (expected {})",
                version, VERSION
            )));
        }

        let expected = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let payload = &bytes[HEADER_LEN..];
        if crc32fast::hash(payload) != expected {
            return Err(Error::malformed_index("blob checksum mismatch"));
        }

        let (index, document) = bincode::deserialize(payload)?;
        Ok(IndexBlob { index, document })
    }
}
