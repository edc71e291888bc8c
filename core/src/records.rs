use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::RecordError;
use crate::normalize::{self, de};
use crate::Endpoint;

/// A record read from one scan source. Validation happens at deserialization time.
pub trait ScanRecord: DeserializeOwned {
    /// Short source label used in diagnostics.
    const SOURCE: &'static str;

    fn endpoint(&self) -> Endpoint;

    fn from_json(value: Value) -> Result<Self, RecordError> {
        if !value.is_object() {
            return Err(RecordError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// One line of fingerprint output (dismap style).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FingerprintRecord {
    #[serde(deserialize_with = "de::host")]
    pub host: String,
    #[serde(deserialize_with = "de::port")]
    pub port: u16,
    #[serde(rename = "identify.string", alias = "identify_string", default, deserialize_with = "de::text")]
    pub identify_string: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub protocol: Option<String>,
    #[serde(rename = "banner.string", alias = "banner_string", default, deserialize_with = "de::text")]
    pub banner_string: Option<String>,
}

impl FingerprintRecord {
    pub fn is_protocol(&self, proto: &str) -> bool {
        self.protocol.as_deref() == Some(proto)
    }
}

impl ScanRecord for FingerprintRecord {
    const SOURCE: &'static str = "fingerprint";

    fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }
}

/// `tech` as emitted by HTTP probers: a single value or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tech {
    One(String),
    Many(Vec<String>),
}

impl Tech {
    pub fn tags(&self) -> Vec<&str> {
        match self {
            Tech::One(s) => vec![s.as_str()],
            Tech::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }

    /// Single space-joined string; empty lists and empty strings are absent.
    pub fn normalize(&self) -> Option<String> {
        normalize::join_tech(self.tags())
    }
}

/// One line of HTTP probe output (httpx style).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProbeRecord {
    #[serde(deserialize_with = "de::host")]
    pub host: String,
    #[serde(deserialize_with = "de::port")]
    pub port: u16,
    #[serde(default, deserialize_with = "de::text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub webserver: Option<String>,
    #[serde(default, deserialize_with = "de::tech")]
    pub tech: Option<Tech>,
    #[serde(default, deserialize_with = "de::count")]
    pub status_code: Option<u64>,
    #[serde(default, deserialize_with = "de::count")]
    pub content_length: Option<u64>,
}

impl ScanRecord for ProbeRecord {
    const SOURCE: &'static str = "probe";

    fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }
}

/// Probe-sourced columns of a merged row, already normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeFields {
    pub url: Option<String>,
    pub title: Option<String>,
    pub webserver: Option<String>,
    pub tech: Option<String>,
    pub status_code: Option<u64>,
    pub content_length: Option<u64>,
}

const COLLECT_SEP: &str = " | ";

impl ProbeFields {
    /// Combine every probe seen for one endpoint. Text columns keep distinct values in
    /// observation order; numeric columns keep the first value present.
    pub fn collect<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ProbeRecord>,
    {
        let mut out = ProbeFields::default();
        let (mut urls, mut titles, mut servers, mut tags) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
        for r in records {
            normalize::push_distinct(&mut urls, r.url.as_deref());
            normalize::push_distinct(&mut titles, r.title.as_deref());
            normalize::push_distinct(&mut servers, r.webserver.as_deref());
            if let Some(t) = &r.tech {
                for tag in t.tags() {
                    normalize::push_distinct(&mut tags, Some(tag));
                }
            }
            out.status_code = out.status_code.or(r.status_code);
            out.content_length = out.content_length.or(r.content_length);
        }
        out.url = normalize::join_distinct(&urls, COLLECT_SEP);
        out.title = normalize::join_distinct(&titles, COLLECT_SEP);
        out.webserver = normalize::join_distinct(&servers, COLLECT_SEP);
        out.tech = normalize::join_tech(tags);
        out
    }
}

impl From<&ProbeRecord> for ProbeFields {
    fn from(r: &ProbeRecord) -> Self {
        ProbeFields {
            url: r.url.clone(),
            title: r.title.clone(),
            webserver: r.webserver.clone(),
            tech: r.tech.as_ref().and_then(Tech::normalize),
            status_code: r.status_code,
            content_length: r.content_length,
        }
    }
}

/// A single output row. Absent fields are omitted from JSON and left blank in tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergedRecord {
    pub host: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identify_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webserver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_note: Option<String>,
}

/// One table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(u64),
    Empty,
}

impl<'a> Cell<'a> {
    fn text(v: &'a Option<String>) -> Self {
        v.as_deref().map_or(Cell::Empty, Cell::Text)
    }

    fn number(v: Option<u64>) -> Self {
        v.map_or(Cell::Empty, Cell::Number)
    }
}

impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Empty => Ok(()),
        }
    }
}

impl MergedRecord {
    pub const COLUMNS: [&'static str; 12] = [
        "host",
        "port",
        "identify_string",
        "protocol",
        "banner_string",
        "url",
        "title",
        "webserver",
        "tech",
        "status_code",
        "content_length",
        "redirect_note",
    ];

    pub fn from_fingerprint(fp: &FingerprintRecord) -> Self {
        MergedRecord {
            host: fp.host.clone(),
            port: fp.port,
            identify_string: fp.identify_string.clone(),
            protocol: fp.protocol.clone(),
            banner_string: fp.banner_string.clone(),
            ..Default::default()
        }
    }

    /// Row for a probed endpoint that no fingerprint record covers.
    pub fn probe_only(endpoint: &Endpoint, fields: &ProbeFields) -> Self {
        MergedRecord { host: endpoint.host.clone(), port: endpoint.port, ..Default::default() }
            .with_probe(Some(fields))
    }

    pub fn with_probe(mut self, fields: Option<&ProbeFields>) -> Self {
        if let Some(p) = fields {
            self.url = p.url.clone();
            self.title = p.title.clone();
            self.webserver = p.webserver.clone();
            self.tech = p.tech.clone();
            self.status_code = p.status_code;
            self.content_length = p.content_length;
        }
        self
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    pub fn has_fingerprint(&self) -> bool {
        self.identify_string.is_some() || self.protocol.is_some() || self.banner_string.is_some()
    }

    /// The row as ordered `(column, cell)` pairs matching [`MergedRecord::COLUMNS`].
    pub fn cells(&self) -> [(&'static str, Cell<'_>); 12] {
        let c = Self::COLUMNS;
        [
            (c[0], Cell::Text(&self.host)),
            (c[1], Cell::Number(u64::from(self.port))),
            (c[2], Cell::text(&self.identify_string)),
            (c[3], Cell::text(&self.protocol)),
            (c[4], Cell::text(&self.banner_string)),
            (c[5], Cell::text(&self.url)),
            (c[6], Cell::text(&self.title)),
            (c[7], Cell::text(&self.webserver)),
            (c[8], Cell::text(&self.tech)),
            (c[9], Cell::number(self.status_code)),
            (c[10], Cell::number(self.content_length)),
            (c[11], Cell::text(&self.redirect_note)),
        ]
    }
}
