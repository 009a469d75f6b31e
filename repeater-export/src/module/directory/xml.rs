//! XML directory backend (przemienniki.net RXF export)
//!
//! Every `<repeater>` element is read regardless of where it sits in the
//! document. Inside it we pick up:
//!
//! ```xml
//! <repeater>
//!   <qra>SR9KR</qra>
//!   <mode>fm,dmr</mode>
//!   <qrg type="rx">145.6875</qrg>
//!   <qrg type="tx">145.0875</qrg>
//!   <location><latitude>50.08</latitude><longitude>19.90</longitude></location>
//! </repeater>
//! ```

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::Event;

use super::error::DirectoryError;
use super::http::{DirectoryHttp, with_query};
use super::types::{FieldValue, Repeater};
use super::{BackendKind, DirectoryBackend};
use crate::config::{QueryParams, ZoneConfig};
use crate::module::codeplug::{ChannelType, ModeTable};

pub const DEFAULT_XML_ENDPOINT: &str = "https://przemienniki.net/export/rxf.xml";
const DEFAULT_MODE: &str = "all";

/// A `<qrg>` element: frequency text plus its `type` attribute
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Qrg {
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawXmlRepeater {
    pub qra: String,
    pub mode: String,
    pub latitude: String,
    pub longitude: String,
    pub qrg: Vec<Qrg>,
}

/// Parse the export body into raw entries.
pub fn parse_xml_export(body: &str) -> Result<Vec<RawXmlRepeater>, DirectoryError> {
    read_repeaters(body).map_err(|e| DirectoryError::parse_failure("XML", e, body))
}

fn read_repeaters(body: &str) -> quick_xml::Result<Vec<RawXmlRepeater>> {
    let mut reader = Reader::from_str(body);
    let mut repeaters = Vec::new();
    let mut saw_element = false;
    // Open elements outside of a <repeater>; read_repeater consumes its own end tag
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                saw_element = true;
                if e.name().as_ref() == b"repeater" {
                    repeaters.push(read_repeater(&mut reader)?);
                } else {
                    depth += 1;
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Empty(_) => saw_element = true,
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_element || depth != 0 {
        return Err(quick_xml::Error::Syntax(quick_xml::errors::SyntaxError::UnclosedTag));
    }

    Ok(repeaters)
}

fn element_text(reader: &mut Reader<&[u8]>, e: &quick_xml::events::BytesStart) -> quick_xml::Result<String> {
    let raw = reader.read_text(e.name())?;
    Ok(unescape(raw.trim())?.into_owned())
}

fn read_repeater(reader: &mut Reader<&[u8]>) -> quick_xml::Result<RawXmlRepeater> {
    let mut repeater = RawXmlRepeater::default();
    let mut in_location = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"qra" => repeater.qra = element_text(reader, &e)?,
                b"mode" => repeater.mode = element_text(reader, &e)?,
                b"location" => in_location = true,
                b"latitude" if in_location => repeater.latitude = element_text(reader, &e)?,
                b"longitude" if in_location => repeater.longitude = element_text(reader, &e)?,
                b"qrg" => {
                    let mut kind = String::new();
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == b"type" {
                            kind = attr.unescape_value()?.into_owned();
                        }
                    }
                    let value = element_text(reader, &e)?;
                    repeater.qrg.push(Qrg { kind, value });
                }
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"location" => in_location = false,
                b"repeater" => break,
                _ => {}
            },
            Event::Eof => {
                return Err(quick_xml::Error::Syntax(quick_xml::errors::SyntaxError::UnclosedTag));
            }
            _ => {}
        }
    }

    Ok(repeater)
}

fn frequency(qrg: &[Qrg], kind: &str) -> FieldValue {
    qrg.iter()
        .find(|q| q.kind.trim().eq_ignore_ascii_case(kind))
        .map(|q| FieldValue::from_text(&q.value))
        .unwrap_or_default()
}

/// CTCSS is not part of the export, so tones are always absent.
pub fn normalize_xml(raw: RawXmlRepeater) -> Repeater {
    Repeater {
        rx_frequency: frequency(&raw.qrg, "rx"),
        tx_frequency: frequency(&raw.qrg, "tx"),
        latitude: FieldValue::from_text(&raw.latitude),
        longitude: FieldValue::from_text(&raw.longitude),
        modes: raw
            .mode
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect(),
        callsign: raw.qra,
        rx_ctcss: None,
        tx_ctcss: None,
    }
}

pub struct XmlBackend {
    http: DirectoryHttp,
    endpoint: String,
    mode: String,
    modes: ModeTable,
}

impl XmlBackend {
    pub fn new(params: &QueryParams) -> Result<Self, DirectoryError> {
        Ok(Self {
            http: DirectoryHttp::new(params)?,
            endpoint: params
                .xml_endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_XML_ENDPOINT.to_string()),
            mode: params.mode.clone().unwrap_or_else(|| DEFAULT_MODE.to_string()),
            modes: ModeTable::standard().with("mototrbo", ChannelType::Digital),
        })
    }

    pub fn request_url(&self, zone: &ZoneConfig) -> String {
        let query = format!(
            "latitude={}&longitude={}&range={}&mode={}",
            zone.latitude,
            zone.longitude,
            zone.max_distance,
            urlencoding::encode(&self.mode)
        );
        with_query(&self.endpoint, &query)
    }
}

#[async_trait]
impl DirectoryBackend for XmlBackend {
    type Entry = RawXmlRepeater;

    fn name(&self) -> &str {
        BackendKind::Xml.as_str()
    }

    async fn fetch(&self, zone: &ZoneConfig) -> Result<Vec<RawXmlRepeater>, DirectoryError> {
        let url = self.request_url(zone);
        tracing::info!("Querying {} with URL: {}", zone.name, url);

        let body = self.http.get_text(&url).await?;
        parse_xml_export(&body)
    }

    fn normalize(&self, entry: RawXmlRepeater) -> Repeater {
        normalize_xml(entry)
    }

    fn modes(&self) -> &ModeTable {
        &self.modes
    }
}
