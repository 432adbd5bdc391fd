//! XML feed decoding: charset detection, document model, value normalization.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1251};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;

use currencier_types::{Currency, SourceErrorKind};

/// Root `<ValCurs>` element.
#[derive(Debug, Deserialize)]
struct ValCurs {
    #[serde(rename = "Valute", default)]
    valutes: Vec<Valute>,
}

/// One `<Valute ID="...">` entry, values still in feed format.
///
/// Every field is optional here so that a bad entry is reported against its
/// id rather than failing the whole document.
#[derive(Debug, Deserialize)]
struct Valute {
    #[serde(rename = "@ID", default)]
    id: Option<String>,
    #[serde(rename = "NumCode", default)]
    num_code: Option<String>,
    #[serde(rename = "CharCode", default)]
    char_code: Option<String>,
    #[serde(rename = "Nominal", default)]
    nominal: Option<String>,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Value", default)]
    value: Option<String>,
}

/// Parses an optional integer field; missing or blank yields `default`.
fn parse_int(field: &str, raw: Option<&str>, default: i32) -> Result<i32, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| format!("invalid {} {:?}: {}", field, raw, e)),
    }
}

impl Valute {
    /// `position` labels entries that carry neither an id nor a char code.
    fn into_currency(self, position: usize) -> Result<Currency, SourceErrorKind> {
        let id = self.id.unwrap_or_default().trim().to_string();
        let char_code = self.char_code.unwrap_or_default().trim().to_string();
        let entry = if !id.is_empty() {
            id.clone()
        } else if !char_code.is_empty() {
            char_code.clone()
        } else {
            format!("#{}", position + 1)
        };
        let parse_error = |message: String| SourceErrorKind::Parse {
            entry: entry.clone(),
            message,
        };

        if id.is_empty() {
            return Err(parse_error("missing ID attribute".into()));
        }
        let num_code = parse_int("NumCode", self.num_code.as_deref(), 0).map_err(parse_error)?;
        let nominal = parse_int("Nominal", self.nominal.as_deref(), 1).map_err(parse_error)?;
        if nominal < 1 {
            return Err(parse_error(format!(
                "nominal must be at least 1, got {}",
                nominal
            )));
        }
        let raw_value = self
            .value
            .ok_or_else(|| parse_error("missing Value".into()))?;
        let value = parse_rate(&raw_value).map_err(parse_error)?;

        Ok(Currency {
            id,
            num_code,
            char_code,
            nominal,
            name: self.name.unwrap_or_default().trim().to_string(),
            value,
        })
    }
}

/// Parses a feed rate such as `"90,5012"` into a rate rounded to 2 decimals.
///
/// Both `,` and `.` are accepted as the decimal separator. Rounding is half
/// away from zero.
pub fn parse_rate(raw: &str) -> Result<f64, String> {
    let normalized = raw.trim().replacen(',', ".", 1);
    let rate: f64 = normalized
        .parse()
        .map_err(|e| format!("invalid value {:?}: {}", raw, e))?;

    if !rate.is_finite() || rate < 0.0 {
        return Err(format!("value {:?} is not a non-negative finite number", raw));
    }

    Ok((rate * 100.0).round() / 100.0)
}

/// Returns the encoding declared in the XML prolog.
///
/// Documents without a declaration are treated as UTF-8. Only UTF-8 and
/// windows-1251 are accepted.
pub fn detect_charset(document: &[u8]) -> Result<&'static Encoding, SourceErrorKind> {
    let mut reader = Reader::from_reader(document);
    let mut buf = Vec::new();

    let label = match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => match decl.encoding() {
            Some(Ok(label)) => String::from_utf8_lossy(&label).trim().to_ascii_lowercase(),
            Some(Err(e)) => {
                return Err(SourceErrorKind::Decode(format!(
                    "malformed XML declaration: {}",
                    e
                )));
            }
            None => return Ok(UTF_8),
        },
        Ok(_) => return Ok(UTF_8),
        Err(e) => return Err(SourceErrorKind::Decode(format!("can't read XML: {}", e))),
    };

    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) if encoding == WINDOWS_1251 || encoding == UTF_8 => Ok(encoding),
        _ => Err(SourceErrorKind::Decode(format!("unknown charset: {}", label))),
    }
}

/// Decodes a raw feed document into canonical records.
pub fn decode_feed(document: &[u8]) -> Result<Vec<Currency>, SourceErrorKind> {
    let encoding = detect_charset(document)?;
    let (text, _, had_errors) = encoding.decode(document);
    if had_errors {
        return Err(SourceErrorKind::Decode(format!(
            "document is not valid {}",
            encoding.name()
        )));
    }

    let curs: ValCurs = quick_xml::de::from_str(&text)
        .map_err(|e| SourceErrorKind::Decode(format!("can't extract xml data: {}", e)))?;

    if curs.valutes.is_empty() {
        return Err(SourceErrorKind::EmptyResult);
    }

    curs.valutes
        .into_iter()
        .enumerate()
        .map(|(position, valute)| valute.into_currency(position))
        .collect()
}
