//! Character source
//!
//! Decoded document text plus the encoding it was decoded with. Detection
//! order: byte order mark, transport charset, `<meta charset>` prescan,
//! configured default.

use encoding_rs::Encoding;

/// How far into the bytes the `<meta charset>` prescan looks
const PRESCAN_LIMIT: usize = 1024;

/// Where the source encoding came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingConfidence {
    /// Byte order mark or transport header
    Certain,
    /// `<meta charset>` prescan or the configured default
    Tentative,
    /// Source was handed over as text
    Irrelevant,
}

#[derive(Debug, Clone)]
pub struct TextSource {
    text: String,
    encoding: &'static Encoding,
    confidence: EncodingConfidence,
}

impl TextSource {
    /// Source already decoded
    pub fn from_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            encoding: encoding_rs::UTF_8,
            confidence: EncodingConfidence::Irrelevant,
        }
    }

    /// Decode `bytes`, detecting the encoding
    pub fn from_bytes(bytes: &[u8], charset: Option<&str>, default_encoding: &str) -> Self {
        let (encoding, confidence) = detect_encoding(bytes, charset, default_encoding);
        // decode() strips any BOM it finds
        let (text, used, had_errors) = encoding.decode(bytes);
        if had_errors {
            tracing::warn!(encoding = used.name(), "malformed bytes replaced while decoding source");
        }
        Self {
            text: text.into_owned(),
            encoding: used,
            confidence,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Canonical encoding name, e.g. `UTF-8`
    pub fn encoding(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn confidence(&self) -> EncodingConfidence {
        self.confidence
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Append text written into an open stream
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }
}

impl Default for TextSource {
    fn default() -> Self {
        Self::from_text("")
    }
}

fn detect_encoding(
    bytes: &[u8],
    charset: Option<&str>,
    default_encoding: &str,
) -> (&'static Encoding, EncodingConfidence) {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return (encoding, EncodingConfidence::Certain);
    }
    if let Some(encoding) = charset.and_then(|label| Encoding::for_label(label.trim().as_bytes())) {
        return (encoding, EncodingConfidence::Certain);
    }
    if let Some(encoding) = prescan_meta_charset(bytes) {
        return (encoding, EncodingConfidence::Tentative);
    }
    let fallback = Encoding::for_label(default_encoding.as_bytes()).unwrap_or(encoding_rs::UTF_8);
    (fallback, EncodingConfidence::Tentative)
}

/// Look for `charset=` inside a `<meta` tag near the top of the bytes
fn prescan_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(PRESCAN_LIMIT)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        let tag = &rest[start..];
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];
        if let Some(pos) = tag.find("charset=") {
            let value = tag[pos + "charset=".len()..].trim_start_matches(['"', '\'', ' ']);
            let end = value
                .find(|c: char| c == '"' || c == '\'' || c == ';' || c == '/' || c.is_whitespace())
                .unwrap_or(value.len());
            if let Some(encoding) = Encoding::for_label(value[..end].as_bytes()) {
                // UTF-16 labels in an ASCII-compatible prescan mean UTF-8
                if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
                    return Some(encoding_rs::UTF_8);
                }
                return Some(encoding);
            }
        }
        rest = &rest[start + "<meta".len()..];
    }
    None
}
