use crate::errors::SdkError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;

type XmlResult = Result<(), quick_xml::Error>;

/// Thin wrapper over the quick-xml event writer for building the outbound
/// document in one pass.
pub(crate) struct XmlDocument {
    writer: Writer<Vec<u8>>,
}

impl XmlDocument {
    /// Starts a UTF-8 document with its XML declaration.
    pub fn new() -> Result<Self, quick_xml::Error> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        Ok(Self { writer })
    }

    pub fn open(&mut self, name: &str) -> XmlResult {
        self.open_with(name, &[])
    }

    pub fn open_with(&mut self, name: &str, attributes: &[(&str, &str)]) -> XmlResult {
        let start = start_tag(name, attributes);
        self.writer.write_event(Event::Start(start))
    }

    pub fn close(&mut self, name: &str) -> XmlResult {
        self.writer.write_event(Event::End(BytesEnd::new(name)))
    }

    /// Writes `<name>text</name>`, or `<name/>` for empty text.
    pub fn element(&mut self, name: &str, text: &str) -> XmlResult {
        self.element_with(name, &[], text)
    }

    /// Characters XML 1.0 does not allow are dropped from the text and the
    /// attribute values.
    pub fn element_with(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> XmlResult {
        let start = start_tag(name, attributes);
        let text = xml_chars(text);
        if text.is_empty() {
            return self.writer.write_event(Event::Empty(start));
        }
        self.writer.write_event(Event::Start(start))?;
        self.writer.write_event(Event::Text(BytesText::new(&text)))?;
        self.close(name)
    }

    /// Returns the document text with newlines removed.
    pub fn finish(self) -> Result<String, SdkError> {
        let bytes = self.writer.into_inner();
        let text = String::from_utf8(bytes).map_err(|e| SdkError::Render(e.to_string()))?;
        Ok(text.replace(&['\r', '\n'][..], ""))
    }
}

fn start_tag<'a>(name: &'a str, attributes: &[(&str, &str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for (key, value) in attributes {
        start.push_attribute((*key, xml_chars(value).as_ref()));
    }
    start
}

/// `Char` production of XML 1.0. Rust chars are never surrogates.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

fn xml_chars(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    }
}
