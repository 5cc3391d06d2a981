use std::borrow::Cow;

use quick_xml::{
    Reader,
    escape::{resolve_predefined_entity, unescape},
    events::{BytesRef, BytesStart, Event as XmlEvent},
};

use crate::{
    error::{Detail, Error},
    handler::Handler,
    model::{Attributes, Location},
};

/// An element that has been opened but not closed yet.
struct OpenElement {
    name: String,
    start: usize,
    end: usize,
}

/// Walks `input` with quick-xml and forwards its events to `handler`.
///
/// Text is accumulated until the next element boundary so the handler sees
/// one `characters()` call per run, whatever mix of plain text, CDATA and
/// references produced it.
#[tracing::instrument(skip_all, fields(bytes = input.len()))]
pub(crate) fn drive<H>(input: &str, handler: &mut H) -> Result<(), H::Error>
where
    H: Handler,
    H::Error: From<Error>,
{
    let mut reader = Reader::from_str(input);
    let config = reader.config_mut();
    config.expand_empty_elements = true;
    // End tags are matched against our own stack so the error carries a location
    config.check_end_names = false;

    let mut open: Vec<OpenElement> = Vec::new();
    let mut text = String::new();
    let mut elements = 0_usize;

    handler.start_document()?;
    loop {
        let start = offset(reader.buffer_position());
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                let at = offset(reader.error_position());
                let end = offset(reader.buffer_position());
                return Err(Error::Syntax(detail(input, at, end), e.to_string()).into());
            }
        };
        let end = offset(reader.buffer_position());

        match event {
            XmlEvent::Start(element) => {
                flush_text(&mut text, handler)?;
                let name = element_name(&element);
                let attributes = read_attributes(&reader, &element, &name)
                    .map_err(|message| Error::InvalidAttribute(detail(input, start, end), name.clone(), message))?;
                handler.start_element(&name, &attributes)?;
                elements += 1;
                open.push(OpenElement { name, start, end });
            }
            XmlEvent::Empty(element) => {
                flush_text(&mut text, handler)?;
                let name = element_name(&element);
                let attributes = read_attributes(&reader, &element, &name)
                    .map_err(|message| Error::InvalidAttribute(detail(input, start, end), name.clone(), message))?;
                handler.start_element(&name, &attributes)?;
                handler.end_element(&name)?;
                elements += 1;
            }
            XmlEvent::End(element) => {
                flush_text(&mut text, handler)?;
                let found = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                match open.pop() {
                    Some(expected) if expected.name == found => handler.end_element(&found)?,
                    Some(expected) => {
                        return Err(Error::MismatchedEndTag {
                            detail: detail(input, start, end),
                            expected: expected.name,
                            found,
                        }
                        .into());
                    }
                    None => {
                        return Err(Error::UnexpectedEndTag(detail(input, start, end), found).into());
                    }
                }
            }
            XmlEvent::Text(content) => {
                let decoded = content
                    .decode()
                    .map_err(|e| Error::Syntax(detail(input, start, end), e.to_string()))?;
                text.push_str(&normalize_line_endings(&decoded));
            }
            XmlEvent::CData(content) => {
                let decoded = content
                    .decode()
                    .map_err(|e| Error::Syntax(detail(input, start, end), e.to_string()))?;
                text.push_str(&normalize_line_endings(&decoded));
            }
            XmlEvent::GeneralRef(reference) => {
                resolve_reference(&reference, &mut text)
                    .map_err(|name| Error::UnknownEntity(detail(input, start, end), name))?;
            }
            XmlEvent::Comment(_)
            | XmlEvent::Decl(_)
            | XmlEvent::PI(_)
            | XmlEvent::DocType(_) => {}
            XmlEvent::Eof => break,
        }
    }

    flush_text(&mut text, handler)?;
    if let Some(unclosed) = open.pop() {
        return Err(Error::UnclosedElement(
            detail(input, unclosed.start, unclosed.end),
            unclosed.name,
        )
        .into());
    }
    tracing::debug!(elements, "document read");
    handler.end_document()
}

fn flush_text<H>(text: &mut String, handler: &mut H) -> Result<(), H::Error>
where
    H: Handler,
{
    if text.is_empty() {
        return Ok(());
    }
    let result = handler.characters(text);
    text.clear();
    result
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

fn read_attributes(
    reader: &Reader<&[u8]>,
    element: &BytesStart<'_>,
    element_name: &str,
) -> Result<Attributes, String> {
    let mut attributes = Attributes::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let name = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let raw = reader
            .decoder()
            .decode(&attribute.value)
            .map_err(|e| format!("attribute `{name}`: {e}"))?;
        // Literal whitespace is normalized before references are expanded,
        // so `&#10;` still yields a line feed
        let value = unescape(&normalize_attribute_whitespace(&raw))
            .map_err(|e| format!("attribute `{name}`: {e}"))?
            .into_owned();
        tracing::trace!(element = element_name, %name, %value, "attribute");
        attributes.push(name, value);
    }
    Ok(attributes)
}

/// Append the text a `&...;` reference stands for, or return its name when it
/// is neither a character reference nor one of the predefined XML entities.
fn resolve_reference(reference: &BytesRef<'_>, text: &mut String) -> Result<(), String> {
    let name = reference
        .decode()
        .map_err(|e| e.to_string())?
        .into_owned();
    match reference.resolve_char_ref() {
        Ok(Some(ch)) => {
            text.push(ch);
            Ok(())
        }
        Ok(None) => match resolve_predefined_entity(&name) {
            Some(replacement) => {
                text.push_str(replacement);
                Ok(())
            }
            None => Err(name),
        },
        Err(_) => Err(name),
    }
}

/// Turn `\r\n` and lone `\r` into `\n`, as XML end-of-line handling requires.
fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Replace each literal tab, line feed, carriage return or CRLF pair of an
/// attribute value with one space.
fn normalize_attribute_whitespace(raw: &str) -> Cow<'_, str> {
    if raw.contains(['\t', '\n', '\r']) {
        Cow::Owned(
            raw.replace("\r\n", " ")
                .replace(['\t', '\n', '\r'], " "),
        )
    } else {
        Cow::Borrowed(raw)
    }
}

fn detail(input: &str, start: usize, end: usize) -> Detail {
    Detail {
        location: Location::from_offsets(input, start, end),
    }
}

fn offset(position: u64) -> usize {
    usize::try_from(position).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use crate::{Error, Event, events};
    use pretty_assertions::assert_eq;

    fn start(name: &str, attributes: &[(&str, &str)]) -> Event {
        Event::Start {
            name: name.to_string(),
            attributes: attributes.iter().copied().collect(),
        }
    }

    fn end(name: &str) -> Event {
        Event::End {
            name: name.to_string(),
        }
    }

    fn text(content: &str) -> Event {
        Event::Text {
            content: content.to_string(),
        }
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_events_in_document_order() -> Result<(), Error> {
        let events = events(r#"<body><section name="Intro"><p>Hello</p></section></body>"#)?;
        assert_eq!(
            events,
            vec![
                start("body", &[]),
                start("section", &[("name", "Intro")]),
                start("p", &[]),
                text("Hello"),
                end("p"),
                end("section"),
                end("body"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_empty_element_is_start_then_end() -> Result<(), Error> {
        let events = events(r#"<p><img src="a.png" alt="A"/></p>"#)?;
        assert_eq!(
            events,
            vec![
                start("p", &[]),
                start("img", &[("src", "a.png"), ("alt", "A")]),
                end("img"),
                end("p"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_text_entities_and_cdata_are_coalesced() -> Result<(), Error> {
        let events = events("<p>Tom &amp; Jerry&#33; <![CDATA[<raw>]]> &#x41;</p>")?;
        assert_eq!(
            events,
            vec![start("p", &[]), text("Tom & Jerry! <raw> A"), end("p")]
        );
        Ok(())
    }

    #[test]
    fn test_attribute_values_are_unescaped() -> Result<(), Error> {
        let events = events(r#"<a href="https://x/?a=1&amp;b=2">x</a>"#)?;
        assert_eq!(
            events.first(),
            Some(&start("a", &[("href", "https://x/?a=1&b=2")]))
        );
        Ok(())
    }

    #[test]
    fn test_whitespace_is_delivered_verbatim() -> Result<(), Error> {
        let events = events("<pre>  a\n    b  </pre>")?;
        assert_eq!(
            events,
            vec![start("pre", &[]), text("  a\n    b  "), end("pre")]
        );
        Ok(())
    }

    #[test]
    fn test_line_endings_are_normalized() -> Result<(), Error> {
        let events = events("<pre>a\r\nb\rc<![CDATA[\r\nd]]>&#13;</pre>")?;
        assert_eq!(
            events,
            vec![start("pre", &[]), text("a\nb\nc\nd\r"), end("pre")]
        );
        Ok(())
    }

    #[rstest::rstest]
    #[case("<section name=\"A\nB\"/>", "A B")]
    #[case("<section name=\"A\r\n\tB\"/>", "A  B")]
    #[case("<section name=\"A&#10;B\"/>", "A\nB")]
    #[case("<section name=\"A &amp; B\"/>", "A & B")]
    fn test_attribute_whitespace_is_normalized(
        #[case] source: &str,
        #[case] expected: &str,
    ) -> Result<(), Error> {
        let events = events(source)?;
        assert_eq!(
            events.first(),
            Some(&start("section", &[("name", expected)]))
        );
        Ok(())
    }

    #[test]
    fn test_comments_and_declarations_are_skipped() -> Result<(), Error> {
        let events = events(
            "<?xml version=\"1.0\"?><!DOCTYPE document><document><!-- note --><body/></document>",
        )?;
        assert_eq!(
            events,
            vec![
                start("document", &[]),
                start("body", &[]),
                end("body"),
                end("document"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_mismatched_end_tag() {
        let result = events("<body>\n  <p>text</section>\n</body>");
        match result {
            Err(Error::MismatchedEndTag {
                detail,
                expected,
                found,
            }) => {
                assert_eq!(expected, "p");
                assert_eq!(found, "section");
                assert_eq!(detail.location.start.line, 2);
                assert_eq!(detail.location.start.column, 10);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_end_tag() {
        let result = events("<p>text</p></body>");
        assert!(
            matches!(result, Err(Error::UnexpectedEndTag(_, ref name)) if name == "body"),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn test_unclosed_element_points_at_start_tag() {
        let result = events("<body>\n<section name=\"a\">\n<p>text</p>");
        match result {
            Err(Error::UnclosedElement(detail, name)) => {
                assert_eq!(name, "section");
                assert_eq!(detail.location.start.line, 2);
                assert_eq!(detail.location.start.column, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_entity() {
        let result = events("<p>&nbsp;</p>");
        assert!(
            matches!(result, Err(Error::UnknownEntity(_, ref name)) if name == "nbsp"),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let result = events("<p attr=>text</p>");
        assert!(result.is_err(), "unexpected result: {result:?}");
        if let Err(error) = result {
            assert!(error.location().is_some());
        }
    }
}
