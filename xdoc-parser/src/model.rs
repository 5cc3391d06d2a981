use std::fmt;

use serde::{
    Serialize,
    ser::{SerializeMap, Serializer},
};

/// Attribute names understood by the xdoc vocabulary.
pub mod attribute {
    /// Title of a `section` or `subsection`.
    pub const NAME: &str = "name";
    /// Target of an anchor.
    pub const HREF: &str = "href";
    /// Source of an image.
    pub const SRC: &str = "src";
    /// Alternate text of an image.
    pub const ALT: &str = "alt";
    /// Highlighting language of a `pre` block.
    pub const LANGUAGE: &str = "language";
}

/// The fixed set of xdoc elements that carry meaning for converters.
///
/// Element names are matched ignoring ASCII case, so `<Section>` and
/// `<SECTION>` both resolve to [`Tag::Section`]. Anything outside this set is
/// not an error, converters simply skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Body,
    Section,
    Subsection,
    Strong,
    Bold,
    Emphasis,
    Code,
    Paragraph,
    Preformatted,
    ListItem,
    UnorderedList,
    Table,
    TableRow,
    TableHeader,
    TableData,
    Anchor,
    Image,
}

impl Tag {
    /// Every known tag, in vocabulary order.
    pub const ALL: [Tag; 17] = [
        Tag::Body,
        Tag::Section,
        Tag::Subsection,
        Tag::Strong,
        Tag::Bold,
        Tag::Emphasis,
        Tag::Code,
        Tag::Paragraph,
        Tag::Preformatted,
        Tag::ListItem,
        Tag::UnorderedList,
        Tag::Table,
        Tag::TableRow,
        Tag::TableHeader,
        Tag::TableData,
        Tag::Anchor,
        Tag::Image,
    ];

    /// The element name as written in xdoc sources.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Tag::Body => "body",
            Tag::Section => "section",
            Tag::Subsection => "subsection",
            Tag::Strong => "strong",
            Tag::Bold => "b",
            Tag::Emphasis => "em",
            Tag::Code => "code",
            Tag::Paragraph => "p",
            Tag::Preformatted => "pre",
            Tag::ListItem => "li",
            Tag::UnorderedList => "ul",
            Tag::Table => "table",
            Tag::TableRow => "tr",
            Tag::TableHeader => "th",
            Tag::TableData => "td",
            Tag::Anchor => "a",
            Tag::Image => "img",
        }
    }

    /// Resolve an element name to a tag, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attributes of an element, in document order.
///
/// Lookups are case-sensitive, the same way SAX `Attributes::getValue` works.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Create an empty attribute list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute. Duplicates are kept; [`Attributes::get`] returns the first.
    pub fn push<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.0.push((name.into(), value.into()));
    }

    /// Value of the attribute called `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Number of attributes, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the element carried no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for Attributes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One structural event of an xdoc document.
///
/// This is the owned form of the calls a [`Handler`](crate::Handler) receives;
/// [`events`](crate::events) collects a whole document into a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// An element opened, with its attributes in source order.
    Start { name: String, attributes: Attributes },
    /// An element closed.
    End { name: String },
    /// A run of character data, references resolved.
    Text { content: String },
}

/// A line/column position, both 1-based. Columns count characters, not bytes.
#[derive(Debug, Default, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Position of the byte `offset` inside `input`.
    ///
    /// Offsets past the end (or inside a multi-byte character) are clamped to
    /// the closest preceding character boundary.
    #[must_use]
    pub fn at_offset(input: &str, offset: usize) -> Self {
        let mut offset = offset.min(input.len());
        while !input.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = input.get(..offset).unwrap_or_default();
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before
            .get(line_start..)
            .map_or(0, |rest| rest.chars().count())
            + 1;
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line: {}, column: {}", self.line, self.column)
    }
}

/// A span of the source document.
#[derive(Debug, Default, Clone, Hash, Eq, PartialEq, Serialize)]
#[non_exhaustive]
pub struct Location {
    /// Byte offset where the span starts.
    pub absolute_start: usize,
    /// Byte offset where the span ends (exclusive).
    pub absolute_end: usize,

    pub start: Position,
    pub end: Position,
}

impl Location {
    /// Build the location of the byte range `start..end` of `input`.
    #[must_use]
    pub fn from_offsets(input: &str, start: usize, end: usize) -> Self {
        let end = end.max(start);
        Self {
            absolute_start: start,
            absolute_end: end,
            start: Position::at_offset(input, start),
            end: Position::at_offset(input, end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest::rstest]
    #[case("body", Some(Tag::Body))]
    #[case("BODY", Some(Tag::Body))]
    #[case("SubSection", Some(Tag::Subsection))]
    #[case("b", Some(Tag::Bold))]
    #[case("Img", Some(Tag::Image))]
    #[case("ol", None)]
    #[case("", None)]
    fn test_tag_from_name(#[case] name: &str, #[case] expected: Option<Tag>) {
        assert_eq!(Tag::from_name(name), expected);
    }

    #[test]
    fn test_tag_names_round_trip() {
        for tag in Tag::ALL {
            assert_eq!(Tag::from_name(tag.name()), Some(tag));
        }
    }

    #[test]
    fn test_attributes_lookup_is_case_sensitive() {
        let attributes: Attributes = [("href", "https://x"), ("HREF", "other")]
            .into_iter()
            .collect();
        assert_eq!(attributes.get("href"), Some("https://x"));
        assert_eq!(attributes.get("HREF"), Some("other"));
        assert_eq!(attributes.get("Href"), None);
    }

    #[test]
    fn test_attributes_serialize_as_map() -> Result<(), serde_json::Error> {
        let mut attributes = Attributes::new();
        attributes.push("src", "icon.png");
        attributes.push("alt", "Icon");
        assert_eq!(
            serde_json::to_string(&attributes)?,
            r#"{"src":"icon.png","alt":"Icon"}"#
        );
        Ok(())
    }

    #[test]
    fn test_position_at_offset() {
        let input = "<body>\n  <p>héllo</p>\n</body>";
        assert_eq!(Position::at_offset(input, 0), Position { line: 1, column: 1 });
        assert_eq!(Position::at_offset(input, 9), Position { line: 2, column: 3 });
        // "é" is two bytes, columns count characters
        let after_accent = input.find("llo").unwrap_or_default();
        assert_eq!(
            Position::at_offset(input, after_accent),
            Position { line: 2, column: 8 }
        );
        assert_eq!(
            Position::at_offset(input, 10_000),
            Position { line: 3, column: 8 }
        );
    }
}
