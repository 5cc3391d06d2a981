use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use crossterm::style::Stylize;
use xdoc_parser::{Attributes, Event};

use crate::error;

/// Show the element tree an xdoc document streams as
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Input xdoc file
    pub file: PathBuf,

    /// Print the raw event stream as JSON lines instead of a tree
    #[arg(long)]
    pub json: bool,

    /// Maximum depth to display (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub max_depth: usize,
}

/// Element tree rebuilt from the event stream.
#[derive(Debug, PartialEq, Eq)]
enum Node {
    Element {
        name: String,
        attributes: Attributes,
        children: Vec<Node>,
    },
    Text(String),
}

/// Nest `events` back into a tree. Whitespace-only text is dropped.
fn build_tree(events: Vec<Event>) -> Vec<Node> {
    let mut stack: Vec<(String, Attributes, Vec<Node>)> = Vec::new();
    let mut roots = Vec::new();

    for event in events {
        let node = match event {
            Event::Start { name, attributes } => {
                stack.push((name, attributes, Vec::new()));
                continue;
            }
            Event::Text { content } if content.trim().is_empty() => continue,
            Event::Text { content } => Node::Text(content),
            Event::End { .. } => match stack.pop() {
                Some((name, attributes, children)) => Node::Element {
                    name,
                    attributes,
                    children,
                },
                None => continue,
            },
        };
        match stack.last_mut() {
            Some((_, _, children)) => children.push(node),
            None => roots.push(node),
        }
    }
    roots
}

struct TreePrinter<W: Write> {
    writer: W,
    depth: usize,
    is_last_stack: Vec<bool>,
    max_depth: usize,
}

impl<W: Write> TreePrinter<W> {
    fn new(writer: W, max_depth: usize) -> Self {
        Self {
            writer,
            depth: 0,
            is_last_stack: Vec::new(),
            max_depth,
        }
    }

    fn should_show(&self) -> bool {
        self.max_depth == 0 || self.depth <= self.max_depth
    }

    fn print_tree_line(&mut self, name: &str, detail: Option<&str>) -> io::Result<()> {
        if !self.should_show() {
            return Ok(());
        }

        // Print tree structure: ├─, └─, │
        for i in 0..self.depth {
            let is_last = self.is_last_stack.get(i) == Some(&true);
            let segment = match (i + 1 == self.depth, is_last) {
                (true, true) => "└─ ",
                (true, false) => "├─ ",
                (false, true) => "   ",
                (false, false) => "│  ",
            };
            write!(self.writer, "{segment}")?;
        }

        write!(self.writer, "{}", name.cyan().bold())?;

        if let Some(d) = detail {
            write!(self.writer, ": {}", d.yellow())?;
        }

        writeln!(self.writer)
    }

    fn with_child<F>(&mut self, is_last: bool, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.is_last_stack.push(is_last);
        self.depth += 1;
        let result = f(self);
        self.is_last_stack.pop();
        self.depth -= 1;
        result
    }

    fn print_nodes(&mut self, nodes: &[Node]) -> io::Result<()> {
        for (i, node) in nodes.iter().enumerate() {
            let is_last = i + 1 == nodes.len();
            self.with_child(is_last, |printer| printer.print_node(node))?;
        }
        Ok(())
    }

    fn print_node(&mut self, node: &Node) -> io::Result<()> {
        match node {
            Node::Element {
                name,
                attributes,
                children,
            } => {
                let detail = attributes
                    .iter()
                    .map(|(key, value)| format!("{key}=\"{}\"", truncate(value, 40)))
                    .collect::<Vec<_>>()
                    .join(" ");
                self.print_tree_line(name, (!detail.is_empty()).then_some(detail.as_str()))?;
                self.print_nodes(children)
            }
            Node::Text(text) => {
                let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
                self.print_tree_line("Text", Some(&truncate(&collapsed, 50)))
            }
        }
    }
}

/// Truncate text for display
fn truncate(text: &str, max_len: usize) -> String {
    let length = text.chars().count();
    if length <= max_len {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_len).collect();
        format!("{head}... ({length} chars)")
    }
}

fn write_json_lines<W: Write>(mut writer: W, events: &[Event]) -> io::Result<()> {
    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writeln!(writer)?;
    }
    Ok(())
}

pub fn run(args: &Args) -> miette::Result<()> {
    let content = fs::read_to_string(&args.file).map_err(|e| error::report(&e, None))?;
    let events = xdoc_parser::events(&content)
        .map_err(|e| error::report(&e, Some((args.file.as_path(), &content))))?;

    let stdout = io::stdout();
    let result = if args.json {
        write_json_lines(stdout.lock(), &events)
    } else {
        let mut printer = TreePrinter::new(stdout.lock(), args.max_depth);
        writeln!(printer.writer, "{}", "Document".blue().bold())
            .and_then(|()| printer.print_nodes(&build_tree(events)))
    };
    result.map_err(|e| error::report(&e, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(source: &str, max_depth: usize) -> Result<String, Box<dyn std::error::Error>> {
        let events = xdoc_parser::events(source)?;
        let mut output = Vec::new();
        TreePrinter::new(&mut output, max_depth).print_nodes(&build_tree(events))?;
        // Strip the ANSI styling to compare the layout
        let text = String::from_utf8(output)?;
        let mut plain = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                plain.push(c);
            }
        }
        Ok(plain)
    }

    #[test]
    fn test_build_tree() -> Result<(), xdoc_parser::Error> {
        let events = xdoc_parser::events("<body>\n  <p>Hi</p>\n</body>")?;
        assert_eq!(
            build_tree(events),
            vec![Node::Element {
                name: "body".into(),
                attributes: Attributes::new(),
                children: vec![Node::Element {
                    name: "p".into(),
                    attributes: Attributes::new(),
                    children: vec![Node::Text("Hi".into())],
                }],
            }]
        );
        Ok(())
    }

    #[test]
    fn test_tree_layout() -> Result<(), Box<dyn std::error::Error>> {
        let tree = render(
            r#"<body><section name="Intro"><p>Hello</p><p>World</p></section></body>"#,
            0,
        )?;
        assert_eq!(
            tree,
            "└─ body\n   └─ section: name=\"Intro\"\n      ├─ p\n      │  └─ Text: Hello\n      └─ p\n         └─ Text: World\n"
        );
        Ok(())
    }

    #[test]
    fn test_max_depth() -> Result<(), Box<dyn std::error::Error>> {
        let tree = render("<body><p>Hello</p></body>", 1)?;
        assert_eq!(tree, "└─ body\n");
        Ok(())
    }

    #[rstest::rstest]
    #[case("short", 10, "short")]
    #[case("éèàùç", 2, "éè... (5 chars)")]
    fn test_truncate(#[case] text: &str, #[case] max_len: usize, #[case] expected: &str) {
        assert_eq!(truncate(text, max_len), expected);
    }

    #[test]
    fn test_json_lines() -> Result<(), Box<dyn std::error::Error>> {
        let events = xdoc_parser::events(r#"<a href="x">y</a>"#)?;
        let mut output = Vec::new();
        write_json_lines(&mut output, &events)?;
        assert_eq!(
            String::from_utf8(output)?,
            "{\"event\":\"start\",\"name\":\"a\",\"attributes\":{\"href\":\"x\"}}\n\
             {\"event\":\"text\",\"content\":\"y\"}\n\
             {\"event\":\"end\",\"name\":\"a\"}\n"
        );
        Ok(())
    }
}
