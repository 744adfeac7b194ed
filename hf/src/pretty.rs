//! HTML pretty-printer
//!
//! Parses markup with `scraper` (html5ever) and writes it back with two-space
//! indentation. Block content gets one node per line; runs of text and inline
//! elements stay together on one line with whitespace collapsed. `script` and
//! `style` bodies are written verbatim, as are `pre` and `textarea`.
//!
//! The output is a pure function of the input: same markup, same bytes.

use ego_tree::NodeRef;
use scraper::{Html, Node};
use scraper::node::Element;
use tracing::debug;

const INDENT: &str = "  ";

/// HTML5 void elements that don't have closing tags.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose content is written exactly as parsed.
const VERBATIM_ELEMENTS: &[&str] = &[
    "pre", "textarea", "script", "style", "noscript", "iframe", "noembed", "noframes", "xmp",
];

/// Raw text elements: content is not HTML-escaped.
///
/// `noscript` is raw because the parser runs with scripting enabled.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "iframe", "noembed", "noframes", "xmp"];

/// The parser drops one newline right after these start tags.
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["pre", "textarea"];

/// Elements that always open onto their own indented block.
const STRUCTURAL_ELEMENTS: &[&str] = &["html", "head", "body"];

/// Phrasing elements that stay on the line of the surrounding text.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark", "q", "s", "samp",
    "small", "span", "strong", "sub", "sup", "time", "u", "var", "wbr", "img", "button", "input", "label", "select",
    "output", "meter", "progress",
];

/// Attributes written without a value when present.
const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "async",
    "autofocus",
    "autoplay",
    "checked",
    "controls",
    "defer",
    "disabled",
    "hidden",
    "loop",
    "multiple",
    "muted",
    "novalidate",
    "open",
    "readonly",
    "required",
    "selected",
];

/// Reformat an HTML document
pub fn prettify(html: &str) -> String {
    debug!(len = html.len(), "prettify: called");
    let document = Html::parse_document(html);
    let mut printer = Printer::default();
    printer.children(document.tree.root(), 0);
    let out = printer.finish();
    debug!(len = out.len(), "prettify: done");
    out
}

#[derive(Default)]
struct Printer {
    lines: Vec<String>,
}

impl Printer {
    fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    fn line(&mut self, depth: usize, content: &str) {
        self.lines.push(format!("{}{}", INDENT.repeat(depth), content));
    }

    /// Write the children of `parent`, grouping inline runs onto single lines
    fn children(&mut self, parent: NodeRef<'_, Node>, depth: usize) {
        let mut run = String::new();
        for child in parent.children() {
            if is_inline(child) {
                write_inline(child, &mut run);
                continue;
            }
            self.flush_run(&mut run, depth);
            self.block(child, depth);
        }
        self.flush_run(&mut run, depth);
    }

    fn flush_run(&mut self, run: &mut String, depth: usize) {
        let trimmed = run.trim_matches(is_html_space);
        if !trimmed.is_empty() {
            let content = trimmed.to_string();
            self.line(depth, &content);
        }
        run.clear();
    }

    fn block(&mut self, node: NodeRef<'_, Node>, depth: usize) {
        match node.value() {
            Node::Doctype(doctype) => self.line(depth, &format!("<!DOCTYPE {}>", doctype.name())),
            Node::Element(element) => self.element(node, element, depth),
            Node::Comment(comment) => self.line(depth, &format!("<!--{}-->", &**comment)),
            Node::Text(text) => {
                let text = collapse_whitespace(text);
                let trimmed = text.trim_matches(is_html_space);
                if !trimmed.is_empty() {
                    self.line(depth, &escape_text(trimmed));
                }
            }
            _ => self.children(node, depth),
        }
    }

    fn element(&mut self, node: NodeRef<'_, Node>, element: &Element, depth: usize) {
        let name = element.name();
        let open = open_tag(element);

        if VOID_ELEMENTS.contains(&name) {
            self.line(depth, &open);
            return;
        }

        if VERBATIM_ELEMENTS.contains(&name) {
            let raw = RAW_TEXT_ELEMENTS.contains(&name);
            let mut inner = String::new();
            for child in node.children() {
                write_verbatim(child, raw, &mut inner);
            }
            if LEADING_NEWLINE_ELEMENTS.contains(&name) && inner.starts_with('\n') {
                inner.insert(0, '\n');
            }
            self.line(depth, &format!("{}{}</{}>", open, inner, name));
            return;
        }

        if !STRUCTURAL_ELEMENTS.contains(&name) && node.children().all(is_inline) {
            let mut inner = String::new();
            for child in node.children() {
                write_inline(child, &mut inner);
            }
            let inner = inner.trim_matches(is_html_space);
            self.line(depth, &format!("{}{}</{}>", open, inner, name));
            return;
        }

        self.line(depth, &open);
        self.children(node, depth + 1);
        self.line(depth, &format!("</{}>", name));
    }
}

/// Text, comments and phrasing elements made only of those
fn is_inline(node: NodeRef<'_, Node>) -> bool {
    match node.value() {
        Node::Text(_) | Node::Comment(_) => true,
        Node::Element(element) => INLINE_ELEMENTS.contains(&element.name()) && node.children().all(is_inline),
        _ => false,
    }
}

fn write_inline(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(&escape_text(&collapse_whitespace(text))),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Element(element) => {
            let name = element.name();
            out.push_str(&open_tag(element));
            if VOID_ELEMENTS.contains(&name) {
                return;
            }
            for child in node.children() {
                write_inline(child, out);
            }
            out.push_str(&format!("</{}>", name));
        }
        _ => {}
    }
}

fn write_verbatim(node: NodeRef<'_, Node>, raw: bool, out: &mut String) {
    match node.value() {
        Node::Text(text) if raw => out.push_str(text),
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Element(element) => {
            let name = element.name();
            out.push_str(&open_tag(element));
            if VOID_ELEMENTS.contains(&name) {
                return;
            }
            let raw = raw || RAW_TEXT_ELEMENTS.contains(&name);
            let mut inner = String::new();
            for child in node.children() {
                write_verbatim(child, raw, &mut inner);
            }
            if LEADING_NEWLINE_ELEMENTS.contains(&name) && inner.starts_with('\n') {
                out.push('\n');
            }
            out.push_str(&inner);
            out.push_str(&format!("</{}>", name));
        }
        _ => {}
    }
}

fn open_tag(element: &Element) -> String {
    let mut tag = format!("<{}", element.name());
    for (name, value) in element.attrs() {
        tag.push(' ');
        tag.push_str(name);
        if value.is_empty() && BOOLEAN_ATTRIBUTES.contains(&name) {
            continue;
        }
        tag.push_str("=\"");
        tag.push_str(&escape_attribute(value));
        tag.push('"');
    }
    tag.push('>');
    tag
}

/// ASCII whitespace as HTML defines it; U+00A0 is content
fn is_html_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{0C}')
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.chars() {
        if is_html_space(ch) {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\"><title>Document</title>\
        <link rel=\"stylesheet\" href=\"/assets/a.css\" /></head><body><div><p>Hello <b>World</b></p>\
        <ul><li>one</li><li>two</li></ul></div></body></html>";

    #[test]
    fn test_prettify_document() {
        let expected = "\
<!DOCTYPE html>
<html lang=\"en\">
  <head>
    <meta charset=\"UTF-8\">
    <title>Document</title>
    <link rel=\"stylesheet\" href=\"/assets/a.css\">
  </head>
  <body>
    <div>
      <p>Hello <b>World</b></p>
      <ul>
        <li>one</li>
        <li>two</li>
      </ul>
    </div>
  </body>
</html>
";
        assert_eq!(prettify(DOC), expected);
    }

    #[test]
    fn test_prettify_is_idempotent() {
        let once = prettify(DOC);
        assert_eq!(prettify(&once), once);
    }

    #[test]
    fn test_body_text_on_own_line() {
        let out = prettify("<!DOCTYPE html><html><head></head><body>\n\n   Hello   World \n</body></html>");
        assert!(out.contains("\n  <body>\n    Hello World\n  </body>\n"), "{}", out);
    }

    #[test]
    fn test_inline_run_between_blocks() {
        let out = prettify("<body><div>before <em>mid</em> after<p>para</p>tail</div></body>");
        assert!(out.contains("      before <em>mid</em> after\n      <p>para</p>\n      tail\n"), "{}", out);
    }

    #[test]
    fn test_script_and_pre_are_verbatim() {
        let out = prettify("<body><script>if (a < b) {\n  go();\n}</script><pre>  x\n    y &amp; z</pre></body>");
        assert!(out.contains("<script>if (a < b) {\n  go();\n}</script>"), "{}", out);
        assert!(out.contains("<pre>  x\n    y &amp; z</pre>"), "{}", out);
    }

    #[test]
    fn test_raw_text_elements_are_not_escaped() {
        let cases = [
            ("<body><noscript><img src=\"x.png\"></noscript></body>", "<noscript><img src=\"x.png\"></noscript>"),
            (
                "<body><iframe src=\"a.html\"><p>fallback & more</p></iframe></body>",
                "<iframe src=\"a.html\"><p>fallback & more</p></iframe>",
            ),
            ("<body><noembed><b>no</b> embed</noembed></body>", "<noembed><b>no</b> embed</noembed>"),
            ("<body><noframes><p>no frames</p></noframes></body>", "<noframes><p>no frames</p></noframes>"),
            ("<body><xmp><tag> & text</xmp></body>", "<xmp><tag> & text</xmp>"),
        ];
        for (input, expected) in cases {
            let out = prettify(input);
            assert!(out.contains(expected), "{}", out);
            assert_eq!(prettify(&out), out, "not stable: {}", input);
        }
    }

    #[test]
    fn test_noscript_in_head_is_raw() {
        let out = prettify("<html><head><noscript><link rel=\"stylesheet\" href=\"/x.css\"></noscript></head><body></body></html>");
        assert!(out.contains("<noscript><link rel=\"stylesheet\" href=\"/x.css\"></noscript>"), "{}", out);
    }

    #[test]
    fn test_leading_newline_in_pre_survives_reprinting() {
        let once = prettify("<body><pre>\n\nx</pre></body>");
        assert!(once.contains("<pre>\n\nx</pre>"), "{}", once);
        assert_eq!(prettify(&once), once);

        let once = prettify("<body><textarea>\n\nnote</textarea></body>");
        assert!(once.contains("<textarea>\n\nnote</textarea>"), "{}", once);
        assert_eq!(prettify(&once), once);
    }

    #[test]
    fn test_single_leading_newline_in_pre_is_dropped() {
        let out = prettify("<body><pre>\nx</pre></body>");
        assert!(out.contains("<pre>x</pre>"), "{}", out);
        assert_eq!(prettify(&out), out);
    }

    #[test]
    fn test_text_is_escaped() {
        let out = prettify("<body><p>a &lt; b &amp;&amp; c&nbsp;d</p></body>");
        assert!(out.contains("<p>a &lt; b &amp;&amp; c&nbsp;d</p>"), "{}", out);
    }

    #[test]
    fn test_boolean_and_empty_attributes() {
        let out = prettify("<body><input disabled type=\"checkbox\"><img alt=\"\" src=\"x.png\"></body>");
        assert!(out.contains("<input disabled type=\"checkbox\">"), "{}", out);
        assert!(out.contains("<img alt=\"\" src=\"x.png\">"), "{}", out);
    }

    #[test]
    fn test_comments_kept() {
        let out = prettify("<body><!-- note --><div>x</div></body>");
        assert!(out.contains("<!-- note -->"), "{}", out);
    }

    #[test]
    fn test_ends_with_single_newline() {
        let out = prettify("<p>x</p>");
        assert!(out.ends_with("</html>\n"));
        assert!(!out.ends_with("\n\n"));
    }
}
