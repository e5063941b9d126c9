//! Markup tree backing the editable surface.
//!
//! The parser is deliberately lenient: anything it cannot read as a tag is kept
//! as text, unmatched closing tags are dropped and unclosed elements are closed
//! at the end of input. It never fails.

use indexmap::IndexMap;

pub type Attrs = IndexMap<String, String>;

pub const NBSP: char = '\u{a0}';
pub const ZERO_WIDTH_SPACE: char = '\u{200b}';

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "div",
    "dl",
    "fieldset",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(std::slice::from_ref(self), &mut out);
        out
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Node::Element(value)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Attrs,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        let mut tag = tag.into();
        tag.make_ascii_lowercase();
        Self {
            tag,
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attrs.shift_remove(name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }

    pub fn is_block(&self) -> bool {
        is_block_tag(&self.tag)
    }

    /// `Some(false)` for `contenteditable="false"`, `Some(true)` for any other
    /// value, `None` when the attribute is absent.
    pub fn editable(&self) -> Option<bool> {
        self.attr("contenteditable")
            .map(|value| !value.eq_ignore_ascii_case("false"))
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        serialize(&self.children)
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_element(&mut out, self);
        out
    }

    /// Sets one declaration inside the `style` attribute, keeping the others.
    pub fn set_style_property(&mut self, property: &str, value: &str) {
        let mut declarations: Vec<String> = self
            .attr("style")
            .unwrap_or("")
            .split(';')
            .map(str::trim)
            .filter(|decl| !decl.is_empty())
            .filter(|decl| {
                decl.split(':')
                    .next()
                    .is_none_or(|name| !name.trim().eq_ignore_ascii_case(property))
            })
            .map(str::to_string)
            .collect();
        declarations.push(format!("{property}: {value}"));
        self.set_attr("style", format!("{};", declarations.join("; ")));
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
            Node::Comment(_) => {}
        }
    }
}

pub fn parse_fragment(src: &str) -> Vec<Node> {
    let mut open: Vec<Element> = vec![Element::new("#fragment")];
    let mut rest = src;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            let (comment, tail) = match after.find("-->") {
                Some(end) => (&after[..end], &after[end + 3..]),
                None => (after, ""),
            };
            push_node(&mut open, Node::Comment(comment.to_string()));
            rest = tail;
            continue;
        }

        if let Some(after) = rest.strip_prefix("</") {
            if let Some((tag, tail)) = closing_tag(after) {
                close_element(&mut open, &tag);
                rest = tail;
                continue;
            }
        } else if let Some(after) = rest.strip_prefix('<') {
            if let Some((element, self_closing, tail)) = opening_tag(after) {
                if self_closing || element.is_void() {
                    push_node(&mut open, Node::Element(element));
                } else {
                    open.push(element);
                }
                rest = tail;
                continue;
            }
        }

        let first_len = rest.chars().next().map_or(1, char::len_utf8);
        let end = rest[first_len..]
            .find('<')
            .map_or(rest.len(), |ix| ix + first_len);
        push_text(&mut open, &decode_entities(&rest[..end]));
        rest = &rest[end..];
    }

    while open.len() > 1 {
        if let Some(el) = open.pop() {
            push_node(&mut open, Node::Element(el));
        }
    }
    open.pop().map(|root| root.children).unwrap_or_default()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

fn closing_tag(src: &str) -> Option<(String, &str)> {
    let name_len = src.find(|c: char| !is_name_char(c)).unwrap_or(src.len());
    if name_len == 0 {
        return None;
    }
    let end = src[name_len..].find('>')? + name_len;
    Some((src[..name_len].to_ascii_lowercase(), &src[end + 1..]))
}

fn opening_tag(src: &str) -> Option<(Element, bool, &str)> {
    if !src.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let name_len = src.find(|c: char| !is_name_char(c)).unwrap_or(src.len());
    let mut element = Element::new(&src[..name_len]);
    let mut rest = &src[name_len..];

    loop {
        rest = rest.trim_start();
        if let Some(tail) = rest.strip_prefix("/>") {
            return Some((element, true, tail));
        }
        if let Some(tail) = rest.strip_prefix('>') {
            return Some((element, false, tail));
        }
        if let Some(tail) = rest.strip_prefix('/') {
            rest = tail;
            continue;
        }

        let name_len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '=' | '>' | '/'))
            .unwrap_or(rest.len());
        if name_len == 0 {
            return None;
        }
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let value = match rest.strip_prefix('=') {
            Some(tail) => {
                let tail = tail.trim_start();
                let (raw, after) = match tail.chars().next() {
                    Some(quote @ ('"' | '\'')) => {
                        let body = &tail[1..];
                        let end = body.find(quote)?;
                        (&body[..end], &body[end + 1..])
                    }
                    _ => {
                        let end = tail
                            .find(|c: char| c.is_whitespace() || c == '>')
                            .unwrap_or(tail.len());
                        (&tail[..end], &tail[end..])
                    }
                };
                rest = after;
                decode_entities(raw)
            }
            None => String::new(),
        };
        element.attrs.entry(name).or_insert(value);
    }
}

fn push_node(open: &mut [Element], node: Node) {
    if let Some(parent) = open.last_mut() {
        parent.children.push(node);
    }
}

fn push_text(open: &mut [Element], text: &str) {
    let Some(parent) = open.last_mut() else {
        return;
    };
    if let Some(Node::Text(prev)) = parent.children.last_mut() {
        prev.push_str(text);
    } else {
        parent.children.push(Node::Text(text.to_string()));
    }
}

fn close_element(open: &mut Vec<Element>, tag: &str) {
    let Some(depth) = open.iter().skip(1).rposition(|el| el.tag == tag) else {
        return;
    };
    let target = depth + 1;
    while open.len() > target {
        if let Some(el) = open.pop() {
            push_node(open, Node::Element(el));
        }
    }
}

/// Decodes numeric and named character references against the full HTML
/// entity table. Anything that is not a reference stays as written.
pub fn decode_entities(src: &str) -> String {
    html_escape::decode_html_entities(src).into_owned()
}

pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_nodes(&mut out, nodes);
    out
}

pub fn write_nodes(out: &mut String, nodes: &[Node]) {
    for node in nodes {
        match node {
            Node::Text(text) => escape_text(out, text),
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            Node::Element(el) => write_element(out, el),
        }
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_attr(out, value);
        out.push('"');
    }
    out.push('>');
    if el.is_void() {
        return;
    }
    write_nodes(out, &el.children);
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn escape_text(out: &mut String, text: &str) {
    for (ix, chunk) in text.split(NBSP).enumerate() {
        if ix > 0 {
            out.push_str("&nbsp;");
        }
        html_escape::encode_text_to_string(chunk, out);
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for (ix, chunk) in value.split(NBSP).enumerate() {
        if ix > 0 {
            out.push_str("&nbsp;");
        }
        html_escape::encode_double_quoted_attribute_to_string(chunk, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_markup_round_trips() {
        let src = r#"<p class="lead">hi <b>there</b><br>next&nbsp;line</p><!--note--><hr>"#;
        assert_eq!(serialize(&parse_fragment(src)), src);
    }

    #[test]
    fn entities_decode_into_text() {
        let nodes = parse_fragment("a &amp; b &lt;c&gt; &#64;&#x41;&emsp;");
        assert_eq!(nodes, vec![Node::text("a & b <c> @A\u{2003}")]);
    }

    #[test]
    fn named_entities_survive_reserialization() {
        let nodes = parse_fragment("it&rsquo;s caf&eacute; &laquo;ok&raquo;");
        assert_eq!(nodes, vec![Node::text("it\u{2019}s caf\u{e9} \u{ab}ok\u{bb}")]);
        assert_eq!(serialize(&nodes), "it\u{2019}s caf\u{e9} \u{ab}ok\u{bb}");
    }

    #[test]
    fn unknown_entities_stay_literal() {
        let nodes = parse_fragment("fish &chips; & more");
        assert_eq!(nodes, vec![Node::text("fish &chips; & more")]);
    }

    #[test]
    fn stray_angle_brackets_are_text() {
        let nodes = parse_fragment("a < b <3 </ c");
        assert_eq!(nodes, vec![Node::text("a < b <3 </ c")]);
        assert_eq!(serialize(&nodes), "a &lt; b &lt;3 &lt;/ c");
    }

    #[test]
    fn unclosed_and_unmatched_tags_are_repaired() {
        let nodes = parse_fragment("<p><b>bold</i> text</p></div>tail");
        assert_eq!(serialize(&nodes), "<p><b>bold text</b></p>tail");
    }

    #[test]
    fn attributes_keep_order_and_accept_all_quoting_styles() {
        let nodes = parse_fragment("<a href='x.html' target=_blank data-flag>x</a>");
        let Some(Node::Element(a)) = nodes.first() else {
            panic!("expected anchor");
        };
        let names: Vec<&str> = a.attrs.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["href", "target", "data-flag"]);
        assert_eq!(a.attr("target"), Some("_blank"));
        assert_eq!(a.attr("data-flag"), Some(""));
        assert_eq!(
            a.outer_html(),
            r#"<a href="x.html" target="_blank" data-flag="">x</a>"#
        );
    }

    #[test]
    fn self_closing_and_void_elements_take_no_children() {
        let nodes = parse_fragment("<img src=\"a.png\"/>after<br>x");
        assert_eq!(nodes.len(), 4);
        assert_eq!(serialize(&nodes), "<img src=\"a.png\">after<br>x");
    }

    #[test]
    fn style_property_replaces_existing_declaration() {
        let mut el = Element::new("p").with_attr("style", "color: red; text-align: left");
        el.set_style_property("text-align", "center");
        assert_eq!(el.attr("style"), Some("color: red; text-align: center;"));
    }

    #[test]
    fn editable_flag_reads_contenteditable() {
        let token = Element::new("span").with_attr("contenteditable", "false");
        assert_eq!(token.editable(), Some(false));
        assert_eq!(Element::new("span").editable(), None);
    }
}
