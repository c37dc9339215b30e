//! Styled text for store descriptions.
//!
//! Store descriptions arrive as HTML. They are flattened into a list of runs,
//! each carrying a font and emphasis flags, so the presentation layer never
//! has to interpret markup. Headings map onto a fixed font ladder.

use scraper::{ElementRef, Html, Node};
use serde::{Deserialize, Serialize};

/// Font of a run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Font {
    LargeTitle,
    Title,
    Title2,
    Title3,
    #[default]
    Body,
}

impl Font {
    /// Font for an HTML heading level. Levels past 4 render as body text.
    pub fn for_heading(level: u8) -> Font {
        match level {
            1 => Font::LargeTitle,
            2 => Font::Title,
            3 => Font::Title2,
            4 => Font::Title3,
            _ => Font::Body,
        }
    }

    fn is_body(&self) -> bool {
        *self == Font::Body
    }
}

/// A span of text sharing one style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "Font::is_body")]
    pub font: Font,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText {
    pub runs: Vec<TextRun>,
}

impl RichText {
    /// Unstyled text as a single body run
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return RichText::default();
        }
        RichText {
            runs: vec![TextRun {
                text,
                font: Font::Body,
                bold: false,
                italic: false,
            }],
        }
    }

    /// Convert an HTML fragment into styled runs.
    ///
    /// Block elements (paragraphs, headings, list items, line breaks) become
    /// newlines; whitespace inside text collapses the way a browser would.
    /// Scripts and styles are dropped.
    pub fn from_html(html: &str) -> Self {
        let fragment = Html::parse_fragment(html);
        let mut builder = RunBuilder::default();
        builder.walk(fragment.root_element(), Style::default());
        builder.finish()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|run| run.text.is_empty())
    }

    /// The text without any styling
    pub fn to_plain_string(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Style {
    font: Font,
    bold: bool,
    italic: bool,
}

#[derive(Default)]
struct RunBuilder {
    runs: Vec<TextRun>,
    /// A collapsed space is owed before the next visible character, styled
    /// like the text the whitespace came from
    pending_space: Option<Style>,
}

impl RunBuilder {
    fn walk(&mut self, element: ElementRef<'_>, style: Style) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text, style),
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        self.walk_element(child_element, style);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_element(&mut self, element: ElementRef<'_>, style: Style) {
        let name = element.value().name();
        let mut inner = style;

        match name {
            "script" | "style" | "head" => return,
            "br" => {
                self.push_newline(style);
                return;
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<u8>().unwrap_or(6);
                inner.font = Font::for_heading(level);
                inner.bold = inner.bold || level > 4;
            }
            "b" | "strong" => inner.bold = true,
            "i" | "em" => inner.italic = true,
            _ => {}
        }

        let is_block = matches!(
            name,
            "p" | "div"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "ul"
                | "ol"
                | "li"
                | "blockquote"
        );

        if is_block {
            self.break_block();
        }
        if name == "li" {
            self.append("• ", inner);
        }

        self.walk(element, inner);

        if is_block {
            self.break_block();
        }
    }

    fn push_text(&mut self, text: &str, style: Style) {
        let mut collapsed = String::with_capacity(text.len());
        for c in text.chars() {
            if c.is_whitespace() {
                self.pending_space.get_or_insert(style);
                continue;
            }
            if let Some(space_style) = self.pending_space.take() {
                if !collapsed.is_empty() {
                    collapsed.push(' ');
                } else if !self.at_line_start() {
                    self.append(" ", space_style);
                }
            }
            collapsed.push(c);
        }

        if !collapsed.is_empty() {
            self.append(&collapsed, style);
        }
    }

    fn push_newline(&mut self, style: Style) {
        self.pending_space = None;
        self.append("\n", style);
    }

    /// Start a new line unless already at one. The newline joins the
    /// preceding run so headings keep their own font up to the break.
    fn break_block(&mut self) {
        self.pending_space = None;
        if let Some(last) = self.runs.last_mut() {
            if !last.text.ends_with('\n') {
                last.text.push('\n');
            }
        }
    }

    fn at_line_start(&self) -> bool {
        match self.runs.last() {
            Some(run) => run.text.ends_with('\n'),
            None => true,
        }
    }

    fn append(&mut self, text: &str, style: Style) {
        if let Some(last) = self.runs.last_mut() {
            if last.font == style.font && last.bold == style.bold && last.italic == style.italic
            {
                last.text.push_str(text);
                return;
            }
        }
        self.runs.push(TextRun {
            text: text.to_string(),
            font: style.font,
            bold: style.bold,
            italic: style.italic,
        });
    }

    fn finish(mut self) -> RichText {
        // Trailing block breaks carry no content
        while let Some(last) = self.runs.last_mut() {
            let trimmed_len = last.text.trim_end_matches('\n').len();
            last.text.truncate(trimmed_len);
            if last.text.is_empty() {
                self.runs.pop();
            } else {
                break;
            }
        }
        RichText { runs: self.runs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paragraph() {
        let text = RichText::from_html("<p>Nine   distinct\n classes</p>");
        assert_eq!(text.to_plain_string(), "Nine distinct classes");
        assert_eq!(text.runs.len(), 1);
        assert_eq!(text.runs[0].font, Font::Body);
    }

    #[test]
    fn test_heading_levels_map_to_fonts() {
        let text = RichText::from_html(
            "<h1>One</h1><h2>Two</h2><h3>Three</h3><h4>Four</h4><p>Body</p>",
        );
        let fonts: Vec<(Font, &str)> = text
            .runs
            .iter()
            .map(|run| (run.font, run.text.trim_end_matches('\n')))
            .collect();
        assert_eq!(
            fonts,
            vec![
                (Font::LargeTitle, "One"),
                (Font::Title, "Two"),
                (Font::Title2, "Three"),
                (Font::Title3, "Four"),
                (Font::Body, "Body"),
            ]
        );
        assert_eq!(text.to_plain_string(), "One\nTwo\nThree\nFour\nBody");
    }

    #[test]
    fn test_inline_emphasis_and_breaks() {
        let text = RichText::from_html("Play <b>free</b> now<br>or <i>later</i>");
        assert_eq!(text.to_plain_string(), "Play free now\nor later");
        assert!(text.runs.iter().any(|run| run.bold && run.text == "free"));
        assert!(text.runs.iter().any(|run| run.italic && run.text == "later"));
    }

    #[test]
    fn test_list_items_and_scripts() {
        let text = RichText::from_html(
            "<ul><li>Scout</li><li>Heavy</li></ul><script>alert(1)</script>",
        );
        assert_eq!(text.to_plain_string(), "• Scout\n• Heavy");
    }

    #[test]
    fn test_empty_html() {
        assert!(RichText::from_html("").is_empty());
        assert!(RichText::from_html("<p>   </p>").is_empty());
        assert!(RichText::plain("").is_empty());
    }

    #[test]
    fn test_serialized_runs_omit_defaults() {
        let text = RichText::plain("hello");
        let json = serde_json::to_string(&text).unwrap();
        assert_eq!(json, r#"[{"text":"hello"}]"#);
        let decoded: RichText = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, text);
    }
}
