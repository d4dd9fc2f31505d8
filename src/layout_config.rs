//! Layout config – the intermediate representation between layout computation
//! and PDF rendering. This is the "frozen" structure that encodes exactly what
//! goes on each page of a receipt or ticket.
//!
//! Photos travel inside the config as base64 data URIs, so a serialised
//! config renders on its own without access to the original photo files.

use serde::{Deserialize, Serialize};

/// A complete document layout ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Document title embedded in the PDF metadata.
    #[serde(default = "LayoutConfig::default_title")]
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

/// One page of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    pub boxes: Vec<LayoutBox>,
}

/// A positioned rectangle with optional content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    /// Position relative to page top-left, in points.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    /// Visual styling
    #[serde(default)]
    pub background_color: Option<[f32; 4]>,
    #[serde(default)]
    pub border: Option<BorderStyle>,

    /// Content (mutually exclusive in practice)
    #[serde(default)]
    pub text: Option<TextContent>,
    #[serde(default)]
    pub image: Option<ImageContent>,
    #[serde(default)]
    pub rule: Option<RuleContent>,

    /// Children (nested boxes)
    #[serde(default)]
    pub children: Vec<LayoutBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderStyle {
    pub width: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// Pre-wrapped lines of text.
    pub lines: Vec<TextLine>,
    pub font_family: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: [f32; 4],
    pub line_height: f32,
    pub text_align: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// X offset within the layout box (for alignment)
    pub x_offset: f32,
    /// Y offset from the top of the text content area
    pub y_offset: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    /// `data:<mime>;base64,...`
    pub src: String,
    pub width: f32,
    pub height: f32,
}

/// A horizontal line drawn through the vertical centre of its box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleContent {
    pub thickness: f32,
    pub color: [f32; 4],
    #[serde(default)]
    pub dashed: bool,
}

impl LayoutConfig {
    /// An empty layout for pages of the given size.
    pub fn new(title: impl Into<String>, page_width_pt: f32, page_height_pt: f32) -> Self {
        Self {
            title: title.into(),
            page_width_pt,
            page_height_pt,
            pages: Vec::new(),
        }
    }

    fn default_title() -> String {
        "Receipt".to_string()
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Visit every box on every page, parents before children.
    pub fn visit_boxes<'a>(&'a self, mut f: impl FnMut(usize, &'a LayoutBox)) {
        fn walk<'a>(page: usize, b: &'a LayoutBox, f: &mut impl FnMut(usize, &'a LayoutBox)) {
            f(page, b);
            for child in &b.children {
                walk(page, child, f);
            }
        }
        for page in &self.pages {
            for b in &page.boxes {
                walk(page.page_index, b, &mut f);
            }
        }
    }

    /// Every text line in reading order.
    pub fn text_lines(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.visit_boxes(|_, b| {
            if let Some(text) = &b.text {
                out.extend(text.lines.iter().map(|l| l.text.as_str()));
            }
        });
        out
    }
}

impl LayoutBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            background_color: None,
            border: None,
            text: None,
            image: None,
            rule: None,
            children: Vec::new(),
        }
    }

    /// Nothing to paint here or below.
    pub fn is_blank(&self) -> bool {
        self.background_color.is_none()
            && self.border.is_none()
            && self.text.is_none()
            && self.image.is_none()
            && self.rule.is_none()
            && self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_defaults_when_missing() {
        let json = r#"{"page_width_pt": 612.0, "page_height_pt": 792.0, "pages": []}"#;
        let config = LayoutConfig::from_json(json).unwrap();
        assert_eq!(config.title, "Receipt");
    }

    #[test]
    fn optional_box_fields_default() {
        let json = r#"{"title": "t", "page_width_pt": 100.0, "page_height_pt": 100.0,
            "pages": [{"page_index": 0, "boxes": [{"x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0}]}]}"#;
        let config = LayoutConfig::from_json(json).unwrap();
        assert!(config.pages[0].boxes[0].is_blank());
    }

    #[test]
    fn text_lines_in_order() {
        let mut config = LayoutConfig::new("t", 100.0, 100.0);
        let mut outer = LayoutBox::new(0.0, 0.0, 10.0, 10.0);
        let mut inner = LayoutBox::new(0.0, 0.0, 10.0, 10.0);
        inner.text = Some(TextContent {
            lines: vec![TextLine {
                text: "second".into(),
                x_offset: 0.0,
                y_offset: 0.0,
            }],
            font_family: "Helvetica".into(),
            font_size: 10.0,
            bold: false,
            italic: false,
            color: [0.0, 0.0, 0.0, 1.0],
            line_height: 12.0,
            text_align: "left".into(),
        });
        let mut first = inner.clone();
        first.text.as_mut().unwrap().lines[0].text = "first".into();
        outer.children = vec![first, inner];
        config.pages.push(PageLayout {
            page_index: 0,
            boxes: vec![outer],
        });
        assert_eq!(config.text_lines(), vec!["first", "second"]);
    }
}
