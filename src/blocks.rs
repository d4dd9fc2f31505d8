//! Block IR – renderer-agnostic layout instructions produced by the
//! assemblers and consumed by the layout stage.
//!
//! Blocks carry styled content only; every business decision has already
//! been taken by the time a block exists.

use crate::photo::Photo;
use crate::style::{CardStyle, Color, TextAlign, TextStyle};

/// A single run of styled text. May wrap over several lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub style: TextStyle,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Solid,
    Dashed,
}

/// A horizontal line across the content width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub thickness: f32,
    pub color: Color,
    pub kind: RuleKind,
}

impl Rule {
    pub fn solid(thickness: f32, color: Color) -> Self {
        Self {
            thickness,
            color,
            kind: RuleKind::Solid,
        }
    }

    pub fn dashed(thickness: f32, color: Color) -> Self {
        Self {
            thickness,
            color,
            kind: RuleKind::Dashed,
        }
    }
}

/// Column of a [`Table`]; `width` is a fraction of the table width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub width: f32,
    pub align: TextAlign,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub style: TextStyle,
    /// Per-column style overrides (e.g. an accent-coloured value cell).
    pub cell_styles: Vec<Option<TextStyle>>,
    pub background: Option<Color>,
    pub rule_above: Option<Rule>,
    pub padding: f32,
}

impl TableRow {
    pub fn new(cells: Vec<String>, style: TextStyle) -> Self {
        Self {
            cells,
            style,
            cell_styles: Vec::new(),
            background: None,
            rule_above: None,
            padding: 3.0,
        }
    }

    /// Style of column `i`, honouring overrides.
    pub fn style_for(&self, i: usize) -> &TextStyle {
        self.cell_styles
            .get(i)
            .and_then(Option::as_ref)
            .unwrap_or(&self.style)
    }

    /// Concatenated cell text, handy for assertions and logs.
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .filter(|c| !c.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Rows of cells under fixed column widths. Used for the item list and the
/// key/value totals block.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
    /// Grid line colour; `None` draws no grid.
    pub grid: Option<Color>,
    /// Fraction of the content width the table occupies, right-aligned
    /// when less than 1.
    pub width: f32,
}

/// Photo next to a story paragraph, inside a tinted card.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoCard {
    pub photo: Photo,
    /// Photo edge length in points.
    pub photo_size: f32,
    pub heading: TextBlock,
    pub story: TextBlock,
    pub card: CardStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(TextBlock),
    SectionHeader(TextBlock),
    Body(TextBlock),
    Table(Table),
    PhotoCard(PhotoCard),
    Rule(Rule),
    Spacer(f32),
}

impl Block {
    /// Plain text carried by the block, one entry per line / row.
    pub fn texts(&self) -> Vec<String> {
        match self {
            Block::Title(t) | Block::SectionHeader(t) | Block::Body(t) => {
                t.text.lines().map(str::to_string).collect()
            }
            Block::Table(table) => table.rows.iter().map(TableRow::text).collect(),
            Block::PhotoCard(card) => vec![card.heading.text.clone(), card.story.text.clone()],
            Block::Rule(_) | Block::Spacer(_) => Vec::new(),
        }
    }
}

/// Every text line of a document, in order.
pub fn document_text(blocks: &[Block]) -> Vec<String> {
    blocks.iter().flat_map(Block::texts).collect()
}
