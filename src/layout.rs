//! Layout engine – uses Taffy to compute flexbox layout for a block
//! sequence, then converts the result into a tree of positioned boxes.

use std::collections::HashMap;
use taffy::prelude::*;

use crate::blocks::{Block, PhotoCard, Rule, Table, TableRow, TextBlock};
use crate::error::Result;
use crate::fonts::{wrap_text, FontManager};
use crate::style::{Color, TextStyle};

/// Horizontal padding inside table cells.
const CELL_PAD_X: f32 = 6.0;
/// Grid line width for tables that draw one.
const GRID_LINE: f32 = 0.5;
/// Space between a card's photo and its text.
const CARD_GAP: f32 = 10.0;

// ---------------------------------------------------------------------------
// Intermediate layout tree (pre-pagination)
// ---------------------------------------------------------------------------

/// A positioned box in document coordinates (before page splitting).
#[derive(Debug, Clone)]
pub struct PositionedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub paint: Paint,
    pub content: BoxContent,
    pub children: Vec<PositionedBox>,
    pub kind: BoxKind,
}

/// Fill and outline of a box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Paint {
    pub background: Option<Color>,
    /// Width and colour.
    pub border: Option<(f32, Color)>,
}

/// How pagination treats a box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoxKind {
    #[default]
    Plain,
    /// Children are rows; may split between them.
    Table,
    /// Moved to the next page as a whole.
    Card,
}

#[derive(Debug, Clone)]
pub enum BoxContent {
    None,
    Text { lines: Vec<String>, style: TextStyle },
    Image { src: String },
    Rule(Rule),
}

#[derive(Debug, Clone, Default)]
struct NodeInfo {
    paint: Paint,
    content: Option<BoxContent>,
    kind: BoxKind,
}

fn uniform(v: f32) -> Rect<LengthPercentage> {
    Rect {
        top: LengthPercentage::Length(v),
        right: LengthPercentage::Length(v),
        bottom: LengthPercentage::Length(v),
        left: LengthPercentage::Length(v),
    }
}

fn column() -> Style {
    Style {
        display: taffy::Display::Flex,
        flex_direction: taffy::FlexDirection::Column,
        flex_shrink: 0.0,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Build Taffy tree from blocks
// ---------------------------------------------------------------------------

struct LayoutBuilder<'a> {
    taffy: TaffyTree<()>,
    fonts: &'a FontManager,
    nodes: HashMap<NodeId, NodeInfo>,
}

impl<'a> LayoutBuilder<'a> {
    fn new(fonts: &'a FontManager) -> Self {
        Self {
            taffy: TaffyTree::new(),
            fonts,
            nodes: HashMap::new(),
        }
    }

    fn build_block(&mut self, block: &Block, width: f32) -> Result<NodeId> {
        match block {
            Block::Title(t) | Block::SectionHeader(t) | Block::Body(t) => self.text_leaf(t, width),
            Block::Table(table) => self.table(table, width),
            Block::PhotoCard(card) => self.photo_card(card, width),
            Block::Rule(rule) => self.rule(rule),
            Block::Spacer(h) => Ok(self.taffy.new_leaf(Style {
                size: Size {
                    width: Dimension::Auto,
                    height: Dimension::Length(h.max(0.0)),
                },
                flex_shrink: 0.0,
                ..Default::default()
            })?),
        }
    }

    /// Word-wrap `block` to `width` and create a fixed-height leaf. The leaf
    /// stretches to its container so alignment can be resolved later.
    fn text_leaf(&mut self, block: &TextBlock, width: f32) -> Result<NodeId> {
        let style = &block.style;
        let lines = wrap_text(
            &block.text,
            style.font_size,
            style.is_bold(),
            width,
            self.fonts,
        );
        let line_height = self.fonts.line_height_px(style.font_size, style.line_height);
        let text_height = lines.len() as f32 * line_height;

        let node = self.taffy.new_leaf(Style {
            size: Size {
                width: Dimension::Auto,
                height: Dimension::Length(text_height),
            },
            min_size: Size {
                width: Dimension::Length(0.0),
                height: Dimension::Auto,
            },
            margin: Rect {
                top: LengthPercentageAuto::Length(style.space_before),
                right: LengthPercentageAuto::Length(0.0),
                bottom: LengthPercentageAuto::Length(style.space_after),
                left: LengthPercentageAuto::Length(0.0),
            },
            flex_shrink: 0.0,
            ..Default::default()
        })?;
        self.nodes.insert(
            node,
            NodeInfo {
                content: Some(BoxContent::Text {
                    lines,
                    style: style.clone(),
                }),
                ..Default::default()
            },
        );
        Ok(node)
    }

    fn rule(&mut self, rule: &Rule) -> Result<NodeId> {
        let node = self.taffy.new_leaf(Style {
            size: Size {
                width: Dimension::Auto,
                height: Dimension::Length(rule.thickness.max(0.5)),
            },
            flex_shrink: 0.0,
            ..Default::default()
        })?;
        self.nodes.insert(
            node,
            NodeInfo {
                content: Some(BoxContent::Rule(*rule)),
                ..Default::default()
            },
        );
        Ok(node)
    }

    fn table(&mut self, table: &Table, width: f32) -> Result<NodeId> {
        let table_width = width * table.width.clamp(0.0, 1.0);
        let rows = table
            .rows
            .iter()
            .map(|row| self.table_row(table, row, table_width))
            .collect::<Result<Vec<_>>>()?;

        let node = self.taffy.new_with_children(
            Style {
                size: Size {
                    width: Dimension::Length(table_width),
                    height: Dimension::Auto,
                },
                // Narrow tables hug the right edge, like a totals column.
                align_self: Some(AlignSelf::FlexEnd),
                ..column()
            },
            &rows,
        )?;
        self.nodes.insert(
            node,
            NodeInfo {
                kind: BoxKind::Table,
                ..Default::default()
            },
        );
        Ok(node)
    }

    fn table_row(&mut self, table: &Table, row: &TableRow, table_width: f32) -> Result<NodeId> {
        let border = if table.grid.is_some() { GRID_LINE } else { 0.0 };
        let mut cells = Vec::with_capacity(table.columns.len());

        for (i, col) in table.columns.iter().enumerate() {
            let cell_width = table_width * col.width;
            let inner_width = (cell_width - 2.0 * (CELL_PAD_X + border)).max(1.0);
            let style = TextStyle {
                space_before: 0.0,
                space_after: 0.0,
                ..row.style_for(i).clone()
            }
            .aligned(col.align);
            let text = row.cells.get(i).map(String::as_str).unwrap_or("");
            let leaf = self.text_leaf(&TextBlock::new(text, style), inner_width)?;

            let cell = self.taffy.new_with_children(
                Style {
                    size: Size {
                        width: Dimension::Length(cell_width),
                        height: Dimension::Auto,
                    },
                    padding: Rect {
                        top: LengthPercentage::Length(row.padding),
                        right: LengthPercentage::Length(CELL_PAD_X),
                        bottom: LengthPercentage::Length(row.padding),
                        left: LengthPercentage::Length(CELL_PAD_X),
                    },
                    border: uniform(border),
                    ..column()
                },
                &[leaf],
            )?;
            self.nodes.insert(
                cell,
                NodeInfo {
                    paint: Paint {
                        background: None,
                        border: table.grid.map(|c| (GRID_LINE, c)),
                    },
                    ..Default::default()
                },
            );
            cells.push(cell);
        }

        let cells_row = self.taffy.new_with_children(
            Style {
                display: taffy::Display::Flex,
                flex_direction: taffy::FlexDirection::Row,
                align_items: Some(AlignItems::Stretch),
                size: Size {
                    width: Dimension::Percent(1.0),
                    height: Dimension::Auto,
                },
                flex_shrink: 0.0,
                ..Default::default()
            },
            &cells,
        )?;
        self.nodes.insert(
            cells_row,
            NodeInfo {
                paint: Paint {
                    background: row.background,
                    border: None,
                },
                ..Default::default()
            },
        );

        match &row.rule_above {
            None => Ok(cells_row),
            Some(rule) => {
                let line = self.rule(rule)?;
                Ok(self.taffy.new_with_children(column(), &[line, cells_row])?)
            }
        }
    }

    fn photo_card(&mut self, card: &PhotoCard, width: f32) -> Result<NodeId> {
        let frame = card.card;

        // Fit the photo inside a photo_size square, keeping its aspect ratio.
        let (px_w, px_h) = (
            card.photo.px_width.max(1) as f32,
            card.photo.px_height.max(1) as f32,
        );
        let scale = card.photo_size / px_w.max(px_h);
        let (img_w, img_h) = (px_w * scale, px_h * scale);

        let image = self.taffy.new_leaf(Style {
            size: Size {
                width: Dimension::Length(img_w),
                height: Dimension::Length(img_h),
            },
            flex_shrink: 0.0,
            ..Default::default()
        })?;
        self.nodes.insert(
            image,
            NodeInfo {
                content: Some(BoxContent::Image {
                    src: card.photo.to_data_uri(),
                }),
                ..Default::default()
            },
        );

        let text_width =
            (width - 2.0 * (frame.padding + frame.border_width) - img_w - CARD_GAP).max(1.0);
        let heading = self.text_leaf(&card.heading, text_width)?;
        let story = self.text_leaf(&card.story, text_width)?;
        let text_column = self.taffy.new_with_children(
            Style {
                flex_grow: 1.0,
                flex_basis: Dimension::Length(0.0),
                min_size: Size {
                    width: Dimension::Length(0.0),
                    height: Dimension::Auto,
                },
                ..column()
            },
            &[heading, story],
        )?;

        let node = self.taffy.new_with_children(
            Style {
                display: taffy::Display::Flex,
                flex_direction: taffy::FlexDirection::Row,
                align_items: Some(AlignItems::Start),
                padding: uniform(frame.padding),
                border: uniform(frame.border_width),
                gap: Size {
                    width: LengthPercentage::Length(CARD_GAP),
                    height: LengthPercentage::Length(0.0),
                },
                flex_shrink: 0.0,
                ..Default::default()
            },
            &[image, text_column],
        )?;
        self.nodes.insert(
            node,
            NodeInfo {
                paint: Paint {
                    background: Some(frame.background),
                    border: Some((frame.border_width, frame.border)),
                },
                kind: BoxKind::Card,
                ..Default::default()
            },
        );
        Ok(node)
    }

    /// Extract positioned boxes after layout computation.
    fn extract(&self, node: NodeId, offset_x: f32, offset_y: f32) -> Result<PositionedBox> {
        let layout = self.taffy.layout(node)?;
        let info = self.nodes.get(&node).cloned().unwrap_or_default();

        let x = offset_x + layout.location.x;
        let y = offset_y + layout.location.y;
        let (width, height) = (layout.size.width, layout.size.height);

        let children = self
            .taffy
            .children(node)?
            .into_iter()
            .map(|child| self.extract(child, x, y))
            .collect::<Result<Vec<_>>>()?;

        Ok(PositionedBox {
            x,
            y,
            width,
            height,
            paint: info.paint,
            content: info.content.unwrap_or(BoxContent::None),
            children,
            kind: info.kind,
        })
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute layout for a block sequence, returning the top-level positioned
/// boxes in document coordinates (x already includes the left margin).
pub fn compute_layout(
    blocks: &[Block],
    page_width: f32,
    page_margin: f32,
    fonts: &FontManager,
) -> Result<Vec<PositionedBox>> {
    let content_width = (page_width - 2.0 * page_margin).max(1.0);
    let mut builder = LayoutBuilder::new(fonts);

    let child_ids = blocks
        .iter()
        .map(|block| builder.build_block(block, content_width))
        .collect::<Result<Vec<_>>>()?;

    let root_style = Style {
        display: taffy::Display::Flex,
        flex_direction: taffy::FlexDirection::Column,
        size: Size {
            width: Dimension::Length(content_width),
            height: Dimension::Auto,
        },
        ..Default::default()
    };
    let root = builder.taffy.new_with_children(root_style, &child_ids)?;

    builder.taffy.compute_layout(
        root,
        Size {
            width: AvailableSpace::Definite(content_width),
            height: AvailableSpace::MaxContent,
        },
    )?;

    let root_box = builder.extract(root, page_margin, 0.0)?;
    log::debug!(
        "laid out {} blocks, document height {:.1}pt",
        blocks.len(),
        root_box.height
    );
    Ok(root_box.children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::Column;
    use crate::style::{TextAlign, TABLE_GRID};

    fn body(text: &str) -> Block {
        Block::Body(TextBlock::new(text, TextStyle::default()))
    }

    #[test]
    fn layout_simple_paragraph() {
        let fonts = FontManager::default();
        let boxes = compute_layout(&[body("Hello world")], 612.0, 36.0, &fonts).unwrap();
        assert_eq!(boxes.len(), 1);
        let first = &boxes[0];
        assert_eq!(first.x, 36.0);
        assert!((first.width - 540.0).abs() < 0.01, "{}", first.width);
        assert!((first.height - 12.0).abs() < 0.01);
    }

    #[test]
    fn blocks_stack_vertically() {
        let fonts = FontManager::default();
        let blocks = [body("one"), Block::Spacer(20.0), body("two")];
        let boxes = compute_layout(&blocks, 612.0, 36.0, &fonts).unwrap();
        assert!((boxes[2].y - 32.0).abs() < 0.01, "{}", boxes[2].y);
    }

    #[test]
    fn long_text_wraps() {
        let fonts = FontManager::default();
        let text = "word ".repeat(60);
        let boxes = compute_layout(&[body(&text)], 226.77, 14.17, &fonts).unwrap();
        match &boxes[0].content {
            BoxContent::Text { lines, .. } => assert!(lines.len() > 3),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn table_columns_follow_fractions() {
        let fonts = FontManager::default();
        let table = Table {
            columns: vec![
                Column {
                    width: 0.75,
                    align: TextAlign::Left,
                },
                Column {
                    width: 0.25,
                    align: TextAlign::Right,
                },
            ],
            rows: vec![TableRow::new(
                vec!["Pizza".into(), "$1.00".into()],
                TextStyle::default(),
            )],
            grid: Some(TABLE_GRID),
            width: 1.0,
        };
        let boxes = compute_layout(&[Block::Table(table)], 612.0, 36.0, &fonts).unwrap();
        let table_box = &boxes[0];
        assert_eq!(table_box.kind, BoxKind::Table);
        let cells = &table_box.children[0].children;
        assert_eq!(cells.len(), 2);
        assert!((cells[0].width - 405.0).abs() < 0.01);
        assert!((cells[1].x - (36.0 + 405.0)).abs() < 0.01);
        assert!(cells[0].paint.border.is_some());
    }
}
