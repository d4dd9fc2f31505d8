//! Pagination – splits a list of positioned boxes into pages.
//!
//! Handles:
//! - page boundaries for the configured geometry
//! - table row splitting across pages
//! - line splitting of paragraphs taller than a page
//! - keeping photo cards together
//! - resolving text alignment into per-line offsets

use crate::fonts::FontManager;
use crate::layout::{BoxContent, BoxKind, PositionedBox};
use crate::layout_config::*;
use crate::pipeline::PageGeometry;
use crate::style::{FontStyle, TextAlign};

/// Recursively expand any pure-container box whose height exceeds a single
/// page so its children can be split across pages individually.
fn flatten_for_pagination<'a>(
    boxes: &'a [PositionedBox],
    content_height: f32,
) -> Vec<&'a PositionedBox> {
    let mut result = Vec::new();
    for pbox in boxes {
        if pbox.height > content_height
            && matches!(pbox.content, BoxContent::None)
            && !pbox.children.is_empty()
        {
            result.extend(flatten_for_pagination(&pbox.children, content_height));
        } else {
            result.push(pbox);
        }
    }
    result
}

/// Start a fresh page, returning the finished one.
fn next_page(config: &mut LayoutConfig, current_page: &mut PageLayout) {
    let index = config.pages.len() + 1;
    config.pages.push(std::mem::replace(
        current_page,
        PageLayout {
            page_index: index,
            boxes: Vec::new(),
        },
    ));
}

/// Convert positioned boxes into a paginated LayoutConfig.
pub fn paginate(
    boxes: &[PositionedBox],
    geometry: &PageGeometry,
    fonts: &FontManager,
) -> LayoutConfig {
    let mut config = LayoutConfig::new(
        geometry.title.clone(),
        geometry.page_width,
        geometry.page_height,
    );
    let page_margin = geometry.margin;
    let content_height = geometry.content_height();

    let flat = flatten_for_pagination(boxes, content_height);

    let mut current_page = PageLayout {
        page_index: 0,
        boxes: Vec::new(),
    };

    // Document-space y at which the current page begins. `pbox.y -
    // page_start_doc_y` is the y-on-page of any box.
    let mut page_start_doc_y = 0.0f32;

    for pbox in &flat {
        let y_on_page = (pbox.y - page_start_doc_y).max(0.0);
        let box_bottom = y_on_page + pbox.height;

        if box_bottom > content_height {
            if pbox.kind == BoxKind::Table && !pbox.children.is_empty() {
                split_table_box(
                    pbox,
                    &mut config,
                    &mut current_page,
                    &mut page_start_doc_y,
                    content_height,
                    page_margin,
                    fonts,
                );
                continue;
            }
            if let BoxContent::Text { lines, .. } = &pbox.content {
                if pbox.height > content_height && lines.len() > 1 {
                    split_text_box(
                        pbox,
                        &mut config,
                        &mut current_page,
                        &mut page_start_doc_y,
                        content_height,
                        page_margin,
                        fonts,
                    );
                    continue;
                }
            }
            if !current_page.boxes.is_empty() {
                next_page(&mut config, &mut current_page);
                page_start_doc_y = pbox.y;
            }
        }

        let y_on_page = (pbox.y - page_start_doc_y).max(0.0);
        let layout_box = positioned_to_layout_box(pbox, page_margin, y_on_page, fonts);
        if !layout_box.is_blank() {
            current_page.boxes.push(layout_box);
        }
    }

    if !current_page.boxes.is_empty() || config.pages.is_empty() {
        config.pages.push(current_page);
    }
    log::debug!(
        "paginated into {} page(s) of {}x{}pt",
        config.pages.len(),
        geometry.page_width,
        geometry.page_height
    );
    config
}

fn split_table_box(
    pbox: &PositionedBox,
    config: &mut LayoutConfig,
    current_page: &mut PageLayout,
    page_start_doc_y: &mut f32,
    content_height: f32,
    page_margin: f32,
    fonts: &FontManager,
) {
    for row in &pbox.children {
        let y_on_page = (row.y - *page_start_doc_y).max(0.0);
        if y_on_page + row.height > content_height && !current_page.boxes.is_empty() {
            next_page(config, current_page);
            *page_start_doc_y = row.y;
        }
        let y = (row.y - *page_start_doc_y).max(0.0);
        let row_box = positioned_to_layout_box(row, page_margin, y, fonts);
        if !row_box.is_blank() {
            current_page.boxes.push(row_box);
        }
    }
}

/// Place a paragraph taller than a page as consecutive runs of lines, the
/// first filling what is left of the current page.
fn split_text_box(
    pbox: &PositionedBox,
    config: &mut LayoutConfig,
    current_page: &mut PageLayout,
    page_start_doc_y: &mut f32,
    content_height: f32,
    page_margin: f32,
    fonts: &FontManager,
) {
    let BoxContent::Text { lines, style } = &pbox.content else {
        return;
    };
    let line_height = fonts.line_height_px(style.font_size, style.line_height);
    if line_height <= 0.0 {
        return;
    }

    let mut start = 0;
    while start < lines.len() {
        let top = pbox.y + start as f32 * line_height;
        let mut y_on_page = (top - *page_start_doc_y).max(0.0);
        let mut room = ((content_height - y_on_page) / line_height + 0.001).floor().max(0.0) as usize;
        if room == 0 && !current_page.boxes.is_empty() {
            next_page(config, current_page);
            *page_start_doc_y = top;
            y_on_page = 0.0;
            room = (content_height / line_height + 0.001).floor() as usize;
        }
        let end = (start + room.max(1)).min(lines.len());

        let run = PositionedBox {
            x: pbox.x,
            y: top,
            width: pbox.width,
            height: (end - start) as f32 * line_height,
            paint: pbox.paint,
            content: BoxContent::Text {
                lines: lines[start..end].to_vec(),
                style: style.clone(),
            },
            children: Vec::new(),
            kind: pbox.kind,
        };
        let run_box = positioned_to_layout_box(&run, page_margin, y_on_page, fonts);
        if !run_box.is_blank() {
            current_page.boxes.push(run_box);
        }

        start = end;
        if start < lines.len() {
            next_page(config, current_page);
            *page_start_doc_y = pbox.y + start as f32 * line_height;
        }
    }
}

/// Convert a PositionedBox to a LayoutBox with page-absolute coordinates.
/// `y_on_page` = `pbox.y - page_start_doc_y`.
fn positioned_to_layout_box(
    pbox: &PositionedBox,
    page_margin: f32,
    y_on_page: f32,
    fonts: &FontManager,
) -> LayoutBox {
    build_layout_box(pbox, pbox.x, page_margin + y_on_page, fonts)
}

fn rgba(c: crate::style::Color) -> [f32; 4] {
    c.to_array()
}

/// Recursively build a LayoutBox tree where every box carries *page-absolute*
/// x/y coordinates (origin = top-left of the physical page).
///
/// Children keep their offset from the parent:
///   `child_abs_y = parent_abs_y + (child.y − parent.y)`
fn build_layout_box(pbox: &PositionedBox, abs_x: f32, abs_y: f32, fonts: &FontManager) -> LayoutBox {
    let mut lb = LayoutBox::new(abs_x, abs_y, pbox.width, pbox.height);

    if let Some(bg) = pbox.paint.background.filter(|c| !c.is_transparent()) {
        lb.background_color = Some(rgba(bg));
    }
    if let Some((width, color)) = pbox.paint.border {
        if width > 0.0 {
            lb.border = Some(BorderStyle {
                width,
                color: rgba(color),
            });
        }
    }

    match &pbox.content {
        BoxContent::Text { lines, style } => {
            let bold = style.is_bold();
            let line_height = fonts.line_height_px(style.font_size, style.line_height);
            let text_lines: Vec<TextLine> = lines
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    let slack = (pbox.width - fonts.measure_text_width(line, style.font_size, bold))
                        .max(0.0);
                    let x_offset = match style.text_align {
                        TextAlign::Left => 0.0,
                        TextAlign::Center => slack / 2.0,
                        TextAlign::Right => slack,
                    };
                    TextLine {
                        text: line.clone(),
                        x_offset,
                        y_offset: i as f32 * line_height,
                    }
                })
                .collect();

            lb.text = Some(TextContent {
                lines: text_lines,
                font_family: "Helvetica".to_string(),
                font_size: style.font_size,
                bold,
                italic: style.font_style == FontStyle::Italic,
                color: rgba(style.color),
                line_height,
                text_align: match style.text_align {
                    TextAlign::Left => "left".to_string(),
                    TextAlign::Center => "center".to_string(),
                    TextAlign::Right => "right".to_string(),
                },
            });
        }
        BoxContent::Image { src } => {
            lb.image = Some(ImageContent {
                src: src.clone(),
                width: pbox.width,
                height: pbox.height,
            });
        }
        BoxContent::Rule(rule) => {
            lb.rule = Some(RuleContent {
                thickness: rule.thickness,
                color: rgba(rule.color),
                dashed: rule.kind == crate::blocks::RuleKind::Dashed,
            });
        }
        BoxContent::None => {}
    }

    for child in &pbox.children {
        let child_abs_y = abs_y + (child.y - pbox.y);
        let child_box = build_layout_box(child, child.x, child_abs_y, fonts);
        if !child_box.is_blank() {
            lb.children.push(child_box);
        }
    }

    lb
}
