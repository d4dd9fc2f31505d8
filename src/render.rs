//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API) and the builtin Helvetica faces.

use std::collections::{HashMap, HashSet};

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use printpdf::*;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::fonts::{winansi_byte, FontManager};
use crate::layout_config::*;

/// Dash and gap length of a dashed rule, in points.
const DASH: f32 = 3.0;

/// Trailer file identifier as printpdf writes it: `/ID[(<32>)(<32>)]`.
const ID_PREFIX: &[u8] = b"/ID[(";
const ID_LEN: usize = 32;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Render a LayoutConfig into PDF bytes.
///
/// Images whose `src` is not a base64 data URI, or whose bytes cannot be
/// decoded, are skipped with a `log::warn`.
pub fn render_pdf(config: &LayoutConfig) -> Result<Vec<u8>> {
    let page_w = Mm(config.page_width_pt * 0.352778); // pt → mm
    let page_h = Mm(config.page_height_pt * 0.352778);

    let mut doc = PdfDocument::new(&config.title);

    // ── Pre-register all images ────────────────────────────────────────────
    let mut all_srcs: HashSet<&str> = HashSet::new();
    for page_layout in &config.pages {
        for lbox in &page_layout.boxes {
            collect_image_srcs(lbox, &mut all_srcs);
        }
    }

    let mut image_resources: HashMap<String, ImageResource> = HashMap::new();
    let mut img_warnings: Vec<PdfWarnMsg> = Vec::new();

    // Sorted so that XObject ids are assigned in a stable order.
    let mut srcs: Vec<&str> = all_srcs.into_iter().collect();
    srcs.sort_unstable();

    for (index, src) in srcs.into_iter().enumerate() {
        let bytes = match parse_data_uri(src) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("skipping image: {e}");
                continue;
            }
        };

        let dyn_img = match ::image::load_from_memory(&bytes) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("skipping image: decode error: {e}");
                continue;
            }
        };
        let (px_width, px_height) = (dyn_img.width(), dyn_img.height());

        let raw = match RawImage::decode_from_bytes(&bytes, &mut img_warnings) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("skipping image: PDF encode error: {e}");
                continue;
            }
        };
        // `add_image` names the XObject randomly; use the sorted index instead.
        let xobj_id = XObjectId(format!("Im{index}"));
        doc.resources
            .xobjects
            .map
            .insert(xobj_id.clone(), XObject::Image(raw));

        image_resources.insert(
            src.to_string(),
            ImageResource {
                xobj_id,
                px_width,
                px_height,
            },
        );
    }

    // ── Render pages ──────────────────────────────────────────────────────
    let fonts = FontManager::new();
    let mut pages = Vec::new();

    for page_layout in &config.pages {
        let mut ops = Vec::new();
        for lbox in &page_layout.boxes {
            render_box(&mut ops, lbox, config.page_height_pt, &image_resources, &fonts);
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    let mut bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());
    stamp_document_id(&mut bytes);
    log::debug!("rendered {} bytes for '{}'", bytes.len(), config.title);

    Ok(bytes)
}

/// Replace the random trailer `/ID` pair with hex digits of a SHA-256 over
/// everything before it. Lengths are unchanged, so xref offsets stay valid.
fn stamp_document_id(bytes: &mut [u8]) {
    let Some(pos) = bytes
        .windows(ID_PREFIX.len())
        .rposition(|w| w == ID_PREFIX)
    else {
        log::debug!("no trailer /ID found; leaving it as written");
        return;
    };
    let first = pos + ID_PREFIX.len();
    let second = first + ID_LEN + 2;
    if bytes.len() < second + ID_LEN + 1
        || &bytes[first + ID_LEN..second] != b")("
        || bytes[second + ID_LEN] != b')'
    {
        log::debug!("unexpected trailer /ID layout; leaving it as written");
        return;
    }

    let digest = Sha256::digest(&bytes[..pos]);
    let hex: Vec<u8> = digest
        .iter()
        .flat_map(|b| format!("{b:02X}").into_bytes())
        .collect();
    bytes[first..first + ID_LEN].copy_from_slice(&hex[..ID_LEN]);
    bytes[second..second + ID_LEN].copy_from_slice(&hex[ID_LEN..]);
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte). Characters with no WinAnsi
/// code, such as emoji, are dropped.
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s.chars().filter_map(winansi_byte).collect();
    // SAFETY: intentionally non-UTF-8 for the 0x80-0xFF range; printpdf passes
    // these bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
fn parse_data_uri(src: &str) -> std::result::Result<Vec<u8>, String> {
    let Some(rest) = src.strip_prefix("data:") else {
        let preview: String = src.chars().take(80).collect();
        return Err(format!(
            "image src must be a base64 data URI (e.g. `data:image/png;base64,...`), got {preview:?}"
        ));
    };
    let comma_pos = rest
        .find(',')
        .ok_or_else(|| "invalid data URI: missing `,` after the header".to_string())?;
    let header = &rest[..comma_pos];
    if !header.contains(";base64") {
        return Err("only base64-encoded data URIs are supported".to_string());
    }
    BASE64_STD
        .decode(rest[comma_pos + 1..].trim())
        .map_err(|e| format!("base64 decode error: {e}"))
}

/// Recursively collect all unique `image.src` strings from a [`LayoutBox`] tree.
fn collect_image_srcs<'a>(lbox: &'a LayoutBox, srcs: &mut HashSet<&'a str>) {
    if let Some(img) = &lbox.image {
        srcs.insert(img.src.as_str());
    }
    for child in &lbox.children {
        collect_image_srcs(child, srcs);
    }
}

fn rgb(c: &[f32; 4]) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

fn stroke(ops: &mut Vec<Op>, points: Vec<LinePoint>, is_closed: bool) {
    ops.push(Op::DrawLine {
        line: Line { points, is_closed },
    });
}

/// Recursively render a LayoutBox and its children into PDF ops.
fn render_box(
    ops: &mut Vec<Op>,
    lbox: &LayoutBox,
    page_height: f32,
    images: &HashMap<String, ImageResource>,
    fonts: &FontManager,
) {
    // PDF origin is bottom-left; layout origin is top-left.
    let pdf_y = page_height - lbox.y;
    let (x1, y1, x2, y2) = (lbox.x, pdf_y - lbox.height, lbox.x + lbox.width, pdf_y);

    // Background
    if let Some(bg) = &lbox.background_color {
        ops.push(Op::SetFillColor { col: rgb(bg) });
        ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: vec![point(x1, y1), point(x2, y1), point(x2, y2), point(x1, y2)],
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    // Border
    if let Some(border) = &lbox.border {
        ops.push(Op::SetOutlineColor {
            col: rgb(&border.color),
        });
        ops.push(Op::SetOutlineThickness {
            pt: Pt(border.width),
        });
        stroke(
            ops,
            vec![point(x1, y2), point(x2, y2), point(x2, y1), point(x1, y1)],
            true,
        );
    }

    // Rule
    if let Some(rule) = &lbox.rule {
        let mid_y = pdf_y - lbox.height / 2.0;
        ops.push(Op::SetOutlineColor {
            col: rgb(&rule.color),
        });
        ops.push(Op::SetOutlineThickness {
            pt: Pt(rule.thickness),
        });
        if rule.dashed {
            let mut x = x1;
            while x < x2 {
                let end = (x + DASH).min(x2);
                stroke(ops, vec![point(x, mid_y), point(end, mid_y)], false);
                x += 2.0 * DASH;
            }
        } else {
            stroke(ops, vec![point(x1, mid_y), point(x2, mid_y)], false);
        }
    }

    // Text
    if let Some(text) = &lbox.text {
        let font = match (text.bold, text.italic) {
            (true, true) => BuiltinFont::HelveticaBoldOblique,
            (true, false) => BuiltinFont::HelveticaBold,
            (false, true) => BuiltinFont::HelveticaOblique,
            (false, false) => BuiltinFont::Helvetica,
        };
        let ascender = fonts.ascender_px(text.font_size);

        for tline in &text.lines {
            let drawable = tline
                .text
                .chars()
                .any(|c| winansi_byte(c).is_some_and(|b| b != b' '));
            if !drawable {
                continue;
            }
            let text_x = lbox.x + tline.x_offset;
            let text_y = pdf_y - tline.y_offset - ascender;

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(text_x),
                    y: Pt(text_y),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(text.font_size),
                font,
            });
            ops.push(Op::SetLineHeight {
                lh: Pt(text.line_height),
            });
            ops.push(Op::SetFillColor {
                col: rgb(&text.color),
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winlatin(&tline.text))],
                font,
            });
            ops.push(Op::EndTextSection);
        }
    }

    // Image – embed from pre-registered XObject
    if let Some(img) = &lbox.image {
        if let Some(res) = images.get(&img.src) {
            let img_bottom_y = page_height - lbox.y - img.height;

            // At dpi=72 printpdf renders 1 px = 1 pt, so
            // scale = desired_pt / px_dim.
            let scale_x = if res.px_width > 0 {
                img.width / res.px_width as f32
            } else {
                1.0
            };
            let scale_y = if res.px_height > 0 {
                img.height / res.px_height as f32
            } else {
                1.0
            };

            ops.push(Op::UseXobject {
                id: res.xobj_id.clone(),
                transform: XObjectTransform {
                    translate_x: Some(Pt(lbox.x)),
                    translate_y: Some(Pt(img_bottom_y)),
                    dpi: Some(72.0),
                    scale_x: Some(scale_x),
                    scale_y: Some(scale_y),
                    rotate: None,
                },
            });
        }
    }

    for child in &lbox.children {
        render_box(ops, child, page_height, images, fonts);
    }
}
