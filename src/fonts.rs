//! Text measurement for the builtin Helvetica family.
//!
//! Documents are set in the PDF base-14 Helvetica faces, so no font file is
//! embedded. Advances come from the standard Helvetica AFM widths (1/1000 em)
//! for printable ASCII; other WinAnsi glyphs use an average advance. Glyphs
//! outside WinAnsi (emoji, variation selectors, joiners) are not drawn and so
//! measure zero.

/// Helvetica advances for U+0020..=U+007E.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Helvetica-Bold advances for U+0020..=U+007E.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const AVERAGE_ADVANCE: f32 = 556.0;
const ASCENDER: f32 = 718.0;

/// Map a character to its single-byte WinAnsiEncoding code, if it has one.
pub fn winansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{2122}' => 0x99,
        '\u{00A0}' => 0x20,
        '\t' => 0x20,
        c if (0x20..0x7F).contains(&(c as u32)) || (0xA1..0x100).contains(&(c as u32)) => {
            c as u8
        }
        _ => return None,
    };
    Some(byte)
}

/// Font metrics source for layout. Stateless; one instance serves any
/// number of documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontManager;

impl FontManager {
    pub fn new() -> Self {
        Self
    }

    fn advance(c: char, bold: bool) -> f32 {
        let Some(byte) = winansi_byte(c) else {
            return 0.0;
        };
        let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
        match byte {
            0x20..=0x7E => table[(byte - 0x20) as usize] as f32,
            0x95 => 350.0,
            0x85 | 0x97 => 1000.0,
            _ => AVERAGE_ADVANCE,
        }
    }

    /// Width in points of `text` set at `font_size`. Italic faces share the
    /// upright advances.
    pub fn measure_text_width(&self, text: &str, font_size: f32, bold: bool) -> f32 {
        let units: f32 = text.chars().map(|c| Self::advance(c, bold)).sum();
        units * font_size / 1000.0
    }

    pub fn line_height_px(&self, font_size: f32, line_height_factor: f32) -> f32 {
        font_size * line_height_factor
    }

    /// Distance from the top of a line to its baseline.
    pub fn ascender_px(&self, font_size: f32) -> f32 {
        font_size * ASCENDER / 1000.0
    }
}

/// Word-wrap text to fit within `max_width` points. Explicit newlines always
/// break. A single word wider than the line is broken between characters.
pub fn wrap_text(
    text: &str,
    font_size: f32,
    bold: bool,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        // Keep leading indentation ("   + topping").
        let indent_len = paragraph.len() - paragraph.trim_start().len();
        let indent = &paragraph[..indent_len];
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let fits = |s: &str| fonts.measure_text_width(s, font_size, bold) <= max_width;
        let mut current_line = String::new();
        for word in &words {
            let candidate = if current_line.is_empty() {
                format!("{indent}{word}")
            } else {
                format!("{current_line} {word}")
            };
            if fits(&candidate) {
                current_line = candidate;
                continue;
            }
            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
                let fresh = format!("{indent}{word}");
                if fits(&fresh) {
                    current_line = fresh;
                    continue;
                }
            }

            // Word wider than a line: break between characters, at least one per line.
            let mut piece = indent.to_string();
            let mut piece_chars = 0;
            for c in word.chars() {
                piece.push(c);
                piece_chars += 1;
                if piece_chars > 1 && !fits(&piece) {
                    piece.pop();
                    lines.push(std::mem::replace(&mut piece, format!("{indent}{c}")));
                    piece_chars = 1;
                }
            }
            current_line = piece;
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn afm_text_width() {
        let mgr = FontManager::default();
        let w = mgr.measure_text_width("Hello", 16.0, false);
        // (722 + 556 + 222 + 222 + 556) / 1000 × 16
        assert!((w - 36.448).abs() < 0.01, "{w}");
        assert!(mgr.measure_text_width("Hello", 16.0, true) > w);
    }

    #[test]
    fn emoji_measure_zero() {
        let mgr = FontManager::default();
        let plain = mgr.measure_text_width(" LocalFirst", 12.0, true);
        let with_emoji = mgr.measure_text_width("🍕 LocalFirst", 12.0, true);
        assert!((plain - with_emoji).abs() < 0.001);
        assert_eq!(winansi_byte('\u{FE0F}'), None);
        assert_eq!(winansi_byte('\u{200D}'), None);
    }

    #[test]
    fn winansi_specials() {
        assert_eq!(winansi_byte('•'), Some(0x95));
        assert_eq!(winansi_byte('é'), Some(0xE9));
        assert_eq!(winansi_byte('A'), Some(b'A'));
        assert_eq!(winansi_byte('\u{0085}'), None);
    }

    #[test]
    fn word_wrap_basic() {
        let mgr = FontManager::default();
        let lines = wrap_text("Hello world foo bar", 16.0, false, 60.0, &mgr);
        assert!(lines.len() >= 2, "Expected wrapping, got {:?}", lines);
    }

    #[test]
    fn wrap_keeps_newlines_and_indent() {
        let mgr = FontManager::default();
        let lines = wrap_text("a\n   + extra cheese", 10.0, false, 500.0, &mgr);
        assert_eq!(lines, vec!["a", "   + extra cheese"]);
    }

    #[test]
    fn long_word_breaks_between_characters() {
        let mgr = FontManager::default();
        let url = "localfirst.example/orders/LF-4829/receipt?ref=kitchen";
        let lines = wrap_text(&format!("See {url} now"), 10.0, false, 60.0, &mgr);
        assert!(lines.len() > 3, "{lines:?}");
        for line in &lines {
            assert!(mgr.measure_text_width(line, 10.0, false) <= 60.0, "{line:?}");
        }
        assert_eq!(lines[0], "See");
        assert_eq!(lines.concat().replace(' ', ""), format!("See{url}now"));
    }

    #[test]
    fn long_word_keeps_indent() {
        let mgr = FontManager::default();
        let lines = wrap_text("   + WWWWWWWWWWWWWWWW", 10.0, true, 50.0, &mgr);
        assert!(lines.len() > 1);
        assert!(lines.iter().skip(1).all(|l| l.starts_with("   ")), "{lines:?}");
        for line in &lines {
            assert!(mgr.measure_text_width(line, 10.0, true) <= 50.0, "{line:?}");
        }
    }
}
