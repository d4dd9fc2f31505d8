//! Style catalog – named text presets keyed by semantic [`Role`].
//!
//! Two parallel palettes exist: the customer receipt (brand green accent,
//! warm story cards) and the kitchen ticket (large monochrome type for a
//! thermal-width page). Both are static configuration.

/// Horizontal alignment of a text run inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    /// The "grey" of the receipt subtitles and footer.
    pub const GREY: Self = Self::rgb(0x80, 0x80, 0x80);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a < 0.001
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

// ---------------------------------------------------------------------------
// Brand colours
// ---------------------------------------------------------------------------

/// WhatsApp-style brand green, the customer palette accent.
pub const BRAND_GREEN: Color = Color::rgb(0x25, 0xD3, 0x66);
pub const STORY_TEXT: Color = Color::rgb(0x44, 0x44, 0x44);
pub const TABLE_HEADER_FILL: Color = Color::rgb(0xF0, 0xF0, 0xF0);
pub const TABLE_HEADER_TEXT: Color = Color::rgb(0x33, 0x33, 0x33);
pub const TABLE_GRID: Color = Color::rgb(0xDD, 0xDD, 0xDD);
pub const OWNER_CARD_FILL: Color = Color::rgb(0xFF, 0xF8, 0xF0);
pub const OWNER_CARD_BORDER: Color = Color::rgb(0xE0, 0x70, 0x20);
pub const DRIVER_CARD_FILL: Color = Color::rgb(0xF0, 0xFF, 0xF4);
pub const DRIVER_CARD_BORDER: Color = BRAND_GREEN;

/// Colours of a tinted story card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardStyle {
    pub background: Color,
    pub border: Color,
    pub border_width: f32,
    pub padding: f32,
}

pub const OWNER_CARD: CardStyle = CardStyle {
    background: OWNER_CARD_FILL,
    border: OWNER_CARD_BORDER,
    border_width: 2.0,
    padding: 10.0,
};

pub const DRIVER_CARD: CardStyle = CardStyle {
    background: DRIVER_CARD_FILL,
    border: DRIVER_CARD_BORDER,
    border_width: 2.0,
    padding: 10.0,
};

// ---------------------------------------------------------------------------
// Text styles
// ---------------------------------------------------------------------------

/// Fully resolved style for one run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub color: Color,
    pub text_align: TextAlign,
    /// Line height as a multiple of `font_size`.
    pub line_height: f32,
    pub space_before: f32,
    pub space_after: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            color: Color::BLACK,
            text_align: TextAlign::Left,
            line_height: 1.2,
            space_before: 0.0,
            space_after: 0.0,
        }
    }
}

impl TextStyle {
    pub fn is_bold(&self) -> bool {
        self.font_weight == FontWeight::Bold
    }

    pub fn bold(mut self) -> Self {
        self.font_weight = FontWeight::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.font_style = FontStyle::Italic;
        self
    }

    pub fn aligned(mut self, align: TextAlign) -> Self {
        self.text_align = align;
        self
    }
}

/// Semantic role of a piece of text on either document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Title,
    Subtitle,
    Body,
    Emphasis,
    SectionHeader,
    Story,
    TableHeader,
    TableCell,
    TotalsLabel,
    TotalsValue,
    GrandTotalLabel,
    GrandTotalValue,
    Footer,
    ThankYou,
    OrderNumber,
    Item,
    Note,
    PrintTime,
}

/// Which document a palette belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Customer,
    Kitchen,
}

/// A fixed role → style mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleCatalog {
    palette: Palette,
}

impl StyleCatalog {
    pub const fn customer() -> Self {
        Self {
            palette: Palette::Customer,
        }
    }

    pub const fn kitchen() -> Self {
        Self {
            palette: Palette::Kitchen,
        }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Accent colour used for rules and emphasised values.
    pub fn accent(&self) -> Color {
        match self.palette {
            Palette::Customer => BRAND_GREEN,
            Palette::Kitchen => Color::BLACK,
        }
    }

    pub fn get(&self, role: Role) -> TextStyle {
        match self.palette {
            Palette::Customer => customer_style(role),
            Palette::Kitchen => kitchen_style(role),
        }
    }
}

fn customer_style(role: Role) -> TextStyle {
    let base = TextStyle::default();
    match role {
        Role::Title => TextStyle {
            font_size: 18.0,
            text_align: TextAlign::Center,
            color: BRAND_GREEN,
            space_after: 6.0,
            ..base
        }
        .bold(),
        Role::Subtitle => TextStyle {
            text_align: TextAlign::Center,
            color: Color::GREY,
            ..base
        },
        Role::Body => base,
        Role::Emphasis => base.bold(),
        Role::SectionHeader => TextStyle {
            font_size: 12.0,
            color: BRAND_GREEN,
            space_before: 12.0,
            space_after: 6.0,
            ..base
        }
        .bold(),
        Role::Story => TextStyle {
            font_size: 9.0,
            color: STORY_TEXT,
            line_height: 12.0 / 9.0,
            space_before: 6.0,
            space_after: 6.0,
            ..base
        },
        Role::TableHeader => TextStyle {
            color: TABLE_HEADER_TEXT,
            ..base
        }
        .bold(),
        Role::TableCell | Role::Item => base,
        Role::TotalsLabel => base.aligned(TextAlign::Right),
        Role::TotalsValue => base.aligned(TextAlign::Right),
        Role::GrandTotalLabel => TextStyle {
            font_size: 14.0,
            text_align: TextAlign::Right,
            ..base
        }
        .bold(),
        Role::GrandTotalValue => TextStyle {
            font_size: 14.0,
            text_align: TextAlign::Right,
            color: BRAND_GREEN,
            ..base
        }
        .bold(),
        Role::Footer => TextStyle {
            font_size: 9.0,
            text_align: TextAlign::Center,
            color: Color::GREY,
            ..base
        },
        Role::ThankYou => TextStyle {
            font_size: 12.0,
            text_align: TextAlign::Center,
            color: BRAND_GREEN,
            ..base
        }
        .bold(),
        Role::OrderNumber => base.bold(),
        Role::Note => base.italic(),
        Role::PrintTime => TextStyle {
            font_size: 8.0,
            text_align: TextAlign::Center,
            color: Color::GREY,
            ..base
        },
    }
}

fn kitchen_style(role: Role) -> TextStyle {
    let normal = TextStyle {
        font_size: 10.0,
        space_after: 2.0,
        ..TextStyle::default()
    };
    let item = TextStyle {
        font_size: 14.0,
        space_after: 4.0,
        ..TextStyle::default()
    }
    .bold();
    match role {
        Role::Title => TextStyle {
            font_size: 16.0,
            text_align: TextAlign::Center,
            space_after: 4.0,
            ..TextStyle::default()
        }
        .bold(),
        Role::OrderNumber => TextStyle {
            font_size: 24.0,
            text_align: TextAlign::Center,
            space_after: 8.0,
            ..TextStyle::default()
        }
        .bold(),
        Role::Item
        | Role::Emphasis
        | Role::SectionHeader
        | Role::GrandTotalLabel
        | Role::GrandTotalValue => item,
        Role::PrintTime | Role::Footer => TextStyle {
            font_size: 8.0,
            text_align: TextAlign::Center,
            color: Color::GREY,
            ..TextStyle::default()
        },
        Role::Subtitle | Role::ThankYou => normal.aligned(TextAlign::Center),
        Role::TableHeader => normal.bold(),
        Role::Body
        | Role::Story
        | Role::TableCell
        | Role::TotalsLabel
        | Role::TotalsValue
        | Role::Note => normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [Role; 18] = [
        Role::Title,
        Role::Subtitle,
        Role::Body,
        Role::Emphasis,
        Role::SectionHeader,
        Role::Story,
        Role::TableHeader,
        Role::TableCell,
        Role::TotalsLabel,
        Role::TotalsValue,
        Role::GrandTotalLabel,
        Role::GrandTotalValue,
        Role::Footer,
        Role::ThankYou,
        Role::OrderNumber,
        Role::Item,
        Role::Note,
        Role::PrintTime,
    ];

    #[test]
    fn kitchen_order_number_is_largest() {
        let kitchen = StyleCatalog::kitchen();
        let largest = kitchen.get(Role::OrderNumber).font_size;
        for role in ALL_ROLES {
            if role != Role::OrderNumber {
                assert!(kitchen.get(role).font_size < largest, "{role:?}");
            }
        }
    }

    #[test]
    fn kitchen_palette_is_monochrome_except_print_time() {
        let kitchen = StyleCatalog::kitchen();
        for role in ALL_ROLES {
            let style = kitchen.get(role);
            if matches!(role, Role::PrintTime | Role::Footer) {
                assert_eq!(style.color, Color::GREY);
            } else {
                assert_eq!(style.color, Color::BLACK, "{role:?}");
            }
        }
    }

    #[test]
    fn customer_accents_are_green() {
        let customer = StyleCatalog::customer();
        assert_eq!(customer.accent(), BRAND_GREEN);
        assert_eq!(customer.get(Role::Title).color, BRAND_GREEN);
        assert_eq!(customer.get(Role::GrandTotalValue).color, BRAND_GREEN);
        assert!(customer.get(Role::GrandTotalValue).font_size > customer.get(Role::TotalsValue).font_size);
    }
}
