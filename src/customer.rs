//! Customer receipt assembler.
//!
//! Maps an [`Order`] to the fixed block sequence of the customer-facing
//! receipt: header, delivery details, items, totals, payment, the
//! "Your Impact Today" story section and the footer.

use chrono::NaiveDateTime;

use crate::blocks::{Block, Column, PhotoCard, Rule, Table, TableRow, TextBlock};
use crate::format::{format_currency, format_phone, format_timestamp, TimestampPattern};
use crate::order::{DiscountKind, Order, Person};
use crate::photo::PhotoSource;
use crate::style::{
    CardStyle, Color, Role, StyleCatalog, TextAlign, DRIVER_CARD, OWNER_CARD, TABLE_GRID,
    TABLE_HEADER_FILL,
};

pub const BRAND_TITLE: &str = "🍕 LocalFirst YYC";
pub const TAGLINE: &str = "Support Local. Eat Amazing.";
pub const FIRST_ORDER_LABEL: &str = "🎉 First Order (10% OFF)";
pub const CONTACT_LINES: &str = "Questions? Contact us at (403) 826-5529\nor message us on WhatsApp";
pub const THANK_YOU: &str = "Thank you for supporting local! 💚";

const COMMUNITY_INTRO: &str = "By ordering through LocalFirst YYC, you've helped:";
const COMMUNITY_BULLETS: [&str; 4] = [
    "• Keep 100% of your dollars in Calgary",
    "• Support a family-owned business",
    "• Help a local driver earn fair wages",
    "• Build a stronger community",
];

/// Portrait edge length: 1.2 inch.
const PHOTO_SIZE: f32 = 86.4;

/// Build the customer receipt for `order`.
///
/// `now` stands in for a missing or unreadable creation timestamp. Photo
/// failures never abort the document; the affected story degrades to text.
pub fn build_customer_document(
    order: &Order,
    photos: &dyn PhotoSource,
    now: NaiveDateTime,
) -> Vec<Block> {
    let styles = StyleCatalog::customer();
    let mut blocks = Vec::new();

    if let Some(delta) = order.total_mismatch() {
        log::warn!(
            "order {}: total {} differs from its components by {delta:+.2}; printing as supplied",
            order.order_number(),
            format_currency(order.total())
        );
    }

    // Header
    blocks.push(Block::Title(TextBlock::new(BRAND_TITLE, styles.get(Role::Title))));
    blocks.push(Block::Body(TextBlock::new(TAGLINE, styles.get(Role::Subtitle))));
    blocks.push(Block::Spacer(12.0));

    // Order number + creation time
    blocks.push(Block::Body(TextBlock::new(
        format!("Order #{}", order.order_number()),
        styles.get(Role::OrderNumber),
    )));
    let created = order.created_at(now).instant();
    blocks.push(Block::Body(TextBlock::new(
        format_timestamp(&created, TimestampPattern::LongDate),
        styles.get(Role::Subtitle),
    )));
    blocks.push(Block::Spacer(12.0));
    blocks.push(Block::Rule(Rule::solid(1.0, styles.accent())));
    blocks.push(Block::Spacer(12.0));

    // Delivery details
    blocks.push(Block::SectionHeader(TextBlock::new(
        "📋 DELIVERY DETAILS",
        styles.get(Role::SectionHeader),
    )));
    blocks.push(Block::Body(TextBlock::new(
        order.customer_name(),
        styles.get(Role::Emphasis),
    )));
    blocks.push(Block::Body(TextBlock::new(
        format!("📱 {}", format_phone(order.customer_phone())),
        styles.get(Role::Body),
    )));
    blocks.push(Block::Body(TextBlock::new(
        format!("📍 {}", order.customer_address()),
        styles.get(Role::Body),
    )));
    blocks.push(Block::Spacer(12.0));

    blocks.push(Block::SectionHeader(TextBlock::new(
        format!("🍽️ FROM: {}", order.restaurant_name()),
        styles.get(Role::SectionHeader),
    )));
    blocks.push(Block::Spacer(6.0));

    blocks.push(Block::Table(item_table(order, &styles)));
    blocks.push(Block::Spacer(12.0));
    blocks.push(Block::Table(totals_table(order, &styles)));
    blocks.push(Block::Spacer(12.0));

    let method = order.payment_method();
    blocks.push(Block::Body(TextBlock::new(
        format!("Payment: {} {}", method.icon(), method.label()),
        styles.get(Role::Body),
    )));
    blocks.push(Block::Spacer(20.0));

    blocks.push(Block::Rule(Rule::solid(2.0, styles.accent())));
    blocks.push(Block::Spacer(12.0));

    // Your Impact Today
    blocks.push(Block::SectionHeader(TextBlock::new(
        "💚 YOUR IMPACT TODAY",
        styles.get(Role::SectionHeader),
    )));
    blocks.push(Block::Spacer(10.0));

    if let Some(owner) = order.owner() {
        let story = StoryBlock {
            heading: format!("👩‍🍳 Meet {}", owner.name_or("the Owner")),
            story: owner
                .story_or("Thank you for supporting our local restaurant!")
                .to_string(),
            card: OWNER_CARD,
        };
        story.push_into(&mut blocks, owner, photos, &styles);
    }

    if let Some(driver) = order.driver() {
        let story = StoryBlock {
            heading: format!("🚗 Your Driver: {}", driver.name_or("Driver")),
            story: driver.story_or("Thank you for the tip!").to_string(),
            card: DRIVER_CARD,
        };
        story.push_into(&mut blocks, driver, photos, &styles);
    }

    blocks.push(Block::Spacer(8.0));
    blocks.push(Block::Body(TextBlock::new(
        COMMUNITY_INTRO,
        styles.get(Role::Emphasis),
    )));
    blocks.push(Block::Body(TextBlock::new(
        COMMUNITY_BULLETS.join("\n"),
        styles.get(Role::Story),
    )));
    blocks.push(Block::Spacer(20.0));

    // Footer
    blocks.push(Block::Rule(Rule::solid(1.0, Color::GREY)));
    blocks.push(Block::Spacer(8.0));
    blocks.push(Block::Body(TextBlock::new(
        CONTACT_LINES,
        styles.get(Role::Footer),
    )));
    blocks.push(Block::Spacer(8.0));
    blocks.push(Block::Body(TextBlock::new(THANK_YOU, styles.get(Role::ThankYou))));

    blocks
}

fn item_table(order: &Order, styles: &StyleCatalog) -> Table {
    let mut header = TableRow::new(
        vec!["Item".to_string(), "Qty".to_string(), "Price".to_string()],
        styles.get(Role::TableHeader),
    );
    header.background = Some(TABLE_HEADER_FILL);
    header.padding = 8.0;

    let mut rows = vec![header];
    rows.extend(order.items.iter().map(|item| {
        let mut row = TableRow::new(
            vec![
                item.name().to_string(),
                item.quantity().to_string(),
                format_currency(item.unit_price()),
            ],
            styles.get(Role::TableCell),
        );
        row.padding = 6.0;
        row
    }));

    Table {
        columns: vec![
            Column {
                width: 4.0 / 5.5,
                align: TextAlign::Left,
            },
            Column {
                width: 0.5 / 5.5,
                align: TextAlign::Center,
            },
            Column {
                width: 1.0 / 5.5,
                align: TextAlign::Right,
            },
        ],
        rows,
        grid: Some(TABLE_GRID),
        width: 1.0,
    }
}

/// Label/value rows of the money summary, in display order.
pub fn totals_rows(order: &Order) -> Vec<(String, String)> {
    let mut rows = vec![("Subtotal".to_string(), format_currency(order.subtotal()))];

    let discount = order.discount();
    if discount > 0.0 {
        let label = match order.discount_kind() {
            DiscountKind::FirstOrder => FIRST_ORDER_LABEL,
            DiscountKind::Generic => "Discount",
        };
        rows.push((label.to_string(), format_currency(-discount)));
    }

    let fee = order.delivery_fee();
    if fee > 0.0 {
        rows.push(("Delivery Fee".to_string(), format_currency(fee)));
    } else {
        rows.push(("Delivery".to_string(), "FREE".to_string()));
    }

    let tip = order.tip();
    if tip > 0.0 {
        rows.push(("Driver Tip".to_string(), format_currency(tip)));
    }

    rows.push((String::new(), String::new()));
    rows.push(("TOTAL".to_string(), format_currency(order.total())));
    rows
}

fn totals_table(order: &Order, styles: &StyleCatalog) -> Table {
    let summary = totals_rows(order);
    let last = summary.len() - 1;
    let rows = summary
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| {
            if i == last {
                let mut row = TableRow::new(vec![label, value], styles.get(Role::GrandTotalLabel));
                row.cell_styles = vec![None, Some(styles.get(Role::GrandTotalValue))];
                row.rule_above = Some(Rule::solid(1.0, styles.accent()));
                row.padding = 8.0;
                row
            } else {
                let mut row = TableRow::new(vec![label, value], styles.get(Role::TotalsLabel));
                row.cell_styles = vec![None, Some(styles.get(Role::TotalsValue))];
                row
            }
        })
        .collect();

    Table {
        columns: vec![
            Column {
                width: 4.5 / 5.5,
                align: TextAlign::Right,
            },
            Column {
                width: 1.0 / 5.5,
                align: TextAlign::Right,
            },
        ],
        rows,
        grid: None,
        width: 1.0,
    }
}

/// Owner or driver story, rendered as a photo card when the portrait loads.
struct StoryBlock {
    heading: String,
    story: String,
    card: CardStyle,
}

impl StoryBlock {
    fn push_into(
        self,
        blocks: &mut Vec<Block>,
        person: &Person,
        photos: &dyn PhotoSource,
        styles: &StyleCatalog,
    ) {
        let quoted = format!("\"{}\"", self.story);
        let photo = match person.photo_ref() {
            None => None,
            Some(reference) => match photos.load(reference) {
                Ok(photo) => Some(photo),
                Err(e) => {
                    log::warn!("{}: {e}; printing story without photo", self.heading);
                    None
                }
            },
        };

        match photo {
            Some(photo) => blocks.push(Block::PhotoCard(PhotoCard {
                photo,
                photo_size: PHOTO_SIZE,
                heading: TextBlock::new(self.heading, styles.get(Role::Story).bold()),
                story: TextBlock::new(quoted, styles.get(Role::Story).italic()),
                card: self.card,
            })),
            None => {
                blocks.push(Block::Body(TextBlock::new(
                    self.heading,
                    styles.get(Role::Emphasis),
                )));
                blocks.push(Block::Body(TextBlock::new(
                    quoted,
                    styles.get(Role::Story).italic(),
                )));
            }
        }
        blocks.push(Block::Spacer(12.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::document_text;
    use crate::error::PhotoError;
    use crate::order::{Item, PaymentMethod};
    use crate::photo::{tests::TINY_PNG, NoPhotos, Photo};
    use chrono::NaiveDate;
    use std::path::Path;

    struct TinyPhotos;

    impl PhotoSource for TinyPhotos {
        fn load(&self, _reference: &str) -> Result<Photo, PhotoError> {
            Photo::from_bytes(TINY_PNG.to_vec(), Path::new("tiny.png"))
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(15, 5, 9)
            .unwrap()
    }

    fn scenario_order() -> Order {
        Order {
            order_number: Some("LF-4829".to_string()),
            items: vec![Item {
                name: Some("Garlic Bread".to_string()),
                quantity: Some(2),
                price: Some(5.99),
                ..Item::default()
            }],
            subtotal: Some(30.97),
            discount: Some(3.10),
            discount_kind: Some(DiscountKind::FirstOrder),
            delivery_fee: Some(0.0),
            tip: Some(5.57),
            total: Some(33.44),
            payment_method: Some(PaymentMethod::Visa),
            ..Order::default()
        }
    }

    fn person(name: &str, photo: Option<&str>) -> Person {
        Person {
            name: Some(name.to_string()),
            photo: photo.map(str::to_string),
            story: Some("A story.".to_string()),
        }
    }

    fn totals_of(blocks: &[Block]) -> &Table {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Table(t) if t.columns.len() == 2 => Some(t),
                _ => None,
            })
            .next()
            .expect("totals table")
    }

    #[test]
    fn totals_scenario_rows_in_order() {
        let blocks = build_customer_document(&scenario_order(), &NoPhotos, now());
        let rows: Vec<String> = totals_of(&blocks).rows.iter().map(TableRow::text).collect();
        assert_eq!(
            rows,
            vec![
                "Subtotal $30.97",
                "🎉 First Order (10% OFF) -$3.10",
                "Delivery FREE",
                "Driver Tip $5.57",
                "",
                "TOTAL $33.44",
            ]
        );
    }

    #[test]
    fn grand_total_is_emphasised() {
        let blocks = build_customer_document(&scenario_order(), &NoPhotos, now());
        let total = totals_of(&blocks).rows.last().unwrap();
        assert!(total.rule_above.is_some());
        assert!(total.style_for(1).font_size > 10.0);
        assert_eq!(total.style_for(1).color, StyleCatalog::customer().accent());
    }

    #[test]
    fn no_discount_row_without_discount() {
        let order = Order {
            discount: Some(0.0),
            ..scenario_order()
        };
        let rows = totals_rows(&order);
        assert!(rows.iter().all(|(l, _)| !l.contains("Discount") && !l.contains("First Order")));
        assert_eq!(rows[1].0, "Delivery");
    }

    #[test]
    fn generic_discount_label() {
        let order = Order {
            discount_kind: Some(DiscountKind::Generic),
            ..scenario_order()
        };
        let rows = totals_rows(&order);
        assert_eq!(rows[1], ("Discount".to_string(), "-$3.10".to_string()));
    }

    #[test]
    fn paid_delivery_fee_and_no_tip() {
        let order = Order {
            delivery_fee: Some(4.99),
            tip: None,
            ..scenario_order()
        };
        let labels: Vec<String> = totals_rows(&order).into_iter().map(|(l, _)| l).collect();
        assert!(labels.contains(&"Delivery Fee".to_string()));
        assert!(!labels.contains(&"Driver Tip".to_string()));
        assert!(!totals_rows(&order).iter().any(|(_, v)| v == "$0.00" || v == "FREE"));
    }

    #[test]
    fn item_table_has_header_and_rows() {
        let blocks = build_customer_document(&scenario_order(), &NoPhotos, now());
        let table = blocks
            .iter()
            .find_map(|b| match b {
                Block::Table(t) if t.columns.len() == 3 => Some(t),
                _ => None,
            })
            .unwrap();
        assert_eq!(table.rows[0].cells, vec!["Item", "Qty", "Price"]);
        assert!(table.rows[0].background.is_some());
        assert_eq!(table.rows[1].cells, vec!["Garlic Bread", "2", "$5.99"]);
    }

    #[test]
    fn empty_order_degrades_to_defaults() {
        let blocks = build_customer_document(&Order::default(), &NoPhotos, now());
        let text = document_text(&blocks);
        assert!(text.contains(&"Order #N/A".to_string()));
        assert!(text.contains(&"Guest".to_string()));
        assert!(text.contains(&"📍 N/A".to_string()));
        assert!(text.contains(&"October 18, 2026 at 03:05 PM".to_string()));
        assert!(text.contains(&"Payment: 💳 Card".to_string()));
    }

    #[test]
    fn payment_labels() {
        for (method, label) in [
            (PaymentMethod::Cash, "Payment: 💵 Cash on Delivery"),
            (PaymentMethod::Visa, "Payment: 💳 Visa"),
            (PaymentMethod::Mastercard, "Payment: 💳 Mastercard"),
            (PaymentMethod::Amex, "Payment: 💳 American Express"),
            (PaymentMethod::Debit, "Payment: 🏦 Debit Card"),
        ] {
            let order = Order {
                payment_method: Some(method),
                ..Order::default()
            };
            let text = document_text(&build_customer_document(&order, &NoPhotos, now()));
            assert!(text.contains(&label.to_string()), "{label}");
        }
    }

    #[test]
    fn owner_with_photo_renders_card() {
        let order = Order {
            restaurant_owner: Some(person("Fatima", Some("fatima.png"))),
            ..scenario_order()
        };
        let blocks = build_customer_document(&order, &TinyPhotos, now());
        let card = blocks
            .iter()
            .find_map(|b| match b {
                Block::PhotoCard(c) => Some(c),
                _ => None,
            })
            .expect("photo card");
        assert_eq!(card.heading.text, "👩‍🍳 Meet Fatima");
        assert_eq!(card.story.text, "\"A story.\"");
        assert_eq!(card.card, OWNER_CARD);
    }

    #[test]
    fn unreadable_owner_photo_degrades_to_text() {
        let order = Order {
            restaurant_owner: Some(person("Fatima", Some("/no/such/fatima.jpg"))),
            ..scenario_order()
        };
        let blocks = build_customer_document(&order, &crate::photo::FsPhotoSource::new(), now());
        assert!(!blocks.iter().any(|b| matches!(b, Block::PhotoCard(_))));
        let text = document_text(&blocks);
        assert!(text.contains(&"👩‍🍳 Meet Fatima".to_string()));
        assert!(text.contains(&"\"A story.\"".to_string()));
    }

    #[test]
    fn driver_block_omitted_without_driver() {
        let blocks = build_customer_document(&scenario_order(), &TinyPhotos, now());
        let text = document_text(&blocks);
        assert!(!text.iter().any(|t| t.contains("Your Driver")));
        assert!(!blocks.iter().any(|b| matches!(b, Block::PhotoCard(_))));
    }

    #[test]
    fn driver_card_uses_its_own_accent() {
        let order = Order {
            driver: Some(person("Ahmed", Some("ahmed.png"))),
            ..scenario_order()
        };
        let blocks = build_customer_document(&order, &TinyPhotos, now());
        let card = blocks
            .iter()
            .find_map(|b| match b {
                Block::PhotoCard(c) => Some(c),
                _ => None,
            })
            .unwrap();
        assert_eq!(card.heading.text, "🚗 Your Driver: Ahmed");
        assert_eq!(card.card, DRIVER_CARD);
        assert_ne!(card.card.border, OWNER_CARD.border);
    }

    #[test]
    fn section_order_is_fixed() {
        let order = Order {
            restaurant_owner: Some(person("Fatima", None)),
            driver: Some(person("Ahmed", None)),
            ..scenario_order()
        };
        let text = document_text(&build_customer_document(&order, &NoPhotos, now()));
        let pos = |needle: &str| {
            text.iter()
                .position(|t| t.contains(needle))
                .unwrap_or_else(|| panic!("missing {needle}"))
        };
        let order_of = [
            pos(BRAND_TITLE),
            pos("Order #LF-4829"),
            pos("DELIVERY DETAILS"),
            pos("FROM:"),
            pos("Garlic Bread"),
            pos("Subtotal"),
            pos("Payment:"),
            pos("YOUR IMPACT TODAY"),
            pos("Meet Fatima"),
            pos("Your Driver: Ahmed"),
            pos("you've helped"),
            pos("Questions?"),
            pos("Thank you for supporting local!"),
        ];
        assert!(order_of.windows(2).all(|w| w[0] < w[1]), "{order_of:?}");
    }
}
