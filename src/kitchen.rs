//! Kitchen ticket assembler.
//!
//! Terse monochrome ticket for the kitchen and the driver: big order
//! number, upper-cased names, and the cash/paid marker that decides whether
//! money is collected at the door.

use chrono::NaiveDateTime;

use crate::blocks::{Block, Rule, TextBlock};
use crate::format::{format_currency, format_phone, format_timestamp, TimestampPattern};
use crate::order::Order;
use crate::style::{Color, Role, StyleCatalog};

pub const BRAND_HEADER: &str = "🍕 LOCALFIRST YYC";
pub const KITCHEN_MARKER: &str = "*** KITCHEN ORDER ***";
pub const CASH_WARNING: &str = "⚠️ CASH ON DELIVERY ⚠️";
pub const PAID_ONLINE: &str = "✓ PAID ONLINE";
/// Prefix of the only line that changes between two renders of one order.
pub const PRINTED_PREFIX: &str = "Printed: ";

fn separator() -> Block {
    Block::Rule(Rule::dashed(1.0, Color::BLACK))
}

/// Build the kitchen ticket for `order`.
///
/// `now` is the print instant. It also stands in for a missing or unreadable
/// creation time.
pub fn build_kitchen_document(order: &Order, now: NaiveDateTime) -> Vec<Block> {
    let styles = StyleCatalog::kitchen();
    let text = |s: String, role: Role| Block::Body(TextBlock::new(s, styles.get(role)));
    let mut blocks = Vec::new();

    blocks.push(Block::Title(TextBlock::new(BRAND_HEADER, styles.get(Role::Title))));
    blocks.push(Block::Title(TextBlock::new(KITCHEN_MARKER, styles.get(Role::Title))));
    blocks.push(Block::Spacer(8.0));

    blocks.push(text(format!("#{}", order.order_number()), Role::OrderNumber));

    let created = order.created_at(now).instant();
    blocks.push(text(
        format!("Time: {}", format_timestamp(&created, TimestampPattern::TimeOfDay)),
        Role::Subtitle,
    ));
    blocks.push(Block::Spacer(8.0));

    blocks.push(separator());
    blocks.push(Block::Spacer(4.0));
    blocks.push(text(
        format!("CUSTOMER: {}", order.customer_name().to_uppercase()),
        Role::Item,
    ));
    blocks.push(Block::Spacer(8.0));

    blocks.push(separator());
    blocks.push(Block::Spacer(4.0));
    blocks.push(Block::SectionHeader(TextBlock::new(
        "ORDER ITEMS:",
        styles.get(Role::SectionHeader),
    )));
    blocks.push(Block::Spacer(4.0));
    for item in &order.items {
        blocks.push(text(
            format!("{}x {}", item.quantity(), item.name().to_uppercase()),
            Role::Item,
        ));
        for topping in item.toppings.iter().filter(|t| !t.trim().is_empty()) {
            blocks.push(text(format!("   + {topping}"), Role::Body));
        }
        if let Some(note) = item.instruction() {
            blocks.push(text(format!("   ⚠️ NOTE: {note}"), Role::Note));
        }
        blocks.push(Block::Spacer(6.0));
    }

    blocks.push(separator());
    blocks.push(Block::Spacer(4.0));
    blocks.push(text("DELIVERY TO:".to_string(), Role::Emphasis));
    blocks.push(text(order.customer_address().to_string(), Role::Body));
    blocks.push(text(
        format!("Phone: {}", format_phone(order.customer_phone())),
        Role::Body,
    ));
    blocks.push(Block::Spacer(8.0));

    if order.payment_method().is_cash() {
        blocks.push(text(CASH_WARNING.to_string(), Role::Emphasis));
        blocks.push(text(
            format!("Amount due: {}", format_currency(order.total())),
            Role::Emphasis,
        ));
    } else {
        blocks.push(text(PAID_ONLINE.to_string(), Role::Emphasis));
    }
    blocks.push(Block::Spacer(8.0));

    blocks.push(separator());
    if let Some(driver) = order.driver() {
        blocks.push(Block::Spacer(4.0));
        blocks.push(text(format!("DRIVER: {}", driver.name_or("TBD")), Role::Body));
    }

    blocks.push(Block::Spacer(8.0));
    blocks.push(text(
        format!(
            "{PRINTED_PREFIX}{}",
            format_timestamp(&now, TimestampPattern::PrintTime)
        ),
        Role::PrintTime,
    ));

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::document_text;
    use crate::order::{Item, PaymentMethod, Person};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn order(method: PaymentMethod) -> Order {
        Order {
            order_number: Some("LF-4829".to_string()),
            customer: crate::order::Customer {
                name: Some("Sarah Johnson".to_string()),
                phone: Some("4035551234".to_string()),
                address: Some("123 Main St NW".to_string()),
            },
            items: vec![Item {
                name: Some("Large Pepperoni Pizza".to_string()),
                quantity: Some(1),
                price: Some(18.99),
                toppings: vec!["Extra Cheese".to_string(), "Mushrooms".to_string()],
                instructions: Some("Well done please".to_string()),
            }],
            subtotal: Some(18.99),
            total: Some(22.57),
            payment_method: Some(method),
            created_at: Some("2026-10-18T14:30:00".to_string()),
            ..Order::default()
        }
    }

    fn contains(text: &[String], needle: &str) -> bool {
        text.iter().any(|t| t.contains(needle))
    }

    #[test]
    fn cash_orders_show_amount_due() {
        let text = document_text(&build_kitchen_document(&order(PaymentMethod::Cash), at(15, 0, 0)));
        assert!(contains(&text, "CASH ON DELIVERY"));
        assert!(text.contains(&"Amount due: $22.57".to_string()));
        assert!(!contains(&text, "PAID ONLINE"));
    }

    #[test]
    fn paid_orders_have_no_amount_due() {
        for method in [
            PaymentMethod::Visa,
            PaymentMethod::Mastercard,
            PaymentMethod::Debit,
            PaymentMethod::Amex,
            PaymentMethod::Card,
        ] {
            let text = document_text(&build_kitchen_document(&order(method), at(15, 0, 0)));
            assert!(contains(&text, "PAID ONLINE"), "{method:?}");
            assert!(!contains(&text, "Amount due"), "{method:?}");
            assert!(!contains(&text, "CASH ON DELIVERY"), "{method:?}");
        }
    }

    #[test]
    fn driver_line_only_with_driver() {
        let without = document_text(&build_kitchen_document(&order(PaymentMethod::Visa), at(15, 0, 0)));
        assert!(!contains(&without, "DRIVER:"));

        let with_driver = Order {
            driver: Some(Person {
                name: Some("Ahmed".to_string()),
                ..Person::default()
            }),
            ..order(PaymentMethod::Visa)
        };
        let text = document_text(&build_kitchen_document(&with_driver, at(15, 0, 0)));
        assert!(text.contains(&"DRIVER: Ahmed".to_string()));

        let unnamed = Order {
            driver: Some(Person {
                story: Some("New on the team".to_string()),
                ..Person::default()
            }),
            ..order(PaymentMethod::Visa)
        };
        let text = document_text(&build_kitchen_document(&unnamed, at(15, 0, 0)));
        assert!(text.contains(&"DRIVER: TBD".to_string()));
    }

    #[test]
    fn header_uses_creation_time_and_footer_uses_print_time() {
        let text = document_text(&build_kitchen_document(&order(PaymentMethod::Visa), at(15, 5, 9)));
        assert!(text.contains(&"Time: 02:30 PM".to_string()));
        assert_eq!(text.last().unwrap(), "Printed: 03:05:09 PM");
    }

    #[test]
    fn names_are_upper_cased() {
        let text = document_text(&build_kitchen_document(&order(PaymentMethod::Visa), at(15, 0, 0)));
        assert!(text.contains(&"CUSTOMER: SARAH JOHNSON".to_string()));
        assert!(text.contains(&"1x LARGE PEPPERONI PIZZA".to_string()));
        assert!(text.contains(&"   + Extra Cheese".to_string()));
        assert!(text.contains(&"   ⚠️ NOTE: Well done please".to_string()));
        assert!(text.contains(&"Phone: (403) 555-1234".to_string()));
    }

    #[test]
    fn order_number_is_largest_text() {
        let blocks = build_kitchen_document(&order(PaymentMethod::Visa), at(15, 0, 0));
        let sizes: Vec<(String, f32)> = blocks
            .iter()
            .filter_map(|b| match b {
                Block::Title(t) | Block::Body(t) | Block::SectionHeader(t) => {
                    Some((t.text.clone(), t.style.font_size))
                }
                _ => None,
            })
            .collect();
        let (largest, _) = sizes
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert_eq!(largest, "#LF-4829");
    }

    #[test]
    fn empty_order_still_renders_every_section() {
        let text = document_text(&build_kitchen_document(&Order::default(), at(9, 0, 0)));
        assert!(text.contains(&"#N/A".to_string()));
        assert!(text.contains(&"CUSTOMER: GUEST".to_string()));
        assert!(text.contains(&"ORDER ITEMS:".to_string()));
        assert!(text.contains(&"DELIVERY TO:".to_string()));
        assert!(text.contains(&"N/A".to_string()));
        assert!(text.contains(&"Phone: ".to_string()));
        assert!(text.contains(&"Time: 09:00 AM".to_string()));
    }
}
