//! Demo orders for trying the renderer end to end.
//!
//! The photo references are relative file names; with the default
//! [`FsPhotoSource`](crate::photo::FsPhotoSource) they resolve against the
//! working directory and fall back to text-only stories when absent.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::order::{DiscountKind, Item, Order, PaymentMethod, Person};
use crate::pipeline::ReceiptRenderer;

const OWNER_STORY: &str = "I came to Calgary from Jordan 12 years ago with nothing but my \
grandmother's recipes and a dream. Every pizza we make carries four generations of love. \
Your order today helps me put my two daughters through university and keeps our family \
tradition alive. From our family to yours - thank you for believing in us! 🙏";

const DRIVER_STORY: &str = "I'm a Computer Science student at the University of Calgary, \
originally from Sudan. Delivering for LocalFirst lets me pay my tuition without taking \
loans. Every tip goes straight into my education fund - I'm saving up to start my own tech \
company one day! Thank you for helping me build my future. 💚";

fn item(name: &str, price: f64, toppings: &[&str]) -> Item {
    Item {
        name: Some(name.to_string()),
        quantity: Some(1),
        price: Some(price),
        toppings: toppings.iter().map(|t| t.to_string()).collect(),
        instructions: None,
    }
}

/// A card-paid first order with an owner and a driver story.
pub fn sample_order() -> Order {
    let mut order = Order {
        order_number: Some("LF-4829".to_string()),
        restaurant_owner: Some(Person {
            name: Some("Fatima Al-Hassan".to_string()),
            photo: Some("fatima_profile.jpg".to_string()),
            story: Some(OWNER_STORY.to_string()),
        }),
        driver: Some(Person {
            name: Some("Ahmed Hassan".to_string()),
            photo: Some("ahmed_profile.jpg".to_string()),
            story: Some(DRIVER_STORY.to_string()),
        }),
        items: vec![
            item("Pepperoni Classic (Large)", 20.99, &["Extra Cheese"]),
            item("Garlic Bread", 5.99, &[]),
            item("Coca-Cola (2L)", 3.99, &[]),
        ],
        subtotal: Some(30.97),
        discount: Some(3.10),
        discount_kind: Some(DiscountKind::FirstOrder),
        delivery_fee: Some(0.0),
        tip: Some(5.57),
        total: Some(33.44),
        payment_method: Some(PaymentMethod::Visa),
        created_at: Some("2026-10-18T18:42:00".to_string()),
        ..Order::default()
    };
    order.customer.name = Some("Sarah Johnson".to_string());
    order.customer.phone = Some("14035551234".to_string());
    order.customer.address = Some("123 Main St NW, Calgary, AB T2N 1A1".to_string());
    order.restaurant.name = Some("AB King Pizza".to_string());
    order
}

/// The same basket paid in cash at the door.
pub fn sample_cash_order() -> Order {
    let mut order = sample_order();
    order.order_number = Some("LF-4830".to_string());
    order.payment_method = Some(PaymentMethod::Cash);
    order.customer.name = Some("Mike Chen".to_string());
    order
}

/// Write the demo set into `out_dir`: the customer receipt and kitchen
/// ticket for [`sample_order`] and the kitchen ticket for
/// [`sample_cash_order`].
pub fn render_samples(renderer: &ReceiptRenderer, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let order = sample_order();
    let cash = sample_cash_order();
    Ok(vec![
        renderer.render_customer_receipt(&order, out_dir.join("customer_receipt.pdf"))?,
        renderer.render_kitchen_ticket(&order, out_dir.join("kitchen_receipt.pdf"))?,
        renderer.render_kitchen_ticket(&cash, out_dir.join("kitchen_receipt_cod.pdf"))?,
    ])
}
