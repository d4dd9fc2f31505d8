//! Order schema – the immutable input of a render call.
//!
//! The JSON shape is the flat record the ordering backend produces. Every
//! optional field is an `Option`; the documented defaults are resolved by the
//! accessor methods at read time so callers never see a half-filled record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::OrderError;
use crate::format::parse_timestamp;

/// Tolerance used when comparing money amounts.
const MONEY_EPSILON: f64 = 0.005;

/// One delivery order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(flatten)]
    pub customer: Customer,
    #[serde(flatten)]
    pub restaurant: Restaurant,
    #[serde(default)]
    pub restaurant_owner: Option<Person>,
    #[serde(default)]
    pub driver: Option<Person>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<Item>,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default, rename = "discount_type")]
    pub discount_kind: Option<DiscountKind>,
    #[serde(default)]
    pub delivery_fee: Option<f64>,
    #[serde(default)]
    pub tip: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// ISO-8601 creation instant, kept verbatim until read.
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, rename = "customer_name")]
    pub name: Option<String>,
    /// Some backends store the phone as a bare number.
    #[serde(default, rename = "customer_phone", deserialize_with = "phone_text")]
    pub phone: Option<String>,
    #[serde(default, rename = "customer_address")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(default, rename = "restaurant_name")]
    pub name: Option<String>,
}

/// Restaurant owner or driver, shown with a photo and a short story.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub name: Option<String>,
    /// Photo reference (a path for [`FsPhotoSource`](crate::photo::FsPhotoSource)).
    #[serde(default, rename = "image")]
    pub photo: Option<String>,
    #[serde(default)]
    pub story: Option<String>,
}

impl Person {
    /// A record with no fields at all counts as absent.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.photo.is_none() && self.story.is_none()
    }

    pub fn name_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_empty(self.name.as_deref()).unwrap_or(default)
    }

    pub fn story_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_empty(self.story.as_deref()).unwrap_or(default)
    }

    pub fn photo_ref(&self) -> Option<&str> {
        non_empty(self.photo.as_deref())
    }
}

/// One line item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    /// Unit price.
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub toppings: Vec<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl Item {
    pub fn name(&self) -> &str {
        non_empty(self.name.as_deref()).unwrap_or("Item")
    }

    pub fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }

    pub fn unit_price(&self) -> f64 {
        money(self.price)
    }

    /// Free-text kitchen instruction; blank strings count as absent.
    pub fn instruction(&self) -> Option<&str> {
        self.instructions
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Kind tag of the order discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DiscountKind {
    /// New-customer promotion, shown as "First Order (10% OFF)".
    FirstOrder,
    #[default]
    Generic,
}

impl From<String> for DiscountKind {
    fn from(s: String) -> Self {
        if s.trim().eq_ignore_ascii_case("first_order") {
            DiscountKind::FirstOrder
        } else {
            DiscountKind::Generic
        }
    }
}

impl From<DiscountKind> for String {
    fn from(k: DiscountKind) -> Self {
        match k {
            DiscountKind::FirstOrder => "first_order".to_string(),
            DiscountKind::Generic => "discount".to_string(),
        }
    }
}

/// How the customer pays. Unknown values fall back to [`PaymentMethod::Card`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    Cash,
    Visa,
    Mastercard,
    Debit,
    Amex,
    #[default]
    Card,
}

impl PaymentMethod {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => PaymentMethod::Cash,
            "visa" => PaymentMethod::Visa,
            "mastercard" => PaymentMethod::Mastercard,
            "debit" => PaymentMethod::Debit,
            "amex" => PaymentMethod::Amex,
            _ => PaymentMethod::Card,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Visa => "visa",
            PaymentMethod::Mastercard => "mastercard",
            PaymentMethod::Debit => "debit",
            PaymentMethod::Amex => "amex",
            PaymentMethod::Card => "card",
        }
    }

    /// Customer-facing label.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash on Delivery",
            PaymentMethod::Visa => "Visa",
            PaymentMethod::Mastercard => "Mastercard",
            PaymentMethod::Debit => "Debit Card",
            PaymentMethod::Amex => "American Express",
            PaymentMethod::Card => "Card",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "💵",
            PaymentMethod::Debit => "🏦",
            PaymentMethod::Visa
            | PaymentMethod::Mastercard
            | PaymentMethod::Amex
            | PaymentMethod::Card => "💳",
        }
    }

    /// Cash is collected at the door; everything else is paid before dispatch.
    pub fn is_cash(self) -> bool {
        self == PaymentMethod::Cash
    }
}

impl From<String> for PaymentMethod {
    fn from(s: String) -> Self {
        PaymentMethod::parse(&s)
    }
}

impl From<PaymentMethod> for String {
    fn from(m: PaymentMethod) -> Self {
        m.as_str().to_string()
    }
}

/// How the creation timestamp was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedAt {
    Recorded(NaiveDateTime),
    /// Absent or unparseable; the render instant is used instead.
    Defaulted(NaiveDateTime),
}

impl CreatedAt {
    pub fn instant(self) -> NaiveDateTime {
        match self {
            CreatedAt::Recorded(t) | CreatedAt::Defaulted(t) => t,
        }
    }
}

impl Order {
    /// Parse an order from the backend's JSON record.
    pub fn from_json(json: &str) -> Result<Self, OrderError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn order_number(&self) -> &str {
        non_empty(self.order_number.as_deref()).unwrap_or("N/A")
    }

    pub fn customer_name(&self) -> &str {
        non_empty(self.customer.name.as_deref()).unwrap_or("Guest")
    }

    pub fn customer_phone(&self) -> &str {
        self.customer.phone.as_deref().unwrap_or("")
    }

    pub fn customer_address(&self) -> &str {
        non_empty(self.customer.address.as_deref()).unwrap_or("N/A")
    }

    pub fn restaurant_name(&self) -> &str {
        non_empty(self.restaurant.name.as_deref()).unwrap_or("Restaurant")
    }

    pub fn owner(&self) -> Option<&Person> {
        self.restaurant_owner.as_ref().filter(|p| !p.is_empty())
    }

    pub fn driver(&self) -> Option<&Person> {
        self.driver.as_ref().filter(|p| !p.is_empty())
    }

    pub fn subtotal(&self) -> f64 {
        money(self.subtotal)
    }

    pub fn discount(&self) -> f64 {
        money(self.discount)
    }

    pub fn discount_kind(&self) -> DiscountKind {
        self.discount_kind.unwrap_or_default()
    }

    pub fn delivery_fee(&self) -> f64 {
        money(self.delivery_fee)
    }

    pub fn tip(&self) -> f64 {
        money(self.tip)
    }

    /// The total as supplied; falls back to the subtotal. Never re-derived.
    pub fn total(&self) -> f64 {
        self.total.map(|t| money(Some(t))).unwrap_or_else(|| self.subtotal())
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method.unwrap_or_default()
    }

    /// Resolve the creation instant, falling back to `now`.
    pub fn created_at(&self, now: NaiveDateTime) -> CreatedAt {
        match self.created_at.as_deref().map(str::trim) {
            None | Some("") => CreatedAt::Defaulted(now),
            Some(text) => match parse_timestamp(text) {
                Some(t) => CreatedAt::Recorded(t),
                None => {
                    log::warn!(
                        "order {}: unparseable created_at {text:?}, using render time",
                        self.order_number()
                    );
                    CreatedAt::Defaulted(now)
                }
            },
        }
    }

    /// Difference between the supplied total and the sum of its components,
    /// when it exceeds half a cent.
    pub fn total_mismatch(&self) -> Option<f64> {
        let expected = self.subtotal() - self.discount() + self.delivery_fee() + self.tip();
        let delta = self.total() - expected;
        (delta.abs() > MONEY_EPSILON).then_some(delta)
    }
}

/// Money fields are non-negative; anything else reads as zero.
fn money(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// `null` reads the same as a missing list.
fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(d).map(Option::unwrap_or_default)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PhoneField {
    Text(String),
    Whole(u64),
    Number(f64),
}

fn phone_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PhoneField>::deserialize(d)?.map(|p| match p {
        PhoneField::Text(s) => s,
        PhoneField::Whole(n) => n.to_string(),
        PhoneField::Number(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn empty_record_uses_defaults() {
        let order = Order::from_json("{}").unwrap();
        assert_eq!(order.order_number(), "N/A");
        assert_eq!(order.customer_name(), "Guest");
        assert_eq!(order.customer_phone(), "");
        assert_eq!(order.customer_address(), "N/A");
        assert_eq!(order.restaurant_name(), "Restaurant");
        assert!(order.owner().is_none());
        assert!(order.driver().is_none());
        assert!(order.items.is_empty());
        assert_eq!(order.total(), 0.0);
        assert_eq!(order.payment_method(), PaymentMethod::Card);
        assert_eq!(order.created_at(noon()), CreatedAt::Defaulted(noon()));
    }

    #[test]
    fn flat_backend_record() {
        let json = r#"{
            "order_number": "LF-1",
            "customer_name": "Sarah Johnson",
            "customer_phone": "14035551234",
            "customer_address": "123 Main St NW",
            "restaurant_name": "AB King Pizza",
            "driver": {"name": "Ahmed", "image": "/tmp/a.jpg"},
            "items": [{"name": "Garlic Bread", "quantity": 2, "price": 5.99,
                       "toppings": ["Cheese"], "instructions": "  "}],
            "subtotal": 11.98, "total": 11.98,
            "discount_type": "first_order",
            "payment_method": "CASH",
            "created_at": "2026-10-18T12:00:00"
        }"#;
        let order = Order::from_json(json).unwrap();
        assert_eq!(order.customer_name(), "Sarah Johnson");
        assert_eq!(order.restaurant_name(), "AB King Pizza");
        assert_eq!(order.driver().unwrap().name_or("Driver"), "Ahmed");
        assert_eq!(order.driver().unwrap().photo_ref(), Some("/tmp/a.jpg"));
        assert_eq!(order.items[0].quantity(), 2);
        assert_eq!(order.items[0].instruction(), None);
        assert_eq!(order.discount_kind(), DiscountKind::FirstOrder);
        assert_eq!(order.payment_method(), PaymentMethod::Cash);
        assert_eq!(order.created_at(noon() - chrono::Duration::hours(1)), CreatedAt::Recorded(noon()));
    }

    #[test]
    fn null_lists_read_as_empty() {
        let order = Order::from_json(r#"{"items": null}"#).unwrap();
        assert!(order.items.is_empty());

        let order = Order::from_json(r#"{"items": [{"name": "Pizza", "toppings": null}]}"#).unwrap();
        assert_eq!(order.items[0].name(), "Pizza");
        assert!(order.items[0].toppings.is_empty());
    }

    #[test]
    fn numeric_phone_is_accepted() {
        let order = Order::from_json(r#"{"customer_phone": 4035551234}"#).unwrap();
        assert_eq!(order.customer_phone(), "4035551234");
        assert_eq!(crate::format::format_phone(order.customer_phone()), "(403) 555-1234");

        let order = Order::from_json(r#"{"customer_phone": null}"#).unwrap();
        assert_eq!(order.customer_phone(), "");
    }

    #[test]
    fn unknown_payment_method_is_card() {
        let order = Order::from_json(r#"{"payment_method": "bitcoin"}"#).unwrap();
        assert_eq!(order.payment_method(), PaymentMethod::Card);
        assert_eq!(order.payment_method().label(), "Card");
    }

    #[test]
    fn empty_people_are_absent() {
        let order = Order::from_json(r#"{"restaurant_owner": {}, "driver": {}}"#).unwrap();
        assert!(order.owner().is_none());
        assert!(order.driver().is_none());
    }

    #[test]
    fn malformed_timestamp_falls_back_to_render_time() {
        let order = Order::from_json(r#"{"created_at": "last tuesday"}"#).unwrap();
        assert_eq!(order.created_at(noon()), CreatedAt::Defaulted(noon()));
    }

    #[test]
    fn item_defaults() {
        let item = Item::default();
        assert_eq!(item.name(), "Item");
        assert_eq!(item.quantity(), 1);
        assert_eq!(item.unit_price(), 0.0);
    }

    #[test]
    fn total_is_trusted_not_recomputed() {
        let order = Order {
            subtotal: Some(30.97),
            discount: Some(3.10),
            delivery_fee: Some(0.0),
            tip: Some(5.57),
            total: Some(33.44),
            ..Order::default()
        };
        assert_eq!(order.total(), 33.44);
        assert_eq!(order.total_mismatch(), None);

        let off = Order {
            total: Some(40.0),
            ..order
        };
        assert_eq!(off.total(), 40.0);
        assert!(off.total_mismatch().is_some());
    }

    #[test]
    fn negative_money_reads_as_zero() {
        let order = Order {
            tip: Some(-2.0),
            ..Order::default()
        };
        assert_eq!(order.tip(), 0.0);
    }
}
