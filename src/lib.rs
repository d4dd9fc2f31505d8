//! # receipt-forge – delivery order receipts as PDF
//!
//! Every order produces two documents: a letter-size customer receipt with
//! the totals and the stories of the people behind the meal, and a narrow
//! kitchen ticket for an 80mm thermal printer. The pipeline stages are:
//!
//! 1. **Assemble** – order record → block sequence ([`customer`], [`kitchen`])
//! 2. **Layout** – compute flexbox layout with Taffy ([`layout`])
//! 3. **Paginate** – split into pages of the target geometry ([`pagination`])
//! 4. **Render** – emit PDF bytes via printpdf ([`render`])
//! 5. **Write** – replace the destination file atomically ([`pipeline`])
//!
//! A C-compatible FFI surface is exposed via the [`ffi`] module.

pub mod blocks;
pub mod customer;
pub mod error;
pub mod ffi;
pub mod fonts;
pub mod format;
pub mod kitchen;
pub mod layout;
pub mod layout_config;
pub mod order;
pub mod pagination;
pub mod photo;
pub mod pipeline;
pub mod render;
pub mod samples;
pub mod style;

// Re-exports for convenience
pub use error::{OrderError, PhotoError, RenderError};
pub use order::Order;
pub use photo::{FsPhotoSource, NoPhotos, PhotoSource};
pub use pipeline::{
    render_customer_receipt, render_kitchen_ticket, DocumentKind, PageGeometry, ReceiptRenderer,
};
