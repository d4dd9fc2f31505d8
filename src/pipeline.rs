//! Pipeline – ties together assembly, layout, pagination, and rendering,
//! and exposes the two document entry points.
//!
//! Output files are written atomically: the PDF is produced in memory,
//! written to a temporary file next to the destination and renamed over it
//! only once complete. A failed render never leaves a partial file behind
//! and never touches an existing one.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tempfile::NamedTempFile;

use crate::blocks::Block;
use crate::customer::build_customer_document;
use crate::error::Result;
use crate::fonts::FontManager;
use crate::kitchen::build_kitchen_document;
use crate::layout::compute_layout;
use crate::layout_config::LayoutConfig;
use crate::order::Order;
use crate::pagination::paginate;
use crate::photo::{FsPhotoSource, PhotoSource};
use crate::render::render_pdf;

/// Points per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Page size and margins for one kind of document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Page width in points.
    pub page_width: f32,
    /// Page height in points.
    pub page_height: f32,
    /// Margin on all four sides, in points.
    pub margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter_receipt()
    }
}

impl PageGeometry {
    /// US Letter with half-inch margins, for the customer receipt.
    pub fn letter_receipt() -> Self {
        Self {
            title: "Customer Receipt".to_string(),
            page_width: 612.0,
            page_height: 792.0,
            margin: 36.0,
        }
    }

    /// 80mm thermal roll cut at 11in, for the kitchen ticket.
    pub fn thermal() -> Self {
        Self {
            title: "Kitchen Ticket".to_string(),
            page_width: 80.0 * PT_PER_MM,
            page_height: 792.0,
            margin: 5.0 * PT_PER_MM,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }
}

/// Lay out and paginate a block sequence without rendering it.
pub fn compute_layout_config(blocks: &[Block], geometry: &PageGeometry) -> Result<LayoutConfig> {
    let fonts = FontManager::default();
    let boxes = compute_layout(blocks, geometry.page_width, geometry.margin, &fonts)?;
    Ok(paginate(&boxes, geometry, &fonts))
}

/// Full pipeline: blocks → PDF bytes.
///
/// Returns `(pdf_bytes, layout_config)`.
pub fn render_blocks(blocks: &[Block], geometry: &PageGeometry) -> Result<(Vec<u8>, LayoutConfig)> {
    let layout = compute_layout_config(blocks, geometry)?;
    let bytes = render_pdf(&layout)?;
    Ok((bytes, layout))
}

/// Write `bytes` to `dest` via a temporary file in the same directory.
/// Missing parent directories are created.
pub fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let mut tmp = NamedTempFile::new_in(&parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest)?;
    Ok(dest.to_path_buf())
}

/// The two documents produced for every order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    CustomerReceipt,
    KitchenTicket,
}

impl DocumentKind {
    /// Default file name stem, e.g. `customer_receipt_LF-4829`.
    pub fn file_stem(self, order: &Order) -> String {
        let prefix = match self {
            DocumentKind::CustomerReceipt => "customer_receipt",
            DocumentKind::KitchenTicket => "kitchen_ticket",
        };
        format!("{prefix}_{}", sanitize(order.order_number()))
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::CustomerReceipt => write!(f, "customer receipt"),
            DocumentKind::KitchenTicket => write!(f, "kitchen ticket"),
        }
    }
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Renders customer receipts and kitchen tickets.
///
/// Holds no per-render state, so one renderer can serve concurrent calls.
pub struct ReceiptRenderer {
    photos: Box<dyn PhotoSource>,
    pub customer_page: PageGeometry,
    pub kitchen_page: PageGeometry,
}

impl Default for ReceiptRenderer {
    fn default() -> Self {
        Self {
            photos: Box::new(FsPhotoSource::new()),
            customer_page: PageGeometry::letter_receipt(),
            kitchen_page: PageGeometry::thermal(),
        }
    }
}

impl fmt::Debug for ReceiptRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiptRenderer")
            .field("customer_page", &self.customer_page)
            .field("kitchen_page", &self.kitchen_page)
            .finish_non_exhaustive()
    }
}

impl ReceiptRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_photo_source(mut self, photos: impl PhotoSource + 'static) -> Self {
        self.photos = Box::new(photos);
        self
    }

    /// Assemble the block sequence for `kind`.
    pub fn blocks(&self, kind: DocumentKind, order: &Order, now: NaiveDateTime) -> Vec<Block> {
        match kind {
            DocumentKind::CustomerReceipt => build_customer_document(order, &*self.photos, now),
            DocumentKind::KitchenTicket => build_kitchen_document(order, now),
        }
    }

    fn geometry(&self, kind: DocumentKind, order: &Order) -> PageGeometry {
        let page = match kind {
            DocumentKind::CustomerReceipt => &self.customer_page,
            DocumentKind::KitchenTicket => &self.kitchen_page,
        };
        let title = format!("{} #{}", page.title, order.order_number());
        page.clone().with_title(title)
    }

    /// Layout of one document as rendered at `now`.
    pub fn layout_at(&self, kind: DocumentKind, order: &Order, now: NaiveDateTime) -> Result<LayoutConfig> {
        let blocks = self.blocks(kind, order, now);
        compute_layout_config(&blocks, &self.geometry(kind, order))
    }

    /// PDF bytes and layout of one document as rendered at `now`.
    pub fn render_at(
        &self,
        kind: DocumentKind,
        order: &Order,
        now: NaiveDateTime,
    ) -> Result<(Vec<u8>, LayoutConfig)> {
        let blocks = self.blocks(kind, order, now);
        render_blocks(&blocks, &self.geometry(kind, order))
    }

    /// Render one document and write it atomically to `dest`.
    pub fn render_to_path(
        &self,
        kind: DocumentKind,
        order: &Order,
        dest: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let dest = dest.as_ref();
        let (bytes, layout) = self.render_at(kind, order, local_now())?;
        let written = write_atomically(dest, &bytes)?;
        log::info!(
            "wrote {kind} for order {} to '{}' ({} bytes, {} page{})",
            order.order_number(),
            written.display(),
            bytes.len(),
            layout.pages.len(),
            if layout.pages.len() == 1 { "" } else { "s" }
        );
        Ok(written)
    }

    /// Render one document into any writer.
    pub fn write_to(&self, kind: DocumentKind, order: &Order, sink: &mut impl Write) -> Result<()> {
        let (bytes, _) = self.render_at(kind, order, local_now())?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        Ok(())
    }

    pub fn render_customer_receipt(&self, order: &Order, dest: impl AsRef<Path>) -> Result<PathBuf> {
        self.render_to_path(DocumentKind::CustomerReceipt, order, dest)
    }

    pub fn render_kitchen_ticket(&self, order: &Order, dest: impl AsRef<Path>) -> Result<PathBuf> {
        self.render_to_path(DocumentKind::KitchenTicket, order, dest)
    }

    pub fn customer_receipt_bytes(&self, order: &Order) -> Result<Vec<u8>> {
        Ok(self.render_at(DocumentKind::CustomerReceipt, order, local_now())?.0)
    }

    pub fn kitchen_ticket_bytes(&self, order: &Order) -> Result<Vec<u8>> {
        Ok(self.render_at(DocumentKind::KitchenTicket, order, local_now())?.0)
    }

    pub fn customer_receipt_layout(&self, order: &Order) -> Result<LayoutConfig> {
        self.layout_at(DocumentKind::CustomerReceipt, order, local_now())
    }

    pub fn kitchen_ticket_layout(&self, order: &Order) -> Result<LayoutConfig> {
        self.layout_at(DocumentKind::KitchenTicket, order, local_now())
    }

    pub fn write_customer_receipt(&self, order: &Order, sink: &mut impl Write) -> Result<()> {
        self.write_to(DocumentKind::CustomerReceipt, order, sink)
    }

    pub fn write_kitchen_ticket(&self, order: &Order, sink: &mut impl Write) -> Result<()> {
        self.write_to(DocumentKind::KitchenTicket, order, sink)
    }
}

/// Render the customer receipt for `order` to `dest` with default settings.
pub fn render_customer_receipt(order: &Order, dest: impl AsRef<Path>) -> Result<PathBuf> {
    ReceiptRenderer::default().render_customer_receipt(order, dest)
}

/// Render the kitchen ticket for `order` to `dest` with default settings.
pub fn render_kitchen_ticket(order: &Order, dest: impl AsRef<Path>) -> Result<PathBuf> {
    ReceiptRenderer::default().render_kitchen_ticket(order, dest)
}
