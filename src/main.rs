//! receipts – command-line receipt and kitchen ticket renderer.
//!
//! Usage:
//!   receipts <order.json> [--out-dir DIR] [--kind customer|kitchen|both]
//!            [--layout-json] [--photos DIR]
//!   receipts --sample [--out-dir DIR] [--photos DIR]
//!
//! Output files are named after the order number, e.g.
//! `customer_receipt_LF-4829.pdf` and `kitchen_ticket_LF-4829.pdf`.

use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

use receipt_forge::layout_config::LayoutConfig;
use receipt_forge::pipeline::write_atomically;
use receipt_forge::samples::render_samples;
use receipt_forge::{DocumentKind, FsPhotoSource, Order, ReceiptRenderer};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut out_dir = PathBuf::from(".");
    let mut kinds = vec![DocumentKind::CustomerReceipt, DocumentKind::KitchenTicket];
    let mut layout_json = false;
    let mut photos_dir: Option<PathBuf> = None;
    let mut sample = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out-dir" | "-o" => out_dir = PathBuf::from(flag_value(&mut iter, arg, &args[0])),
            "--photos" | "-p" => photos_dir = Some(PathBuf::from(flag_value(&mut iter, arg, &args[0]))),
            "--kind" | "-k" => {
                kinds = match flag_value(&mut iter, arg, &args[0]) {
                    "customer" => vec![DocumentKind::CustomerReceipt],
                    "kitchen" => vec![DocumentKind::KitchenTicket],
                    "both" => vec![DocumentKind::CustomerReceipt, DocumentKind::KitchenTicket],
                    other => {
                        eprintln!("Unknown document kind: {other}");
                        print_usage(&args[0]);
                        process::exit(1);
                    }
                }
            }
            "--layout-json" => layout_json = true,
            "--sample" => sample = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if input_path.is_some() {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                input_path = Some(PathBuf::from(path));
            }
        }
    }

    let mut renderer = ReceiptRenderer::new();
    if let Some(dir) = photos_dir {
        renderer = renderer.with_photo_source(FsPhotoSource::with_base_dir(dir));
    }

    if sample {
        match render_samples(&renderer, &out_dir) {
            Ok(paths) => {
                for p in paths {
                    eprintln!("Wrote '{}'", p.display());
                }
            }
            Err(e) => {
                eprintln!("Error rendering samples: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no order file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let json = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let order = match Order::from_json(&json) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error in '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let now = chrono::Local::now().naive_local();
    for kind in kinds {
        let stem = kind.file_stem(&order);
        let output = out_dir.join(format!("{stem}.pdf"));

        let (bytes, layout) = match renderer.render_at(kind, &order, now) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Error rendering {kind}: {e}");
                process::exit(1);
            }
        };
        if let Err(e) = write_atomically(&output, &bytes) {
            eprintln!("Error writing '{}': {e}", output.display());
            process::exit(1);
        }
        if layout_json {
            write_layout(&layout, &out_dir.join(format!("{stem}.json")));
        }

        let pages = layout.pages.len();
        eprintln!(
            "Wrote '{}' ({} bytes, {} page{})",
            output.display(),
            bytes.len(),
            pages,
            if pages == 1 { "" } else { "s" }
        );
    }
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str, prog: &str) -> &'a str {
    match iter.next() {
        Some(v) => v.as_str(),
        None => {
            eprintln!("Missing value for {flag}");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn write_layout(layout: &LayoutConfig, path: &Path) {
    if let Err(e) = write_atomically(path, layout.to_json().as_bytes()) {
        eprintln!("Error writing '{}': {e}", path.display());
        process::exit(1);
    }
}

fn print_usage(prog: &str) {
    eprintln!("receipts – delivery order receipts as PDF (receipt-forge)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <order.json> [--out-dir DIR] [--kind customer|kitchen|both] [--layout-json] [--photos DIR]");
    eprintln!("  {prog} --sample [--out-dir DIR] [--photos DIR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <order.json>     Order record as produced by the ordering backend");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --out-dir, -o    Directory for the output files (default: current directory)");
    eprintln!("  --kind, -k       Which document to render (default: both)");
    eprintln!("  --layout-json    Also write the computed layout next to each PDF");
    eprintln!("  --photos, -p     Directory that relative photo references resolve against");
    eprintln!("  --sample         Render the demo orders instead of reading a file");
    eprintln!("  --help           Print this message");
}
