//! Keyword device classification.
//!
//! Rules are checked in order over the lowercased label text; the first
//! family with a hit wins. Vendor product lines are checked before generic
//! words so that e.g. a PowerEdge label lands on Server rather than on a
//! generic keyword further down.

use scan_types::{Classification, ItemType, ParsedLabel};

const SERVER_HINTS: &[&str] = &[
    "poweredge",
    "proliant",
    "thinksystem",
    "poweredge r",
    "poweredge t",
];

const LAPTOP_HINTS: &[&str] = &[
    "thinkpad",
    "latitude",
    "elitebook",
    "probook",
    "macbook",
    "xps",
    "precision mobile",
];

const DESKTOP_HINTS: &[&str] = &[
    "optiplex",
    "thinkcentre",
    "vostro",
    "elite desk",
    "pro desk",
    "imac",
    "mac mini",
];

const NETWORK_HINTS: &[&str] = &[
    "catalyst",
    "nexus",
    "aruba",
    "unifi",
    "edge switch",
    "switch",
    "router",
    "firewall",
    "fortigate",
    "juniper",
];

const PRINTER_HINTS: &[&str] = &[
    "laserjet",
    "deskjet",
    "image runner",
    "bizhub",
    "printer",
    "mfp",
];

const UPS_HINTS: &[&str] = &["ups", "smart-ups", "back-ups", "surge", "pdu"];

const MONITOR_HINTS: &[&str] = &["monitor", "lcd", "led display", "ultrasharp"];

/// Classify a parsed label into a GLPI item type plus a category hint.
pub fn classify(parsed: &ParsedLabel) -> Classification {
    let text = parsed.raw_text.to_lowercase();
    let has = |hints: &[&str]| hints.iter().any(|h| text.contains(h));

    let (item_type, category) = if has(SERVER_HINTS) {
        (ItemType::Computer, "Server")
    } else if has(LAPTOP_HINTS) {
        (ItemType::Computer, "Laptop")
    } else if has(DESKTOP_HINTS) {
        (ItemType::Computer, "Desktop")
    } else if has(NETWORK_HINTS) {
        (ItemType::NetworkEquipment, "Network")
    } else if has(PRINTER_HINTS) {
        (ItemType::Printer, "Printer")
    } else if has(UPS_HINTS) {
        (ItemType::Peripheral, "UPS")
    } else if has(MONITOR_HINTS) {
        (ItemType::Peripheral, "Monitor")
    } else {
        (ItemType::Computer, "Unknown")
    };

    Classification {
        item_type,
        category: category.to_string(),
    }
}
