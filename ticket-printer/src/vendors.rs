//! Known thermal printer USB vendors
//!
//! Detection keeps only USB devices whose vendor id appears here.
//! Adding a vendor is a one-line change to [`THERMAL_VENDORS`].

/// A USB vendor that ships ESC/POS thermal printers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThermalVendor {
    pub id: u16,
    pub name: &'static str,
}

pub static THERMAL_VENDORS: &[ThermalVendor] = &[
    ThermalVendor {
        id: 0x0fe6,
        name: "XPrinter",
    },
    ThermalVendor {
        id: 0x04b8,
        name: "Epson",
    },
    ThermalVendor {
        id: 0x154f,
        name: "SNBC",
    },
    ThermalVendor {
        id: 0x0416,
        name: "Gowell",
    },
    ThermalVendor {
        id: 0x20d1,
        name: "Star Micronics",
    },
    ThermalVendor {
        id: 0x0519,
        name: "Star",
    },
];

/// Find the vendor entry for a USB vendor id
pub fn find_vendor(vendor_id: u16) -> Option<&'static ThermalVendor> {
    THERMAL_VENDORS.iter().find(|v| v.id == vendor_id)
}

pub fn is_thermal_vendor(vendor_id: u16) -> bool {
    find_vendor(vendor_id).is_some()
}
