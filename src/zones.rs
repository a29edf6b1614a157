//! Static zone and device placement tables.
//!
//! This is the single lookup shared by the occupancy and IAQ aggregators.
//! Bump [`MAPPING_VERSION`] whenever a device moves or a zone rule changes
//! so exports and logs can be traced back to the table that produced them.

use crate::models::{FloorKey, IaqReading, RawReading};

// ---

pub const MAPPING_VERSION: u32 = 3;

/// Zone whose sensors were moved; its history is never aggregated.
pub const RELOCATED_ZONE: &str = "Relocated";

/// Entrance counter zone; ground truth for the derived 1F figure.
pub const MAIN_ENTRANCE_ZONE: &str = "Main-Entrance";

/// Canonical placement of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement<'a> {
    pub floor: FloorKey,
    pub zone: &'a str,
}

/// Outcome of mapping one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneMapping<'a> {
    // ---
    /// Counts toward the floor (or pseudo floor) it names.
    Mapped(Placement<'a>),
    /// Dropped by a zone exclusion rule.
    Excluded,
    /// Source not present in any table; dropped and logged.
    Unmapped,
}

impl<'a> ZoneMapping<'a> {
    pub fn placement(&self) -> Option<Placement<'a>> {
        match self {
            ZoneMapping::Mapped(p) => Some(*p),
            _ => None,
        }
    }
}

/// Which aggregate a mapping is being computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingPurpose {
    /// Per-floor day buckets; Main-Entrance readings land on the pseudo floor.
    FloorBuckets,
    /// Building-wide and per-zone sums; Main-Entrance is excluded.
    ZoneSums,
}

/// Map an occupancy record to its floor, applying exclusion rules.
pub fn map_occupancy(reading: &RawReading, purpose: MappingPurpose) -> ZoneMapping<'_> {
    // ---
    let zone = reading.zone_name.trim();
    if zone == RELOCATED_ZONE {
        return ZoneMapping::Excluded;
    }

    let floor = if zone == MAIN_ENTRANCE_ZONE {
        FloorKey::MainEntrance
    } else {
        match reading.floor_id.parse::<FloorKey>() {
            Ok(floor) => floor,
            Err(_) => {
                tracing::debug!(
                    "Unmapped floor '{}' (zone '{}') at {}; reading dropped",
                    reading.floor_id,
                    zone,
                    reading.timestamp
                );
                return ZoneMapping::Unmapped;
            }
        }
    };

    if floor == FloorKey::MainEntrance && purpose == MappingPurpose::ZoneSums {
        return ZoneMapping::Excluded;
    }

    ZoneMapping::Mapped(Placement { floor, zone })
}

/// Device placement table for IAQ sensors.
const DEVICE_ZONES: [(&str, FloorKey, &str); 23] = [
    // ---
    ("IAQ-1F-01", FloorKey::F1, "Lobby"),
    ("IAQ-1F-02", FloorKey::F1, "Reception"),
    ("IAQ-1F-03", FloorKey::F1, "Cafe"),
    ("IAQ-1F-04", FloorKey::F1, "Lift Lobby"),
    ("IAQ-1F-05", FloorKey::F1, "Exhibition Hall"),
    ("IAQ-MF-01", FloorKey::Mf, "Pantry"),
    ("IAQ-MF-02", FloorKey::Mf, "Open Office East"),
    ("IAQ-MF-03", FloorKey::Mf, "Open Office West"),
    ("IAQ-MF-04", FloorKey::Mf, "Meeting Room A"),
    ("IAQ-MF-05", FloorKey::Mf, "Meeting Room B"),
    ("IAQ-2F-01", FloorKey::F2, "Open Office North"),
    ("IAQ-2F-02", FloorKey::F2, "Open Office South"),
    ("IAQ-2F-03", FloorKey::F2, "Training Room"),
    ("IAQ-2F-04", FloorKey::F2, "Focus Pods"),
    ("IAQ-2F-05", FloorKey::F2, "Breakout Area"),
    ("IAQ-2F-06", FloorKey::F2, "Pantry"),
    ("IAQ-3F-01", FloorKey::F3, "Boardroom"),
    ("IAQ-3F-02", FloorKey::F3, "Executive Office"),
    ("IAQ-3F-03", FloorKey::F3, "Open Office"),
    ("IAQ-3F-04", FloorKey::F3, "Library"),
    ("IAQ-3F-05", FloorKey::F3, "Lounge"),
    ("IAQ-3F-06", FloorKey::F3, "Server Room"),
    ("IAQ-3F-07", FloorKey::F3, "Roof Garden Lobby"),
];

/// Placement of a device, or `(None, None)` when it is not in the table.
pub fn lookup_device(device: &str) -> (Option<FloorKey>, Option<&'static str>) {
    // ---
    DEVICE_ZONES
        .iter()
        .find(|(id, _, _)| *id == device.trim())
        .map_or((None, None), |(_, floor, zone)| (Some(*floor), Some(*zone)))
}

/// Map an IAQ record by its device id.
pub fn map_iaq(reading: &IaqReading) -> ZoneMapping<'static> {
    // ---
    match lookup_device(&reading.device) {
        (Some(floor), Some(zone)) => ZoneMapping::Mapped(Placement { floor, zone }),
        _ => {
            tracing::debug!(
                "Unknown IAQ device '{}' at {}; reading dropped",
                reading.device,
                reading.timestamp
            );
            ZoneMapping::Unmapped
        }
    }
}
