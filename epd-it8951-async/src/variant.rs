//! Panel-generation policy derived from the controller's firmware.
//!
//! Different waveform firmware revisions place the fast monochrome (A2)
//! procedure in different slots, and some panel generations corrupt rows
//! unless transfers are trimmed to a 32-pixel boundary. Neither quirk is in
//! any datasheet; the table below keeps that knowledge in one place instead
//! of scattering string comparisons through the pipeline.

use crate::it8951::RefreshMode;

/// Update policy for one panel generation.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelPolicy {
    /// Transfers must not be wider than the panel width rounded down to a
    /// 32-pixel boundary.
    pub four_byte_align: bool,
    /// Waveform slot holding the fast monochrome update.
    pub fast_mode: RefreshMode,
}

/// Policy for LUT revisions not in the table.
const DEFAULT_POLICY: PanelPolicy = PanelPolicy {
    four_byte_align: false,
    fast_mode: RefreshMode(6),
};

const KNOWN_PANELS: [(&str, PanelPolicy); 5] = [
    // 6" (800x600) and 6" HD (1448x1072) panels.
    (
        "M641",
        PanelPolicy {
            four_byte_align: true,
            fast_mode: RefreshMode(4),
        },
    ),
    // Alternate firmware shipped on the 6" HD panels.
    (
        "M841_TFAB512",
        PanelPolicy {
            four_byte_align: true,
            fast_mode: RefreshMode(6),
        },
    ),
    // 9.7" (1200x825).
    (
        "M841",
        PanelPolicy {
            four_byte_align: false,
            fast_mode: RefreshMode(6),
        },
    ),
    // 7.8" (1872x1404).
    (
        "M841_TFA2812",
        PanelPolicy {
            four_byte_align: false,
            fast_mode: RefreshMode(6),
        },
    ),
    // 10.3" (1872x1404).
    (
        "M841_TFA5210",
        PanelPolicy {
            four_byte_align: false,
            fast_mode: RefreshMode(6),
        },
    ),
];

/// Maps a LUT revision string to the update policy for that panel
/// generation.
///
/// The match is exact and case-sensitive. Unrecognised revisions, including
/// the empty string, fall back to the unaligned slot-6 policy rather than
/// failing; new firmware revisions have so far behaved like the 10.3" line.
pub fn classify(lut_version: &str) -> PanelPolicy {
    KNOWN_PANELS
        .iter()
        .find(|(name, _)| *name == lut_version)
        .map(|(_, policy)| *policy)
        .unwrap_or(DEFAULT_POLICY)
}
