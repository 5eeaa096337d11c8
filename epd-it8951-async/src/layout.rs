//! Frame geometry derived from controller-reported panel data.

use embedded_graphics::prelude::Size;
use thiserror::Error;

use crate::{it8951::DeviceInfo, variant::PanelPolicy};

/// Horizontal boundary aligned panel generations require transfers to
/// respect.
pub const ALIGN_BOUNDARY: u16 = 32;

/// The usable frame for one run: trimmed width, height and the resolved
/// frame buffer address. Fixed once computed.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    /// Usable row width in pixels. Never wider than the panel.
    pub width: u16,
    /// Frame height in pixels. Always the full panel height.
    pub height: u16,
    /// Controller-memory address rendered frames are written to.
    pub target_address: u32,
}

impl FrameGeometry {
    pub fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// An aligned panel narrower than one boundary would round down to a
    /// zero-width frame, so it is rejected instead.
    #[error("panel width {width} is below the 32-pixel alignment boundary")]
    PanelTooNarrow { width: u16 },
}

/// Recombines the split frame buffer base address.
///
/// The controller reports the 32-bit address as two 16-bit register reads:
/// the low register carries bits 0..16 and the high register bits 16..32.
/// Swapping the halves produces an address that writes silently into the
/// wrong memory, so the composition lives in exactly one place.
pub const fn join_address(low: u16, high: u16) -> u32 {
    (low as u32) | ((high as u32) << 16)
}

/// Derives the frame geometry for a detected panel.
///
/// When the policy demands alignment the width is rounded down to
/// [ALIGN_BOUNDARY]; the height is never adjusted.
pub fn compute(info: &DeviceInfo, policy: &PanelPolicy) -> Result<FrameGeometry, GeometryError> {
    let width = if policy.four_byte_align {
        if info.panel_width < ALIGN_BOUNDARY {
            return Err(GeometryError::PanelTooNarrow {
                width: info.panel_width,
            });
        }
        info.panel_width - (info.panel_width % ALIGN_BOUNDARY)
    } else {
        info.panel_width
    };

    Ok(FrameGeometry {
        width,
        height: info.panel_height,
        target_address: join_address(info.memory_addr_low, info.memory_addr_high),
    })
}
