//! Types and the protocol seam for the IT8951 e-paper controller.
//!
//! The IT8951 is a timing controller that owns the panel's frame memory and
//! runs named waveform procedures to move pixels. This module defines what
//! the orchestration core needs to know about it: the identification data it
//! reports at start-up, the waveform slot and pixel depth vocabulary, and
//! the [It8951] trait a concrete protocol driver implements.

use embedded_graphics::prelude::Size;
use heapless::String;

use crate::layout::FrameGeometry;

/// Identification data the controller reports during initialisation.
///
/// Obtained once per run and treated as immutable afterwards. The frame
/// buffer base address arrives split across two 16-bit register reads and is
/// kept split here; [crate::layout::join_address] recombines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Panel width in pixels. Zero means the controller never answered;
    /// teardown uses this as the "was it initialised" sentinel.
    pub panel_width: u16,
    /// Panel height in pixels.
    pub panel_height: u16,
    /// Low 16 bits of the frame buffer base address.
    pub memory_addr_low: u16,
    /// High 16 bits of the frame buffer base address.
    pub memory_addr_high: u16,
    /// Firmware build string.
    pub firmware_version: String<16>,
    /// Waveform lookup-table revision. This identifies the panel generation
    /// and drives the update policy, see [crate::variant::classify].
    pub lut_version: String<16>,
}

impl DeviceInfo {
    /// Panel dimensions as reported, before any alignment trimming.
    pub fn size(&self) -> Size {
        Size::new(self.panel_width as u32, self.panel_height as u32)
    }
}

/// A waveform slot number understood by the controller.
///
/// Slots are procedures burned into the waveform firmware. The low slots are
/// stable across revisions; the fast monochrome (A2) slot moves between
/// panel generations and comes from [crate::variant::classify].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshMode(pub u16);

impl RefreshMode {
    /// Full clear to white. Used for bring-up and before storage, the same
    /// slot on every known firmware.
    pub const INIT: Self = Self(0);
    /// Direct update, monochrome, no grey transition.
    pub const DU: Self = Self(1);
    /// 16-level greyscale. The slowest and cleanest refresh.
    pub const GC16: Self = Self(2);
}

/// Pixel depth for frame transfers into controller memory.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitsPerPixel {
    One,
    Two,
    #[default]
    Four,
    Eight,
}

impl BitsPerPixel {
    pub const fn bits(self) -> u8 {
        match self {
            BitsPerPixel::One => 1,
            BitsPerPixel::Two => 2,
            BitsPerPixel::Four => 4,
            BitsPerPixel::Eight => 8,
        }
    }
}

/// Protocol driver seam for the controller.
///
/// Implementations own the command set (SYS_RUN, LD_IMG, DPY_AREA, ...) and
/// the bus framing; the orchestration core only sequences these calls.
#[allow(async_fn_in_trait)]
pub trait It8951 {
    type Error: core::error::Error;

    /// Wakes the controller, applies the common-voltage calibration value
    /// (millivolt magnitude) and reads back the device identification.
    async fn init(&mut self, vcom_mv: u16) -> Result<DeviceInfo, Self::Error>;

    /// Strengthens the source driving capability. Only meant for panels
    /// that show a blurred image at default drive strength.
    async fn enhance_driving(&mut self) -> Result<(), Self::Error>;

    /// Clears the whole screen and refreshes it with the given waveform.
    async fn clear_refresh(
        &mut self,
        info: &DeviceInfo,
        target_address: u32,
        mode: RefreshMode,
    ) -> Result<(), Self::Error>;

    /// Streams a packed raster into controller memory at the frame's target
    /// address and triggers the panel update.
    async fn display_image(
        &mut self,
        frame: &FrameGeometry,
        depth: BitsPerPixel,
        raster: &[u8],
    ) -> Result<(), Self::Error>;

    /// Puts the controller into its deepest low-power state.
    async fn sleep(&mut self) -> Result<(), Self::Error>;

    /// Puts the controller into standby; cheaper to wake than sleep.
    async fn standby(&mut self) -> Result<(), Self::Error>;
}
