//! Buffer and power-state bookkeeping shared by every exit path.

use alloc::vec::Vec;

use crate::{
    it8951::{DeviceInfo, It8951},
    log::{debug, warn_log},
};

/// Transfer-buffer slots tracked by the [ResourceGuard].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferBuffer {
    /// Raw frame staging buffer, for hosts that assemble refresh data
    /// themselves.
    Refresh,
    /// Decoded source image as returned by the acquisition collaborator.
    Decode,
    /// Controller-native packed raster produced by the converter.
    Raster,
}

/// Controller power state at the coarse granularity this layer tracks.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerState {
    #[default]
    Uninitialized,
    Active,
    Standby,
    Sleep,
}

/// Which low-power command teardown issues.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerOff {
    /// Deepest low-power state; recommended before storage.
    #[default]
    Sleep,
    /// Lighter state that is cheaper to wake from.
    Standby,
}

/// Tracks host buffers and controller power across every exit path.
///
/// Both the natural end of the pipeline and an interrupt-driven teardown
/// funnel through this type, so every operation is idempotent: each buffer
/// is freed exactly once and the low-power command is issued at most once.
#[derive(Debug, Default)]
pub struct ResourceGuard {
    refresh: Option<Vec<u8>>,
    decode: Option<Vec<u8>>,
    raster: Option<Vec<u8>>,
    panel_width: u16,
    power: PowerState,
}

impl ResourceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an owned buffer and lends it back for the next stage.
    ///
    /// Registering into an occupied slot frees the previous buffer.
    pub fn register(&mut self, slot: TransferBuffer, buf: Vec<u8>) -> &[u8] {
        let slot = self.slot_mut(slot);
        *slot = Some(buf);
        slot.as_deref().unwrap_or(&[])
    }

    /// The live buffer in a slot, if any.
    pub fn buffer(&self, slot: TransferBuffer) -> Option<&[u8]> {
        match slot {
            TransferBuffer::Refresh => self.refresh.as_deref(),
            TransferBuffer::Decode => self.decode.as_deref(),
            TransferBuffer::Raster => self.raster.as_deref(),
        }
    }

    /// Frees every live buffer. A second call is a no-op.
    pub fn release_all(&mut self) {
        for slot in [&mut self.refresh, &mut self.decode, &mut self.raster] {
            if slot.take().is_some() {
                debug!("released transfer buffer");
            }
        }
    }

    /// Marks the controller as initialised.
    ///
    /// A zero reported panel width means the controller never really
    /// answered and keeps [ResourceGuard::power_down_if_active] a no-op.
    pub fn note_initialized(&mut self, info: &DeviceInfo) {
        self.panel_width = info.panel_width;
        if self.panel_width != 0 {
            self.power = PowerState::Active;
        }
    }

    pub fn power_state(&self) -> PowerState {
        self.power
    }

    /// Issues the configured low-power command if the controller is active.
    ///
    /// Best-effort: a protocol failure is logged and swallowed so teardown
    /// always runs to completion. The state still advances, so a repeated
    /// teardown never re-issues the command.
    pub async fn power_down_if_active<EPD: It8951>(&mut self, epd: &mut EPD, off: PowerOff) {
        if self.power != PowerState::Active {
            return;
        }
        debug!("powering down controller");
        let result = match off {
            PowerOff::Sleep => epd.sleep().await,
            PowerOff::Standby => epd.standby().await,
        };
        if result.is_err() {
            warn_log!("power-down command failed, continuing teardown");
        }
        self.power = match off {
            PowerOff::Sleep => PowerState::Sleep,
            PowerOff::Standby => PowerState::Standby,
        };
    }

    fn slot_mut(&mut self, slot: TransferBuffer) -> &mut Option<Vec<u8>> {
        match slot {
            TransferBuffer::Refresh => &mut self.refresh,
            TransferBuffer::Decode => &mut self.decode,
            TransferBuffer::Raster => &mut self.raster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use heapless::String;

    #[derive(Debug, thiserror::Error)]
    #[error("mock controller error")]
    struct MockError;

    #[derive(Default)]
    struct MockEpd {
        sleeps: usize,
        standbys: usize,
        fail_power_down: bool,
    }

    impl It8951 for MockEpd {
        type Error = MockError;

        async fn init(&mut self, _vcom_mv: u16) -> Result<DeviceInfo, MockError> {
            unreachable!("not exercised by guard tests")
        }

        async fn enhance_driving(&mut self) -> Result<(), MockError> {
            Ok(())
        }

        async fn clear_refresh(
            &mut self,
            _info: &DeviceInfo,
            _target_address: u32,
            _mode: crate::it8951::RefreshMode,
        ) -> Result<(), MockError> {
            Ok(())
        }

        async fn display_image(
            &mut self,
            _frame: &crate::layout::FrameGeometry,
            _depth: crate::it8951::BitsPerPixel,
            _raster: &[u8],
        ) -> Result<(), MockError> {
            Ok(())
        }

        async fn sleep(&mut self) -> Result<(), MockError> {
            self.sleeps += 1;
            if self.fail_power_down {
                return Err(MockError);
            }
            Ok(())
        }

        async fn standby(&mut self) -> Result<(), MockError> {
            self.standbys += 1;
            Ok(())
        }
    }

    fn device(panel_width: u16) -> DeviceInfo {
        DeviceInfo {
            panel_width,
            panel_height: 825,
            memory_addr_low: 0,
            memory_addr_high: 0,
            firmware_version: String::new(),
            lut_version: String::new(),
        }
    }

    #[test]
    fn test_release_all_is_idempotent() {
        let mut guard = ResourceGuard::new();
        guard.register(TransferBuffer::Decode, vec![1, 2, 3]);
        guard.register(TransferBuffer::Raster, vec![4]);
        assert_eq!(guard.buffer(TransferBuffer::Decode), Some(&[1, 2, 3][..]));

        guard.release_all();
        assert_eq!(guard.buffer(TransferBuffer::Decode), None);
        assert_eq!(guard.buffer(TransferBuffer::Raster), None);

        // Second release must be a harmless no-op.
        guard.release_all();
        assert_eq!(guard.buffer(TransferBuffer::Refresh), None);
    }

    #[test]
    fn test_register_replaces_previous_buffer() {
        let mut guard = ResourceGuard::new();
        guard.register(TransferBuffer::Decode, vec![1]);
        let lent = guard.register(TransferBuffer::Decode, vec![2, 3]);
        assert_eq!(lent, &[2, 3]);
    }

    #[test]
    fn test_power_down_skipped_when_uninitialized() {
        let mut guard = ResourceGuard::new();
        let mut epd = MockEpd::default();

        block_on(guard.power_down_if_active(&mut epd, PowerOff::Sleep));
        assert_eq!(epd.sleeps, 0);
        assert_eq!(guard.power_state(), PowerState::Uninitialized);
    }

    #[test]
    fn test_power_down_skipped_for_zero_panel_width() {
        let mut guard = ResourceGuard::new();
        guard.note_initialized(&device(0));
        let mut epd = MockEpd::default();

        block_on(guard.power_down_if_active(&mut epd, PowerOff::Sleep));
        assert_eq!(epd.sleeps, 0);
    }

    #[test]
    fn test_power_down_sleeps_exactly_once() {
        let mut guard = ResourceGuard::new();
        guard.note_initialized(&device(1200));
        let mut epd = MockEpd::default();

        block_on(guard.power_down_if_active(&mut epd, PowerOff::Sleep));
        block_on(guard.power_down_if_active(&mut epd, PowerOff::Sleep));
        assert_eq!(epd.sleeps, 1);
        assert_eq!(guard.power_state(), PowerState::Sleep);
    }

    #[test]
    fn test_power_down_can_use_standby() {
        let mut guard = ResourceGuard::new();
        guard.note_initialized(&device(1200));
        let mut epd = MockEpd::default();

        block_on(guard.power_down_if_active(&mut epd, PowerOff::Standby));
        assert_eq!(epd.standbys, 1);
        assert_eq!(epd.sleeps, 0);
        assert_eq!(guard.power_state(), PowerState::Standby);
    }

    #[test]
    fn test_power_down_failure_is_swallowed_and_not_retried() {
        let mut guard = ResourceGuard::new();
        guard.note_initialized(&device(1200));
        let mut epd = MockEpd {
            fail_power_down: true,
            ..MockEpd::default()
        };

        block_on(guard.power_down_if_active(&mut epd, PowerOff::Sleep));
        block_on(guard.power_down_if_active(&mut epd, PowerOff::Sleep));
        assert_eq!(epd.sleeps, 1);
        assert_eq!(guard.power_state(), PowerState::Sleep);
    }
}
