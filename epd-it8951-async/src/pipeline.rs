//! The bring-up and display sequence, end to end.
//!
//! The sequence is strictly linear with no retries: bus init, controller
//! init, variant detection, full clear, image acquisition, raster
//! conversion, frame transfer, power-down. Any stage failure after a
//! successful bus init diverts straight to teardown, as does an external
//! termination request observed between stages.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal_async::delay::DelayNs as _;
use thiserror::Error;

use crate::{
    config::Config,
    guard::{ResourceGuard, TransferBuffer},
    hw::{BusHw, DelayHw},
    it8951::{It8951, RefreshMode},
    layout::{self, GeometryError},
    log::{debug, info},
    source::{ImageSource, RasterConverter},
    variant,
};

/// Settling time before the bus is released. A frame transfer the
/// controller is still draining can take several seconds to complete.
pub const SETTLE_DELAY_MS: u32 = 5_000;

/// One-shot token for external termination requests.
///
/// A signal-handling context calls [Interrupt::request]; the pipeline
/// observes the token between stages and diverts to teardown. `const`
/// constructible so hosts can keep one in a `static`.
#[derive(Debug, Default)]
pub struct Interrupt(AtomicBool);

impl Interrupt {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Requests termination. Safe to call from any context, any number of
    /// times.
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// How a run ended when it did not fail.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every stage ran and the frame is on the panel.
    Completed,
    /// A termination request was honoured; teardown still ran.
    Interrupted,
}

impl Outcome {
    /// Both outcomes are clean exits.
    pub fn exit_code(&self) -> i32 {
        0
    }
}

/// A stage failure. Every variant is fatal at this layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError<E> {
    /// The host bus layer never came up. Nothing was acquired, so this is
    /// the one failure with no teardown.
    #[error("bus initialisation failed: {0}")]
    BusInit(E),
    #[error("controller initialisation failed: {0}")]
    ControllerInit(E),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("full-screen clear failed: {0}")]
    ClearRefresh(E),
    #[error("image acquisition failed: {0}")]
    Acquisition(E),
    #[error("raster conversion failed: {0}")]
    Conversion(E),
    #[error("frame transfer failed: {0}")]
    Render(E),
}

impl<E> PipelineError<E> {
    /// Process exit status for this failure: -1 when the bus layer never
    /// came up, 1 for every later stage.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::BusInit(_) => -1,
            _ => 1,
        }
    }
}

/// Drives one display run against the supplied collaborators.
pub struct Pipeline<'a, HW, EPD, SRC, CVT> {
    hw: HW,
    epd: EPD,
    source: SRC,
    converter: CVT,
    config: Config,
    interrupt: &'a Interrupt,
    guard: ResourceGuard,
}

impl<'a, HW, EPD, SRC, CVT> Pipeline<'a, HW, EPD, SRC, CVT>
where
    HW: BusHw + DelayHw,
    EPD: It8951,
    SRC: ImageSource,
    CVT: RasterConverter,
{
    pub fn new(
        hw: HW,
        epd: EPD,
        source: SRC,
        converter: CVT,
        config: Config,
        interrupt: &'a Interrupt,
    ) -> Self {
        Self {
            hw,
            epd,
            source,
            converter,
            config,
            interrupt,
            guard: ResourceGuard::new(),
        }
    }

    /// Runs the full sequence.
    ///
    /// Teardown (buffers, controller power, settling delay, bus) runs on
    /// every exit except a failed bus init, including stage failures and
    /// honoured termination requests.
    pub async fn run<E>(mut self) -> Result<Outcome, PipelineError<E>>
    where
        E: From<HW::Error> + From<EPD::Error> + From<SRC::Error> + From<CVT::Error>,
    {
        self.hw
            .init()
            .await
            .map_err(|e| PipelineError::BusInit(e.into()))?;

        let outcome = self.drive().await;
        self.teardown().await;
        outcome
    }

    async fn drive<E>(&mut self) -> Result<Outcome, PipelineError<E>>
    where
        E: From<HW::Error> + From<EPD::Error> + From<SRC::Error> + From<CVT::Error>,
    {
        info!("VCOM: {} mV", self.config.vcom_mv);
        info!("display mode: {}", self.config.display_mode);

        let device = self
            .epd
            .init(self.config.vcom_mv)
            .await
            .map_err(|e| PipelineError::ControllerInit(e.into()))?;
        self.guard.note_initialized(&device);
        info!(
            "panel {}x{}, LUT revision {}",
            device.panel_width,
            device.panel_height,
            device.lut_version.as_str()
        );

        if self.config.enhance_driving {
            info!("enhancing source driving capability");
            self.epd
                .enhance_driving()
                .await
                .map_err(|e| PipelineError::ControllerInit(e.into()))?;
        }

        let policy = variant::classify(&device.lut_version);
        debug!("fast waveform slot: {}", policy.fast_mode.0);
        let frame = layout::compute(&device, &policy)?;
        if self.interrupt.is_requested() {
            return Ok(Outcome::Interrupted);
        }

        self.epd
            .clear_refresh(&device, frame.target_address, RefreshMode::INIT)
            .await
            .map_err(|e| PipelineError::ClearRefresh(e.into()))?;
        if self.interrupt.is_requested() {
            return Ok(Outcome::Interrupted);
        }

        let image = self
            .source
            .fetch(frame.width, frame.height)
            .await
            .map_err(|e| PipelineError::Acquisition(e.into()))?;
        let image = self.guard.register(TransferBuffer::Decode, image);
        if self.interrupt.is_requested() {
            return Ok(Outcome::Interrupted);
        }

        let raster = self
            .converter
            .convert(image, self.config.bits_per_pixel)
            .map_err(|e| PipelineError::Conversion(e.into()))?;
        let raster = self.guard.register(TransferBuffer::Raster, raster);
        if self.interrupt.is_requested() {
            return Ok(Outcome::Interrupted);
        }

        self.epd
            .display_image(&frame, self.config.bits_per_pixel, raster)
            .await
            .map_err(|e| PipelineError::Render(e.into()))?;
        if self.interrupt.is_requested() {
            return Ok(Outcome::Interrupted);
        }

        Ok(Outcome::Completed)
    }

    /// The single teardown entry for the normal, failure and interrupt
    /// paths. Idempotent through the guard.
    async fn teardown(&mut self) {
        debug!("tearing down");
        self.guard.release_all();
        self.guard
            .power_down_if_active(&mut self.epd, self.config.power_off)
            .await;
        self.hw.delay().delay_ms(SETTLE_DELAY_MS).await;
        self.hw.deinit();
    }
}
