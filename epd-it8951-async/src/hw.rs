use embedded_hal_async::delay::DelayNs;

/// Host-side bus and peripheral access for the controller link.
///
/// This covers the duties of the board support layer: bringing up the SPI
/// peripheral, GPIO and anything else the controller link needs, and
/// releasing all of it again at the end of a run. The wire protocol itself
/// lives behind [crate::it8951::It8951].
#[allow(async_fn_in_trait)]
pub trait BusHw {
    type Error: core::error::Error;

    /// Brings up the bus layer. Nothing may talk to the controller before
    /// this has succeeded.
    async fn init(&mut self) -> Result<(), Self::Error>;

    /// Releases the bus layer. Must tolerate being called regardless of how
    /// much controller traffic happened since [BusHw::init].
    fn deinit(&mut self);
}

/// Provides access to delay functionality for controller timing control.
pub trait DelayHw {
    type Delay: DelayNs;

    fn delay(&mut self) -> &mut Self::Delay;
}
