//! Canvas flush onto an LS027B7DH01 memory LCD.

use embedded_hal::{digital::OutputPin, spi::SpiDevice};
use log::warn;
use ls027b7dh01::Ls027;

use crate::canvas::{FlushTarget, Rect};

/// Writes the flushed canvas rows to the panel line by line.
///
/// Pixel values below `0x80` are dark. Driver failures are logged and
/// dropped: a flush has no way to report them and the next one rewrites
/// the same lines.
#[derive(Debug)]
pub struct PanelFlush<SPI, DISP, EXTCOM> {
    driver: Ls027<SPI, DISP, EXTCOM>,
}

impl<SPI, DISP, EXTCOM> PanelFlush<SPI, DISP, EXTCOM>
where
    SPI: SpiDevice<u8>,
    DISP: OutputPin,
    EXTCOM: OutputPin,
{
    pub fn new(driver: Ls027<SPI, DISP, EXTCOM>) -> Self {
        Self { driver }
    }

    pub fn driver_mut(&mut self) -> &mut Ls027<SPI, DISP, EXTCOM> {
        &mut self.driver
    }

    pub fn release(self) -> Ls027<SPI, DISP, EXTCOM> {
        self.driver
    }
}

impl<SPI, DISP, EXTCOM> FlushTarget for PanelFlush<SPI, DISP, EXTCOM>
where
    SPI: SpiDevice<u8>,
    DISP: OutputPin,
    EXTCOM: OutputPin,
{
    fn flush(&mut self, rows: &[u8], rect: Rect) {
        if let Err(err) = self.driver.write_indexed_rows(rows, rect.width(), rect.y0) {
            warn!(
                "panel: flush of rows {}..={} failed: {:?}",
                rect.y0, rect.y1, err
            );
        }
    }
}
