#![cfg_attr(not(test), no_std)]

//! Line-addressed driver for the LS027B7DH01 400x240 Sharp memory LCD.
//!
//! The panel keeps its own image, so callers only send the lines that
//! changed. [`Ls027::write_indexed_rows`] takes 8-bit pixel rows and packs
//! them on the way out.

pub mod protocol;

use embedded_hal::{
    digital::OutputPin,
    spi::{Operation, SpiDevice},
};

/// Panel timing and signalling options.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// EXTCOMIN toggle rate the board glue should keep up, in Hz.
    pub extcomin_hz: u8,
    /// M1 level embedded in every command byte.
    pub m1_high: bool,
    /// Chip-select hold after the all-clear command.
    pub clear_hold_ns: u32,
    /// Pixels below this value are drawn dark.
    pub dark_threshold: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extcomin_hz: 1,
            m1_high: false,
            clear_hold_ns: 220_000,
            dark_threshold: protocol::DARK_THRESHOLD,
        }
    }
}

/// Driver errors, generic over the bus and pin error types.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<SpiErr, DispErr, ExtErr> {
    /// The SPI transaction failed.
    Spi(SpiErr),
    /// Driving the DISP pin failed.
    Disp(DispErr),
    /// Driving the EXTCOMIN pin failed.
    ExtCom(ExtErr),
    /// Line number or row stride the panel cannot take.
    InvalidInput,
}

/// Result of a driver operation that returns nothing on success.
pub type DriverResult<SpiErr, DispErr, ExtErr> = Result<(), Error<SpiErr, DispErr, ExtErr>>;

/// LS027B7DH01 driver over an SPI device and the DISP/EXTCOMIN pins.
#[derive(Debug)]
pub struct Ls027<SPI, DISP, EXTCOM> {
    spi: SPI,
    disp: DISP,
    extcom: EXTCOM,
    config: Config,
    extcom_high: bool,
}

impl<SPI, DISP, EXTCOM> Ls027<SPI, DISP, EXTCOM>
where
    SPI: SpiDevice<u8>,
    DISP: OutputPin,
    EXTCOM: OutputPin,
{
    /// Takes ownership of the bus and pins. The display stays in whatever
    /// state the pins were left in until [`Ls027::enable_display`].
    pub fn new(spi: SPI, disp: DISP, extcom: EXTCOM, config: Config) -> Self {
        Self {
            spi,
            disp,
            extcom,
            config,
            extcom_high: false,
        }
    }

    /// Configuration the driver was built with.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Gives back the bus and both pins.
    pub fn release(self) -> (SPI, DISP, EXTCOM) {
        (self.spi, self.disp, self.extcom)
    }

    /// Drives DISP high so the panel shows its memory contents.
    pub fn enable_display(&mut self) -> DriverResult<SPI::Error, DISP::Error, EXTCOM::Error> {
        self.disp.set_high().map_err(Error::Disp)
    }

    /// Drives DISP low, blanking the panel without losing its memory.
    pub fn disable_display(&mut self) -> DriverResult<SPI::Error, DISP::Error, EXTCOM::Error> {
        self.disp.set_low().map_err(Error::Disp)
    }

    /// Flips EXTCOMIN. Must be called at `extcomin_hz` while the display is
    /// on.
    pub fn toggle_extcomin(&mut self) -> DriverResult<SPI::Error, DISP::Error, EXTCOM::Error> {
        self.extcom_high = !self.extcom_high;

        if self.extcom_high {
            self.extcom.set_high().map_err(Error::ExtCom)
        } else {
            self.extcom.set_low().map_err(Error::ExtCom)
        }
    }

    /// Sends the all-clear command, holding chip select for
    /// `clear_hold_ns` afterwards.
    pub fn clear_all(&mut self) -> DriverResult<SPI::Error, DISP::Error, EXTCOM::Error> {
        let packet = protocol::build_clear_packet(self.config.m1_high);
        let mut ops = [
            Operation::Write(&packet),
            Operation::DelayNs(self.config.clear_hold_ns),
        ];
        self.spi.transaction(&mut ops).map_err(Error::Spi)
    }

    /// Writes one packed line, 1..=240.
    pub fn write_line(
        &mut self,
        line: u16,
        data: &[u8; protocol::LINE_BYTES],
    ) -> DriverResult<SPI::Error, DISP::Error, EXTCOM::Error> {
        let packet = protocol::build_write_line_packet(line, data, self.config.m1_high)
            .ok_or(Error::InvalidInput)?;

        self.spi.write(&packet).map_err(Error::Spi)
    }

    /// Writes consecutive rows of 8-bit pixels, `stride` pixels each, to
    /// the gate lines starting at zero-based `first_row`.
    ///
    /// Rows below the panel are dropped; a trailing partial row is ignored.
    pub fn write_indexed_rows(
        &mut self,
        pixels: &[u8],
        stride: usize,
        first_row: usize,
    ) -> DriverResult<SPI::Error, DISP::Error, EXTCOM::Error> {
        if stride == 0 {
            return Err(Error::InvalidInput);
        }

        for (offset, row) in pixels.chunks_exact(stride).enumerate() {
            let row_index = first_row + offset;
            if row_index >= protocol::HEIGHT {
                break;
            }
            let line = protocol::pack_indexed_row(row, self.config.dark_threshold);
            self.write_line(row_index as u16 + 1, &line)?;
        }

        Ok(())
    }
}
