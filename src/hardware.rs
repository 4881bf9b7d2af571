//! GPIO and SPI glue for the physical 7.5" panel.
//!
//! Pins go through the GPIO character device and the frame through the
//! kernel spidev driver, both via the `linux-embedded-hal` re-exports.
//! Chip select is left to the kernel, so the driver's CS slot gets a
//! no-op pin.

use linux_embedded_hal::gpio_cdev::{Chip, LineHandle, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, Spidev, SpidevOptions};
use std::io::Write;
use tide_dashboard_lib::canvas::Canvas;
use tide_dashboard_lib::config::HardwareConfig;
use tide_dashboard_lib::display::{DisplayError, DisplayTarget};
use tide_dashboard_lib::epd7in5_v2::{Epd7in5V2, EpdError, GpioPin, InputPin, SoftwareSpi};

const GPIO_CHIP: &str = "/dev/gpiochip0";
const CONSUMER: &str = "tide-dashboard";

fn epd_err<E: std::fmt::Display>(e: E) -> EpdError {
    EpdError(e.to_string())
}

/// Kernel SPI device; 8 MHz mode 0 per the UC8179 datasheet.
pub struct SpidevSpi {
    dev: Spidev,
}

impl SpidevSpi {
    pub fn open(path: &str) -> Result<Self, EpdError> {
        let mut dev = Spidev::open(path).map_err(epd_err)?;
        let opts = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(8_000_000)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        dev.configure(&opts).map_err(epd_err)?;
        Ok(Self { dev })
    }
}

impl SoftwareSpi for SpidevSpi {
    fn write_byte(&mut self, data: u8) -> Result<(), EpdError> {
        self.dev.write(&[data]).map(|_| ()).map_err(epd_err)
    }
}

pub struct OutputLine {
    line: LineHandle,
}

impl OutputLine {
    pub fn new(chip: &mut Chip, offset: u32) -> Result<Self, EpdError> {
        let line = chip
            .get_line(offset)
            .map_err(epd_err)?
            .request(LineRequestFlags::OUTPUT, 0, CONSUMER)
            .map_err(epd_err)?;
        Ok(Self { line })
    }
}

impl GpioPin for OutputLine {
    fn set_high(&mut self) -> Result<(), EpdError> {
        self.line.set_value(1).map_err(epd_err)
    }
    fn set_low(&mut self) -> Result<(), EpdError> {
        self.line.set_value(0).map_err(epd_err)
    }
}

pub struct InputLine {
    line: LineHandle,
}

impl InputLine {
    pub fn new(chip: &mut Chip, offset: u32) -> Result<Self, EpdError> {
        let line = chip
            .get_line(offset)
            .map_err(epd_err)?
            .request(LineRequestFlags::INPUT, 0, CONSUMER)
            .map_err(epd_err)?;
        Ok(Self { line })
    }
}

impl InputPin for InputLine {
    fn is_high(&self) -> Result<bool, EpdError> {
        Ok(self.line.get_value().map_err(epd_err)? == 1)
    }
}

/// The kernel spidev driver toggles CS around each transfer.
pub struct KernelCs;

impl GpioPin for KernelCs {
    fn set_high(&mut self) -> Result<(), EpdError> {
        Ok(())
    }
    fn set_low(&mut self) -> Result<(), EpdError> {
        Ok(())
    }
}

/// The physical panel as a [`DisplayTarget`].
///
/// Each `show` owns the panel for one full transaction: init, clear,
/// frame transfer, then deep sleep so the parked image cannot burn in
/// between refreshes.
pub struct EpdDisplay {
    epd: Epd7in5V2<SpidevSpi, KernelCs, OutputLine, OutputLine, InputLine>,
}

impl EpdDisplay {
    pub fn open(hw: &HardwareConfig) -> Result<Self, DisplayError> {
        let mut chip = Chip::new(GPIO_CHIP)
            .map_err(|e| DisplayError::Panel(format!("open {}: {}", GPIO_CHIP, e)))?;

        let dc = OutputLine::new(&mut chip, hw.dc_pin).map_err(panel)?;
        let rst = OutputLine::new(&mut chip, hw.rst_pin).map_err(panel)?;
        let busy = InputLine::new(&mut chip, hw.busy_pin).map_err(panel)?;
        let spi = SpidevSpi::open(&hw.spi_device).map_err(panel)?;

        Ok(Self {
            epd: Epd7in5V2::new(spi, KernelCs, dc, rst, busy),
        })
    }
}

impl DisplayTarget for EpdDisplay {
    fn show(&mut self, frame: &Canvas) -> Result<(), DisplayError> {
        self.epd.init().map_err(panel)?;
        self.epd.clear().map_err(panel)?;
        self.epd.display(frame.buffer()).map_err(panel)?;
        self.epd.sleep().map_err(panel)
    }
}

fn panel(e: EpdError) -> DisplayError {
    DisplayError::Panel(e.to_string())
}
