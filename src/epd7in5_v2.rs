//! Custom EPD 7.5" V2 (800x480, black/white) driver.
//!
//! Follows the Waveshare epd7in5_v2.py and C reference sequences so the
//! init/refresh/sleep timing matches the vendor examples. The controller is
//! a UC8179; unlike the SSD-series panels its BUSY line is active LOW, so
//! waits poll until the pin reads high again.

use std::thread;
use std::time::Duration;

/// Panel dimensions
pub const EPD_WIDTH: u32 = 800;
pub const EPD_HEIGHT: u32 = 480;

/// Simple error type for panel operations
#[derive(Debug)]
pub struct EpdError(pub String);

impl std::fmt::Display for EpdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPD Error: {}", self.0)
    }
}

impl std::error::Error for EpdError {}

/// Trait for software SPI interface
pub trait SoftwareSpi {
    fn write_byte(&mut self, data: u8) -> Result<(), EpdError>;
}

/// Trait for GPIO output pin interface
pub trait GpioPin {
    fn set_high(&mut self) -> Result<(), EpdError>;
    fn set_low(&mut self) -> Result<(), EpdError>;
}

/// Trait for input pin interface
pub trait InputPin {
    fn is_high(&self) -> Result<bool, EpdError>;
}

/// EPD 7.5" V2 display driver
pub struct Epd7in5V2<SPI, CS, DC, RST, BUSY> {
    spi: SPI,
    cs_pin: CS,
    dc_pin: DC,
    rst_pin: RST,
    busy_pin: BUSY,
    width: u32,
    height: u32,
}

impl<SPI, CS, DC, RST, BUSY> Epd7in5V2<SPI, CS, DC, RST, BUSY>
where
    SPI: SoftwareSpi,
    CS: GpioPin,
    DC: GpioPin,
    RST: GpioPin,
    BUSY: InputPin,
{
    pub fn new(spi: SPI, cs_pin: CS, dc_pin: DC, rst_pin: RST, busy_pin: BUSY) -> Self {
        Self {
            spi,
            cs_pin,
            dc_pin,
            rst_pin,
            busy_pin,
            width: EPD_WIDTH,
            height: EPD_HEIGHT,
        }
    }

    /// Hardware reset, timing from the Python reset()
    fn reset(&mut self) -> Result<(), EpdError> {
        self.rst_pin.set_high()?;
        thread::sleep(Duration::from_millis(20));
        self.rst_pin.set_low()?;
        thread::sleep(Duration::from_millis(2));
        self.rst_pin.set_high()?;
        thread::sleep(Duration::from_millis(20));
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> Result<(), EpdError> {
        self.dc_pin.set_low()?;
        self.cs_pin.set_low()?;
        self.spi.write_byte(command)?;
        self.cs_pin.set_high()?;
        Ok(())
    }

    fn send_data(&mut self, data: u8) -> Result<(), EpdError> {
        self.dc_pin.set_high()?;
        self.cs_pin.set_low()?;
        self.spi.write_byte(data)?;
        self.cs_pin.set_high()?;
        Ok(())
    }

    /// BUSY is active LOW on the UC8179: wait until the pin reads high.
    fn read_busy(&mut self) -> Result<(), EpdError> {
        eprintln!("   Waiting for display (BUSY pin check)...");
        let mut count = 0;
        while !self.busy_pin.is_high()? {
            self.send_command(0x71)?; // GET_STATUS keeps the poll alive
            thread::sleep(Duration::from_millis(20));
            count += 1;
            if count > 2000 {
                eprintln!("   BUSY pin timeout after 40 seconds - display may be stuck");
                break;
            }
        }
        thread::sleep(Duration::from_millis(20));
        eprintln!("   Display ready (BUSY released after {} checks)", count);
        Ok(())
    }

    fn turn_on_display(&mut self) -> Result<(), EpdError> {
        self.send_command(0x12)?; // DISPLAY_REFRESH
        thread::sleep(Duration::from_millis(100));
        self.read_busy()?;
        Ok(())
    }

    /// Initialize the panel, following the vendor EPD_7IN5_V2_Init()
    pub fn init(&mut self) -> Result<(), EpdError> {
        eprintln!("Initializing EPD 7.5\" V2...");
        self.reset()?;

        self.send_command(0x01)?; // POWER_SETTING
        self.send_data(0x07)?;
        self.send_data(0x07)?; // VGH=20V, VGL=-20V
        self.send_data(0x3f)?; // VDH=15V
        self.send_data(0x3f)?; // VDL=-15V

        self.send_command(0x04)?; // POWER_ON
        thread::sleep(Duration::from_millis(100));
        self.read_busy()?;

        self.send_command(0x00)?; // PANEL_SETTING
        self.send_data(0x1F)?; // KW mode, LUT from OTP

        self.send_command(0x61)?; // RESOLUTION_SETTING
        self.send_data((self.width / 256) as u8)?;
        self.send_data((self.width % 256) as u8)?;
        self.send_data((self.height / 256) as u8)?;
        self.send_data((self.height % 256) as u8)?;

        self.send_command(0x15)?; // DUAL_SPI off
        self.send_data(0x00)?;

        self.send_command(0x50)?; // VCOM_AND_DATA_INTERVAL
        self.send_data(0x10)?;
        self.send_data(0x07)?;

        self.send_command(0x60)?; // TCON_SETTING
        self.send_data(0x22)?;

        eprintln!("   EPD initialization completed");
        Ok(())
    }

    /// Send one frame and refresh.
    ///
    /// `buffer` is packed 1bpp, MSB first, bit set = white, row-major at
    /// 100 bytes per row. The old-data RAM (0x10) is filled white and the
    /// new frame goes to 0x13 inverted, matching EPD_7IN5_V2_Display().
    pub fn display(&mut self, buffer: &[u8]) -> Result<(), EpdError> {
        let high = self.height as usize;
        let wide = self.width.div_ceil(8) as usize;
        if buffer.len() != high * wide {
            return Err(EpdError(format!(
                "frame buffer is {} bytes, panel needs {}",
                buffer.len(),
                high * wide
            )));
        }

        eprintln!("   Sending frame ({} bytes) to display...", buffer.len());

        self.send_command(0x10)?;
        for _ in 0..high * wide {
            self.send_data(0xFF)?;
        }

        self.send_command(0x13)?;
        for j in 0..high {
            for i in 0..wide {
                self.send_data(!buffer[i + j * wide])?;
            }
        }

        self.turn_on_display()?;
        eprintln!("   Frame sent and display refreshed");
        Ok(())
    }

    /// Clear the panel to white.
    pub fn clear(&mut self) -> Result<(), EpdError> {
        eprintln!("   Clearing display...");
        let high = self.height as usize;
        let wide = self.width.div_ceil(8) as usize;

        self.send_command(0x10)?;
        for _ in 0..high * wide {
            self.send_data(0xFF)?;
        }
        self.send_command(0x13)?;
        for _ in 0..high * wide {
            self.send_data(0x00)?;
        }

        self.turn_on_display()?;
        eprintln!("   Display cleared");
        Ok(())
    }

    /// Power off and enter deep sleep. The image persists; a hardware
    /// reset (via init) is required before the next refresh.
    pub fn sleep(&mut self) -> Result<(), EpdError> {
        eprintln!("   Putting display to sleep...");
        self.send_command(0x02)?; // POWER_OFF
        self.read_busy()?;
        self.send_command(0x07)?; // DEEP_SLEEP
        self.send_data(0xA5)?;
        thread::sleep(Duration::from_millis(2000));
        eprintln!("   Display sleeping");
        Ok(())
    }
}
