// GestLock — SSD1306 OLED Driver
//
// Draws into an off-screen `FrameBuffer`; `flush` pushes the whole buffer over
// the shared I2C bus in horizontal addressing mode.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use anyhow::anyhow;

use gestlock::config::*;
use gestlock::ui::screen::FrameBuffer;
use gestlock::ui::Panel;

use super::imu::SharedBus;

const CTRL_CMD: u8 = 0x00;
const CTRL_DATA: u8 = 0x40;
/// Data bytes per I2C transaction (plus the control byte).
const CHUNK: usize = 32;

const INIT_SEQUENCE: &[u8] = &[
    0xAE, // display off
    0xD5, 0x80, // clock divide
    0xA8, 0x3F, // multiplex 64
    0xD3, 0x00, // display offset
    0x40, // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing
    0xA1, // segment remap
    0xC8, // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge
    0xDB, 0x40, // VCOMH
    0xA4, // resume to RAM
    0xA6, // normal (not inverted)
    0xAF, // display on
];

pub struct OledDisplay {
    bus: SharedBus,
    frame: FrameBuffer,
}

impl OledDisplay {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            bus,
            frame: FrameBuffer::new(),
        }
    }

    /// Verify the controller acknowledges its address.
    pub fn is_connected(&self) -> bool {
        match self.bus.lock() {
            Ok(mut bus) => bus.write(I2C_ADDR_OLED, &[CTRL_CMD, 0xE3], I2C_TIMEOUT_TICKS).is_ok(),
            Err(_) => false,
        }
    }

    pub fn init(&mut self) -> anyhow::Result<()> {
        self.commands(INIT_SEQUENCE)?;
        self.frame = FrameBuffer::new();
        self.flush()?;
        log::info!("SSD1306 initialised ({}x{})", SCREEN_WIDTH, SCREEN_HEIGHT);
        Ok(())
    }

    fn commands(&self, cmds: &[u8]) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().map_err(|_| anyhow!("I2C bus lock poisoned"))?;
        for &cmd in cmds {
            bus.write(I2C_ADDR_OLED, &[CTRL_CMD, cmd], I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }
}

impl OriginDimensions for OledDisplay {
    fn size(&self) -> Size {
        self.frame.size()
    }
}

impl DrawTarget for OledDisplay {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.frame.draw_iter(pixels)
    }
}

impl Panel for OledDisplay {
    fn flush(&mut self) -> anyhow::Result<()> {
        // Column and page window: full screen.
        let last_col = (SCREEN_WIDTH - 1) as u8;
        let last_page = (SCREEN_HEIGHT / 8 - 1) as u8;
        self.commands(&[0x21, 0, last_col, 0x22, 0, last_page])?;

        let mut bus = self.bus.lock().map_err(|_| anyhow!("I2C bus lock poisoned"))?;
        let mut packet = [0u8; CHUNK + 1];
        packet[0] = CTRL_DATA;
        for chunk in self.frame.as_bytes().chunks(CHUNK) {
            packet[1..=chunk.len()].copy_from_slice(chunk);
            bus.write(I2C_ADDR_OLED, &packet[..=chunk.len()], I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }
}
