// GestLock — Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V) + MPU6050 + SSD1306

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_BUTTON: i32 = 3;      // D1/A1 — User button (INPUT_PULLDOWN, active HIGH)
pub const PIN_INDICATOR: i32 = 4;   // D2/A2 — Status LED / haptic motor
pub const PIN_GYRO_INT: i32 = 5;    // D3    — MPU6050 INT (data ready, active HIGH)
pub const PIN_I2C_SDA: i32 = 6;     // D4    — I2C data line
pub const PIN_I2C_SCL: i32 = 7;     // D5    — I2C clock line

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 1024

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_BUTTON: usize = 4096;
pub const STACK_EDGE: usize = 3072;
pub const STACK_AUTH: usize = 16384; // DTW rows + two capture buffers
pub const STACK_UI: usize = 8192;

// ---------------------------------------------------------------------------
// Button Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const DEBOUNCE_MS: u64 = 50;
pub const LONG_PRESS_MS: u64 = 500;
pub const DOUBLE_CLICK_WINDOW_MS: u64 = 250;

// ---------------------------------------------------------------------------
// Gesture Capture
// ---------------------------------------------------------------------------
pub const CAPTURE_WINDOW_MS: u64 = 5000;
pub const CAPTURE_RATE_HZ: u32 = 20;
pub const UI_POLL_INTERVAL_MS: u64 = 50;
pub const INDICATOR_PULSE_MS: u64 = 80;

// ---------------------------------------------------------------------------
// Gesture Matching
// ---------------------------------------------------------------------------
pub const TRIM_THRESHOLD: f32 = 1e-5;
pub const DTW_THRESHOLD: f32 = 100.0;
pub const CORRELATION_THRESHOLD: f32 = 0.3;
pub const CORRELATION_MIN_AXES: usize = 3;

// ---------------------------------------------------------------------------
// MPU6050 Gyroscope
// ---------------------------------------------------------------------------
pub const GYRO_SCALE_500: f32 = 65.5; // LSB/°/s at ±500 °/s
pub const GYRO_BASE_RATE_HZ: u32 = 1000; // Gyro output rate with DLPF enabled
/// Fixed zero-rate offset (rad/s) measured on the bench unit, subtracted per axis.
pub const GYRO_OFFSET_RAD_S: [f32; 3] = [0.0, 0.0, 0.0];

// ---------------------------------------------------------------------------
// Template Storage (NVS)
// ---------------------------------------------------------------------------
pub const NVS_NAMESPACE: &str = "gestlock";
pub const NVS_TEMPLATE_KEY: &str = "template";
/// Upper bound on a stored template: 5 s at 20 Hz plus slack for faster rates.
pub const TEMPLATE_MAX_SAMPLES: usize = 256;
