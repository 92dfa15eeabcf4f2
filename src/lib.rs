// GestLock — Gesture-Keyed Lock
//
// A gyroscope gesture is the key: the user records a motion once, later
// motions are compared against it to unlock. Everything here is plain std so
// it runs on the ESP32-C3 (esp-idf std) and on a development host alike; the
// board drivers live in the binary.

pub mod config;
pub mod context;
pub mod events;
pub mod gesture;
pub mod input;
pub mod signals;
#[cfg(not(target_os = "espidf"))]
pub mod sim;
pub mod tasks;
pub mod ui;
