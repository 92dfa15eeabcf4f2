pub mod display;
pub mod edge;
pub mod haptic;
pub mod imu;
pub mod storage;
