// GestLock — Worker Tasks
//
// Each task runs on its own thread (a FreeRTOS task on the board) and talks
// to the others through the shared signal set and mpsc channels.

pub mod auth;
pub mod button;
pub mod ui;
