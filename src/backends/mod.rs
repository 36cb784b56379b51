//! Platform input backends.
//!
//! Each backend discovers peripherals, opens them and feeds translated
//! [`EngineEvent`](crate::event::EngineEvent)s into an
//! [`EventQueue`](crate::queue::EventQueue).
//!
//! Only Linux (evdev + epoll) is implemented.

#[cfg(target_os = "linux")]
#[cfg_attr(docsrs, doc(cfg(target_os = "linux")))]
pub mod linux;
