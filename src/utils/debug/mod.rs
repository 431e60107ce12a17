/*
 * Debugging and Logging Utilities
 *
 * This module contains the logging backend of the simulator: a `log`
 * implementation that formats records into fixed-size lines and a ring
 * buffer the host drains them from.
 */

pub mod log_buffer;
pub mod logger;
pub mod ring_buffer;
