/*
 * Buffered Logging System
 *
 * Log lines are appended to a global ring buffer guarded by a spin::Mutex.
 * The host pulls them out with drain() or drain_lines(); nothing is printed
 * on its own. When the host falls behind, the oldest output is lost.
 */

use spin::Mutex;

use super::ring_buffer::RingBuffer;

/// Longest line handed out by drain_lines(), newline included
pub const LINE_CAPACITY: usize = 256;

/// Global log buffer
static LOG_BUFFER: Mutex<RingBuffer> = Mutex::new(RingBuffer::new());

/// Append a formatted line to the buffer
pub fn write_log(message: &str) {
    LOG_BUFFER.lock().write(message);
}

/// Copy buffered output into `dest`, oldest first
///
/// # Returns
/// Number of bytes copied
pub fn drain(dest: &mut [u8]) -> usize {
    LOG_BUFFER.lock().read(dest)
}

/// Hand every complete buffered line to `f`, without its newline
///
/// Lines that are not valid UTF-8 (a multi-byte character cut by an
/// overwrite) are skipped.
pub fn drain_lines<F: FnMut(&str)>(mut f: F) {
    let mut line = [0u8; LINE_CAPACITY];
    loop {
        let n = LOG_BUFFER.lock().read_line(&mut line);
        if n == 0 {
            break;
        }
        let bytes = line[..n].strip_suffix(b"\n").unwrap_or(&line[..n]);
        if let Ok(text) = core::str::from_utf8(bytes) {
            f(text);
        }
    }
}

/// Number of bytes waiting to be drained
pub fn pending() -> usize {
    LOG_BUFFER.lock().len()
}

/// Drop everything buffered so far
pub fn clear() {
    LOG_BUFFER.lock().clear();
}
