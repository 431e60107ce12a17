/*
 * Ring Buffer for Logging
 *
 * This module implements a fixed-size byte ring buffer for log output.
 *
 * Design:
 * - Fixed-size circular buffer (16KB), no heap allocations
 * - Overwrite on overflow (loses the oldest bytes)
 * - Not synchronized by itself; the log buffer wraps it in a spin::Mutex
 */

/// Size of the ring buffer
pub const BUFFER_SIZE: usize = 16 * 1024;

/// Ring buffer for log messages
pub struct RingBuffer {
    buffer: [u8; BUFFER_SIZE],

    /// Index of the oldest byte
    head: usize,

    /// Number of bytes stored
    len: usize,
}

impl RingBuffer {
    /// Create a new empty ring buffer
    pub const fn new() -> Self {
        Self {
            buffer: [0; BUFFER_SIZE],
            head: 0,
            len: 0,
        }
    }

    /// Write a string to the ring buffer
    ///
    /// If the buffer is full, old data is overwritten.
    ///
    /// # Returns
    /// Number of bytes actually written
    pub fn write(&mut self, data: &str) -> usize {
        let mut bytes = data.as_bytes();
        // Only the tail of an oversized message can survive anyway
        if bytes.len() > BUFFER_SIZE {
            bytes = &bytes[bytes.len() - BUFFER_SIZE..];
        }

        for &byte in bytes {
            let idx = (self.head + self.len) % BUFFER_SIZE;
            self.buffer[idx] = byte;
            if self.len == BUFFER_SIZE {
                self.head = (self.head + 1) % BUFFER_SIZE;
            } else {
                self.len += 1;
            }
        }
        bytes.len()
    }

    /// Read available data from the ring buffer, draining it
    ///
    /// # Returns
    /// Number of bytes actually read
    pub fn read(&mut self, dest: &mut [u8]) -> usize {
        let to_read = self.len.min(dest.len());
        for (i, slot) in dest.iter_mut().take(to_read).enumerate() {
            *slot = self.buffer[(self.head + i) % BUFFER_SIZE];
        }
        self.consume(to_read);
        to_read
    }

    /// Read up to and including the next newline, or until `dest` is full
    ///
    /// # Returns
    /// Number of bytes read, 0 if the buffer is empty
    pub fn read_line(&mut self, dest: &mut [u8]) -> usize {
        let mut count = 0;
        while count < self.len && count < dest.len() {
            let byte = self.buffer[(self.head + count) % BUFFER_SIZE];
            dest[count] = byte;
            count += 1;
            if byte == b'\n' {
                break;
            }
        }
        self.consume(count);
        count
    }

    fn consume(&mut self, count: usize) {
        self.head = (self.head + count) % BUFFER_SIZE;
        self.len -= count;
    }

    /// Check if the ring buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the number of bytes currently in the buffer
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new()
    }
}
