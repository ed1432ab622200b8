//! Dynamic GPU buffer management with automatic resizing
//!
//! Provides buffers that grow automatically when data exceeds capacity,
//! using a 2x growth strategy to minimize reallocations, plus helpers for
//! packing per-draw uniforms at a dynamic-offset stride.

/// A GPU buffer that can grow dynamically
///
/// Uses a 2x growth strategy when capacity is exceeded.
/// Never shrinks (GPU buffers cannot be resized in place).
pub struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: usize, // Capacity in bytes
    len: usize,      // Current data length in bytes
    usage: wgpu::BufferUsages,
    label: String,
}

impl DynamicBuffer {
    /// Buffer with the given initial byte capacity.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        initial_capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let capacity = initial_capacity.max(MIN_CAPACITY);
        Self {
            buffer: Self::allocate(device, label, capacity, usage),
            capacity,
            len: 0,
            usage,
            label: label.to_owned(),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        label: &str,
        capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity as u64,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Write raw bytes to buffer, growing if necessary.
    ///
    /// Returns `true` if buffer was reallocated (bind groups need recreation).
    pub fn write_bytes(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
    ) -> bool {
        let needed = data.len();
        let reallocated = if needed > self.capacity {
            self.capacity = grown_capacity(self.capacity, needed);
            self.buffer =
                Self::allocate(device, &self.label, self.capacity, self.usage);
            log::debug!(
                "Grew buffer '{}' to {} bytes",
                self.label,
                self.capacity
            );
            true
        } else {
            false
        };

        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, data);
        }
        self.len = needed;

        reallocated
    }

    /// The underlying buffer.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Bytes written by the last write.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the last write was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated size in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

const MIN_CAPACITY: usize = 64;

/// 2x growth, minimum 1KB more than the current capacity.
#[must_use]
pub fn grown_capacity(current: usize, needed: usize) -> usize {
    (needed * 2).max(current + 1024)
}

/// Packs fixed-size records at a fixed stride, for uniform buffers bound
/// with dynamic offsets.
pub struct StridedWriter {
    bytes: Vec<u8>,
    stride: usize,
}

impl StridedWriter {
    /// A writer whose records start every `stride` bytes.
    #[must_use]
    pub fn new(stride: usize) -> Self {
        Self {
            bytes: Vec::new(),
            stride,
        }
    }

    /// Append one record and return its byte offset. Records larger than
    /// the stride occupy several slots.
    pub fn push<T: bytemuck::Pod>(&mut self, value: &T) -> u32 {
        let offset = self.bytes.len();
        let record = bytemuck::bytes_of(value);
        self.bytes.extend_from_slice(record);
        let slots = record.len().div_ceil(self.stride).max(1);
        self.bytes.resize(offset + slots * self.stride, 0);
        offset as u32
    }

    /// Drop all records, keeping the allocation.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Packed bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_at_least_doubles_demand() {
        assert_eq!(grown_capacity(64, 100), 1088);
        assert_eq!(grown_capacity(1024, 4096), 8192);
    }

    #[test]
    fn strided_records_are_aligned() {
        let mut writer = StridedWriter::new(256);
        assert_eq!(writer.push(&[1.0f32; 4]), 0);
        assert_eq!(writer.push(&[2.0f32; 4]), 256);
        assert_eq!(writer.as_bytes().len(), 512);
        let second: [f32; 4] =
            bytemuck::pod_read_unaligned(&writer.as_bytes()[256..272]);
        assert_eq!(second, [2.0; 4]);

        writer.clear();
        assert!(writer.as_bytes().is_empty());
    }
}
