//! Storage abstraction for removable media

/// Storage trait for file system access
pub trait Storage {
    /// Error type
    type Error: core::fmt::Debug;
    /// File type
    type File: File;

    /// Open file for reading
    fn open_file(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<Self::File, Self::Error>>;

    /// Check if path exists
    fn exists(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<bool, Self::Error>>;
}

/// File trait for reading files
///
/// Closing is implicit: dropping the handle releases it. Reads have
/// unbounded latency and must only be issued from a non-interrupt
/// context; there is no cancellation primitive for an in-flight read.
pub trait File {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read from current position, returning the number of bytes read.
    /// A return of 0 on a non-empty buffer means end-of-file.
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Seek to absolute position
    fn seek(&mut self, pos: u64) -> impl core::future::Future<Output = Result<u64, Self::Error>>;

    /// Get file size
    fn size(&self) -> u64;

    /// `true` once the read cursor has reached the end of the file.
    ///
    /// Reports end-of-file for a read that returned exactly the remaining
    /// bytes, not only for a short read.
    fn eof(&self) -> bool;
}
