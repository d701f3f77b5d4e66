//! Metadata model and file I/O.
//!
//! The batch output is a single JSON array with one [`ImageRecord`] per
//! finalized image. It is the only durable interchange format: undo history
//! is never written, and rendered images can always be regenerated from it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use redactor::format::{read_records, write_records};
//!
//! let records = read_records(Path::new("output.json"))?;
//! write_records(&records, Path::new("copy.json"))?;
//! ```

mod error;
mod files;
mod metadata;

#[cfg(test)]
mod tests;

pub use error::FormatError;
pub use files::{
    display_name_for, load_image, output_path_for, read_records, save_image, write_records,
};
pub use metadata::{ImageRecord, Metadata, RectangleMetadata, VertexEntry};
