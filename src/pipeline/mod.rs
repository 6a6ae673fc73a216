//! Pipeline stages for image conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the codec can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ raster ──▶ encode ──▶ deliver
//! (bytes)   (codec)    (RGBA8)    (codec)    (img.<fmt>)
//! ```
//!
//! 1. [`input`]   — the selected file and its declared MIME type; loads bytes
//! 2. [`decode`]  — bytes → image, on the blocking pool, optional timeout
//! 3. [`raster`]  — draw onto a canvas of the natural dimensions
//! 4. [`encode`]  — canvas → target-format bytes at default settings
//! 5. [`deliver`] — name the artifact `img.<format>` and hand it over

pub mod decode;
pub mod deliver;
pub mod encode;
pub mod input;
pub mod raster;
