//! File selection helpers: content-kind inference and preview decoding.

pub mod decode;
pub mod mime;

pub use decode::{DecodeError, DecodedImagePng, decode_image_to_png, fit_within};
pub use mime::{RawFile, is_supported_extension, mime_type_for_extension, normalize_input_path};
