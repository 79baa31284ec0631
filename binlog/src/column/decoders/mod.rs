// Built-in type decoders for MySQL column types

pub mod numeric;
pub mod string;
pub mod datetime;
pub mod blob;
pub mod bit;
pub mod json;
pub mod decimal_enhanced;
pub mod geometry;

// Re-export all decoders
pub use numeric::*;
pub use string::*;
pub use datetime::*;
pub use bit::*;

// Re-export specific decoders to avoid conflicts
pub use blob::{BlobDecoder, TinyBlobDecoder, MediumBlobDecoder, LongBlobDecoder};
pub use json::JsonDecoder as JsonTypeDecoder;
pub use decimal_enhanced::EnhancedDecimalDecoder;
pub use geometry::GeometryDecoder as GeometryTypeDecoder;