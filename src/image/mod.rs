//! Single-channel image buffers used by the describer and the K-VLD filter.
//!
//! - `ImageU8`: borrowed 8-bit view over decoded pixels.
//! - `ImageF32`: owned float image in `[0, 1]`, the working type of every
//!   numeric stage.
//! - `IntegralImage`: summed-area table for box averages at arbitrary scale.
//! - `io`: decoding from disk and JSON helpers for tool outputs.

pub mod f32;
pub mod integral;
pub mod io;
pub mod traits;
pub mod u8;

pub use self::f32::ImageF32;
pub use self::integral::IntegralImage;
pub use self::traits::{ImageView, ImageViewMut};
pub use self::u8::ImageU8;
