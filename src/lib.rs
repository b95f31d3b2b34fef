#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! Shape descriptors for N-dimensional convolutions.
//!
//! A descriptor records every static parameter of a convolution (spatial
//! kernel size, channel counts, stride, padding, dilation, kernel flip) and
//! derives the dependent quantities from them. Compute kernels validate the
//! runtime shapes of their input, weight and output buffers against the
//! descriptor before doing any numeric work, so shape bugs surface as
//! structured errors instead of silent corruption.
//!
//! ```
//! use conv_dims::{ConvDims, ConvOptions, DenseConvDims, Shape};
//!
//! # fn main() -> Result<(), conv_dims::ShapeError> {
//! // A 2D convolution over a 28x28 input with 1 channel and batch size 32;
//! // shapes are ordered (spatial.., channels, batch).
//! let x = Shape::from([28, 28, 1, 32]);
//! let w = Shape::from([3, 3, 1, 8]);
//! let options = ConvOptions::new().with_stride(2).with_padding(1);
//! let dims = DenseConvDims::new(&x, &w, options)?;
//!
//! assert_eq!(dims.output_size(), [14, 14]);
//! assert_eq!(dims.channels_out(), 8);
//!
//! // What a compute kernel runs before touching any data:
//! let y = Shape::from([14, 14, 8, 32]);
//! dims.check_dims(&x, &w, &y)?;
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate derive_new;

extern crate alloc;

mod check;
mod dims;
mod shape;

pub use check::*;
pub use dims::*;
pub use shape::*;
