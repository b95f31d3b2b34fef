//! # Convolution Shape Descriptors
//!
//! The [`ConvDims`] trait is the contract every descriptor variant fulfils:
//! accessors for the static convolution parameters, the derived output size,
//! and runtime shape validation. Compute kernels are generic over the trait,
//! never over a concrete variant.

mod dense;
mod depthwise;
mod options;

pub use dense::*;
pub use depthwise::*;
pub use options::*;

use crate::check::ShapeError;
use crate::shape::Shape;

/// The receptive-field extent of a dilated kernel along one axis.
///
/// ```text
/// effective = dilation * (kernel_size - 1) + 1
/// ```
pub fn effective_kernel_size(kernel_size: usize, dilation: usize) -> usize {
    match kernel_size {
        0 => 0,
        k => dilation * (k - 1) + 1,
    }
}

/// Predict the output extent of one convolution axis.
///
/// ```text
/// out = floor((in + pad_front + pad_back - (dilation * (kernel - 1) + 1)) / stride) + 1
/// ```
///
/// # Reference
///
/// - [conv_arithmetic diagram](https://github.com/vdumoulin/conv_arithmetic/blob/master/README.md)
///   visual explanations of these convolution parameters.
///
/// # Arguments
///
/// - `input_size`: The input extent along the axis.
/// - `kernel_size`: The kernel extent along the axis.
/// - `stride`: The stride of the convolution, must be > 0.
/// - `padding`: The padding at the start of the axis.
/// - `padding_end`: The padding at the end of the axis.
/// - `dilation`: The dilation of the convolution, must be > 0.
///
/// # Returns
///
/// An `Option<usize>` representing the output extent; or `None` when the
/// padded input is smaller than the effective kernel.
pub fn maybe_conv_output_size(
    input_size: usize,
    kernel_size: usize,
    stride: usize,
    padding: usize,
    padding_end: usize,
    dilation: usize,
) -> Option<usize> {
    assert!(stride > 0);
    assert!(dilation > 0);

    let padded = input_size + padding + padding_end;
    let kernel = effective_kernel_size(kernel_size, dilation);
    if kernel == 0 || padded < kernel {
        return None;
    }

    Some((padded - kernel) / stride + 1)
}

/// Predict the output extent of one convolution axis.
///
/// This is the ``panic``-ing variant of [`maybe_conv_output_size`].
///
/// # Panics
///
/// If the output extent would be empty.
pub fn expect_conv_output_size(
    input_size: usize,
    kernel_size: usize,
    stride: usize,
    padding: usize,
    padding_end: usize,
    dilation: usize,
) -> usize {
    match maybe_conv_output_size(input_size, kernel_size, stride, padding, padding_end, dilation) {
        Some(size) => size,
        None => panic!(
            "No legal output size for conv axis with:\n input_size:{input_size}\n kernel_size:{kernel_size}\n stride:{stride}\n padding:{padding}\n padding_end:{padding_end}\n dilation:{dilation}",
        ),
    }
}

/// Calculate the padding required along one axis for a convolution to produce
/// a given output extent.
///
/// Returns the `(front, back)` padding pair; the back side absorbs the odd
/// unit when the total is uneven.
pub fn calculate_conv_padding(
    kernel_size: usize,
    stride: usize,
    dilation: usize,
    size_in: usize,
    size_out: usize,
) -> (usize, usize) {
    assert!(size_out > 0);
    assert!(stride > 0);

    let kernel = effective_kernel_size(kernel_size, dilation);
    let total = ((size_out - 1) * stride + kernel).saturating_sub(size_in);
    let front = total / 2;

    (front, total - front)
}

/// Common contract implemented by every convolution descriptor variant.
///
/// A descriptor is an immutable value: once constructed its parameters never
/// change, which makes it freely shareable across concurrent kernel
/// invocations. `output_size` is always derived, never stored.
pub trait ConvDims<const N: usize> {
    /// Spatial extents of the input tensor (channel and batch axes excluded).
    fn input_size(&self) -> [usize; N];

    /// Spatial extents of the kernel.
    fn kernel_size(&self) -> [usize; N];

    /// Number of input channels.
    fn channels_in(&self) -> usize;

    /// Number of output channels.
    fn channels_out(&self) -> usize;

    /// Stride per spatial axis.
    fn stride(&self) -> [usize; N];

    /// Padding at the start of each spatial axis.
    fn padding(&self) -> [usize; N];

    /// Padding at the end of each spatial axis.
    fn padding_end(&self) -> [usize; N];

    /// Dilation per spatial axis.
    fn dilation(&self) -> [usize; N];

    /// Whether the kernel is applied flipped (true convolution) rather than
    /// unflipped (cross-correlation). Consumed by kernels; shape arithmetic
    /// ignores it.
    fn flip_kernel(&self) -> bool;

    /// Number of spatial axes.
    fn spatial_dims(&self) -> usize {
        N
    }

    /// Spatial extents of the output tensor, derived from the input size,
    /// kernel size, stride, padding and dilation.
    ///
    /// # Panics
    ///
    /// If the padded input is smaller than the effective kernel on some axis.
    /// Descriptors built by this crate validate the geometry at construction,
    /// so this concerns hand-rolled trait implementations only.
    fn output_size(&self) -> [usize; N] {
        let input = self.input_size();
        let kernel = self.kernel_size();
        let stride = self.stride();
        let padding = self.padding();
        let padding_end = self.padding_end();
        let dilation = self.dilation();

        core::array::from_fn(|i| {
            expect_conv_output_size(
                input[i],
                kernel[i],
                stride[i],
                padding[i],
                padding_end[i],
                dilation[i],
            )
        })
    }

    /// Validates the runtime shapes of a kernel's input, weight and output
    /// buffers against this descriptor.
    ///
    /// Called by compute kernels immediately before executing, so shape bugs
    /// abort with a [`ShapeError`] before any numeric work begins. Checks are
    /// sequential; the first violated constraint is reported.
    fn check_dims(&self, x: &Shape, w: &Shape, y: &Shape) -> Result<(), ShapeError>;
}

/// The leading N entries of a shape, as a fixed-size array.
///
/// Callers must have rank-checked the shape beforehand.
pub(crate) fn spatial_dims_of<const N: usize>(shape: &Shape) -> [usize; N] {
    core::array::from_fn(|i| shape.dims[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_size_unit_params() {
        let size_out = expect_conv_output_size(10, 3, 1, 0, 0, 1);

        assert_eq!(size_out, 8);
    }

    #[test]
    fn test_output_size_strided() {
        let size_out = expect_conv_output_size(10, 3, 2, 0, 0, 1);

        assert_eq!(size_out, 4);
    }

    #[test]
    fn test_output_size_same_padding() {
        let size_out = expect_conv_output_size(10, 3, 1, 1, 1, 1);

        assert_eq!(size_out, 10);
    }

    #[test]
    fn test_output_size_dilated() {
        // effective kernel extent is 5
        let size_out = expect_conv_output_size(10, 3, 1, 0, 0, 2);

        assert_eq!(size_out, 6);
    }

    #[test]
    fn test_output_size_kernel_too_large() {
        let size_out = maybe_conv_output_size(4, 3, 1, 0, 0, 3);

        assert_eq!(size_out, None);
    }

    #[test]
    fn test_calculate_same_padding() {
        let kernel_size = 3;
        let stride = 1;
        let dilation = 1;
        let size_in = 10;

        let (front, back) = calculate_conv_padding(kernel_size, stride, dilation, size_in, size_in);
        let size_out = expect_conv_output_size(size_in, kernel_size, stride, front, back, dilation);

        assert_eq!(size_in, size_out, "Expected size");
    }

    #[test]
    fn test_calculate_padding_uneven_total() {
        let kernel_size = 4;
        let stride = 1;
        let dilation = 1;
        let size_in = 9;

        let (front, back) = calculate_conv_padding(kernel_size, stride, dilation, size_in, size_in);

        assert_eq!((front, back), (1, 2));
        let size_out = expect_conv_output_size(size_in, kernel_size, stride, front, back, dilation);
        assert_eq!(size_in, size_out, "Expected size");
    }

    #[test]
    fn test_effective_kernel_size() {
        assert_eq!(effective_kernel_size(3, 1), 3);
        assert_eq!(effective_kernel_size(3, 2), 5);
        assert_eq!(effective_kernel_size(1, 4), 1);
        assert_eq!(effective_kernel_size(0, 2), 0);
    }
}
