use crate::dims::{effective_kernel_size, ConvOptions};
use crate::shape::Shape;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The tensor argument a shape check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TensorArg {
    /// The input (data) tensor.
    Input,
    /// The weight (kernel) tensor.
    Weight,
    /// The output tensor.
    Output,
}

impl core::fmt::Display for TensorArg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TensorArg::Input => f.write_str("input"),
            TensorArg::Weight => f.write_str("weight"),
            TensorArg::Output => f.write_str("output"),
        }
    }
}

/// A dimension mismatch detected while building a convolution descriptor or
/// while validating runtime shapes against one.
///
/// Every variant carries the expected value (derived from the descriptor) and
/// the actual value (from the caller-supplied shape), so the first violated
/// constraint can be reported precisely. These errors indicate a caller bug
/// and are never recovered internally.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeError {
    /// A tensor does not have the rank the descriptor requires.
    #[error("{tensor} tensor has rank {actual}, expected {expected}")]
    Rank {
        /// The offending tensor.
        tensor: TensorArg,
        /// The rank the descriptor requires.
        expected: usize,
        /// The rank of the supplied shape.
        actual: usize,
    },

    /// A stride entry was zero.
    #[error("stride must be positive on every axis, got 0 on axis {axis}")]
    Stride {
        /// The spatial axis carrying the zero entry.
        axis: usize,
    },

    /// A dilation entry was zero.
    #[error("dilation must be positive on every axis, got 0 on axis {axis}")]
    Dilation {
        /// The spatial axis carrying the zero entry.
        axis: usize,
    },

    /// The padded input is smaller than the effective (dilated) kernel on
    /// some axis, so no output element can be produced.
    #[error(
        "kernel does not fit on axis {axis}: padded input extent is {input}, effective kernel extent is {kernel}"
    )]
    KernelGeometry {
        /// The offending spatial axis.
        axis: usize,
        /// The input extent including both padding ends.
        input: usize,
        /// The effective kernel extent after dilation.
        kernel: usize,
    },

    /// A channel axis disagrees with the descriptor.
    #[error("{tensor} tensor has {actual} channels on axis {axis}, expected {expected}")]
    Channels {
        /// The offending tensor.
        tensor: TensorArg,
        /// The axis holding the channel count.
        axis: usize,
        /// The channel count recorded by the descriptor.
        expected: usize,
        /// The channel count of the supplied shape.
        actual: usize,
    },

    /// A spatial extent disagrees with the descriptor.
    #[error("{tensor} tensor has spatial extent {actual} on axis {axis}, expected {expected}")]
    Spatial {
        /// The offending tensor.
        tensor: TensorArg,
        /// The offending spatial axis.
        axis: usize,
        /// The extent recorded by (or derived from) the descriptor.
        expected: usize,
        /// The extent of the supplied shape.
        actual: usize,
    },

    /// The input and output batch axes disagree.
    #[error("batch size mismatch: input has {input}, output has {output}")]
    Batch {
        /// The input tensor's batch size.
        input: usize,
        /// The output tensor's batch size.
        output: usize,
    },
}

pub(crate) fn check_rank(tensor: TensorArg, shape: &Shape, expected: usize) -> Result<(), ShapeError> {
    let actual = shape.num_dims();
    if actual != expected {
        return Err(ShapeError::Rank {
            tensor,
            expected,
            actual,
        });
    }

    Ok(())
}

/// Shared hyper-parameter validation: every descriptor constructor and
/// override funnels through here, so no descriptor ever exists with a zero
/// stride or dilation, or with a kernel that outgrows its padded input.
pub(crate) fn check_options<const N: usize>(
    input_size: &[usize; N],
    kernel_size: &[usize; N],
    options: &ConvOptions<N>,
) -> Result<(), ShapeError> {
    for (axis, &stride) in options.stride.iter().enumerate() {
        if stride == 0 {
            return Err(ShapeError::Stride { axis });
        }
    }

    for (axis, &dilation) in options.dilation.iter().enumerate() {
        if dilation == 0 {
            return Err(ShapeError::Dilation { axis });
        }
    }

    for axis in 0..N {
        let input = input_size[axis] + options.padding[axis] + options.padding_end[axis];
        let kernel = effective_kernel_size(kernel_size[axis], options.dilation[axis]);
        if kernel == 0 || input < kernel {
            return Err(ShapeError::KernelGeometry { axis, input, kernel });
        }
    }

    Ok(())
}

pub(crate) fn check_channels(
    tensor: TensorArg,
    axis: usize,
    expected: usize,
    actual: usize,
) -> Result<(), ShapeError> {
    if actual != expected {
        return Err(ShapeError::Channels {
            tensor,
            axis,
            expected,
            actual,
        });
    }

    Ok(())
}

pub(crate) fn check_spatial(
    tensor: TensorArg,
    expected: &[usize],
    shape: &Shape,
) -> Result<(), ShapeError> {
    for (axis, &expected) in expected.iter().enumerate() {
        let actual = shape.dims[axis];
        if actual != expected {
            return Err(ShapeError::Spatial {
                tensor,
                axis,
                expected,
                actual,
            });
        }
    }

    Ok(())
}

pub(crate) fn check_batch(x: &Shape, y: &Shape) -> Result<(), ShapeError> {
    let input = x.dims[x.num_dims() - 1];
    let output = y.dims[y.num_dims() - 1];
    if input != output {
        return Err(ShapeError::Batch { input, output });
    }

    Ok(())
}
