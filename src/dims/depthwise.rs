use super::{spatial_dims_of, ConvDims, ConvOptions};
use crate::check::{self, ShapeError, TensorArg};
use crate::shape::Shape;

/// Descriptor for a depthwise N-dimensional convolution, where every input
/// channel is expanded into `channel_multiplier` output channels.
///
/// `channels_out` is always derived as `channels_in * channel_multiplier`,
/// never stored. The weight is ordered
/// `(spatial.., channel_multiplier, channels_in)`: depthwise kernels are
/// organized per input channel, so the weight's trailing axis must match the
/// input's channel axis before the multiplier means anything. This is
/// asserted at construction, unlike the deferred channel check of
/// [`DenseConvDims`](super::DenseConvDims).
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct DepthwiseConvDims<const N: usize> {
    input_size: [usize; N],
    kernel_size: [usize; N],
    channels_in: usize,
    channel_multiplier: usize,
    options: ConvOptions<N>,
}

impl<const N: usize> DepthwiseConvDims<N> {
    /// Builds a descriptor from the input and weight shapes.
    ///
    /// Both shapes must have rank `N + 2`, and the weight's trailing axis
    /// must equal the input's channel axis.
    pub fn new(x: &Shape, w: &Shape, options: ConvOptions<N>) -> Result<Self, ShapeError> {
        check::check_rank(TensorArg::Input, x, N + 2)?;
        check::check_rank(TensorArg::Weight, w, N + 2)?;

        let channels_in = x.dims[N];
        check::check_channels(TensorArg::Weight, N + 1, channels_in, w.dims[N + 1])?;

        Self::build(
            spatial_dims_of(x),
            spatial_dims_of(w),
            channels_in,
            w.dims[N],
            options,
        )
    }

    /// Single validation point shared by the constructor and every override.
    fn build(
        input_size: [usize; N],
        kernel_size: [usize; N],
        channels_in: usize,
        channel_multiplier: usize,
        options: ConvOptions<N>,
    ) -> Result<Self, ShapeError> {
        check::check_options(&input_size, &kernel_size, &options)?;

        Ok(Self {
            input_size,
            kernel_size,
            channels_in,
            channel_multiplier,
            options,
        })
    }

    /// The per-input-channel output expansion factor.
    pub fn channel_multiplier(&self) -> usize {
        self.channel_multiplier
    }

    /// The hyper-parameters of this descriptor.
    pub fn options(&self) -> &ConvOptions<N> {
        &self.options
    }

    /// Derives a new descriptor with different hyper-parameters, keeping the
    /// shape fields.
    pub fn with_options(&self, options: ConvOptions<N>) -> Result<Self, ShapeError> {
        Self::build(
            self.input_size,
            self.kernel_size,
            self.channels_in,
            self.channel_multiplier,
            options,
        )
    }

    /// Derives a new descriptor with a different input size.
    pub fn with_input_size(&self, input_size: [usize; N]) -> Result<Self, ShapeError> {
        Self::build(
            input_size,
            self.kernel_size,
            self.channels_in,
            self.channel_multiplier,
            self.options.clone(),
        )
    }

    /// Derives a new descriptor with a different kernel size.
    pub fn with_kernel_size(&self, kernel_size: [usize; N]) -> Result<Self, ShapeError> {
        Self::build(
            self.input_size,
            kernel_size,
            self.channels_in,
            self.channel_multiplier,
            self.options.clone(),
        )
    }

    /// Derives a new descriptor with different channel bookkeeping.
    pub fn with_channels(&self, channels_in: usize, channel_multiplier: usize) -> Self {
        Self {
            channels_in,
            channel_multiplier,
            ..self.clone()
        }
    }
}

impl<const N: usize> ConvDims<N> for DepthwiseConvDims<N> {
    fn input_size(&self) -> [usize; N] {
        self.input_size
    }

    fn kernel_size(&self) -> [usize; N] {
        self.kernel_size
    }

    fn channels_in(&self) -> usize {
        self.channels_in
    }

    fn channels_out(&self) -> usize {
        self.channels_in * self.channel_multiplier
    }

    fn stride(&self) -> [usize; N] {
        self.options.stride
    }

    fn padding(&self) -> [usize; N] {
        self.options.padding
    }

    fn padding_end(&self) -> [usize; N] {
        self.options.padding_end
    }

    fn dilation(&self) -> [usize; N] {
        self.options.dilation
    }

    fn flip_kernel(&self) -> bool {
        self.options.flip_kernel
    }

    fn check_dims(&self, x: &Shape, w: &Shape, y: &Shape) -> Result<(), ShapeError> {
        check::check_rank(TensorArg::Input, x, N + 2)?;
        check::check_rank(TensorArg::Weight, w, N + 2)?;
        check::check_rank(TensorArg::Output, y, N + 2)?;

        check::check_channels(TensorArg::Input, N, self.channels_in, x.dims[N])?;
        check::check_channels(TensorArg::Weight, N, self.channel_multiplier, w.dims[N])?;
        check::check_channels(TensorArg::Weight, N + 1, self.channels_in, w.dims[N + 1])?;
        check::check_channels(TensorArg::Output, N, self.channels_out(), y.dims[N])?;

        check::check_spatial(TensorArg::Input, &self.input_size, x)?;
        check::check_spatial(TensorArg::Weight, &self.kernel_size, w)?;
        check::check_spatial(TensorArg::Output, &self.output_size(), y)?;

        check::check_batch(x, y)
    }
}
