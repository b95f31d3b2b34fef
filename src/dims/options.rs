/// A stride or dilation argument: a scalar broadcast to every spatial axis,
/// or explicit per-axis values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisParam<const N: usize>(
    /// The normalized per-axis values.
    pub [usize; N],
);

impl<const N: usize> From<usize> for AxisParam<N> {
    fn from(value: usize) -> Self {
        Self([value; N])
    }
}

impl<const N: usize> From<[usize; N]> for AxisParam<N> {
    fn from(values: [usize; N]) -> Self {
        Self(values)
    }
}

/// A padding argument.
///
/// A scalar or per-axis value pads both ends of each axis equally; explicit
/// `[front, back]` pairs give independent amounts per end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddingParam<const N: usize> {
    /// Padding at the start of each axis.
    pub front: [usize; N],
    /// Padding at the end of each axis.
    pub back: [usize; N],
}

impl<const N: usize> From<usize> for PaddingParam<N> {
    fn from(value: usize) -> Self {
        Self {
            front: [value; N],
            back: [value; N],
        }
    }
}

impl<const N: usize> From<[usize; N]> for PaddingParam<N> {
    fn from(values: [usize; N]) -> Self {
        Self {
            front: values,
            back: values,
        }
    }
}

impl<const N: usize> From<[[usize; 2]; N]> for PaddingParam<N> {
    fn from(pairs: [[usize; 2]; N]) -> Self {
        Self {
            front: core::array::from_fn(|i| pairs[i][0]),
            back: core::array::from_fn(|i| pairs[i][1]),
        }
    }
}

/// Convolution hyper-parameters shared by every descriptor variant.
///
/// Defaults to unit stride and dilation, no padding and an unflipped kernel.
/// Positivity of stride and dilation is enforced when a descriptor is built
/// from these options, not here, so options values can be assembled freely.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct ConvOptions<const N: usize> {
    /// Stride (non-zero).
    pub stride: [usize; N],

    /// Padding at the start of each spatial axis.
    pub padding: [usize; N],

    /// Padding at the end of each spatial axis.
    pub padding_end: [usize; N],

    /// Dilation (non-zero).
    pub dilation: [usize; N],

    /// Whether the kernel is applied flipped (true convolution) rather than
    /// unflipped (cross-correlation).
    pub flip_kernel: bool,
}

impl<const N: usize> Default for ConvOptions<N> {
    fn default() -> Self {
        Self {
            stride: [1; N],
            padding: [0; N],
            padding_end: [0; N],
            dilation: [1; N],
            flip_kernel: false,
        }
    }
}

impl<const N: usize> ConvOptions<N> {
    /// Constructs the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stride, broadcasting a scalar to every axis.
    pub fn with_stride(mut self, stride: impl Into<AxisParam<N>>) -> Self {
        self.stride = stride.into().0;
        self
    }

    /// Replaces the padding, broadcasting a scalar or per-axis value to both
    /// ends of every axis.
    pub fn with_padding(mut self, padding: impl Into<PaddingParam<N>>) -> Self {
        let padding = padding.into();
        self.padding = padding.front;
        self.padding_end = padding.back;
        self
    }

    /// Replaces the dilation, broadcasting a scalar to every axis.
    pub fn with_dilation(mut self, dilation: impl Into<AxisParam<N>>) -> Self {
        self.dilation = dilation.into().0;
        self
    }

    /// Sets the kernel orientation flag.
    pub fn with_flip_kernel(mut self, flip_kernel: bool) -> Self {
        self.flip_kernel = flip_kernel;
        self
    }
}
