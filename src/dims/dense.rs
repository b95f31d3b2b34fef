use super::{spatial_dims_of, ConvDims, ConvOptions};
use crate::check::{self, ShapeError, TensorArg};
use crate::shape::Shape;

/// Descriptor for a dense N-dimensional convolution, mapping `channels_in`
/// input channels directly onto `channels_out` output channels.
///
/// Shapes follow the `(spatial.., channels, batch)` axis convention: the
/// input is `(spatial.., channels_in, batch)` and the weight
/// `(spatial.., channels, channels_out)`.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct DenseConvDims<const N: usize> {
    input_size: [usize; N],
    kernel_size: [usize; N],
    channels_in: usize,
    channels_out: usize,
    options: ConvOptions<N>,
}

impl<const N: usize> DenseConvDims<N> {
    /// Builds a descriptor from the input and weight shapes.
    ///
    /// Both shapes must have rank `N + 2`. The weight's channel axis is *not*
    /// compared against `channels_in` here, since its meaning varies across
    /// backend weight layouts (grouped mappings in particular); the
    /// comparison happens in [`check_dims`](ConvDims::check_dims) instead.
    pub fn new(x: &Shape, w: &Shape, options: ConvOptions<N>) -> Result<Self, ShapeError> {
        check::check_rank(TensorArg::Input, x, N + 2)?;
        check::check_rank(TensorArg::Weight, w, N + 2)?;

        Self::build(
            spatial_dims_of(x),
            spatial_dims_of(w),
            x.dims[N],
            w.dims[N + 1],
            options,
        )
    }

    /// Single validation point shared by the constructor and every override.
    fn build(
        input_size: [usize; N],
        kernel_size: [usize; N],
        channels_in: usize,
        channels_out: usize,
        options: ConvOptions<N>,
    ) -> Result<Self, ShapeError> {
        check::check_options(&input_size, &kernel_size, &options)?;

        Ok(Self {
            input_size,
            kernel_size,
            channels_in,
            channels_out,
            options,
        })
    }

    /// The hyper-parameters of this descriptor.
    pub fn options(&self) -> &ConvOptions<N> {
        &self.options
    }

    /// Derives a new descriptor with different hyper-parameters, keeping the
    /// shape fields. Used by kernels that need a descriptor for a related
    /// pass, e.g. a gradient kernel flipping the orientation of the forward
    /// descriptor.
    pub fn with_options(&self, options: ConvOptions<N>) -> Result<Self, ShapeError> {
        Self::build(
            self.input_size,
            self.kernel_size,
            self.channels_in,
            self.channels_out,
            options,
        )
    }

    /// Derives a new descriptor with a different input size.
    pub fn with_input_size(&self, input_size: [usize; N]) -> Result<Self, ShapeError> {
        Self::build(
            input_size,
            self.kernel_size,
            self.channels_in,
            self.channels_out,
            self.options.clone(),
        )
    }

    /// Derives a new descriptor with a different kernel size.
    pub fn with_kernel_size(&self, kernel_size: [usize; N]) -> Result<Self, ShapeError> {
        Self::build(
            self.input_size,
            kernel_size,
            self.channels_in,
            self.channels_out,
            self.options.clone(),
        )
    }

    /// Derives a new descriptor with different channel counts.
    pub fn with_channels(&self, channels_in: usize, channels_out: usize) -> Self {
        Self {
            channels_in,
            channels_out,
            ..self.clone()
        }
    }
}

impl<const N: usize> ConvDims<N> for DenseConvDims<N> {
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
        self.channels_out
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
        check::check_channels(TensorArg::Weight, N, self.channels_in, w.dims[N])?;
        check::check_channels(TensorArg::Weight, N + 1, self.channels_out, w.dims[N + 1])?;
        check::check_channels(TensorArg::Output, N, self.channels_out, y.dims[N])?;

        check::check_spatial(TensorArg::Input, &self.input_size, x)?;
        check::check_spatial(TensorArg::Weight, &self.kernel_size, w)?;
        check::check_spatial(TensorArg::Output, &self.output_size(), y)?;

        check::check_batch(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims_2d() -> DenseConvDims<2> {
        let x = Shape::from([10, 10, 3, 4]);
        let w = Shape::from([3, 3, 3, 16]);

        DenseConvDims::new(&x, &w, ConvOptions::new()).unwrap()
    }

    #[test]
    fn constructor_extracts_fields() {
        let dims = dims_2d();

        assert_eq!(dims.input_size(), [10, 10]);
        assert_eq!(dims.kernel_size(), [3, 3]);
        assert_eq!(dims.channels_in(), 3);
        assert_eq!(dims.channels_out(), 16);
        assert_eq!(dims.spatial_dims(), 2);
        assert!(!dims.flip_kernel());
    }

    #[test]
    fn output_size_is_derived() {
        let dims = dims_2d();

        assert_eq!(dims.output_size(), [8, 8]);
    }

    #[test]
    fn round_trip_check_dims() {
        let x = Shape::from([10, 10, 3, 4]);
        let w = Shape::from([3, 3, 3, 16]);
        let dims = DenseConvDims::new(&x, &w, ConvOptions::new().with_stride(2)).unwrap();

        let [out_0, out_1] = dims.output_size();
        let y = Shape::from([out_0, out_1, 16, 4]);

        assert!(dims.check_dims(&x, &w, &y).is_ok());
    }

    #[test]
    fn constructor_rejects_wrong_rank() {
        let x = Shape::from([10, 10, 3]);
        let w = Shape::from([3, 3, 3, 16]);
        let err = DenseConvDims::<2>::new(&x, &w, ConvOptions::new()).unwrap_err();

        assert_eq!(
            err,
            ShapeError::Rank {
                tensor: TensorArg::Input,
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn weight_channel_axis_is_deferred_to_check_dims() {
        // channel axis of the weight disagrees with channels_in; construction
        // accepts it, validation does not
        let x = Shape::from([10, 10, 3, 4]);
        let w = Shape::from([3, 3, 5, 16]);
        let dims = DenseConvDims::<2>::new(&x, &w, ConvOptions::new()).unwrap();
        assert_eq!(dims.channels_in(), 3);

        let y = Shape::from([8, 8, 16, 4]);
        let err = dims.check_dims(&x, &w, &y).unwrap_err();

        assert_eq!(
            err,
            ShapeError::Channels {
                tensor: TensorArg::Weight,
                axis: 2,
                expected: 3,
                actual: 5,
            }
        );
    }

    #[test]
    fn check_dims_rejects_wrong_output_spatial_size() {
        let x = Shape::from([10, 10, 3, 4]);
        let w = Shape::from([3, 3, 3, 16]);
        let dims = DenseConvDims::<2>::new(&x, &w, ConvOptions::new()).unwrap();

        let y = Shape::from([8, 9, 16, 4]);
        let err = dims.check_dims(&x, &w, &y).unwrap_err();

        assert_eq!(
            err,
            ShapeError::Spatial {
                tensor: TensorArg::Output,
                axis: 1,
                expected: 8,
                actual: 9,
            }
        );
    }

    #[test]
    fn check_dims_rejects_batch_mismatch() {
        let x = Shape::from([10, 10, 3, 4]);
        let w = Shape::from([3, 3, 3, 16]);
        let dims = DenseConvDims::<2>::new(&x, &w, ConvOptions::new()).unwrap();

        // everything correct except the batch axis
        let y = Shape::from([8, 8, 16, 5]);
        let err = dims.check_dims(&x, &w, &y).unwrap_err();

        assert_eq!(err, ShapeError::Batch { input: 4, output: 5 });
    }

    #[test]
    fn override_leaves_original_untouched() {
        let dims = dims_2d();
        let derived = dims
            .with_options(dims.options().clone().with_stride(2))
            .unwrap();

        assert_eq!(derived.stride(), [2, 2]);
        assert_eq!(dims.stride(), [1, 1]);

        // every other field is carried over
        assert_eq!(derived.input_size(), dims.input_size());
        assert_eq!(derived.kernel_size(), dims.kernel_size());
        assert_eq!(derived.channels_in(), dims.channels_in());
        assert_eq!(derived.channels_out(), dims.channels_out());
        assert_eq!(derived.padding(), dims.padding());
        assert_eq!(derived.dilation(), dims.dilation());
        assert_eq!(derived.flip_kernel(), dims.flip_kernel());
    }

    #[test]
    fn override_revalidates_geometry() {
        let dims = dims_2d();
        let err = dims.with_input_size([2, 2]).unwrap_err();

        assert_eq!(
            err,
            ShapeError::KernelGeometry {
                axis: 0,
                input: 2,
                kernel: 3,
            }
        );
    }

    #[test]
    fn asymmetric_padding_enters_output_size() {
        let x = Shape::from([10, 3, 4]);
        let w = Shape::from([3, 3, 16]);
        let options = ConvOptions::new().with_padding([[1, 0]]);
        let dims = DenseConvDims::new(&x, &w, options).unwrap();

        assert_eq!(dims.output_size(), [9]);
    }

    #[test]
    fn rank_zero_descriptor_degenerates_cleanly() {
        // shapes are (channels, batch) only
        let x = Shape::from([3, 4]);
        let w = Shape::from([3, 16]);
        let dims = DenseConvDims::<0>::new(&x, &w, ConvOptions::new()).unwrap();

        assert_eq!(dims.spatial_dims(), 0);
        assert!(dims.output_size().is_empty());

        let y = Shape::from([16, 4]);
        assert!(dims.check_dims(&x, &w, &y).is_ok());
    }
}
