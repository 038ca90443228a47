//! Audio tensor types.
//!
//! An [`AudioTensor`] is what a generation engine hands back: a float
//! array of rank 2 `[channels, time]` or rank 3 `[batch, channels, time]`.
//! [`ClipBatch`] is the same data after the rank has been checked once,
//! so writers never have to look at the shape again.

use ndarray::{Array, Array2, Array3, ArrayD, Axis, Dimension, Ix2, Ix3, IxDyn};

use crate::error::{Result, StudioError};

/// Raw generated audio samples of arbitrary rank.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTensor(ArrayD<f32>);

impl AudioTensor {
    /// Builds a tensor from a flat row-major buffer and a shape.
    pub fn from_shape_vec(shape: &[usize], data: Vec<f32>) -> Result<Self> {
        let array = Array::from_shape_vec(IxDyn(shape), data).map_err(|e| {
            StudioError::model_inference_failed(format!(
                "Failed to build audio tensor of shape {:?}: {}",
                shape, e
            ))
        })?;
        Ok(Self(array))
    }

    /// Returns the tensor shape.
    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.0.ndim()
    }

    /// Returns the number of samples along the last (time) axis.
    pub fn frames(&self) -> usize {
        self.shape().last().copied().unwrap_or(0)
    }

    /// Consumes the tensor, returning the underlying array.
    pub fn into_array(self) -> ArrayD<f32> {
        self.0
    }
}

impl<D: Dimension> From<Array<f32, D>> for AudioTensor {
    fn from(array: Array<f32, D>) -> Self {
        Self(array.into_dyn())
    }
}

/// An audio tensor whose rank has been resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipBatch {
    /// One clip, `[channels, time]`.
    Single(Array2<f32>),
    /// Several clips, `[batch, channels, time]`.
    Batched(Array3<f32>),
}

impl TryFrom<AudioTensor> for ClipBatch {
    type Error = StudioError;

    fn try_from(tensor: AudioTensor) -> Result<Self> {
        let shape = tensor.shape().to_vec();
        let array = tensor.into_array();
        match shape.len() {
            2 => array
                .into_dimensionality::<Ix2>()
                .map(ClipBatch::Single)
                .map_err(|_| StudioError::invalid_tensor_shape(&shape)),
            3 => array
                .into_dimensionality::<Ix3>()
                .map(ClipBatch::Batched)
                .map_err(|_| StudioError::invalid_tensor_shape(&shape)),
            _ => Err(StudioError::invalid_tensor_shape(&shape)),
        }
    }
}

impl ClipBatch {
    /// Returns the number of clips.
    pub fn len(&self) -> usize {
        match self {
            ClipBatch::Single(_) => 1,
            ClipBatch::Batched(a) => a.len_of(Axis(0)),
        }
    }

    /// Returns true if there are no clips to write.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the channel count shared by every clip.
    pub fn channels(&self) -> usize {
        match self {
            ClipBatch::Single(a) => a.len_of(Axis(0)),
            ClipBatch::Batched(a) => a.len_of(Axis(1)),
        }
    }

    /// Returns the number of frames per clip.
    pub fn frames(&self) -> usize {
        match self {
            ClipBatch::Single(a) => a.len_of(Axis(1)),
            ClipBatch::Batched(a) => a.len_of(Axis(2)),
        }
    }

    /// Copies the samples into an owned, contiguous `[batch, channels, time]`
    /// array in host memory.
    ///
    /// A single clip gains a leading batch axis of length 1.
    pub fn into_host(self) -> Array3<f32> {
        let batched = match self {
            ClipBatch::Single(a) => a.insert_axis(Axis(0)),
            ClipBatch::Batched(a) => a,
        };
        batched.as_standard_layout().into_owned()
    }
}
