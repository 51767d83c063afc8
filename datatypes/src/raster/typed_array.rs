use ndarray::{Array2, ArrayD, Axis, Ix2, IxDyn};
use snafu::ensure;

use super::{Pixel, RasterDataType};
use crate::error;
use crate::util::Result;

/// An n-dimensional array of one of the supported pixel types
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    U32(ArrayD<u32>),
    U64(ArrayD<u64>),
    I8(ArrayD<i8>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

/// Maps a `TypedArray` to another `TypedArray` by calling a function on all its variants.
/// Call via `map_typed_array!(input, array => function)`.
#[macro_export]
macro_rules! map_typed_array {
    ($input_array:expr, $array:ident => $function_call:expr) => {
        map_typed_array!(
            @variants $input_array, $array => $function_call,
            U8, U16, U32, U64, I8, I16, I32, I64, F32, F64
        )
    };

    (@variants $input_array:expr, $array:ident => $function_call:expr, $($variant:tt),+) => {
        match $input_array {
            $(
                $crate::raster::TypedArray::$variant($array) => {
                    $crate::raster::TypedArray::$variant($function_call)
                }
            )+
        }
    };
}

/// Calls a function on a `TypedArray` by calling it on all its variants.
/// Call via `call_typed_array!(input, array => function)`.
#[macro_export]
macro_rules! call_typed_array {
    ($input_array:expr, $array:ident => $function_call:expr) => {
        call_typed_array!(
            @variants $input_array, $array => $function_call,
            U8, U16, U32, U64, I8, I16, I32, I64, F32, F64
        )
    };

    (@variants $input_array:expr, $array:ident => $function_call:expr, $($variant:tt),+) => {
        match $input_array {
            $(
                $crate::raster::TypedArray::$variant($array) => $function_call,
            )+
        }
    };
}

impl TypedArray {
    /// Creates an array of the given shape and data type where every cell holds `value`.
    /// The value is cast to the pixel type.
    pub fn filled(data_type: RasterDataType, shape: &[usize], value: f64) -> Self {
        crate::call_with_pixel_type!(data_type, T => {
            ArrayD::from_elem(IxDyn(shape), T::from_f64(value)).into()
        })
    }

    pub fn data_type(&self) -> RasterDataType {
        match self {
            TypedArray::U8(_) => RasterDataType::U8,
            TypedArray::U16(_) => RasterDataType::U16,
            TypedArray::U32(_) => RasterDataType::U32,
            TypedArray::U64(_) => RasterDataType::U64,
            TypedArray::I8(_) => RasterDataType::I8,
            TypedArray::I16(_) => RasterDataType::I16,
            TypedArray::I32(_) => RasterDataType::I32,
            TypedArray::I64(_) => RasterDataType::I64,
            TypedArray::F32(_) => RasterDataType::F32,
            TypedArray::F64(_) => RasterDataType::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        call_typed_array!(self, array => array.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Returns the array if it holds pixels of type `T`
    pub fn get_ref<T: Pixel>(&self) -> Option<&ArrayD<T>> {
        T::get_array_ref(self)
    }

    /// Converts into the array of pixel type `T`
    ///
    /// # Errors
    ///
    /// Fails if the array holds another pixel type
    pub fn into_array<T: Pixel>(self) -> Result<ArrayD<T>> {
        let found = self.data_type();
        T::get_array(self).ok_or(error::Error::InvalidTypedArrayConversion {
            expected: T::TYPE,
            found,
        })
    }

    /// Squeezes the array to a `[height, width]` grid, i.e. removes all axes of length one.
    ///
    /// # Errors
    ///
    /// Fails if the axes that are not of length one differ from the ones of the grid
    pub fn squeeze_to_grid(self, grid: [usize; 2], feature: &str) -> Result<Self> {
        let shape = self.shape().to_vec();

        let non_singleton = |dims: &[usize]| -> Vec<usize> {
            dims.iter().copied().filter(|&d| d != 1).collect()
        };

        ensure!(
            non_singleton(&shape) == non_singleton(&grid),
            error::InvalidLayerShape {
                feature,
                expected_ndim: 2_usize,
                shape,
            }
        );

        self.into_shape(&grid, feature)
    }

    /// Squeezes the array to a `[height, width]` grid of pixel type `T`
    pub fn into_grid<T: Pixel>(self, grid: [usize; 2], feature: &str) -> Result<Array2<T>> {
        let shape = self.shape().to_vec();

        self.squeeze_to_grid(grid, feature)?
            .into_array::<T>()?
            .into_dimensionality::<Ix2>()
            .map_err(|_| error::Error::InvalidLayerShape {
                feature: feature.to_string(),
                expected_ndim: 2,
                shape,
            })
    }

    /// Reshapes the array without changing the number of elements.
    pub fn into_shape(self, shape: &[usize], feature: &str) -> Result<Self> {
        let original = self.shape().to_vec();
        let target = IxDyn(shape);

        Ok(map_typed_array!(self, array => {
            array
                .into_shape_with_order(target.clone())
                .map_err(|_| error::Error::InvalidLayerShape {
                    feature: feature.to_string(),
                    expected_ndim: shape.len(),
                    shape: original.clone(),
                })?
        }))
    }

    /// Adds an axis of length one at `axis`.
    pub fn insert_axis(self, axis: usize) -> Self {
        map_typed_array!(self, array => array.insert_axis(Axis(axis)))
    }
}

/// Conversion between `TypedArray` and the array of a concrete pixel type
pub trait TypedArrayConversion: Sized {
    fn get_array(array: TypedArray) -> Option<ArrayD<Self>>;

    fn get_array_ref(array: &TypedArray) -> Option<&ArrayD<Self>>;

    fn into_typed_array(array: ArrayD<Self>) -> TypedArray;
}

macro_rules! impl_typed_array_conversion {
    ($($t:ty => $variant:ident),+) => {
        $(
            impl TypedArrayConversion for $t {
                fn get_array(array: TypedArray) -> Option<ArrayD<Self>> {
                    match array {
                        TypedArray::$variant(array) => Some(array),
                        _ => None,
                    }
                }

                fn get_array_ref(array: &TypedArray) -> Option<&ArrayD<Self>> {
                    match array {
                        TypedArray::$variant(array) => Some(array),
                        _ => None,
                    }
                }

                fn into_typed_array(array: ArrayD<Self>) -> TypedArray {
                    TypedArray::$variant(array)
                }
            }

            impl From<ArrayD<$t>> for TypedArray {
                fn from(array: ArrayD<$t>) -> Self {
                    TypedArray::$variant(array)
                }
            }
        )+
    };
}

impl_typed_array_conversion!(
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64
);

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    #[test]
    fn filled() {
        let array = TypedArray::filled(RasterDataType::I16, &[2, 3, 1], -1.0);

        assert_eq!(array.data_type(), RasterDataType::I16);
        assert_eq!(array.shape(), &[2, 3, 1]);
        assert!(array.get_ref::<i16>().unwrap().iter().all(|&v| v == -1));
        assert!(array.get_ref::<u8>().is_none());
    }

    #[test]
    fn into_array_checks_type() {
        let array: TypedArray = Array2::<u8>::zeros((2, 2)).into_dyn().into();

        assert!(array.clone().into_array::<u8>().is_ok());
        assert!(matches!(
            array.into_array::<f32>(),
            Err(error::Error::InvalidTypedArrayConversion {
                expected: RasterDataType::F32,
                found: RasterDataType::U8
            })
        ));
    }

    #[test]
    fn squeeze_to_grid() {
        let array: TypedArray = Array3::<u8>::zeros((4, 5, 1)).into_dyn().into();
        assert_eq!(array.squeeze_to_grid([4, 5], "A").unwrap().shape(), &[4, 5]);

        let array: TypedArray = ArrayD::<u8>::zeros(IxDyn(&[1, 4, 5, 1])).into();
        assert_eq!(array.squeeze_to_grid([4, 5], "A").unwrap().shape(), &[4, 5]);

        let array: TypedArray = ArrayD::<u8>::zeros(IxDyn(&[1, 1, 5, 1])).into();
        assert_eq!(array.squeeze_to_grid([1, 5], "A").unwrap().shape(), &[1, 5]);

        let array: TypedArray = ArrayD::<u8>::zeros(IxDyn(&[2, 4, 5, 1])).into();
        assert!(matches!(
            array.squeeze_to_grid([4, 5], "A"),
            Err(error::Error::InvalidLayerShape { expected_ndim: 2, .. })
        ));

        let array: TypedArray = ArrayD::<u8>::zeros(IxDyn(&[5, 4, 1])).into();
        assert!(array.squeeze_to_grid([4, 5], "A").is_err());
    }

    #[test]
    fn squeeze_keeps_values() {
        let array: TypedArray = Array3::from_shape_vec((2, 2, 1), vec![1_u8, 2, 3, 4])
            .unwrap()
            .into_dyn()
            .into();

        let squeezed = array.squeeze_to_grid([2, 2], "A").unwrap();

        assert_eq!(
            squeezed.get_ref::<u8>().unwrap(),
            &Array2::from_shape_vec((2, 2), vec![1_u8, 2, 3, 4])
                .unwrap()
                .into_dyn()
        );
    }

    #[test]
    fn insert_axis() {
        let array: TypedArray = Array2::<f32>::zeros((4, 5)).into_dyn().into();

        let array = array.insert_axis(2).insert_axis(0);

        assert_eq!(array.shape(), &[1, 4, 5, 1]);
        assert_eq!(array.data_type(), RasterDataType::F32);
    }
}
