use num_traits::{AsPrimitive, Bounded, Num};
use serde::{Deserialize, Serialize};

use super::TypedArrayConversion;

/// A collection of required traits for a pixel type
pub trait Pixel:
    'static
    + Copy
    + std::fmt::Debug
    + Sync
    + Send
    + Num
    + Bounded
    + PartialOrd
    + AsPrimitive<f64>
    + StaticRasterDataType
    + TypedArrayConversion
{
    /// Converts a configured value, e.g. a label, into the pixel type.
    /// The value is truncated and saturated like an `as` cast.
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_pixel {
    ($($t:ty),+) => {
        $(
            impl Pixel for $t {
                fn from_f64(value: f64) -> Self {
                    value.as_()
                }
            }
        )+
    };
}

impl_pixel!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

#[derive(
    Debug,
    Ord,
    PartialOrd,
    Eq,
    PartialEq,
    Hash,
    Deserialize,
    Serialize,
    Copy,
    Clone,
    Default,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RasterDataType {
    #[default]
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl RasterDataType {
    /// Returns true if the given `value` is valid for the `RasterDataType` variant,
    /// i.e. it can be represented by a variable of the corresponding primitive data type
    #[allow(clippy::float_cmp)]
    #[allow(clippy::cast_lossless)]
    pub fn is_valid(self, value: f64) -> bool {
        match self {
            RasterDataType::U8 => value as u8 as f64 == value,
            RasterDataType::U16 => value as u16 as f64 == value,
            RasterDataType::U32 => value as u32 as f64 == value,
            RasterDataType::U64 => value as u64 as f64 == value,
            RasterDataType::I8 => value as i8 as f64 == value,
            RasterDataType::I16 => value as i16 as f64 == value,
            RasterDataType::I32 => value as i32 as f64 == value,
            RasterDataType::I64 => value as i64 as f64 == value,
            RasterDataType::F32 => value.is_nan() || value as f32 as f64 == value,
            RasterDataType::F64 => true,
        }
    }
}

pub trait StaticRasterDataType: Copy + Default + 'static {
    const TYPE: RasterDataType;
}

macro_rules! impl_static_raster_data_type {
    ($($t:ty => $variant:ident),+) => {
        $(
            impl StaticRasterDataType for $t {
                const TYPE: RasterDataType = RasterDataType::$variant;
            }
        )+
    };
}

impl_static_raster_data_type!(
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

/// Binds the primitive type of a `RasterDataType` to a type alias and evaluates `$expr` with it.
///
/// # Examples
///
/// ```
/// use geopatch_datatypes::raster::{RasterDataType, StaticRasterDataType};
/// use geopatch_datatypes::call_with_pixel_type;
///
/// let data_type = RasterDataType::I16;
/// let size = call_with_pixel_type!(data_type, T => std::mem::size_of::<T>());
///
/// assert_eq!(size, 2);
/// ```
#[macro_export]
macro_rules! call_with_pixel_type {
    ($data_type:expr, $t:ident => $expr:expr) => {
        match $data_type {
            $crate::raster::RasterDataType::U8 => {
                type $t = u8;
                $expr
            }
            $crate::raster::RasterDataType::U16 => {
                type $t = u16;
                $expr
            }
            $crate::raster::RasterDataType::U32 => {
                type $t = u32;
                $expr
            }
            $crate::raster::RasterDataType::U64 => {
                type $t = u64;
                $expr
            }
            $crate::raster::RasterDataType::I8 => {
                type $t = i8;
                $expr
            }
            $crate::raster::RasterDataType::I16 => {
                type $t = i16;
                $expr
            }
            $crate::raster::RasterDataType::I32 => {
                type $t = i32;
                $expr
            }
            $crate::raster::RasterDataType::I64 => {
                type $t = i64;
                $expr
            }
            $crate::raster::RasterDataType::F32 => {
                type $t = f32;
                $expr
            }
            $crate::raster::RasterDataType::F64 => {
                type $t = f64;
                $expr
            }
        }
    };
}
