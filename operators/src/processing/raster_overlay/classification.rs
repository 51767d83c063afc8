use geopatch_datatypes::raster::Pixel;
use image::RgbaImage;
use ndarray::Array2;

use super::class_spec::{BinaryClass, ClassSpec, MulticlassMap};

/// Classifies every pixel of `image` into a `(height, width)` label grid
pub fn classify<T: Pixel>(
    image: &RgbaImage,
    class_spec: &ClassSpec,
    no_data_value: T,
    mean_abs_difference: f64,
) -> Array2<T> {
    match class_spec {
        ClassSpec::Binary(binary) => classify_binary(image, binary),
        ClassSpec::Multiclass(classes) => {
            classify_multiclass(image, classes, no_data_value, mean_abs_difference)
        }
    }
}

/// Pixels with a nonzero alpha channel get the label, all others `0`
pub fn classify_binary<T: Pixel>(image: &RgbaImage, class: &BinaryClass) -> Array2<T> {
    let label = T::from_f64(class.label);

    Array2::from_shape_fn(grid_shape(image), |(y, x)| {
        let [.., alpha] = image.get_pixel(x as u32, y as u32).0;
        if alpha > 0 { label } else { T::zero() }
    })
}

/// Pixels whose mean absolute channel difference to a class color is below `mean_abs_difference`
/// get the label of that class. A later class overrides an earlier one, pixels without a class
/// get `no_data_value`.
pub fn classify_multiclass<T: Pixel>(
    image: &RgbaImage,
    classes: &MulticlassMap,
    no_data_value: T,
    mean_abs_difference: f64,
) -> Array2<T> {
    let mut raster = Array2::from_elem(grid_shape(image), no_data_value);

    for (name, class) in classes.iter() {
        let label = T::from_f64(class.label);
        let mut matches = 0_usize;

        for ((y, x), value) in raster.indexed_iter_mut() {
            let pixel = image.get_pixel(x as u32, y as u32).0;

            if color_difference(pixel, class.color) < mean_abs_difference {
                *value = label;
                matches += 1;
            }
        }

        tracing::trace!(class = name, matches, "classified pixels");
    }

    raster
}

/// The mean absolute difference of the four channels
fn color_difference(a: [u8; 4], b: [u8; 4]) -> f64 {
    let sum: u32 = a
        .iter()
        .zip(b)
        .map(|(&a, b)| u32::from(a.abs_diff(b)))
        .sum();

    f64::from(sum) / 4.
}

fn grid_shape(image: &RgbaImage) -> (usize, usize) {
    (image.height() as usize, image.width() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use ndarray::array;

    fn image(pixels: &[[[u8; 4]; 2]; 2]) -> RgbaImage {
        RgbaImage::from_fn(2, 2, |x, y| Rgba(pixels[y as usize][x as usize]))
    }

    #[test]
    fn binary_uses_alpha() {
        let image = image(&[
            [[0, 0, 0, 0], [255, 255, 255, 1]],
            [[12, 34, 56, 255], [200, 0, 0, 0]],
        ]);

        let raster: Array2<u8> = classify_binary(&image, &BinaryClass { label: 7. });

        assert_eq!(raster, array![[0, 7], [7, 0]]);
    }

    #[test]
    fn binary_ignores_no_data() {
        let image = image(&[[[0, 0, 0, 0], [0, 0, 0, 0]], [[0, 0, 0, 0], [1, 1, 1, 9]]]);

        let raster: Array2<i16> = classify(&image, &ClassSpec::binary(-3.), 99, 2.);

        assert_eq!(raster, array![[0, 0], [0, -3]]);
    }

    #[test]
    fn multiclass_exact_colors_regardless_of_order() {
        let image = image(&[
            [[73, 119, 20, 255], [154, 86, 1, 255]],
            [[10, 10, 10, 10], [73, 119, 20, 255]],
        ]);

        let forward = MulticlassMap::new()
            .with_class("forest", 2., [73, 119, 20, 255])
            .with_class("water", 5., [154, 86, 1, 255]);
        let backward = MulticlassMap::new()
            .with_class("water", 5., [154, 86, 1, 255])
            .with_class("forest", 2., [73, 119, 20, 255]);

        let expected = array![[2_u8, 5], [0, 2]];

        assert_eq!(classify_multiclass(&image, &forward, 0_u8, 2.), expected);
        assert_eq!(classify_multiclass(&image, &backward, 0_u8, 2.), expected);
    }

    #[test]
    fn multiclass_later_class_wins() {
        let image = image(&[
            [[100, 100, 100, 255], [100, 100, 100, 255]],
            [[0, 0, 0, 0], [101, 101, 101, 255]],
        ]);

        let classes = MulticlassMap::new()
            .with_class("first", 1., [100, 100, 100, 255])
            .with_class("second", 2., [101, 100, 100, 255]);

        assert_eq!(
            classify_multiclass(&image, &classes, 9_u8, 2.),
            array![[2, 2], [9, 2]]
        );
    }

    #[test]
    fn multiclass_tolerance_is_strict() {
        // mean absolute difference of exactly 2
        let image = image(&[
            [[2, 2, 2, 2], [1, 1, 1, 1]],
            [[0, 0, 0, 8], [0, 0, 0, 0]],
        ]);

        let classes = MulticlassMap::new().with_class("black", 1., [0, 0, 0, 0]);

        assert_eq!(
            classify_multiclass(&image, &classes, 0_u8, 2.),
            array![[0, 1], [0, 1]]
        );
    }

    #[test]
    fn color_differences() {
        float_cmp::assert_approx_eq!(f64, color_difference([0, 0, 0, 0], [4, 4, 4, 4]), 4.);
        float_cmp::assert_approx_eq!(f64, color_difference([10, 0, 0, 0], [0, 0, 0, 2]), 3.);
    }
}
