use neurogen_core::buffer::PixelBuffer;
use neurogen_core::config::ResampleFilter;
use neurogen_core::error::NeuroGenError;
use neurogen_core::mask::{pack_mask_map, MaskSources};

fn solid(width: u32, height: u32, value: u8) -> PixelBuffer {
    PixelBuffer::new(width, height, [value, value, value, 255]).expect("buffer")
}

#[test]
fn absent_sources_fall_back_to_neutral_defaults() {
    // Only metallic present, solid white: R comes from the map, every
    // other channel takes its physically neutral default.
    let metallic = solid(8, 8, 255);
    let sources = MaskSources {
        metallic: Some(&metallic),
        ..Default::default()
    };
    let packed = pack_mask_map(&sources, 8, 8, ResampleFilter::Nearest).expect("pack");
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(packed.pixel(x, y), [255, 255, 0, 255]);
        }
    }
}

#[test]
fn alpha_is_the_exact_inversion_of_roughness() {
    let mut data = Vec::new();
    for y in 0..4u32 {
        for x in 0..4u32 {
            let v = (y * 4 + x) as u8 * 16;
            data.extend_from_slice(&[v, 0, 0, 255]);
        }
    }
    let roughness = PixelBuffer::from_raw(4, 4, data).expect("buffer");
    let sources = MaskSources {
        roughness: Some(&roughness),
        ..Default::default()
    };
    let packed = pack_mask_map(&sources, 4, 4, ResampleFilter::Nearest).expect("pack");
    for y in 0..4 {
        for x in 0..4 {
            let v = roughness.pixel(x, y)[0];
            assert_eq!(packed.pixel(x, y)[3], 255 - v);
        }
    }
}

#[test]
fn occlusion_feeds_green_and_blue_stays_reserved() {
    let occlusion = solid(4, 4, 40);
    let sources = MaskSources {
        occlusion: Some(&occlusion),
        ..Default::default()
    };
    let packed = pack_mask_map(&sources, 4, 4, ResampleFilter::Nearest).expect("pack");
    assert_eq!(packed.pixel(2, 2), [0, 40, 0, 255]);
}

#[test]
fn packing_without_any_source_fails() {
    let err = pack_mask_map(&MaskSources::default(), 1024, 1024, ResampleFilter::Bilinear)
        .unwrap_err();
    assert!(matches!(err, NeuroGenError::InsufficientInputs));
}

#[test]
fn zero_output_resolution_is_rejected() {
    let metallic = solid(4, 4, 255);
    let sources = MaskSources {
        metallic: Some(&metallic),
        ..Default::default()
    };
    let err = pack_mask_map(&sources, 0, 1024, ResampleFilter::Nearest).unwrap_err();
    assert!(matches!(err, NeuroGenError::InvalidParameter(_)));
}

#[test]
fn sources_are_resampled_to_the_output_resolution() {
    // 2x2 metallic checker packed at 4x4: nearest-neighbor duplicates each
    // source pixel into a 2x2 block.
    let data = vec![
        255, 0, 0, 255, /* (0,0) */ 0, 0, 0, 255, /* (1,0) */
        0, 0, 0, 255, /* (0,1) */ 255, 0, 0, 255, /* (1,1) */
    ];
    let metallic = PixelBuffer::from_raw(2, 2, data).expect("buffer");
    let sources = MaskSources {
        metallic: Some(&metallic),
        ..Default::default()
    };
    let packed = pack_mask_map(&sources, 4, 4, ResampleFilter::Nearest).expect("pack");
    for y in 0..4 {
        for x in 0..4 {
            let expected = metallic.pixel(x / 2, y / 2)[0];
            assert_eq!(packed.pixel(x, y)[0], expected, "at ({x},{y})");
            assert_eq!(packed.pixel(x, y)[1], 255);
        }
    }
}

#[test]
fn differently_sized_sources_pack_together() {
    let metallic = solid(2, 2, 200);
    let occlusion = solid(16, 16, 100);
    let roughness = solid(8, 4, 55);
    let sources = MaskSources {
        metallic: Some(&metallic),
        occlusion: Some(&occlusion),
        roughness: Some(&roughness),
    };
    let packed = pack_mask_map(&sources, 8, 8, ResampleFilter::Bilinear).expect("pack");
    assert_eq!(packed.dimensions(), (8, 8));
    // Uniform sources stay uniform under any filter.
    assert_eq!(packed.pixel(3, 5), [200, 100, 0, 200]);
}

#[test]
fn input_buffers_are_not_mutated() {
    let metallic = solid(4, 4, 9);
    let before = metallic.data().to_vec();
    let sources = MaskSources {
        metallic: Some(&metallic),
        ..Default::default()
    };
    let _ = pack_mask_map(&sources, 8, 8, ResampleFilter::Bilinear).expect("pack");
    assert_eq!(metallic.data(), before.as_slice());
}
