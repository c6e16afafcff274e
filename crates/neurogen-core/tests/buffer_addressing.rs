use neurogen_core::buffer::PixelBuffer;
use neurogen_core::config::ResampleFilter;
use neurogen_core::error::NeuroGenError;

#[test]
fn constructors_enforce_the_length_invariant() {
    let err = PixelBuffer::from_raw(2, 2, vec![0u8; 15]).unwrap_err();
    match err {
        NeuroGenError::DimensionMismatch {
            expected_len,
            actual_len,
            ..
        } => {
            assert_eq!(expected_len, 16);
            assert_eq!(actual_len, 15);
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }

    assert!(matches!(
        PixelBuffer::new(0, 4, [0, 0, 0, 255]),
        Err(NeuroGenError::InvalidParameter(_))
    ));
    assert!(matches!(
        PixelBuffer::from_raw(4, 0, Vec::new()),
        Err(NeuroGenError::InvalidParameter(_))
    ));
}

#[test]
fn wrapped_addressing_is_toroidal() {
    let mut data = vec![0u8; 3 * 2 * 4];
    // Mark the corners of a 3x2 grid.
    data[0] = 10; // (0,0)
    data[2 * 4] = 20; // (2,0)
    data[(3 + 0) * 4] = 30; // (0,1)
    data[(3 + 2) * 4] = 40; // (2,1)
    let buffer = PixelBuffer::from_raw(3, 2, data).expect("buffer");

    assert_eq!(buffer.pixel_wrapped(-1, -1)[0], 40);
    assert_eq!(buffer.pixel_wrapped(-1, 0)[0], 20);
    assert_eq!(buffer.pixel_wrapped(0, -1)[0], 30);
    assert_eq!(buffer.pixel_wrapped(3, 0)[0], 10);
    assert_eq!(buffer.pixel_wrapped(0, 2)[0], 10);
    assert_eq!(buffer.pixel_wrapped(-4, -3)[0], buffer.pixel(2, 1)[0]);
}

#[test]
fn luma_matches_the_rec601_weights() {
    let white = PixelBuffer::new(1, 1, [255, 255, 255, 255]).expect("buffer");
    let black = PixelBuffer::new(1, 1, [0, 0, 0, 0]).expect("buffer");
    let red = PixelBuffer::new(1, 1, [255, 0, 0, 255]).expect("buffer");

    assert!((white.luma(0, 0) - 1.0).abs() < 1e-6);
    assert_eq!(black.luma(0, 0), 0.0);
    assert!((red.luma(0, 0) - 0.299).abs() < 1e-6);
}

#[test]
fn same_size_resample_is_an_identity_copy() {
    let buffer = PixelBuffer::new(5, 3, [9, 8, 7, 255]).expect("buffer");
    for filter in [ResampleFilter::Nearest, ResampleFilter::Bilinear] {
        let copy = buffer.resample(5, 3, filter).expect("resample");
        assert_eq!(copy.data(), buffer.data());
    }
}

#[test]
fn nearest_downsampling_picks_source_texels() {
    let mut data = Vec::new();
    for y in 0..4u32 {
        for x in 0..4u32 {
            let v = (y * 4 + x) as u8;
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    let buffer = PixelBuffer::from_raw(4, 4, data).expect("buffer");
    let small = buffer.resample(2, 2, ResampleFilter::Nearest).expect("resample");
    assert_eq!(small.pixel(0, 0)[0], buffer.pixel(0, 0)[0]);
    assert_eq!(small.pixel(1, 0)[0], buffer.pixel(2, 0)[0]);
    assert_eq!(small.pixel(0, 1)[0], buffer.pixel(0, 2)[0]);
    assert_eq!(small.pixel(1, 1)[0], buffer.pixel(2, 2)[0]);
}

#[test]
fn bilinear_upsampling_interpolates_between_texels() {
    let data = vec![0, 0, 0, 255, 255, 255, 255, 255];
    let buffer = PixelBuffer::from_raw(1, 2, data).expect("buffer");
    let tall = buffer.resample(1, 4, ResampleFilter::Bilinear).expect("resample");
    let column: Vec<u8> = (0..4).map(|y| tall.pixel(0, y)[0]).collect();
    assert_eq!(column, [0, 64, 191, 255]);
}
