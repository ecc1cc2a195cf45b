use stfilter_core::kernel::DEFAULT_ORIENTATIONS;
use stfilter_core::{
    build_kernel_bank, compute_energy, reconstruct_frames, reslice_along_x, reslice_along_y,
    Axis, FrameVolume, Plane, SeparableTapFilter, SlitFilter,
};

fn constant_volume(t_len: usize, height: usize, width: usize, value: u8) -> FrameVolume<u8> {
    FrameVolume::new(vec![Plane::filled(width, height, value); t_len]).unwrap()
}

#[test]
fn constant_gray_volume_reslices_and_hits_degenerate_fallback() {
    let volume = constant_volume(3, 4, 4, 128);

    let over_y = reslice_along_y(&volume);
    assert_eq!(over_y.len(), 4);
    for slit in over_y.slits() {
        assert_eq!(slit.shape(), (3, 4));
        assert!(slit.as_slice().iter().all(|&v| v == 128));
    }

    let tapped = SeparableTapFilter::new().apply(&over_y).unwrap();
    assert_eq!(tapped.len(), 4);
    for slit in tapped.slits() {
        assert_eq!(slit.shape(), (3, 4));
        assert!(slit.as_slice().iter().all(|&v| v == 0));
    }

    let frames = reconstruct_frames(&tapped, Axis::Y).unwrap();
    assert_eq!(frames.len(), 3);
    assert!(frames.iter().all(|f| f.shape() == (4, 4)));
}

#[test]
fn x_reslice_stacks_time_as_rows() {
    let frame0 = Plane::<u8>::from_rows(&[&[0u8, 0], &[0, 0]]).unwrap();
    let frame1 = Plane::<u8>::from_rows(&[&[255u8, 255], &[255, 255]]).unwrap();
    let volume = FrameVolume::new(vec![frame0, frame1]).unwrap();

    let over_x = reslice_along_x(&volume);
    assert_eq!(over_x.len(), 2);
    let expected = Plane::<u8>::from_rows(&[&[0u8, 0], &[255, 255]]).unwrap();
    for slit in over_x.slits() {
        assert_eq!(slit.shape(), (2, 2));
        assert_eq!(slit, &expected);
    }
}

#[test]
fn gabor_energy_highlights_moving_edge() {
    // Left half dark, right half bright, boundary moving one column per frame.
    let (t_len, height, width) = (16, 12, 24);
    let frames = (0..t_len)
        .map(|t| {
            let data = (0..height)
                .flat_map(|_| (0..width).map(move |x| if x < 4 + t { 30u8 } else { 220 }))
                .collect();
            Plane::from_vec(width, height, data).unwrap()
        })
        .collect();
    let volume = FrameVolume::new(frames).unwrap();

    let over_y = reslice_along_y(&volume);
    let bank = build_kernel_bank(&DEFAULT_ORIENTATIONS);
    let energy = compute_energy(&over_y, &bank).unwrap();
    assert_eq!(energy.len(), height);

    // Every row sees the same x–t pattern, so every energy map is identical.
    let first = energy.slit(0).unwrap();
    assert!(energy.slits().iter().all(|s| s == first));
    assert_eq!(first.min_max(), Some((0, 255)));

    let frames = reconstruct_frames(&energy, Axis::Y).unwrap();
    assert_eq!(frames.len(), t_len);
    assert!(frames.iter().all(|f| f.shape() == (height, width)));
}
