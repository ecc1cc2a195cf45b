use proptest::prelude::*;

use stfilter_core::{
    reconstruct_frames, reslice_along_x, reslice_along_y, Axis, FrameVolume, Plane,
};

fn volume_strategy() -> impl Strategy<Value = FrameVolume<u8>> {
    (1usize..6, 1usize..7, 1usize..7).prop_flat_map(|(t_len, height, width)| {
        prop::collection::vec(any::<u8>(), t_len * height * width).prop_map(move |samples| {
            let frames = samples
                .chunks_exact(height * width)
                .map(|chunk| Plane::from_vec(width, height, chunk.to_vec()).unwrap())
                .collect();
            FrameVolume::new(frames).unwrap()
        })
    })
}

proptest! {
    #[test]
    fn reslice_y_round_trips_exactly(volume in volume_strategy()) {
        let stack = reslice_along_y(&volume);
        let frames = reconstruct_frames(&stack, Axis::Y).unwrap();
        prop_assert_eq!(frames.as_slice(), volume.frames());
    }

    #[test]
    fn reslice_x_round_trips_exactly(volume in volume_strategy()) {
        let stack = reslice_along_x(&volume);
        let frames = reconstruct_frames(&stack, Axis::X).unwrap();
        prop_assert_eq!(frames.as_slice(), volume.frames());
    }

    #[test]
    fn reslice_shapes_follow_volume_dims(volume in volume_strategy()) {
        let (t_len, height, width) = volume.dims();

        let over_x = reslice_along_x(&volume);
        prop_assert_eq!(over_x.len(), width);
        prop_assert!(over_x.slits().iter().all(|s| s.shape() == (t_len, height)));

        let over_y = reslice_along_y(&volume);
        prop_assert_eq!(over_y.len(), height);
        prop_assert!(over_y.slits().iter().all(|s| s.shape() == (t_len, width)));
    }

    #[test]
    fn reslice_copies_samples_verbatim(volume in volume_strategy()) {
        let over_y = reslice_along_y(&volume);
        let over_x = reslice_along_x(&volume);
        for (t, frame) in volume.frames().iter().enumerate() {
            for y in 0..volume.height() {
                for x in 0..volume.width() {
                    prop_assert_eq!(over_y.slit(y).unwrap().get(x, t), frame.get(x, y));
                    prop_assert_eq!(over_x.slit(x).unwrap().get(y, t), frame.get(x, y));
                }
            }
        }
    }
}
