use qrscan_base::{FrameSample, Region};

fn gradient(width: u32, height: u32) -> FrameSample {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[x as u8, y as u8, 0, 255]);
        }
    }
    FrameSample::from_rgba(width, height, data).unwrap()
}

#[test]
fn test_new_is_zeroed() {
    let frame = FrameSample::new(3, 2);
    assert_eq!(frame.data().len(), 24);
    assert!(frame.data().iter().all(|&b| b == 0));
}

#[test]
fn test_from_rgba_rejects_wrong_length() {
    assert!(FrameSample::from_rgba(2, 2, vec![0; 15]).is_none());
    assert!(FrameSample::from_rgba(2, 2, vec![0; 16]).is_some());
}

#[test]
fn test_pixel_bounds() {
    let frame = gradient(4, 4);
    assert_eq!(frame.pixel(2, 3), Some([2, 3, 0, 255]));
    assert_eq!(frame.pixel(4, 0), None);
}

#[test]
fn test_resize_reuses_buffer() {
    let mut frame = gradient(8, 8);
    frame.resize(2, 3);
    assert_eq!((frame.width(), frame.height()), (2, 3));
    assert_eq!(frame.data().len(), 24);
    assert!(frame.data().iter().all(|&b| b == 0));
}

#[test]
fn test_crop_into_copies_region() {
    let src = gradient(10, 10);
    let mut dst = FrameSample::default();
    src.crop_into(Region::new(3, 4, 2, 2), &mut dst);
    assert_eq!((dst.width(), dst.height()), (2, 2));
    assert_eq!(dst.pixel(0, 0), Some([3, 4, 0, 255]));
    assert_eq!(dst.pixel(1, 1), Some([4, 5, 0, 255]));
}

#[test]
fn test_crop_into_clips_outside_source() {
    let src = gradient(4, 4);
    let mut dst = FrameSample::default();
    src.crop_into(Region::new(2, 2, 4, 4), &mut dst);
    assert_eq!((dst.width(), dst.height()), (4, 4));
    assert_eq!(dst.pixel(1, 1), Some([3, 3, 0, 255]));
    assert_eq!(dst.pixel(3, 3), Some([0, 0, 0, 0]));
}
