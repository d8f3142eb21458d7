#[cfg(feature = "v4l2")]
mod v4l2_tests {
    use qrscan_camera::{
        ConstraintValue, DeviceConstraint, MediaConstraints, MediaDevices, MediaErrorKind,
        ReadyState, V4l2Devices, V4l2Stream, V4l2Video, VideoConstraints, VideoElement,
    };

    #[test]
    fn test_v4l2_open_invalid_device() {
        let result = V4l2Stream::open("/dev/nonexistent_camera", 640, 480);

        match result {
            Err(e) => assert_eq!(e.kind(), MediaErrorKind::NotFound),
            Ok(_) => panic!("Expected an error for a missing device"),
        }
    }

    #[tokio::test]
    async fn test_v4l2_exact_device_id_is_a_path() {
        let constraints = MediaConstraints {
            video: VideoConstraints {
                device: Some(DeviceConstraint::DeviceId("/dev/nonexistent_camera".to_string())),
                width: Some(ConstraintValue::Ideal(1280)),
                height: Some(ConstraintValue::Ideal(720)),
            },
        };

        assert!(V4l2Devices.get_user_media(&constraints).await.is_err());
    }

    #[test]
    fn test_v4l2_video_without_stream() {
        let video = V4l2Video::new();
        video.attach(None);

        assert_eq!(video.ready_state(), ReadyState::HaveNothing);
        assert_eq!(video.dimensions().video_width, 0);
    }
}
