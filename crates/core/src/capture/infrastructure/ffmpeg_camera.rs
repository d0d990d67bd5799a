use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::capture::domain::capture_device::CaptureDevice;
use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::device::{
    DeviceDescriptor, OutputSettings, PixelFormat, VideoOrientation,
};
use crate::capture::domain::frame_slot::{FrameSink, Offer};
use crate::shared::frame::Frame;

/// Stream properties read when the device is opened.
#[derive(Clone, Debug, PartialEq)]
struct StreamInfo {
    width: u32,
    height: u32,
    fps: f64,
}

/// Plays a video file as a live camera via ffmpeg-next.
///
/// The file holds the upright scene. Frames leave the camera in sensor
/// layout, transposed relative to the scene, which is what
/// [`ImageOrientation::LeftMirrored`](crate::detection::domain::image_orientation::ImageOrientation)
/// undoes. Decoding runs on a dedicated thread at the stream's native
/// rate; frames offered while the pipeline is busy are lost exactly as a
/// live camera would lose them.
pub struct FfmpegCamera {
    descriptor: DeviceDescriptor,
    path: PathBuf,
    info: StreamInfo,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FfmpegCamera {
    /// Opens `path` and reads its video stream properties.
    pub fn open(descriptor: DeviceDescriptor, path: &Path) -> Result<Self, CaptureError> {
        let info = read_stream_info(path)?;
        log::debug!(
            "Opened {} as {}: {}x{} @ {:.1} fps",
            path.display(),
            descriptor.name,
            info.width,
            info.height,
            info.fps
        );
        Ok(Self {
            descriptor,
            path: path.to_path_buf(),
            info,
            stop: Arc::new(AtomicBool::new(false)),
            handle: None,
        })
    }
}

impl CaptureDevice for FfmpegCamera {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    /// Only the sensor's native portrait connection is available.
    fn supports_orientation(&self, orientation: VideoOrientation) -> bool {
        orientation == VideoOrientation::Portrait
    }

    fn start(&mut self, settings: OutputSettings, sink: FrameSink) -> Result<(), CaptureError> {
        if self.handle.is_some() {
            return Err(CaptureError::AlreadyRunning);
        }
        let pixel = output_pixel(&settings)?;
        self.stop.store(false, Ordering::Relaxed);

        let path = self.path.clone();
        let fps = self.info.fps;
        let stop = self.stop.clone();
        let handle = std::thread::Builder::new()
            .name("camera frame processing".into())
            .spawn(move || {
                if let Err(e) = run_capture(&path, fps, pixel, &sink, &stop) {
                    log::error!("Capture from {} failed: {e}", path.display());
                }
                let stats = sink.stats();
                log::info!(
                    "Capture ended: {} frames delivered, {} dropped",
                    stats.delivered,
                    stats.dropped
                );
            })
            .map_err(CaptureError::Spawn)?;

        self.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Capture thread panicked");
            }
        }
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Checks `settings` against what the camera can deliver and returns the
/// scaler's target pixel format.
fn output_pixel(settings: &OutputSettings) -> Result<ffmpeg_next::format::Pixel, CaptureError> {
    if !settings.always_discard_late_frames {
        return Err(CaptureError::UnsupportedSettings(
            "late frames are always discarded".into(),
        ));
    }
    match settings.orientation {
        None | Some(VideoOrientation::Portrait) => {}
        Some(other) => {
            return Err(CaptureError::UnsupportedSettings(format!(
                "orientation {other:?}"
            )))
        }
    }
    Ok(match settings.pixel_format {
        PixelFormat::Bgra32 => ffmpeg_next::format::Pixel::BGRA,
    })
}

fn read_stream_info(path: &Path) -> Result<StreamInfo, CaptureError> {
    let open_err = |source| CaptureError::Open {
        path: path.to_path_buf(),
        source,
    };
    ffmpeg_next::init().map_err(open_err)?;
    let ictx = ffmpeg_next::format::input(path).map_err(open_err)?;
    let stream = ictx
        .streams()
        .best(ffmpeg_next::media::Type::Video)
        .ok_or_else(|| CaptureError::NoVideoStream(path.to_path_buf()))?;
    let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
        .map_err(open_err)?;
    let decoder = codec_ctx.decoder().video().map_err(open_err)?;

    let rate = stream.rate();
    let fps = if rate.denominator() != 0 {
        rate.numerator() as f64 / rate.denominator() as f64
    } else {
        0.0
    };

    Ok(StreamInfo {
        width: decoder.width(),
        height: decoder.height(),
        fps,
    })
}

/// Decode loop run on the capture thread.
fn run_capture(
    path: &Path,
    fps: f64,
    pixel: ffmpeg_next::format::Pixel,
    sink: &FrameSink,
    stop: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ictx = ffmpeg_next::format::input(path)?;
    let stream = ictx
        .streams()
        .best(ffmpeg_next::media::Type::Video)
        .ok_or("No video stream found")?;
    let stream_index = stream.index();
    let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
    let mut decoder = codec_ctx.decoder().video()?;
    let width = decoder.width();
    let height = decoder.height();

    let mut scaler = ffmpeg_next::software::scaling::Context::get(
        decoder.format(),
        width,
        height,
        pixel,
        width,
        height,
        ffmpeg_next::software::scaling::Flags::BILINEAR,
    )?;

    let mut clock = FrameClock::new(fps);
    let mut frame_index = 0usize;
    let mut emit = |decoded: &ffmpeg_next::util::frame::video::Video,
                    scaler: &mut ffmpeg_next::software::scaling::Context|
     -> Result<bool, Box<dyn std::error::Error>> {
        let mut converted = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(decoded, &mut converted)?;
        clock.wait_for(frame_index);
        let pixels = to_sensor_layout(converted.data(0), converted.stride(0), width, height);
        let frame = Frame::new(pixels, height, width, frame_index);
        frame_index += 1;
        Ok(sink.offer(frame) != Offer::Closed)
    };

    let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
    for (stream, packet) in ictx.packets() {
        if stop.load(Ordering::Relaxed) {
            return Ok(());
        }
        if stream.index() != stream_index || decoder.send_packet(&packet).is_err() {
            continue;
        }
        while decoder.receive_frame(&mut decoded).is_ok() {
            if !emit(&decoded, &mut scaler)? {
                return Ok(());
            }
        }
    }

    let _ = decoder.send_eof();
    while decoder.receive_frame(&mut decoded).is_ok() {
        if stop.load(Ordering::Relaxed) || !emit(&decoded, &mut scaler)? {
            break;
        }
    }
    Ok(())
}

/// Transposes an upright `width` x `height` BGRA plane (rows `stride`
/// bytes apart) into a packed `height` x `width` sensor buffer.
fn to_sensor_layout(data: &[u8], stride: usize, width: u32, height: u32) -> Vec<u8> {
    let (width, height) = (width as usize, height as usize);
    let mut pixels = vec![0u8; width * height * 4];
    for row in 0..height {
        let src_row = &data[row * stride..row * stride + width * 4];
        for col in 0..width {
            // Upright (col, row) lands at sensor (row, col).
            let dst = (col * height + row) * 4;
            pixels[dst..dst + 4].copy_from_slice(&src_row[col * 4..col * 4 + 4]);
        }
    }
    pixels
}

/// Paces frame delivery to a fixed rate measured from the first frame.
struct FrameClock {
    interval: Option<Duration>,
    start: Option<Instant>,
}

impl FrameClock {
    fn new(fps: f64) -> Self {
        let interval = (fps.is_finite() && fps > 0.0).then(|| Duration::from_secs_f64(1.0 / fps));
        Self {
            interval,
            start: None,
        }
    }

    /// Delay until frame `index` is due. Never sleeps when the rate is unknown.
    fn delay_for(&mut self, index: usize, now: Instant) -> Duration {
        let Some(interval) = self.interval else {
            return Duration::ZERO;
        };
        let start = *self.start.get_or_insert(now);
        let due = start + interval.mul_f64(index as f64);
        due.saturating_duration_since(now)
    }

    fn wait_for(&mut self, index: usize) {
        let delay = self.delay_for(index, Instant::now());
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::domain::device::{DevicePosition, DeviceType};
    use crate::capture::domain::frame_slot::frame_slot;
    use crate::detection::domain::decoded_image::DecodedImage;
    use crate::pipeline::detection_invoker::FRAME_ORIENTATION;

    const BRIGHT: u8 = 220;
    const DARK: u8 = 30;

    /// Encodes `num_frames` frames whose top half is bright and bottom half dark.
    fn create_test_video(path: &Path, num_frames: usize, width: u32, height: u32, fps: f64) {
        ffmpeg_next::init().unwrap();

        let mut octx = ffmpeg_next::format::output(path).unwrap();

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();

        encoder_ctx.set_width(width);
        encoder_ctx.set_height(height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps as i32));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps as i32, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let mut encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .unwrap();
        ost.set_parameters(&encoder);

        octx.write_header().unwrap();

        let ost_time_base = octx.stream(0).unwrap().time_base();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::format::Pixel::YUV420P,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .unwrap();

        for i in 0..num_frames {
            let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
                ffmpeg_next::format::Pixel::RGB24,
                width,
                height,
            );
            let stride = rgb_frame.stride(0);
            let data = rgb_frame.data_mut(0);
            for row in 0..height as usize {
                let value = if row < height as usize / 2 { BRIGHT } else { DARK };
                for col in 0..width as usize {
                    let offset = row * stride + col * 3;
                    data[offset..offset + 3].fill(value);
                }
            }

            let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
            scaler.run(&rgb_frame, &mut yuv_frame).unwrap();
            yuv_frame.set_pts(Some(i as i64));

            encoder.send_frame(&yuv_frame).unwrap();

            let mut encoded = ffmpeg_next::Packet::empty();
            while encoder.receive_packet(&mut encoded).is_ok() {
                encoded.set_stream(0);
                encoded.rescale_ts(ffmpeg_next::Rational(1, fps as i32), ost_time_base);
                encoded.write_interleaved(&mut octx).unwrap();
            }
        }

        encoder.send_eof().unwrap();
        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(ffmpeg_next::Rational(1, fps as i32), ost_time_base);
            encoded.write_interleaved(&mut octx).unwrap();
        }

        octx.write_trailer().unwrap();
    }

    fn test_video_path(dir: &Path) -> PathBuf {
        dir.join("camera.mp4")
    }

    fn descriptor() -> DeviceDescriptor {
        DeviceDescriptor {
            id: "file".into(),
            name: "File Camera".into(),
            device_type: DeviceType::WideAngle,
            position: DevicePosition::Front,
        }
    }

    fn is_close(actual: u8, expected: u8) -> bool {
        actual.abs_diff(expected) <= 25
    }

    #[test]
    fn test_clock_without_rate_never_waits() {
        let mut clock = FrameClock::new(0.0);
        let now = Instant::now();
        assert_eq!(clock.delay_for(10, now), Duration::ZERO);
    }

    #[test]
    fn test_clock_first_frame_is_due_immediately() {
        let mut clock = FrameClock::new(30.0);
        assert_eq!(clock.delay_for(0, Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_clock_spaces_frames_by_interval() {
        let mut clock = FrameClock::new(10.0);
        let start = Instant::now();
        clock.delay_for(0, start);
        let delay = clock.delay_for(3, start);
        assert_eq!(delay, Duration::from_millis(300));
    }

    #[test]
    fn test_clock_late_frame_has_no_delay() {
        let mut clock = FrameClock::new(10.0);
        let start = Instant::now();
        clock.delay_for(0, start);
        let delay = clock.delay_for(1, start + Duration::from_secs(1));
        assert_eq!(delay, Duration::ZERO);
    }

    #[test]
    fn test_clock_index_beyond_u32_keeps_full_offset() {
        let mut clock = FrameClock::new(1000.0);
        let start = Instant::now();
        clock.delay_for(0, start);
        let index = u32::MAX as usize + 2;
        let delay = clock.delay_for(index, start);
        assert!(delay > Duration::from_secs(4_000_000), "got {delay:?}");
    }

    #[test]
    fn test_sensor_layout_decodes_back_upright() {
        // Upright 4x2 scene with a red marker at top-right, rows padded to 20 bytes.
        let (width, height, stride) = (4u32, 2u32, 20usize);
        let mut upright = vec![0u8; stride * height as usize];
        upright[3 * 4..3 * 4 + 4].copy_from_slice(&[0, 0, 255, 255]);

        let sensor = to_sensor_layout(&upright, stride, width, height);
        let frame = Frame::new(sensor, height, width, 0);
        let image = DecodedImage::decode(&frame, FRAME_ORIENTATION).unwrap();

        assert_eq!((image.width(), image.height()), (width, height));
        let arr = image.as_ndarray();
        assert_eq!(arr[[0, 3, 0]], 255);
        assert_eq!(arr[[0, 0, 0]], 0);
        assert_eq!(arr[[1, 3, 0]], 0);
    }

    #[test]
    fn test_default_settings_select_bgra() {
        assert_eq!(
            output_pixel(&OutputSettings::default()).unwrap(),
            ffmpeg_next::format::Pixel::BGRA
        );
        let unrotated = OutputSettings {
            orientation: None,
            ..OutputSettings::default()
        };
        assert!(output_pixel(&unrotated).is_ok());
    }

    #[test]
    fn test_queueing_late_frames_is_rejected() {
        let settings = OutputSettings {
            always_discard_late_frames: false,
            ..OutputSettings::default()
        };
        assert!(matches!(
            output_pixel(&settings),
            Err(CaptureError::UnsupportedSettings(_))
        ));
    }

    #[test]
    fn test_landscape_orientation_is_rejected() {
        let settings = OutputSettings {
            orientation: Some(VideoOrientation::LandscapeLeft),
            ..OutputSettings::default()
        };
        assert!(matches!(
            output_pixel(&settings),
            Err(CaptureError::UnsupportedSettings(_))
        ));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let result = FfmpegCamera::open(descriptor(), Path::new("/nonexistent/video.mp4"));
        assert!(matches!(result, Err(CaptureError::Open { .. })));
    }

    #[test]
    fn test_open_reads_stream_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 3, 160, 120, 30.0);

        let camera = FfmpegCamera::open(descriptor(), &path).unwrap();
        assert_eq!((camera.info.width, camera.info.height), (160, 120));
        assert!(camera.info.fps > 0.0);
    }

    #[test]
    fn test_start_with_unsupported_settings_spawns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 3, 160, 120, 30.0);

        let mut camera = FfmpegCamera::open(descriptor(), &path).unwrap();
        let (sink, rx) = frame_slot();
        let settings = OutputSettings {
            always_discard_late_frames: false,
            ..OutputSettings::default()
        };
        assert!(camera.start(settings, sink).is_err());
        assert!(camera.handle.is_none());
        // The rejected sink was dropped, so the receiver sees the source close.
        assert!(rx.recv().is_none());
    }

    #[test]
    fn test_camera_delivers_sensor_layout_frames_until_eof() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 5, 160, 120, 30.0);

        let mut camera = FfmpegCamera::open(descriptor(), &path).unwrap();
        let (sink, rx) = frame_slot();
        camera.start(OutputSettings::default(), sink).unwrap();

        let mut received = Vec::new();
        while let Some(lease) = rx.recv() {
            received.push((*lease).clone());
        }
        camera.stop();

        let stats = rx.stats();
        assert_eq!(stats.delivered + stats.dropped, 5);
        assert_eq!(received.len(), stats.delivered);
        assert!(!received.is_empty());

        let first = &received[0];
        assert_eq!((first.width(), first.height()), (120, 160));
        assert_eq!(first.data().len(), 120 * 160 * 4);
        assert!(received.windows(2).all(|w| w[0].index() < w[1].index()));

        // The scene's top half sits in the sensor's left columns.
        let arr = first.as_ndarray().unwrap();
        assert!(is_close(arr[[80, 10, 1]], BRIGHT), "got {}", arr[[80, 10, 1]]);
        assert!(is_close(arr[[80, 110, 1]], DARK), "got {}", arr[[80, 110, 1]]);
    }

    #[test]
    fn test_delivered_frame_decodes_upright() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 1, 160, 120, 30.0);

        let mut camera = FfmpegCamera::open(descriptor(), &path).unwrap();
        let (sink, rx) = frame_slot();
        camera.start(OutputSettings::default(), sink).unwrap();
        let frame = (*rx.recv().unwrap()).clone();
        camera.stop();

        let image = DecodedImage::decode(&frame, FRAME_ORIENTATION).unwrap();
        assert_eq!((image.width(), image.height()), (160, 120));
        let arr = image.as_ndarray();
        assert!(is_close(arr[[10, 80, 0]], BRIGHT), "got {}", arr[[10, 80, 0]]);
        assert!(is_close(arr[[110, 80, 0]], DARK), "got {}", arr[[110, 80, 0]]);
    }
}
