use std::path::Path;

use ffmpeg_next as ffmpeg;
use ffmpeg::format::{context::Input, input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{flag::Flags, Context as ScalingContext};
use ffmpeg::util::frame::video::Video;
use image::RgbImage;
use log::debug;

use crate::error::AnalysisError;
use crate::video::FrameSource;

/// Decodes the best video stream of a container into RGB frames, one at a time.
///
/// Packets are pulled lazily so only the frame being handed out is kept in
/// memory. The container and decoder are closed when the reader is dropped.
pub struct VideoReader {
    input: Input,
    decoder: ffmpeg::decoder::Video,
    stream_index: usize,
    scaler: Option<ScalingContext>,
    decoded: Video,
    eof_sent: bool,
}

impl VideoReader {
    pub fn open(path: &Path) -> Result<Self, AnalysisError> {
        if !path.exists() {
            return Err(AnalysisError::VideoNotFound(path.to_path_buf()));
        }

        let open_error = |reason: String| AnalysisError::VideoOpen {
            path: path.to_path_buf(),
            reason,
        };

        ffmpeg::init().map_err(|e| open_error(format!("ffmpeg init failed: {}", e)))?;

        let input = input(path).map_err(|e| open_error(e.to_string()))?;
        let (stream_index, decoder) = {
            let stream = input
                .streams()
                .best(Type::Video)
                .ok_or_else(|| open_error("no video stream found".to_string()))?;
            let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
                .map_err(|e| open_error(e.to_string()))?;
            let decoder = context.decoder().video().map_err(|e| open_error(e.to_string()))?;
            (stream.index(), decoder)
        };

        debug!(
            "Opened {} ({}x{}, stream #{})",
            path.display(),
            decoder.width(),
            decoder.height(),
            stream_index
        );

        Ok(Self {
            input,
            decoder,
            stream_index,
            scaler: None,
            decoded: Video::empty(),
            eof_sent: false,
        })
    }

    fn convert_decoded(&mut self) -> Result<RgbImage, ffmpeg::Error> {
        if self.scaler.is_none() {
            self.scaler = Some(ScalingContext::get(
                self.decoded.format(),
                self.decoded.width(),
                self.decoded.height(),
                Pixel::RGB24,
                self.decoded.width(),
                self.decoded.height(),
                Flags::BILINEAR,
            )?);
        }
        let Some(scaler) = self.scaler.as_mut() else {
            return Err(ffmpeg::Error::Bug);
        };

        let mut rgb_frame = Video::empty();
        scaler.run(&self.decoded, &mut rgb_frame)?;
        packed_rgb(&rgb_frame).ok_or(ffmpeg::Error::InvalidData)
    }
}

impl FrameSource for VideoReader {
    fn dimensions(&self) -> (u32, u32) {
        (self.decoder.width(), self.decoder.height())
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>, AnalysisError> {
        loop {
            if self.decoder.receive_frame(&mut self.decoded).is_ok() {
                return Ok(Some(self.convert_decoded()?));
            }
            if self.eof_sent {
                return Ok(None);
            }

            match self.input.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() == self.stream_index {
                        self.decoder.send_packet(&packet)?;
                    }
                }
                None => {
                    // Flush whatever the decoder is still holding
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
            }
        }
    }
}

/// Copies an RGB24 frame into a tightly packed buffer, dropping row padding
fn packed_rgb(frame: &Video) -> Option<RgbImage> {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let stride = frame.stride(0);
    let data = frame.data(0);
    let row_bytes = width * 3;

    if stride < row_bytes {
        return None;
    }

    let mut buffer = Vec::with_capacity(row_bytes * height);
    for y in 0..height {
        let start = y * stride;
        buffer.extend_from_slice(data.get(start..start + row_bytes)?);
    }

    RgbImage::from_raw(frame.width(), frame.height(), buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::fixtures::write_solid_clip;

    #[test]
    fn test_missing_file_is_not_found() {
        let result = VideoReader::open(Path::new("/no/such/dir/recording.mp4"));
        assert!(matches!(result, Err(AnalysisError::VideoNotFound(_))));
    }

    #[test]
    fn test_garbage_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_video.mp4");
        std::fs::write(&path, b"this is plainly not an mp4 container").unwrap();
        let result = VideoReader::open(&path);
        assert!(matches!(result, Err(AnalysisError::VideoOpen { .. })));
    }

    #[test]
    fn test_decodes_every_frame_with_its_colour() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solid.nut");
        // 34 * 3 bytes per row forces line padding in the decoded frames
        let colours = [[255, 0, 0], [0, 200, 0], [10, 20, 250]];
        write_solid_clip(&path, 34, 20, &colours);

        let mut reader = VideoReader::open(&path).unwrap();
        assert_eq!(reader.dimensions(), (34, 20));

        let mut decoded = Vec::new();
        while let Some(frame) = reader.next_frame().unwrap() {
            decoded.push(frame);
        }
        assert_eq!(decoded.len(), colours.len());
        for (frame, colour) in decoded.iter().zip(colours) {
            assert_eq!(frame.dimensions(), (34, 20));
            for pixel in [frame.get_pixel(0, 0), frame.get_pixel(33, 19), frame.get_pixel(17, 10)] {
                for (got, want) in pixel.0.iter().zip(colour) {
                    assert!(got.abs_diff(want) <= 2, "{:?} vs {:?}", pixel.0, colour);
                }
            }
        }

        // Exhausted readers stay exhausted
        assert!(reader.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_stream_without_packets_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.nut");
        write_solid_clip(&path, 16, 16, &[]);

        let mut reader = VideoReader::open(&path).unwrap();
        assert!(reader.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_packed_rgb_drops_padding() {
        let mut frame = Video::new(Pixel::RGB24, 3, 2);
        let stride = frame.stride(0);
        let data = frame.data_mut(0);
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = (i % stride) as u8;
        }
        let image = packed_rgb(&frame).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [6, 7, 8]);
    }
}
