//! Tiny recordings written with the ffmpeg encoder, for tests that need a real
//! container on disk.

use std::path::Path;

use ffmpeg_next as ffmpeg;
use ffmpeg::format::{context::Output, output_as, Pixel};
use ffmpeg::util::frame::video::Video;
use ffmpeg::{codec, encoder, Packet, Rational};

const FRAME_RATE: i32 = 25;

/// Writes one solid-colour RGB24 frame per entry of `colours` into a NUT
/// container at `path`. An empty slice gives a container with a video stream
/// and no packets.
pub fn write_solid_clip(path: &Path, width: u32, height: u32, colours: &[[u8; 3]]) {
    ffmpeg::init().unwrap();
    let time_base = Rational::new(1, FRAME_RATE);

    let mut octx = output_as(path, "nut").unwrap();
    let codec = encoder::find(codec::Id::RAWVIDEO).unwrap();

    let mut video = codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()
        .unwrap();
    video.set_width(width);
    video.set_height(height);
    video.set_format(Pixel::RGB24);
    video.set_time_base(time_base);
    video.set_frame_rate(Some(Rational::new(FRAME_RATE, 1)));
    let mut encoder = video.open_as(codec).unwrap();

    let stream_index = {
        let mut stream = octx.add_stream(codec).unwrap();
        stream.set_parameters(&encoder);
        stream.set_time_base(time_base);
        stream.index()
    };
    octx.write_header().unwrap();
    let stream_time_base = octx.stream(stream_index).unwrap().time_base();

    for (pts, colour) in colours.iter().enumerate() {
        let mut frame = Video::new(Pixel::RGB24, width, height);
        let stride = frame.stride(0);
        let data = frame.data_mut(0);
        for y in 0..height as usize {
            for x in 0..width as usize {
                let offset = y * stride + x * 3;
                data[offset..offset + 3].copy_from_slice(colour);
            }
        }
        frame.set_pts(Some(pts as i64));
        encoder.send_frame(&frame).unwrap();
        write_packets(&mut encoder, &mut octx, stream_index, time_base, stream_time_base);
    }

    encoder.send_eof().unwrap();
    write_packets(&mut encoder, &mut octx, stream_index, time_base, stream_time_base);
    octx.write_trailer().unwrap();
}

fn write_packets(
    encoder: &mut encoder::Video,
    octx: &mut Output,
    stream_index: usize,
    encoder_time_base: Rational,
    stream_time_base: Rational,
) {
    let mut packet = Packet::empty();
    while encoder.receive_packet(&mut packet).is_ok() {
        packet.set_stream(stream_index);
        packet.rescale_ts(encoder_time_base, stream_time_base);
        packet.write_interleaved(octx).unwrap();
    }
}
