//! Property tests for message framing.
//!
//! These tests verify that record decoding is robust against fragmentation
//! at arbitrary byte boundaries, which is critical for correct operation over
//! real network streams.

#[cfg(test)]
mod tests {
    use super::super::server::*;
    use super::super::types::*;
    use crate::codec::WireEncode;
    use crate::io::RfbInStream;
    use bytes::BytesMut;
    use proptest::prelude::*;

    /// A reader that hands out at most `chunk` bytes per read.
    ///
    /// This simulates network fragmentation by splitting records across
    /// many small reads.
    struct FragmentingReader {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
    }

    impl FragmentingReader {
        fn new(data: Vec<u8>, chunk: usize) -> Self {
            Self {
                data,
                pos: 0,
                chunk: chunk.max(1),
            }
        }
    }

    impl tokio::io::AsyncRead for FragmentingReader {
        fn poll_read(
            mut self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            let remaining = self.data.len() - self.pos;
            let n = remaining.min(self.chunk).min(buf.remaining());
            let start = self.pos;
            buf.put_slice(&self.data[start..start + n]);
            self.pos += n;
            std::task::Poll::Ready(Ok(()))
        }
    }

    fn arbitrary_pixel_format() -> impl Strategy<Value = PixelFormat> {
        (
            prop::sample::select(vec![8u8, 16, 32]),
            prop::sample::select(vec![8u8, 16, 24]),
            prop::bool::ANY,
            prop::bool::ANY,
            prop::sample::select(vec![7u16, 31, 63, 255]),
            0u8..32,
        )
            .prop_map(|(bpp, depth, big_endian, true_color, max, shift)| PixelFormat {
                bits_per_pixel: bpp,
                depth,
                big_endian,
                true_color,
                red_max: max,
                green_max: max,
                blue_max: max,
                red_shift: shift,
                green_shift: shift / 2,
                blue_shift: 0,
            })
    }

    fn arbitrary_rectangle() -> impl Strategy<Value = Rectangle> {
        (any::<u16>(), any::<u16>(), any::<u16>(), any::<u16>(), any::<i32>()).prop_map(
            |(x, y, width, height, encoding)| Rectangle {
                x,
                y,
                width,
                height,
                encoding,
            },
        )
    }

    fn run<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    proptest! {
        #[test]
        fn server_init_survives_fragmentation(
            width in 1u16..=7680,
            height in 1u16..=4320,
            pixel_format in arbitrary_pixel_format(),
            name_length in 0u32..64,
            chunk in 1usize..30,
        ) {
            let header = ServerInitHeader {
                framebuffer_width: width,
                framebuffer_height: height,
                pixel_format,
                name_length,
            };
            let data = header.to_bytes().to_vec();

            let decoded = run(async {
                let mut stream = RfbInStream::new(FragmentingReader::new(data, chunk));
                stream.read_record::<ServerInitHeader>().await
            }).unwrap();

            prop_assert_eq!(decoded, header);
        }

        #[test]
        fn rectangle_batch_survives_fragmentation(
            rects in prop::collection::vec(arbitrary_rectangle(), 1..8),
            chunk in 1usize..20,
        ) {
            let mut data = BytesMut::new();
            for rect in &rects {
                rect.encode(&mut data);
            }

            let decoded = run(async {
                let mut stream = RfbInStream::new(FragmentingReader::new(data.to_vec(), chunk));
                let mut out = Vec::new();
                for _ in 0..rects.len() {
                    out.push(stream.read_record::<Rectangle>().await?);
                }
                Ok::<_, crate::RfbError>(out)
            }).unwrap();

            prop_assert_eq!(decoded, rects);
        }
    }
}
