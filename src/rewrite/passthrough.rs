//! Byte-exact relay of bodies that are not rewritten.

use axum::body::Bytes;
use futures_util::stream::{self, Stream, StreamExt};

/// Re-slice a byte stream so that no chunk exceeds `max_chunk` bytes.
///
/// Chunks are split without copying; bytes and errors pass through in order.
pub fn bounded_chunks<S, E>(upstream: S, max_chunk: usize) -> impl Stream<Item = Result<Bytes, E>>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    let max_chunk = max_chunk.max(1);
    upstream.flat_map(move |item| {
        let pieces = match item {
            Ok(mut bytes) => {
                let mut pieces = Vec::with_capacity(bytes.len() / max_chunk + 1);
                while bytes.len() > max_chunk {
                    pieces.push(Ok(bytes.split_to(max_chunk)));
                }
                if !bytes.is_empty() {
                    pieces.push(Ok(bytes));
                }
                pieces
            }
            Err(err) => vec![Err(err)],
        };
        stream::iter(pieces)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    #[tokio::test]
    async fn test_bytes_identical_and_bounded() {
        let data = sample(20_000);
        let input = vec![
            Ok::<_, std::io::Error>(Bytes::copy_from_slice(&data[..3])),
            Ok(Bytes::copy_from_slice(&data[3..19_000])),
            Ok(Bytes::new()),
            Ok(Bytes::copy_from_slice(&data[19_000..])),
        ];

        let chunks: Vec<Bytes> = bounded_chunks(stream::iter(input), 8192)
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;

        assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= 8192));
        assert_eq!(chunks.concat(), data);
    }

    #[tokio::test]
    async fn test_errors_forwarded_in_order() {
        let input = vec![
            Ok(Bytes::from_static(b"abcdef")),
            Err("upstream reset"),
            Ok(Bytes::from_static(b"gh")),
        ];

        let items: Vec<_> = bounded_chunks(stream::iter(input), 4).collect().await;
        assert_eq!(
            items,
            vec![
                Ok(Bytes::from_static(b"abcd")),
                Ok(Bytes::from_static(b"ef")),
                Err("upstream reset"),
                Ok(Bytes::from_static(b"gh")),
            ]
        );
    }
}
