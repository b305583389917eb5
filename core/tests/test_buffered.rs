mod common;

#[cfg(test)]
mod tests {
    use std::io::Write;

    use sealstream_core::crypto::new_keystream;
    use sealstream_core::stream::cipher::{CachedStream, CipherStream, InPlaceStream};
    use sealstream_core::stream::{BufferedSink, CloseableWrite};

    use crate::common::{ctr_apply, ScriptedSink};

    #[test]
    fn small_writes_accumulate_without_touching_sink() {
        let (sink, probe) = ScriptedSink::new();
        let mut buffered = BufferedSink::with_capacity(sink, 16);

        for _ in 0..4 {
            assert_eq!(buffered.write(b"abc").expect("write"), 3);
        }
        assert_eq!(buffered.buffered(), 12);
        assert_eq!(probe.writes(), 0);
        assert_eq!(probe.flushes(), 0);
    }

    #[test]
    fn overflow_hands_accumulated_bytes_down_first() {
        let (sink, probe) = ScriptedSink::new();
        let mut buffered = BufferedSink::with_capacity(sink, 16);

        buffered.write_all(&[1u8; 12]).expect("fill");
        buffered.write_all(&[2u8; 5]).expect("overflow");

        assert_eq!(probe.bytes(), vec![1u8; 12]);
        assert_eq!(buffered.buffered(), 5);
        assert_eq!(probe.flushes(), 0, "write must never flush the inner sink");
    }

    #[test]
    fn chunk_at_capacity_passes_straight_through() {
        let (sink, probe) = ScriptedSink::new();
        let mut buffered = BufferedSink::with_capacity(sink, 8);

        buffered.write_all(b"ab").expect("small");
        buffered.write_all(&[7u8; 8]).expect("large");

        let mut expected = b"ab".to_vec();
        expected.extend_from_slice(&[7u8; 8]);
        assert_eq!(probe.bytes(), expected);
        assert_eq!(buffered.buffered(), 0);
    }

    #[test]
    fn flush_drains_and_flushes_inner() {
        let (sink, probe) = ScriptedSink::new();
        let mut buffered = BufferedSink::with_capacity(sink, 64);
        buffered.write_all(b"pending").expect("write");

        buffered.flush().expect("flush");
        assert_eq!(probe.bytes(), b"pending".to_vec());
        assert_eq!(probe.flushes(), 1);
        assert_eq!(probe.closes(), 0);
    }

    #[test]
    fn close_drains_then_closes_once() {
        let (sink, probe) = ScriptedSink::new();
        let mut buffered = BufferedSink::with_capacity(sink, 64);
        buffered.write_all(b"tail bytes").expect("write");

        buffered.close().expect("close");
        buffered.close().expect("second close is a no-op");

        assert_eq!(probe.bytes(), b"tail bytes".to_vec());
        assert_eq!(probe.closes(), 1);
        assert!(buffered.write(b"x").is_err());
    }

    #[test]
    fn failed_drain_on_close_leaves_inner_open() {
        let (sink, probe) = ScriptedSink::failing_after(0);
        let mut buffered = BufferedSink::with_capacity(sink, 64);
        buffered.write_all(b"never lands").expect("buffered write");

        let err = buffered.close().expect_err("drain must fail");
        assert!(err.to_string().contains("injected write failure"));
        assert_eq!(probe.closes(), 0, "inner sink must not be closed");
        assert_eq!(buffered.buffered(), b"never lands".len());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let (sink, _probe) = ScriptedSink::new();
        let buffered = BufferedSink::with_capacity(sink, 0);
        assert_eq!(buffered.capacity(), 1);
    }

    #[test]
    fn buffering_does_not_change_ciphertext() {
        let key = [0x5au8; 32];
        let iv = [0xa5u8; 16];
        let chunks: Vec<Vec<u8>> = (1..40).map(|n| vec![n as u8; n * 3]).collect();
        let plain: Vec<u8> = chunks.concat();

        let (direct_sink, direct) = ScriptedSink::new();
        let mut plain_stream =
            InPlaceStream::new(new_keystream(&key, &iv).expect("ks"), direct_sink);

        let (buffered_sink, buffered) = ScriptedSink::new();
        let mut buffered_stream = CachedStream::new(
            new_keystream(&key, &iv).expect("ks"),
            BufferedSink::with_capacity(buffered_sink, 50),
            8,
        );

        for chunk in &chunks {
            plain_stream.write_chunk(chunk).expect("direct");
            buffered_stream.write_chunk(chunk).expect("buffered");
        }
        plain_stream.close().expect("close direct");
        buffered_stream.close().expect("close buffered");

        assert_eq!(direct.bytes(), buffered.bytes());
        assert_eq!(buffered.bytes(), ctr_apply(&key, &iv, &plain));
        assert!(buffered.writes() < direct.writes(), "buffering should batch writes");
        assert_eq!(buffered.closes(), 1);
    }
}
