//! LZW, RLE, and chunk framing integration tests.

use nufx_lzw::rle::{self, DEFAULT_ESCAPE};
use nufx_lzw::{
    CHUNK_SIZE, LzwConfig, LzwReader, LzwWriter, Lzw1Reader, Lzw2Reader, compress, decompress,
    lzw1, lzw2,
};
use proptest::prelude::*;
use std::io::{Read, Write};

fn read_lzw1(packed: &[u8], len: usize) -> Vec<u8> {
    let mut reader = Lzw1Reader::new(packed)
        .expect("reader")
        .with_limit(len as u64);
    let mut out = Vec::new();
    reader.read_to_end(&mut out).expect("decompression failed");
    assert_eq!(reader.is_crc_valid(), if len == 0 { None } else { Some(true) });
    out
}

fn read_lzw2(packed: &[u8], len: usize) -> Vec<u8> {
    let mut reader = Lzw2Reader::new(packed)
        .expect("reader")
        .with_limit(len as u64);
    let mut out = Vec::new();
    reader.read_to_end(&mut out).expect("decompression failed");
    out
}

#[test]
fn test_lzw_roundtrip_simple() {
    let original = b"TOBEORNOTTOBEORTOBEORNOT";
    let compressed = compress(original, LzwConfig::NUFX).expect("compression failed");
    let decompressed = decompress(&compressed).expect("decompression failed");
    assert_eq!(decompressed, original);
}

#[test]
fn test_lzw_kwk_runs() {
    // Long single-byte runs exercise the code-equals-next-free case.
    for len in [2usize, 3, 4, 10, 100, 5000] {
        let original = vec![b'K'; len];
        let compressed = compress(&original, LzwConfig::NUFX).expect("compression failed");
        assert_eq!(
            decompress(&compressed).expect("decompression failed"),
            original,
            "run of {len}"
        );
    }
}

#[test]
fn test_lzw_clear_mid_stream() {
    // Enough varied input to fill a 12-bit dictionary several times.
    let mut seed: u64 = 0x1234_5678_9abc_def0;
    let original: Vec<u8> = (0..60_000)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            b"ACGT"[(seed >> 62) as usize]
        })
        .collect();
    let compressed = compress(&original, LzwConfig::NUFX).expect("compression failed");
    assert_eq!(decompress(&compressed).expect("decompression failed"), original);
}

#[test]
fn test_lzw_streaming_adapters() {
    let original = b"The quick brown fox jumps over the lazy dog. ".repeat(100);
    let mut writer = LzwWriter::new(Vec::new(), LzwConfig::NUFX).expect("writer");
    for piece in original.chunks(77) {
        writer.write_all(piece).expect("write");
    }
    let compressed = writer.finish().expect("finish");

    let mut out = Vec::new();
    LzwReader::new(compressed.as_slice())
        .expect("reader")
        .read_to_end(&mut out)
        .expect("read");
    assert_eq!(out, original);
}

#[test]
fn test_lzw_corrupt_stream_is_an_error() {
    // 0x1ff is far beyond the dictionary after one literal.
    let data = [0x41, 0xfe, 0x03];
    assert!(decompress(&data).is_err());
}

#[test]
fn test_rle_escape_in_data() {
    let original = [0xDB, 1, 0xDB, 0xDB, 0xDB, 2];
    let packed = rle::encode(&original, DEFAULT_ESCAPE);
    assert_eq!(rle::decode(&packed, DEFAULT_ESCAPE).expect("decode"), original);
}

#[test]
fn test_lzw1_disk_sized_fork() {
    // 140K: the size of a 5.25" ProDOS disk image.
    let original: Vec<u8> = (0..143_360usize)
        .map(|i| match (i / 512) % 4 {
            0 => 0,
            1 => (i % 256) as u8,
            2 => b"BLOCK "[i % 6],
            _ => 0xDB,
        })
        .collect();
    let packed = lzw1::compress(&original, 0xFE, DEFAULT_ESCAPE).expect("compression failed");
    assert!(packed.len() < original.len() / 2);
    assert_eq!(read_lzw1(&packed, original.len()), original);
}

#[test]
fn test_lzw2_disk_sized_fork() {
    let original: Vec<u8> = (0..143_360usize)
        .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8 & 0x1f)
        .collect();
    let packed = lzw2::compress(&original, 0xFE, DEFAULT_ESCAPE).expect("compression failed");
    assert_eq!(read_lzw2(&packed, original.len()), original);
}

#[test]
fn test_lzw2_fork_shorter_than_chunk() {
    let packed = lzw2::compress(b"x", 0, DEFAULT_ESCAPE).expect("compression failed");
    let mut reader = Lzw2Reader::new(packed.as_slice()).expect("reader");
    let mut out = Vec::new();
    reader.read_to_end(&mut out).expect("decompression failed");
    assert_eq!(out.len(), CHUNK_SIZE);
    assert_eq!(out[0], b'x');
    assert!(out[1..].iter().all(|&b| b == 0));
}

#[test]
fn test_truncated_lzw_fork_is_an_error() {
    // Two full chunks, so every byte of the fork is needed.
    let original: Vec<u8> = b"Some text that compresses. "
        .iter()
        .copied()
        .cycle()
        .take(2 * CHUNK_SIZE)
        .collect();
    let packed = lzw1::compress(&original, 0, DEFAULT_ESCAPE).expect("compression failed");
    let truncated = &packed[..packed.len() - 1];
    let mut out = Vec::new();
    let result = Lzw1Reader::new(truncated)
        .expect("reader")
        .with_limit(original.len() as u64)
        .read_to_end(&mut out);
    assert!(result.is_err());
}

proptest! {
    #[test]
    fn prop_lzw_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..6000)) {
        let compressed = compress(&data, LzwConfig::NUFX).unwrap();
        prop_assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn prop_lzw_roundtrip_low_entropy(data in proptest::collection::vec(0u8..4, 0..20000), max_bits in 9u8..=12) {
        let config = LzwConfig::new(max_bits).unwrap();
        let compressed = compress(&data, config).unwrap();
        prop_assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn prop_lzw1_roundtrip(data in proptest::collection::vec(prop_oneof![Just(0u8), Just(0xDBu8), 0u8..8, any::<u8>()], 0..10000)) {
        let packed = lzw1::compress(&data, 0, DEFAULT_ESCAPE).unwrap();
        prop_assert_eq!(read_lzw1(&packed, data.len()), data);
    }

    #[test]
    fn prop_lzw2_roundtrip(data in proptest::collection::vec(prop_oneof![Just(0u8), Just(0xDBu8), 0u8..8, any::<u8>()], 0..14000), escape in any::<u8>()) {
        let packed = lzw2::compress(&data, 0, escape).unwrap();
        prop_assert_eq!(read_lzw2(&packed, data.len()), data);
    }
}
