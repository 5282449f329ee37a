use hashcheck_core::algorithm::{digest_bytes, DigestMode, Digester, HashAlgorithm};
use hashcheck_core::crc::{checksum, CrcVariant};

#[test]
fn crc32_reference_values() {
    assert_eq!(digest_bytes(HashAlgorithm::Crc32, b""), "00000000");
    assert_eq!(digest_bytes(HashAlgorithm::Crc32, b"123456789"), "cbf43926");
}

#[test]
fn crc32c_reference_values() {
    assert_eq!(digest_bytes(HashAlgorithm::Crc32c, b""), "00000000");
    assert_eq!(digest_bytes(HashAlgorithm::Crc32c, b"123456789"), "e3069283");
}

#[test]
fn crc32_table_matches_crc32fast() {
    fastrand::seed(0x5EED);
    for len in [1usize, 7, 255, 4096, 70_001] {
        let data: Vec<u8> = (0..len).map(|_| fastrand::u8(..)).collect();
        assert_eq!(checksum(CrcVariant::Ieee, &data), crc32fast::hash(&data), "len {len}");
    }
}

#[test]
fn crc_tables_initialize_once_under_contention() {
    let tables: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| CrcVariant::Castagnoli.table() as *const _ as usize))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(tables.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(CrcVariant::Castagnoli.table()[1], 0xF26B_8303);
    assert_eq!(CrcVariant::Ieee.table()[1], 0x7707_3096);
}

#[test]
fn xxh3_reference_values() {
    assert_eq!(digest_bytes(HashAlgorithm::Xxh3_64, b""), "2d06800538d394c2");
    assert_eq!(digest_bytes(HashAlgorithm::Xxh3_64, b"a"), "e6c632b61e964e1f");
    assert_eq!(digest_bytes(HashAlgorithm::Xxh3_64, b"abc"), "78af5f94892f3950");
    assert_eq!(digest_bytes(HashAlgorithm::Xxh3_64, b"123456789"), "72dcb18b67a17dff");
}

// High 64 bits first, then low 64 bits.
#[test]
fn city128_reference_values() {
    let city = |data: &[u8]| digest_bytes(HashAlgorithm::CityHash128, data);
    assert_eq!(city(b""), "3cb540c392e51e293df09dfc64c09a2b");
    assert_eq!(city(b"abc"), "a085f09013029e453980b2afd2126c04");
    assert_eq!(city(b"sentences"), "0c8649f64b31d0240dcc335ef92d3406");
    assert_eq!(city(b"123456789"), "f23b3efd020089f76cb62bb21026425b");

    let ramp: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
    let mut d = Digester::new(HashAlgorithm::CityHash128);
    for chunk in ramp.chunks(64) {
        d.update(chunk);
    }
    assert_eq!(d.finalize(), "99198c6d5095fe9639c8024154640cad");
}

#[test]
fn sha_reference_values() {
    assert_eq!(
        digest_bytes(HashAlgorithm::Sha256, b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(
        digest_bytes(HashAlgorithm::Sha256, b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(
        digest_bytes(HashAlgorithm::Sha512, b"abc"),
        "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
         2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
    );
}

#[test]
fn blake2_reference_values() {
    assert_eq!(
        digest_bytes(HashAlgorithm::Blake2b, b"abc"),
        "ba80a53f981c4d0d6a2797b69f12f6e94c212f14685ac4b74b12bb6fdbffa2d1\
         7d87c5392aab792dc252d5de4533cc9518d38aa8dbf1925ab92386edd4009923"
    );
    assert_eq!(
        digest_bytes(HashAlgorithm::Blake2s, b"abc"),
        "508c5e8c327c14e2e1a72ba34eeb452f37458b209ed63a294d999b4c86675982"
    );
}

#[test]
fn chunked_updates_match_one_shot() {
    fastrand::seed(42);
    let data: Vec<u8> = (0..100_003).map(|_| fastrand::u8(..)).collect();
    for algo in HashAlgorithm::ALL {
        let mut d = Digester::new(algo);
        for chunk in data.chunks(4093) {
            d.update(chunk);
        }
        let chunked = d.finalize();
        assert_eq!(chunked, digest_bytes(algo, &data), "{algo}");
        assert_eq!(chunked.len(), algo.digest_hex_len(), "{algo}");
        assert!(chunked.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }
}

#[test]
fn only_city128_buffers_input() {
    for algo in HashAlgorithm::ALL {
        let mut d = Digester::new(algo);
        d.update(&[7u8; 1000]);
        if algo == HashAlgorithm::CityHash128 {
            assert_eq!(algo.mode(), DigestMode::FullBuffer);
            assert_eq!(d.buffered_len(), 1000);
        } else {
            assert_eq!(algo.mode(), DigestMode::Streaming);
            assert_eq!(d.buffered_len(), 0);
        }
    }
}

#[test]
fn extension_table_round_trips() {
    for algo in HashAlgorithm::ALL {
        assert_eq!(HashAlgorithm::from_extension(algo.extension()), Some(algo));
        assert_eq!(HashAlgorithm::from_extension(&format!(".{}", algo.extension())), Some(algo));
        assert_eq!(algo.extension().parse::<HashAlgorithm>().unwrap(), algo);
    }
    assert_eq!(HashAlgorithm::from_extension("md5"), None);
    assert_eq!(HashAlgorithm::from_extension("CRC32"), None);
    assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
    assert!("md5".parse::<HashAlgorithm>().is_err());
}
