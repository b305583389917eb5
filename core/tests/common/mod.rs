#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use ctr::cipher::{KeyIvInit, StreamCipher};
use flate2::read::GzDecoder;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use sealstream_core::stream::CloseableWrite;

pub const IV_LEN: usize = 16;

/// One 2048-bit recipient for the whole test binary; keygen is slow.
pub fn recipient() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 2048).expect("rsa keygen"))
}

pub fn recipient_public() -> RsaPublicKey {
    RsaPublicKey::from(recipient())
}

/// Everything a reader recovers from a sealed stream.
pub struct Opened {
    pub key: Vec<u8>,
    pub iv: [u8; IV_LEN],
    pub compressed: Vec<u8>,
    pub csv: Vec<u8>,
}

impl Opened {
    pub fn csv_str(&self) -> &str {
        std::str::from_utf8(&self.csv).expect("utf8 csv")
    }

    pub fn records(&self) -> Vec<Vec<String>> {
        read_records(&self.csv, b',')
    }
}

/// Reverse the stack by hand: RSA-OAEP unwrap, CTR decrypt, gunzip.
pub fn open_stream(stream: &[u8]) -> Opened {
    let private = recipient();
    let modulus_len = private.size();
    assert!(stream.len() >= modulus_len + IV_LEN, "stream shorter than header");

    let (envelope, rest) = stream.split_at(modulus_len);
    let (iv_bytes, body) = rest.split_at(IV_LEN);

    let key = private
        .decrypt(Oaep::new::<Sha256>(), envelope)
        .expect("unwrap envelope");
    assert_eq!(key.len(), 32);

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(iv_bytes);

    let compressed = ctr_apply(&key, &iv, body);

    let mut csv = Vec::new();
    GzDecoder::new(&compressed[..])
        .read_to_end(&mut csv)
        .expect("gunzip");

    Opened { key, iv, compressed, csv }
}

/// AES-256-CTR with a 128-bit big-endian counter, built independently of the crate.
pub fn ctr_apply(key: &[u8], iv: &[u8], data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    let mut ks = ctr::Ctr128BE::<aes::Aes256>::new_from_slices(key, iv).expect("ctr init");
    ks.apply_keystream(&mut out);
    out
}

pub fn read_records(csv_bytes: &[u8], delimiter: u8) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(csv_bytes);
    reader
        .records()
        .map(|r| r.expect("csv record").iter().map(str::to_owned).collect())
        .collect()
}

// -----------------------------------------------------------------------------
// Scripted sink
// -----------------------------------------------------------------------------

#[derive(Default, Debug)]
pub struct SinkLog {
    pub bytes: Vec<u8>,
    pub writes: usize,
    pub flushes: usize,
    pub closes: usize,
    pub interrupts_left: usize,
}

/// Observation handle shared with a `ScriptedSink` after it moves into a writer.
#[derive(Clone, Default, Debug)]
pub struct Probe(Arc<Mutex<SinkLog>>);

impl Probe {
    pub fn log(&self) -> MutexGuard<'_, SinkLog> {
        self.0.lock().expect("probe lock")
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.log().bytes.clone()
    }

    pub fn writes(&self) -> usize {
        self.log().writes
    }

    pub fn flushes(&self) -> usize {
        self.log().flushes
    }

    pub fn closes(&self) -> usize {
        self.log().closes
    }
}

/// In-memory sink whose failures are scripted per test.
#[derive(Debug, Default)]
pub struct ScriptedSink {
    probe: Probe,
    /// Fail every write once this many writes have succeeded.
    pub fail_after: Option<usize>,
    /// Accept only half of each chunk once this many writes have succeeded.
    pub short_after: Option<usize>,
    pub fail_flush: bool,
    pub fail_close: bool,
}

impl ScriptedSink {
    pub fn new() -> (Self, Probe) {
        let sink = Self::default();
        let probe = sink.probe.clone();
        (sink, probe)
    }

    pub fn failing_after(writes: usize) -> (Self, Probe) {
        let (mut sink, probe) = Self::new();
        sink.fail_after = Some(writes);
        (sink, probe)
    }

    pub fn short_after(writes: usize) -> (Self, Probe) {
        let (mut sink, probe) = Self::new();
        sink.short_after = Some(writes);
        (sink, probe)
    }

    pub fn failing_close() -> (Self, Probe) {
        let (mut sink, probe) = Self::new();
        sink.fail_close = true;
        (sink, probe)
    }

    /// Return `Interrupted` for the first `n` write attempts.
    pub fn interrupting(n: usize) -> (Self, Probe) {
        let (sink, probe) = Self::new();
        probe.log().interrupts_left = n;
        (sink, probe)
    }
}

impl Write for ScriptedSink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut log = self.probe.log();
        if log.interrupts_left > 0 {
            log.interrupts_left -= 1;
            return Err(io::Error::new(io::ErrorKind::Interrupted, "injected interrupt"));
        }
        if self.fail_after.is_some_and(|n| log.writes >= n) {
            return Err(io::Error::other("injected write failure"));
        }
        let accepted = if self.short_after.is_some_and(|n| log.writes >= n) {
            data.len() / 2
        } else {
            data.len()
        };
        log.bytes.extend_from_slice(&data[..accepted]);
        log.writes += 1;
        Ok(accepted)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut log = self.probe.log();
        log.flushes += 1;
        if self.fail_flush {
            return Err(io::Error::other("injected flush failure"));
        }
        Ok(())
    }
}

impl CloseableWrite for ScriptedSink {
    fn close(&mut self) -> io::Result<()> {
        let mut log = self.probe.log();
        log.closes += 1;
        if self.fail_close {
            return Err(io::Error::other("injected close failure"));
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// RNGs
// -----------------------------------------------------------------------------

/// Entropy source that is always unavailable.
pub struct FailingRng;

impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
        Err(rand::Error::new(io::Error::other("entropy source unavailable")))
    }
}

impl CryptoRng for FailingRng {}

/// Entropy source that only ever yields zero bytes.
pub struct ZeroRng;

impl RngCore for ZeroRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        dest.fill(0);
        Ok(())
    }
}

impl CryptoRng for ZeroRng {}

/// Sink an adapter can own while the test keeps a way to read the bytes.
pub fn shared_vec() -> (SharedVec, Arc<Mutex<Vec<u8>>>) {
    let buf = Arc::new(Mutex::new(Vec::new()));
    (SharedVec(buf.clone()), buf)
}

pub struct SharedVec(Arc<Mutex<Vec<u8>>>);

impl Write for SharedVec {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("vec lock").extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
