//! Content sniffing used to keep binary files out of the dump.
//!
//! Only the first [`SNIFF_LEN`] bytes are inspected. The check is a heuristic,
//! so the classifier talks to it through [`BinarySniffer`] and any detector can
//! be plugged in with [`Classifier::with_sniffer`](crate::Classifier::with_sniffer).

use crate::options::BinaryDetection;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Number of leading bytes handed to a sniffer.
pub const SNIFF_LEN: u64 = 8192;

pub trait BinarySniffer: Send + Sync {
    /// Returns `true` when `head` looks like binary data.
    fn is_binary(&self, head: &[u8]) -> bool;
}

/// Treats any NUL byte as proof of binary content.
#[derive(Debug, Clone, Copy, Default)]
pub struct NulByteSniffer;

impl BinarySniffer for NulByteSniffer {
    fn is_binary(&self, head: &[u8]) -> bool {
        head.contains(&0)
    }
}

/// Backed by `content_inspector`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InspectorSniffer;

impl BinarySniffer for InspectorSniffer {
    fn is_binary(&self, head: &[u8]) -> bool {
        content_inspector::inspect(head).is_binary()
    }
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSniffer;

impl BinarySniffer for NoSniffer {
    fn is_binary(&self, _head: &[u8]) -> bool {
        false
    }
}

pub(crate) fn sniffer_for(method: BinaryDetection) -> Box<dyn BinarySniffer> {
    match method {
        BinaryDetection::Simple => Box::new(NulByteSniffer),
        BinaryDetection::Accurate => Box::new(InspectorSniffer),
        BinaryDetection::None => Box::new(NoSniffer),
    }
}

/// Reads the head of `path` and asks `sniffer` about it.
pub(crate) fn sniff_file(path: &Path, sniffer: &dyn BinarySniffer) -> io::Result<bool> {
    let file = File::open(path)?;
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    file.take(SNIFF_LEN).read_to_end(&mut head)?;
    Ok(sniffer.is_binary(&head))
}
