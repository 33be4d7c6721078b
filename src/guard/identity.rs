//! Identity of the running executable.
//!
//! # Responsibilities
//! - Know our own path, content digest and product name
//! - Read the product name embedded in another executable
//!
//! # Design Decisions
//! - The product name lives in a `ProductName` version record, stored the
//!   way Windows version resources store strings (UTF-16LE key, padding,
//!   UTF-16LE value). The same record is compiled into this binary, so
//!   copies and renames of it carry the marker on every platform
//! - The own digest is computed at most once, and only when needed

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use sha2::{Digest, Sha256};

/// Product name identifying this router.
pub const PRODUCT_NAME: &str = "LinkRouter";

const VERSION_KEY: &str = "ProductName";

/// Longest value read after a `ProductName` key, in UTF-16 units.
const MAX_VALUE_UNITS: usize = 128;

/// Files larger than this are not scanned for a product name.
const MAX_SCAN_BYTES: u64 = 256 * 1024 * 1024;

const RECORD_LEN: usize = (VERSION_KEY.len() + 1) * 2 + 2 + (PRODUCT_NAME.len() + 1) * 2;

#[used]
static EMBEDDED_PRODUCT_RECORD: [u8; RECORD_LEN] = product_record();

const fn product_record() -> [u8; RECORD_LEN] {
    let mut out = [0u8; RECORD_LEN];
    let key = VERSION_KEY.as_bytes();
    let mut i = 0;
    while i < key.len() {
        out[i * 2] = key[i];
        i += 1;
    }
    // Key terminator and one padding unit stay zero.
    let value = PRODUCT_NAME.as_bytes();
    let start = (key.len() + 1) * 2 + 2;
    let mut j = 0;
    while j < value.len() {
        out[start + j * 2] = value[j];
        j += 1;
    }
    out
}

/// Path, content digest and product name of an executable.
#[derive(Debug)]
pub struct ExecutableIdentity {
    path: PathBuf,
    product: String,
    digest: OnceLock<Option<String>>,
}

impl ExecutableIdentity {
    pub fn new(path: impl Into<PathBuf>, product: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            product: product.into(),
            digest: OnceLock::new(),
        }
    }

    /// Identity of the running process.
    pub fn current() -> io::Result<Self> {
        let path = std::env::current_exe()?;
        let path = path.canonicalize().unwrap_or(path);
        // Keep the record referenced so the linker cannot drop it.
        let _ = std::hint::black_box(&EMBEDDED_PRODUCT_RECORD);
        Ok(Self::new(path, PRODUCT_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn product_identity(&self) -> &str {
        &self.product
    }

    /// Hex SHA-256 of the executable, `None` if it cannot be read.
    pub fn content_digest(&self) -> Option<&str> {
        self.digest
            .get_or_init(|| match file_digest(&self.path) {
                Ok(digest) => Some(digest),
                Err(e) => {
                    tracing::debug!(
                        path = %self.path.display(),
                        error = %e,
                        "Cannot hash own executable"
                    );
                    None
                }
            })
            .as_deref()
    }
}

/// Hex SHA-256 of a file's content.
pub fn file_digest(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        match file.read(&mut buf)? {
            0 => break,
            n => hasher.update(&buf[..n]),
        }
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Product name embedded in the executable at `path`, if any.
pub fn read_product_identity(path: &Path) -> Option<String> {
    let len = fs::metadata(path).ok()?.len();
    if len > MAX_SCAN_BYTES {
        return None;
    }
    let data = fs::read(path).ok()?;
    find_product_identity(&data)
}

fn find_product_identity(data: &[u8]) -> Option<String> {
    let needle = utf16le(VERSION_KEY, true);
    let mut from = 0;

    while let Some(offset) = find_subslice(&data[from..], &needle) {
        let value_start = from + offset + needle.len();
        if let Some(value) = read_utf16_value(&data[value_start..]) {
            return Some(value);
        }
        from += offset + 1;
    }
    None
}

/// Skip zero padding units, then read a NUL-terminated UTF-16LE string.
fn read_utf16_value(data: &[u8]) -> Option<String> {
    let units = data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .skip_while(|unit| *unit == 0)
        .take(MAX_VALUE_UNITS + 1);

    let mut value = Vec::new();
    for unit in units {
        if unit == 0 {
            return String::from_utf16(&value).ok().filter(|v| !v.is_empty());
        }
        value.push(unit);
    }
    None
}

fn utf16le(text: &str, nul_terminated: bool) -> Vec<u8> {
    let mut out: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    if nul_terminated {
        out.extend_from_slice(&[0, 0]);
    }
    out
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// A version record naming `product`, as found in a Windows executable.
#[cfg(test)]
pub(crate) fn encode_product_record(product: &str) -> Vec<u8> {
    let mut record = utf16le(VERSION_KEY, true);
    record.extend_from_slice(&[0, 0]);
    record.extend(utf16le(product, true));
    record
}
