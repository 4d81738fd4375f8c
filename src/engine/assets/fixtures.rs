// Shared helpers for asset tests

use super::{Asset, AssetValue, ContentBackend, Dispose, FileBackend, Importer, TypeTag};
use anyhow::{anyhow, Result};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Plain text asset without a disposal step
#[derive(Debug)]
pub struct Note(pub String);

impl Asset for Note {
    const TAG: TypeTag = TypeTag::new("note");
}

/// Disposable asset that records its disposal in a shared log
pub struct Token {
    pub value: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl Asset for Token {
    const TAG: TypeTag = TypeTag::new("token");
}

impl Dispose for Token {
    fn dispose(&self) {
        self.log.lock().unwrap().push(self.value.clone());
    }
}

/// Collects the values of disposed tokens, in disposal order
#[derive(Clone, Default)]
pub struct DisposeLog {
    log: Arc<Mutex<Vec<String>>>,
}

impl DisposeLog {
    pub fn importer(&self) -> TokenImporter {
        TokenImporter {
            log: self.log.clone(),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

pub struct TokenImporter {
    log: Arc<Mutex<Vec<String>>>,
}

impl Importer for TokenImporter {
    fn tag(&self) -> TypeTag {
        Token::TAG
    }

    fn import(&self, backend: &dyn ContentBackend, path: &Path) -> Result<AssetValue> {
        let bytes = backend.read(path)?;
        Ok(AssetValue::disposable(Token {
            value: String::from_utf8(bytes)?,
            log: self.log.clone(),
        }))
    }
}

/// File backend that fails its first `failures` reads and counts every read
pub struct FlakyBackend {
    inner: FileBackend,
    failures: AtomicUsize,
    reads: AtomicUsize,
}

impl FlakyBackend {
    pub fn new(root: &Path, failures: usize) -> Self {
        Self {
            inner: FileBackend::new(root),
            failures: AtomicUsize::new(failures),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ContentBackend for FlakyBackend {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(anyhow!("device lost while reading {}", path.display()));
        }

        self.inner.read(path)
    }
}

/// Write a solid PNG of the given size at `root/relative`
pub fn write_png(root: &Path, relative: &str, width: u32, height: u32) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 255, 255]))
        .save(&path)
        .unwrap();
}

/// Write a text file at `root/relative`
pub fn write_text(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}
