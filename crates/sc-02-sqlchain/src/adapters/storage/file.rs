use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the data file inside the store directory.
pub const DATA_FILE: &str = "chain.db";

const FILE_MAGIC: [u8; 4] = *b"SQKV";
const FILE_VERSION: u8 = 1;
const HEADER_LEN: usize = 4 + 1 + 8;
const CRC_LEN: usize = 4;

/// File-backed key-value store for deployments without RocksDB.
///
/// The whole map is rewritten on every mutation: temp file, fsync, rename.
/// A torn or damaged file fails the whole-file CRC and refuses to open.
///
/// ## File Format
///
/// ```text
/// SQKV | version u8 | count u64 | (klen u32 | key | vlen u32 | value)* | crc32
/// ```
///
/// Integers are big-endian; the CRC covers everything before it.
pub struct FileBackedKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    dir: PathBuf,
    sync_writes: bool,
    closed: bool,
}

fn io_error(context: &str, err: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: format!("{context}: {err}"),
    }
}

fn corruption(message: impl Into<String>) -> KVStoreError {
    KVStoreError::CorruptionError {
        message: message.into(),
    }
}

impl FileBackedKVStore {
    /// Open or create a store in `dir`, fsyncing every write.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, KVStoreError> {
        Self::open_with_sync(dir, true)
    }

    /// Open or create a store in `dir`.
    pub fn open_with_sync<P: AsRef<Path>>(dir: P, sync_writes: bool) -> Result<Self, KVStoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| io_error("create store directory", e))?;

        let path = dir.join(DATA_FILE);
        let data = match fs::read(&path) {
            Ok(bytes) => {
                tracing::info!(
                    "[sc-02] 💾 Found existing storage file: {} ({} bytes)",
                    path.display(),
                    bytes.len()
                );
                decode_file(&bytes)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("[sc-02] 📁 No existing storage file at {}", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(io_error("read storage file", e)),
        };

        Ok(Self {
            data,
            dir,
            sync_writes,
            closed: false,
        })
    }

    /// Directory holding the data file.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn ensure_open(&self) -> Result<(), KVStoreError> {
        if self.closed {
            return Err(KVStoreError::Closed);
        }
        Ok(())
    }

    /// Persist `next` and adopt it only once it is durable.
    fn commit(&mut self, next: BTreeMap<Vec<u8>, Vec<u8>>) -> Result<(), KVStoreError> {
        let bytes = encode_file(&next)?;
        let path = self.dir.join(DATA_FILE);
        let temp_path = path.with_extension("tmp");

        let mut file = fs::File::create(&temp_path).map_err(|e| io_error("create temp file", e))?;
        file.write_all(&bytes)
            .map_err(|e| io_error("write temp file", e))?;
        if self.sync_writes {
            file.sync_all().map_err(|e| io_error("sync temp file", e))?;
        }
        drop(file);

        fs::rename(&temp_path, &path).map_err(|e| io_error("replace storage file", e))?;
        if self.sync_writes {
            // Best effort: not every platform can fsync a directory.
            if let Ok(dir) = fs::File::open(&self.dir) {
                let _ = dir.sync_all();
            }
        }

        self.data = next;
        Ok(())
    }
}

fn encode_file(data: &BTreeMap<Vec<u8>, Vec<u8>>) -> Result<Vec<u8>, KVStoreError> {
    let body: usize = data.iter().map(|(k, v)| 8 + k.len() + v.len()).sum();
    let mut bytes = Vec::with_capacity(HEADER_LEN + body + CRC_LEN);
    bytes.extend_from_slice(&FILE_MAGIC);
    bytes.push(FILE_VERSION);
    bytes.extend_from_slice(&(data.len() as u64).to_be_bytes());

    for (key, value) in data {
        for part in [key, value] {
            let len = u32::try_from(part.len())
                .map_err(|_| corruption(format!("entry of {} bytes too large", part.len())))?;
            bytes.extend_from_slice(&len.to_be_bytes());
            bytes.extend_from_slice(part);
        }
    }

    let crc = crc32fast::hash(&bytes);
    bytes.extend_from_slice(&crc.to_be_bytes());
    Ok(bytes)
}

fn decode_file(bytes: &[u8]) -> Result<BTreeMap<Vec<u8>, Vec<u8>>, KVStoreError> {
    if bytes.len() < HEADER_LEN + CRC_LEN {
        return Err(corruption(format!("storage file truncated ({} bytes)", bytes.len())));
    }

    let (body, trailer) = bytes.split_at(bytes.len() - CRC_LEN);
    let mut crc = [0u8; CRC_LEN];
    crc.copy_from_slice(trailer);
    if crc32fast::hash(body) != u32::from_be_bytes(crc) {
        return Err(corruption("storage file checksum mismatch"));
    }
    if body[..4] != FILE_MAGIC {
        return Err(corruption("storage file magic mismatch"));
    }
    if body[4] != FILE_VERSION {
        return Err(corruption(format!("unsupported storage file version {}", body[4])));
    }

    let mut cursor = Cursor {
        bytes: body,
        pos: 5,
    };
    let count = cursor.read_u64()?;
    let mut data = BTreeMap::new();
    for _ in 0..count {
        let key = cursor.read_chunk()?;
        let value = cursor.read_chunk()?;
        data.insert(key, value);
    }
    if cursor.pos != body.len() {
        return Err(corruption("trailing bytes in storage file"));
    }
    Ok(data)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn take(&mut self, n: usize) -> Result<&[u8], KVStoreError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| corruption("storage file entry truncated"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u64(&mut self) -> Result<u64, KVStoreError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_be_bytes(buf))
    }

    fn read_chunk(&mut self) -> Result<Vec<u8>, KVStoreError> {
        let mut len = [0u8; 4];
        len.copy_from_slice(self.take(4)?);
        Ok(self.take(u32::from_be_bytes(len) as usize)?.to_vec())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.ensure_open()?;
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::put(key, value)])
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::delete(key)])
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        self.ensure_open()?;
        let mut next = self.data.clone();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    next.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    next.remove(&key);
                }
            }
        }
        self.commit(next)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.ensure_open()?;
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        self.ensure_open()?;
        Ok(self
            .data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn close(&mut self) -> Result<(), KVStoreError> {
        self.closed = true;
        tracing::debug!("[sc-02] Closed storage at {}", self.dir.display());
        Ok(())
    }
}
