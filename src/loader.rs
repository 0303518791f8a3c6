use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use flate2::read::MultiGzDecoder;

const GZIP_BUFFER_SIZE: usize = 128 * 1024;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Compression {
    Plain,
    Gzip,
    Zstd,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        let name = path.to_string_lossy();
        if name.ends_with(".gz") {
            Self::Gzip
        } else if name.ends_with(".zst") {
            Self::Zstd
        } else {
            Self::Plain
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Gzip => "gzip",
            Self::Zstd => "zstd",
        }
    }
}

/// Reads a whole file, decompressing by suffix. The returned buffer always
/// ends with a newline; empty or truncated inputs are errors.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    let compression = Compression::from_path(path);
    let mut data = match compression {
        Compression::Plain => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        Compression::Gzip => read_gzip(path)?,
        Compression::Zstd => read_zstd(path)?,
    };

    if data.is_empty() {
        bail!("input file is empty: {}", path.display());
    }
    if data.last() != Some(&b'\n') {
        data.push(b'\n');
    }

    Ok(data)
}

fn read_gzip(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut decoder = MultiGzDecoder::new(BufReader::with_capacity(GZIP_BUFFER_SIZE, file));
    let mut data = Vec::new();
    decoder
        .read_to_end(&mut data)
        .with_context(|| format!("failed to decompress gzip file {}", path.display()))?;
    Ok(data)
}

fn read_zstd(path: &Path) -> Result<Vec<u8>> {
    let compressed =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if compressed.is_empty() {
        bail!("input file is empty: {}", path.display());
    }
    zstd::stream::decode_all(compressed.as_slice())
        .with_context(|| format!("failed to decompress zstd file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;

    use flate2::Compression as GzLevel;
    use flate2::write::GzEncoder;

    use super::{Compression, read_file};

    const BODY: &[u8] = b"q1 0 d1 2\nq1 0 d2 1";

    #[test]
    fn compression_is_chosen_by_suffix() {
        assert_eq!(Compression::from_path(Path::new("run.txt")), Compression::Plain);
        assert_eq!(Compression::from_path(Path::new("qrels.gz")), Compression::Gzip);
        assert_eq!(Compression::from_path(Path::new("run.zst")), Compression::Zstd);
        assert_eq!(Compression::from_path(Path::new("run.gzip")), Compression::Plain);
    }

    #[test]
    fn plain_file_gets_trailing_newline() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("qrels.txt");
        std::fs::write(&path, BODY).expect("fixture should be written");

        let data = read_file(&path).expect("plain file should load");
        assert_eq!(data, b"q1 0 d1 2\nq1 0 d2 1\n");
    }

    #[test]
    fn existing_trailing_newline_is_not_doubled() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("qrels.txt");
        std::fs::write(&path, b"q1 0 d1 2\n").expect("fixture should be written");

        let data = read_file(&path).expect("plain file should load");
        assert_eq!(data, b"q1 0 d1 2\n");
    }

    #[test]
    fn gzip_file_is_decompressed() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("qrels.gz");
        let mut encoder = GzEncoder::new(Vec::new(), GzLevel::default());
        encoder.write_all(BODY).expect("gzip encode should succeed");
        let compressed = encoder.finish().expect("gzip finish should succeed");
        std::fs::write(&path, compressed).expect("fixture should be written");

        let data = read_file(&path).expect("gzip file should load");
        assert_eq!(data, b"q1 0 d1 2\nq1 0 d2 1\n");
    }

    #[test]
    fn zstd_file_is_decompressed() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("run.zst");
        let compressed = zstd::stream::encode_all(BODY, 3).expect("zstd encode should succeed");
        std::fs::write(&path, compressed).expect("fixture should be written");

        let data = read_file(&path).expect("zstd file should load");
        assert_eq!(data, b"q1 0 d1 2\nq1 0 d2 1\n");
    }

    #[test]
    fn empty_and_corrupt_inputs_are_errors() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, b"").expect("fixture should be written");
        let error = read_file(&empty).expect_err("empty file should be rejected");
        assert!(error.to_string().contains("empty"), "unexpected error: {error}");

        let corrupt = dir.path().join("corrupt.gz");
        std::fs::write(&corrupt, b"not gzip at all").expect("fixture should be written");
        assert!(read_file(&corrupt).is_err());

        let missing = dir.path().join("missing.txt");
        assert!(read_file(&missing).is_err());
    }
}
