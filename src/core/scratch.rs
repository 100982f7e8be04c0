use crate::utils::error::Result;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Temp file holding the body of the response currently being processed.
///
/// One buffer lives for the whole run and is truncated before every request.
/// The file is removed when the buffer is dropped, so every exit path out of
/// the run (completion, `?`, interrupt) releases it.
#[derive(Debug)]
pub struct ScratchBuffer {
    file: NamedTempFile,
}

impl ScratchBuffer {
    pub fn create() -> Result<Self> {
        Self::create_in(std::env::temp_dir())
    }

    pub fn create_in<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("race-backfill-")
            .suffix(".body")
            .tempfile_in(dir)?;
        tracing::debug!(path = %file.path().display(), "Scratch buffer created");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// 每個請求前清空
    pub fn reset(&mut self) -> io::Result<()> {
        self.file.as_file().set_len(0)?;
        self.file.as_file_mut().seek(SeekFrom::Start(0))?;
        Ok(())
    }

    pub fn len(&self) -> io::Result<u64> {
        Ok(self.file.as_file().metadata()?.len())
    }

    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Reads back everything written since the last reset. Invalid UTF-8 is
    /// replaced rather than rejected; the body is shown, never parsed.
    pub fn contents(&mut self) -> io::Result<String> {
        let file = self.file.as_file_mut();
        file.flush()?;
        file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Removes the file now and reports a failure to do so.
    pub fn close(self) -> Result<()> {
        let path: PathBuf = self.file.path().to_path_buf();
        self.file.close()?;
        tracing::debug!(path = %path.display(), "Scratch buffer released");
        Ok(())
    }
}

impl Write for ScratchBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
