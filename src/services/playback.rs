use crate::utils::audio::AudioInfo;
use anyhow::Result;

/// Creates and releases the handles a host plays audio from
/// (an object URL in the browser, a file on disk natively).
pub trait PlaybackBackend {
    type Handle: Clone;

    fn create(&mut self, audio: &[u8], info: &AudioInfo) -> Result<Self::Handle>;
    fn release(&mut self, handle: Self::Handle);
}

/// Holds the single live playback handle.
pub struct PlaybackSlot<B: PlaybackBackend> {
    backend: B,
    current: Option<B::Handle>,
}

impl<B: PlaybackBackend> PlaybackSlot<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current: None,
        }
    }

    /// Creates a handle for `audio`, then releases the one it supersedes.
    /// On failure the previous handle stays current.
    pub fn replace(&mut self, audio: &[u8], info: &AudioInfo) -> Result<B::Handle> {
        let handle = self.backend.create(audio, info)?;
        if let Some(previous) = self.current.replace(handle.clone()) {
            self.backend.release(previous);
        }
        Ok(handle)
    }

    pub fn current(&self) -> Option<&B::Handle> {
        self.current.as_ref()
    }

    /// Hands the current handle to the caller; it will not be released.
    pub fn detach(&mut self) -> Option<B::Handle> {
        self.current.take()
    }
}

impl<B: PlaybackBackend> Drop for PlaybackSlot<B> {
    fn drop(&mut self) {
        if let Some(handle) = self.current.take() {
            self.backend.release(handle);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::FilePlayback;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::PlaybackBackend;
    use crate::utils::audio::AudioInfo;
    use anyhow::{Context, Result};
    use log::{debug, warn};
    use std::fs;
    use std::path::PathBuf;

    /// Writes each generation to `{folder}/{stem}-{n:03}.{ext}`; released
    /// files are deleted.
    pub struct FilePlayback {
        folder: PathBuf,
        stem: String,
        generation: u32,
    }

    impl FilePlayback {
        pub fn new(folder: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
            Self {
                folder: folder.into(),
                stem: stem.into(),
                generation: 0,
            }
        }
    }

    impl PlaybackBackend for FilePlayback {
        type Handle = PathBuf;

        fn create(&mut self, audio: &[u8], info: &AudioInfo) -> Result<PathBuf> {
            fs::create_dir_all(&self.folder)
                .with_context(|| format!("Failed to create {}", self.folder.display()))?;

            let path = self.folder.join(format!(
                "{}-{:03}.{}",
                self.stem,
                self.generation + 1,
                info.extension()
            ));
            fs::write(&path, audio)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            self.generation += 1;
            debug!("Wrote {} bytes to {}", audio.len(), path.display());
            Ok(path)
        }

        fn release(&mut self, handle: PathBuf) {
            if let Err(e) = fs::remove_file(&handle) {
                warn!("Failed to remove superseded audio {}: {}", handle.display(), e);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::PlaybackBackend;
    use crate::utils::audio::AudioInfo;
    use anyhow::{bail, Result};
    use std::sync::{Arc, Mutex};

    /// Counts live handles; shared so tests can inspect after the slot moves.
    #[derive(Default, Clone)]
    pub struct CountingPlayback {
        pub live: Arc<Mutex<Vec<u32>>>,
        pub next: u32,
        pub fail: bool,
    }

    impl PlaybackBackend for CountingPlayback {
        type Handle = u32;

        fn create(&mut self, _audio: &[u8], _info: &AudioInfo) -> Result<u32> {
            if self.fail {
                bail!("playback unavailable");
            }
            self.next += 1;
            self.live.lock().unwrap().push(self.next);
            Ok(self.next)
        }

        fn release(&mut self, handle: u32) {
            self.live.lock().unwrap().retain(|h| *h != handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::CountingPlayback;
    use super::*;

    #[test]
    fn test_replace_releases_previous_handle() -> Result<()> {
        let backend = CountingPlayback::default();
        let live = backend.live.clone();
        let mut slot = PlaybackSlot::new(backend);
        let info = AudioInfo::detect(b"");

        for expected in 1..=5u32 {
            assert_eq!(slot.replace(b"audio", &info)?, expected);
            assert_eq!(*live.lock().unwrap(), vec![expected]);
        }
        assert_eq!(slot.current(), Some(&5));

        drop(slot);
        assert!(live.lock().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn test_failed_create_keeps_current() -> Result<()> {
        let backend = CountingPlayback::default();
        let live = backend.live.clone();
        let mut slot = PlaybackSlot::new(backend);
        let info = AudioInfo::detect(b"");

        slot.replace(b"audio", &info)?;
        slot.backend.fail = true;
        assert!(slot.replace(b"audio", &info).is_err());
        assert_eq!(slot.current(), Some(&1));
        assert_eq!(*live.lock().unwrap(), vec![1]);
        Ok(())
    }

    #[test]
    fn test_file_playback_deletes_superseded_files() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let folder = temp_dir.path().join("output");
        let mut slot = PlaybackSlot::new(FilePlayback::new(&folder, "generated"));

        let wav = crate::utils::audio::dummy_wav(32, 8_000);
        let info = AudioInfo::detect(&wav);

        let first = slot.replace(&wav, &info)?;
        assert_eq!(first, folder.join("generated-001.wav"));
        assert!(first.exists());

        let second = slot.replace(&wav, &info)?;
        assert_eq!(second, folder.join("generated-002.wav"));
        assert!(second.exists());
        assert!(!first.exists());

        assert_eq!(slot.detach(), Some(second.clone()));
        drop(slot);
        assert!(second.exists());
        Ok(())
    }
}
