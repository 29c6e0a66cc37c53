use crate::services::playback::PlaybackBackend;
use crate::utils::audio::AudioInfo;
use anyhow::{anyhow, Result};
use web_sys::{Blob, BlobPropertyBag, Url};

/// Exposes generated audio to the page through `blob:` object URLs.
#[derive(Default)]
pub struct ObjectUrlPlayback;

impl PlaybackBackend for ObjectUrlPlayback {
    type Handle = String;

    fn create(&mut self, audio: &[u8], info: &AudioInfo) -> Result<String> {
        let array = js_sys::Uint8Array::from(audio);
        let parts = js_sys::Array::of1(&array);

        let bag = BlobPropertyBag::new();
        bag.set_type(info.mime_type());

        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &bag)
            .map_err(|e| anyhow!("Blob error: {:?}", e))?;
        Url::create_object_url_with_blob(&blob).map_err(|e| anyhow!("Object URL error: {:?}", e))
    }

    fn release(&mut self, handle: String) {
        if let Err(e) = Url::revoke_object_url(&handle) {
            log::warn!("Failed to revoke {}: {:?}", handle, e);
        }
    }
}
