//! List media customization: custom icon and background images.
//!
//! Files go to object storage under a name derived from the list id, a
//! purpose tag and a random disambiguator, preserving the original
//! extension. The public URL is then persisted onto the list row; on any
//! failure the prior media is left untouched.

use crate::api::ApiClient;
use wasm_bindgen_futures::JsFuture;

pub(crate) const MEDIA_BUCKET: &str = "list-media";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum MediaPurpose {
    Icon,
    Background,
}

impl MediaPurpose {
    pub fn tag(self) -> &'static str {
        match self {
            MediaPurpose::Icon => "icon",
            MediaPurpose::Background => "bg",
        }
    }

    /// List-row column the public URL is persisted to.
    pub fn field(self) -> &'static str {
        match self {
            MediaPurpose::Icon => "icon-url",
            MediaPurpose::Background => "background-url",
        }
    }
}

fn file_extension(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && !ext.contains('/'))
        .unwrap_or("bin")
}

pub(crate) fn object_path_with(
    list_id: &str,
    purpose: MediaPurpose,
    file_name: &str,
    disambiguator: &str,
) -> String {
    format!(
        "{}/{}-{}.{}",
        list_id,
        purpose.tag(),
        disambiguator,
        file_extension(file_name)
    )
}

/// Storage object name for an upload. The random part keeps repeated
/// uploads for the same list/purpose from overwriting each other (the
/// old object may still be referenced until the row update lands).
pub(crate) fn object_path(list_id: &str, purpose: MediaPurpose, file_name: &str) -> String {
    let mut buf = [0u8; 8];
    // On failure the buffer stays zeroed; still a valid (just non-unique) name.
    let _ = getrandom::getrandom(&mut buf);
    let disambiguator: String = buf.iter().map(|b| format!("{:02x}", b)).collect();

    object_path_with(list_id, purpose, file_name, &disambiguator)
}

pub(crate) async fn read_file_bytes(file: &web_sys::File) -> Result<Vec<u8>, String> {
    let buf = JsFuture::from(file.array_buffer())
        .await
        .map_err(|_| "Could not read the selected file".to_string())?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

/// Upload a file and return its public URL. The caller persists the URL
/// onto the list row; if either step fails nothing references the new
/// object and prior media stays as it was.
pub(crate) async fn upload_list_media(
    api_client: &ApiClient,
    list_id: &str,
    purpose: MediaPurpose,
    file: &web_sys::File,
) -> Result<String, String> {
    let bytes = read_file_bytes(file).await?;

    let content_type = {
        let t = file.type_();
        if t.trim().is_empty() {
            "application/octet-stream".to_string()
        } else {
            t
        }
    };

    let path = object_path(list_id, purpose, &file.name());
    api_client
        .upload_media(MEDIA_BUCKET, &path, bytes, &content_type)
        .await
        .map_err(|e| e.to_string())?;

    Ok(api_client.public_media_url(MEDIA_BUCKET, &path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_keeps_extension_and_purpose_tag() {
        let path = object_path_with("l1", MediaPurpose::Background, "beach photo.JPEG", "abcd1234");
        assert_eq!(path, "l1/bg-abcd1234.JPEG");

        let path = object_path_with("l1", MediaPurpose::Icon, "cart.png", "ff00ff00");
        assert_eq!(path, "l1/icon-ff00ff00.png");
    }

    #[test]
    fn test_object_path_extension_fallback() {
        assert_eq!(
            object_path_with("l1", MediaPurpose::Icon, "noext", "00"),
            "l1/icon-00.bin"
        );
        // A trailing dot yields an empty extension; fall back too.
        assert_eq!(
            object_path_with("l1", MediaPurpose::Icon, "weird.", "00"),
            "l1/icon-00.bin"
        );
    }

    #[test]
    fn test_object_path_disambiguator_is_hex() {
        let path = object_path("l1", MediaPurpose::Icon, "a.png");
        let disambiguator = path
            .strip_prefix("l1/icon-")
            .and_then(|rest| rest.strip_suffix(".png"))
            .expect("path shape");
        assert_eq!(disambiguator.len(), 16);
        assert!(disambiguator.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_media_purpose_fields() {
        assert_eq!(MediaPurpose::Icon.field(), "icon-url");
        assert_eq!(MediaPurpose::Background.field(), "background-url");
    }
}
