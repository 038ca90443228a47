//! Download payloads for written clips.
//!
//! Front ends hand the first clip back to the user both as raw bytes for
//! playback and as a self-contained HTML download link.

use base64::Engine as _;

/// Encodes bytes as standard base64.
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Builds an HTML anchor that downloads `bytes` under `file_name`.
///
/// ```ignore
/// let html = download_link_html(&clip.file_name(), &bytes, "Audio");
/// // <a href="data:application/octet-stream;base64,..." download="audio_0.wav">Download Audio</a>
/// ```
pub fn download_link_html(file_name: &str, bytes: &[u8], label: &str) -> String {
    format!(
        "<a href=\"data:application/octet-stream;base64,{}\" download=\"{}\">Download {}</a>",
        encode_base64(bytes),
        file_name,
        label
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_encoding() {
        assert_eq!(encode_base64(b"RIFF"), "UklGRg==");
        assert_eq!(encode_base64(b""), "");
    }

    #[test]
    fn link_uses_file_name_and_label() {
        let html = download_link_html("audio_0.wav", b"RIFF", "Audio");
        assert_eq!(
            html,
            concat!(
                "<a href=\"data:application/octet-stream;base64,UklGRg==\" ",
                "download=\"audio_0.wav\">Download Audio</a>"
            )
        );
    }
}
