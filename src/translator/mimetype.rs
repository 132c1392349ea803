//! Mimetype detection for inlined resources

use std::collections::HashMap;
use std::sync::Arc;

/// Detects the mimetype of a resource
pub trait MimeTypeProvider: Send + Sync {
    /// `None` when the provider cannot tell
    fn detect(&self, bytes: &[u8], name: &str) -> Option<String>;
}

/// Detection from well-known file signatures
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicBytesMimeTypeProvider;

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"BM", "image/bmp"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"II*\x00", "image/tiff"),
    (b"MM\x00*", "image/tiff"),
    (b"%PDF-", "application/pdf"),
];

impl MimeTypeProvider for MagicBytesMimeTypeProvider {
    fn detect(&self, bytes: &[u8], _name: &str) -> Option<String> {
        if let Some((_, mimetype)) = SIGNATURES.iter().find(|(sig, _)| bytes.starts_with(sig)) {
            return Some((*mimetype).to_string());
        }

        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some("image/webp".to_string());
        }

        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
        let head = head.trim_start();
        if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
            return Some("image/svg+xml".to_string());
        }

        None
    }
}

/// Detection from the file extension
#[derive(Debug, Clone)]
pub struct ExtensionMimeTypeProvider {
    mappings: HashMap<String, String>,
}

impl Default for ExtensionMimeTypeProvider {
    fn default() -> Self {
        let mappings = [
            ("png", "image/png"),
            ("jpg", "image/jpeg"),
            ("jpeg", "image/jpeg"),
            ("gif", "image/gif"),
            ("bmp", "image/bmp"),
            ("webp", "image/webp"),
            ("svg", "image/svg+xml"),
            ("ico", "image/x-icon"),
            ("tif", "image/tiff"),
            ("tiff", "image/tiff"),
            ("css", "text/css"),
            ("html", "text/html"),
            ("txt", "text/plain"),
            ("pdf", "application/pdf"),
        ]
        .into_iter()
        .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
        .collect();
        Self { mappings }
    }
}

impl ExtensionMimeTypeProvider {
    pub fn with_mapping(mut self, extension: impl Into<String>, mimetype: impl Into<String>) -> Self {
        self.mappings
            .insert(extension.into().to_ascii_lowercase(), mimetype.into());
        self
    }
}

impl MimeTypeProvider for ExtensionMimeTypeProvider {
    fn detect(&self, _bytes: &[u8], name: &str) -> Option<String> {
        let file_name = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
        let (_, extension) = file_name.rsplit_once('.')?;
        self.mappings.get(&extension.to_ascii_lowercase()).cloned()
    }
}

/// Always answers the same mimetype
#[derive(Debug, Clone)]
pub struct FixedMimeTypeProvider(String);

impl FixedMimeTypeProvider {
    pub fn new(mimetype: impl Into<String>) -> Self {
        Self(mimetype.into())
    }
}

impl MimeTypeProvider for FixedMimeTypeProvider {
    fn detect(&self, _bytes: &[u8], _name: &str) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Asks providers in order, the first answer wins
#[derive(Clone, Default)]
pub struct FirstSupportingMimeTypeProvider {
    providers: Vec<Arc<dyn MimeTypeProvider>>,
}

impl FirstSupportingMimeTypeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl MimeTypeProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Magic bytes, then extension, then `default` when given
    pub fn standard(default: Option<String>) -> Self {
        let chain = Self::new()
            .with(MagicBytesMimeTypeProvider)
            .with(ExtensionMimeTypeProvider::default());
        match default {
            Some(mimetype) => chain.with(FixedMimeTypeProvider::new(mimetype)),
            None => chain,
        }
    }
}

impl MimeTypeProvider for FirstSupportingMimeTypeProvider {
    fn detect(&self, bytes: &[u8], name: &str) -> Option<String> {
        self.providers
            .iter()
            .find_map(|provider| provider.detect(bytes, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

    #[test]
    fn test_magic_bytes() {
        let provider = MagicBytesMimeTypeProvider;
        assert_eq!(provider.detect(PNG, "x.bin"), Some("image/png".to_string()));
        assert_eq!(
            provider.detect(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>", "x"),
            Some("image/svg+xml".to_string())
        );
        assert_eq!(provider.detect(b"hello", "x"), None);
    }

    #[test]
    fn test_extension() {
        let provider = ExtensionMimeTypeProvider::default().with_mapping("AVIF", "image/avif");
        assert_eq!(provider.detect(b"", "/images/logo.JPG"), Some("image/jpeg".to_string()));
        assert_eq!(provider.detect(b"", "photo.avif"), Some("image/avif".to_string()));
        assert_eq!(provider.detect(b"", "noextension"), None);
    }

    #[test]
    fn test_standard_chain() {
        let without_default = FirstSupportingMimeTypeProvider::standard(None);
        assert_eq!(without_default.detect(PNG, "logo.gif"), Some("image/png".to_string()));
        assert_eq!(without_default.detect(b"???", "logo.gif"), Some("image/gif".to_string()));
        assert_eq!(without_default.detect(b"???", "logo"), None);

        let with_default =
            FirstSupportingMimeTypeProvider::standard(Some("application/octet-stream".into()));
        assert_eq!(
            with_default.detect(b"???", "logo"),
            Some("application/octet-stream".to_string())
        );
    }
}
