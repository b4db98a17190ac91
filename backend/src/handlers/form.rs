//! Multipart form reading shared by the upload endpoints

use std::collections::HashMap;

use axum::extract::Multipart;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::ImagePayload;

use crate::error::AppResult;

/// One multipart field, buffered
#[derive(Debug, Clone)]
pub struct FormField {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl FormField {
    fn is_file(&self) -> bool {
        self.file_name.is_some()
            || self
                .content_type
                .as_deref()
                .is_some_and(|ct| !ct.starts_with("text/"))
    }
}

/// Buffered multipart body keyed by field name
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, FormField>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let content_type = field.content_type().map(str::to_string);
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await?.to_vec();

            fields.insert(
                name,
                FormField {
                    bytes,
                    content_type,
                    file_name,
                },
            );
        }

        Ok(Self { fields })
    }

    pub fn text(&self, name: &str) -> Option<String> {
        let field = self.fields.get(name)?;
        let text = String::from_utf8_lossy(&field.bytes).trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    /// Non-empty field of any kind
    pub fn file(&self, name: &str) -> Option<&FormField> {
        self.fields.get(name).filter(|f| !f.bytes.is_empty())
    }

    /// An uploaded image file, or a base64 / data URL string field
    pub fn image(&self, name: &str) -> Option<ImagePayload> {
        let field = self.file(name)?;

        if field.is_file() {
            let mime_type = field
                .content_type
                .as_deref()
                .filter(|ct| ct.starts_with("image/"))
                .unwrap_or(ImagePayload::DEFAULT_MIME_TYPE)
                .to_string();
            return Some(ImagePayload {
                mime_type,
                data: STANDARD.encode(&field.bytes),
            });
        }

        ImagePayload::from_base64_input(&String::from_utf8_lossy(&field.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, field: FormField) -> FormData {
        let mut fields = HashMap::new();
        fields.insert(name.to_string(), field);
        FormData { fields }
    }

    #[test]
    fn test_file_upload_is_base64_encoded() {
        let data = form(
            "image",
            FormField {
                bytes: vec![0xff, 0xd8, 0xff],
                content_type: Some("image/png".to_string()),
                file_name: Some("leaf.png".to_string()),
            },
        );
        let image = data.image("image").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "/9j/");
    }

    #[test]
    fn test_string_field_is_parsed_as_data_url() {
        let data = form(
            "image",
            FormField {
                bytes: b"data:image/webp;base64,UklGR".to_vec(),
                content_type: None,
                file_name: None,
            },
        );
        let image = data.image("image").unwrap();
        assert_eq!(image.mime_type, "image/webp");
        assert_eq!(image.data, "UklGR");
    }

    #[test]
    fn test_empty_field_is_absent() {
        let data = form(
            "image",
            FormField {
                bytes: Vec::new(),
                content_type: Some("image/jpeg".to_string()),
                file_name: Some("empty.jpg".to_string()),
            },
        );
        assert!(data.image("image").is_none());
        assert!(data.text("language").is_none());
    }
}
