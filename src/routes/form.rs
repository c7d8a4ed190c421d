//! Reading the admin dashboard's `multipart/form-data` submissions.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::{ClubError, ClubResult};
use crate::file::ImageUpload;

/// The one form field that may carry a file.
pub const IMAGE_FIELD: &str = "image";

/// The text fields of a form, plus its image (if one was chosen).
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub image: Option<ImageUpload>,
}

impl FormData {
    /// Reads the whole form. Images over `max_image_bytes` or with a
    /// non-image content type fail the request.
    pub async fn read(mut multipart: Multipart, max_image_bytes: u64) -> ClubResult<Self> {
        let mut form = FormData::default();

        while let Some(mut field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            if name != IMAGE_FIELD {
                let value = field.text().await?;
                form.fields.insert(name, value);
                continue;
            }

            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let mut content = Vec::new();
            while let Some(chunk) = field.chunk().await? {
                if (content.len() + chunk.len()) as u64 > max_image_bytes {
                    return Err(ClubError::PayloadTooLarge(format!(
                        "images may be at most {} bytes",
                        max_image_bytes
                    )));
                }
                content.extend_from_slice(&chunk);
            }

            // browsers send an empty part when no file was chosen
            if !content.is_empty() {
                form.image = Some(ImageUpload::new(file_name, content_type, content)?);
            }
        }

        Ok(form)
    }

    /// A text field, or `""` if it was never sent.
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// A text field that was sent and isn't blank.
    pub fn optional(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }

    /// The first of `names` that was sent non-blank.
    pub fn first_of(&self, names: &[&str]) -> String {
        names
            .iter()
            .find_map(|name| self.optional(name))
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub fn with_fields(fields: &[(&str, &str)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            image: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_missing() {
        let form = FormData::with_fields(&[("name", "Ada"), ("github", "  ")]);

        assert_eq!(form.text("name"), "Ada");
        assert_eq!(form.text("role"), "");
        assert_eq!(form.optional("github"), None);
    }

    #[test]
    fn first_of_skips_blank_fields() {
        let form = FormData::with_fields(&[("session_year", ""), ("year", "2025-26")]);
        assert_eq!(form.first_of(&["session_year", "year"]), "2025-26");
    }
}
