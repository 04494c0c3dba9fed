use std::collections::HashMap;
use std::path::Path;

use axum::http::HeaderMap;
use bytes::Bytes;
use uuid::Uuid;

use crate::models::FileRef;

/// Upload constraints enforced before any core logic sees the file.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["pdf", "docx", "zip", "rar", "jpg", "png"];

#[derive(Debug)]
pub struct UploadedFile {
    pub field: String,
    pub original_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Default)]
pub struct ParsedForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl ParsedForm {
    /// Trimmed text field, None when absent or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn take_file(&mut self, field: &str) -> Option<UploadedFile> {
        let idx = self.files.iter().position(|f| f.field == field)?;
        Some(self.files.remove(idx))
    }

    pub fn take_files(&mut self, field: &str) -> Vec<UploadedFile> {
        let (matched, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| f.field == field);
        self.files = rest;
        matched
    }
}

/// Parse a multipart body using multer. Parts carrying a filename become
/// files and are validated on the way in; the rest become text fields.
pub async fn parse_form(headers: &HeaderMap, body: Bytes) -> Result<ParsedForm, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = ParsedForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        let name = field.name().unwrap_or("unknown").to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| format!("File read error: {e}"))?;
                validate_file(&file_name, bytes.len())?;
                form.files.push(UploadedFile {
                    field: name,
                    original_name: file_name,
                    bytes,
                });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| format!("Field read error: {e}"))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

pub fn validate_file(original_name: &str, size: usize) -> Result<(), String> {
    if size > MAX_FILE_SIZE {
        return Err(format!(
            "File '{original_name}' exceeds the 10 MiB upload limit"
        ));
    }
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(format!("File format '.{ext}' is not allowed"));
    }
    Ok(())
}

/// Write an accepted upload under `{upload_dir}/{subdir}/` with a unique
/// stored name and return its metadata. The access path mirrors where a
/// reverse proxy or file server would expose the directory.
pub async fn store_file(
    upload_dir: &Path,
    subdir: &str,
    file: &UploadedFile,
) -> Result<FileRef, std::io::Error> {
    let stored_name = format!("{}-{}", Uuid::now_v7(), sanitize_file_name(&file.original_name));
    let dir = upload_dir.join(subdir);
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(&stored_name), &file.bytes).await?;

    Ok(FileRef {
        url: format!("/uploads/{subdir}/{stored_name}"),
        stored_name,
        original_name: file.original_name.clone(),
    })
}

fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
