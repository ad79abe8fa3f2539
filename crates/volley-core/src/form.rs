use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::CoreError;

const EOL: &str = "\r\n";

#[derive(Debug, Deserialize)]
struct FormSpec {
    form: serde_json::Map<String, serde_json::Value>,
}

/// One form entry: a bare string, a text value with optional metadata, or
/// a file reference resolved relative to the form file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FormField {
    Text(String),
    Meta {
        value: String,
        #[serde(rename = "content-type")]
        content_type: Option<String>,
    },
    File {
        filename: String,
        #[serde(rename = "content-type")]
        content_type: Option<String>,
    },
}

/// Builds a `multipart/form-data` body from a JSON form description.
///
/// The file must hold a top-level `form` object; parts are emitted in its
/// key order. `boundary` is written verbatim, so it may itself contain
/// tags that render later when the body is loaded as a template.
pub fn json2form(path: &Path, boundary: &str) -> Result<Vec<u8>, CoreError> {
    let text = fs::read_to_string(path).map_err(|error| CoreError::FileRead {
        path: path.display().to_string(),
        message: error.to_string(),
    })?;
    let spec: FormSpec = serde_json::from_str(&text).map_err(|error| CoreError::FormSpec {
        path: path.display().to_string(),
        message: error.to_string(),
    })?;

    let base_dir = path.parent().unwrap_or(Path::new(""));
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in &spec.form {
        let field: FormField =
            serde_json::from_value(value.clone()).map_err(|error| CoreError::FormSpec {
                path: path.display().to_string(),
                message: format!("field \"{name}\": {error}"),
            })?;

        body.extend_from_slice(format!("--{boundary}{EOL}").as_bytes());
        match field {
            FormField::Text(value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"{EOL}{EOL}").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormField::Meta { value, content_type } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"{EOL}").as_bytes(),
                );
                if let Some(content_type) = content_type {
                    body.extend_from_slice(format!("Content-Type: {content_type}{EOL}").as_bytes());
                }
                body.extend_from_slice(EOL.as_bytes());
                body.extend_from_slice(value.as_bytes());
            }
            FormField::File { filename, content_type } => {
                let file_path = base_dir.join(&filename);
                let content = fs::read(&file_path).map_err(|error| CoreError::FileRead {
                    path: file_path.display().to_string(),
                    message: error.to_string(),
                })?;
                let basename = Path::new(&filename)
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or(&filename);
                let content_type = content_type.as_deref().unwrap_or("application/octet-stream");

                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{basename}\"{EOL}"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(format!("Content-Type: {content_type}{EOL}{EOL}").as_bytes());
                body.extend_from_slice(&content);
            }
        }
        body.extend_from_slice(EOL.as_bytes());
    }

    body.extend_from_slice(format!("--{boundary}--{EOL}").as_bytes());

    Ok(body)
}
