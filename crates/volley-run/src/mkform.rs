use std::fs;
use std::path::Path;

use colored::Colorize;
use miette::IntoDiagnostic;
use volley_core::json2form;

/// Default boundary written into the body. The tag refers back to the
/// boundary token in the header line, so both render to the same value
/// when the body is later loaded as a template.
const BODY_BOUNDARY: &str = "----WebKitFormBoundary{#header:0}";

const HEADER_HINT: &str =
    "Content-Type: multipart/form-data; boundary=----WebKitFormBoundary{t16-16}";

/// Renders a form description JSON into a sibling `.form-data` multipart
/// body template and prints the command line that sends it.
pub fn mkform(file: &Path, boundary: Option<&str>) -> miette::Result<()> {
    let body = json2form(file, boundary.unwrap_or(BODY_BOUNDARY))?;
    let output = file.with_extension("form-data");
    fs::write(&output, body).into_diagnostic()?;

    let header = match boundary {
        Some(custom) => format!("Content-Type: multipart/form-data; boundary={custom}"),
        None => HEADER_HINT.to_string(),
    };

    println!("{}", "## output:".bold().cyan());
    println!(
        "{}",
        format!("volley -b '{}' -H '{header}'", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use scopeguard::defer;

    use super::*;

    #[test]
    fn test_writes_a_form_data_sibling() {
        let (_, form_file) = volley_test::create_file(
            "volley_mkform_default.json",
            r#"{"form": {"user": "{t5-8}"}}"#,
        );
        let output = form_file.with_extension("form-data");
        defer! {
            let _ = fs::remove_file(&form_file);
            let _ = fs::remove_file(&output);
        }

        mkform(&form_file, None).unwrap();

        let body = fs::read_to_string(&output).unwrap();
        let expected = "------WebKitFormBoundary{#header:0}\r\n\
                        Content-Disposition: form-data; name=\"user\"\r\n\r\n{t5-8}\r\n\
                        ------WebKitFormBoundary{#header:0}--\r\n";
        assert_eq!(body, expected);
    }

    #[test]
    fn test_custom_boundary_is_written_verbatim() {
        let (_, form_file) =
            volley_test::create_file("volley_mkform_custom.json", r#"{"form": {"page": "1"}}"#);
        let output = form_file.with_extension("form-data");
        defer! {
            let _ = fs::remove_file(&form_file);
            let _ = fs::remove_file(&output);
        }

        mkform(&form_file, Some("XYZ")).unwrap();

        let body = fs::read_to_string(&output).unwrap();
        assert!(body.starts_with("--XYZ\r\n"));
        assert!(body.ends_with("--XYZ--\r\n"));
    }

    #[test]
    fn test_missing_input_fails() {
        assert!(mkform(Path::new("volley_mkform_missing.json"), None).is_err());
    }
}
