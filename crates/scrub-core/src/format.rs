//! File-format inference from signed download URLs

use lazy_static::lazy_static;
use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

const DISPOSITION_PARAM: &str = "response-content-disposition";

lazy_static! {
    static ref FILENAME_RE: Regex = Regex::new(r"filename=([^;]+)").unwrap();
}

/// Infer the data format (lower-cased file extension) of a download URL
/// from the filename in its `response-content-disposition` parameter.
///
/// Returns `None` when the URL cannot be parsed or the parameter or its
/// `filename=` attribute is absent. A filename ending in a dot yields an
/// empty format.
pub fn infer_data_format(download_url: &str) -> Option<String> {
    let url = Url::parse(download_url).ok()?;
    let disposition = url
        .query_pairs()
        .find(|(key, _)| key == DISPOSITION_PARAM)
        .map(|(_, value)| value.into_owned())?;

    let raw = FILENAME_RE.captures(&disposition)?.get(1)?.as_str();
    let filename = percent_decode_str(raw).decode_utf8_lossy();
    let filename = filename.trim().trim_matches('"');

    let ext = filename.rsplit('.').next().unwrap_or(filename);
    Some(ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lower_cased() {
        let url = "https://files.example.com/obj?X-Amz-Expires=60&response-content-disposition=attachment%3B%20filename%3Dreport.PDF";
        assert_eq!(infer_data_format(url), Some("pdf".to_string()));
    }

    #[test]
    fn test_encoded_filename() {
        let url = "https://files.example.com/obj?response-content-disposition=attachment%3B%20filename%3Dmy%2520scan.v2.PNG%3B%20size%3D12";
        assert_eq!(infer_data_format(url), Some("png".to_string()));
    }

    #[test]
    fn test_quoted_filename() {
        let url = "https://files.example.com/obj?response-content-disposition=attachment%3B%20filename%3D%22notes.txt%22";
        assert_eq!(infer_data_format(url), Some("txt".to_string()));
    }

    #[test]
    fn test_missing_parameter() {
        assert_eq!(infer_data_format("https://files.example.com/obj?a=b"), None);
        assert_eq!(
            infer_data_format("https://files.example.com/obj?response-content-disposition=inline"),
            None
        );
        assert_eq!(infer_data_format("not a url"), None);
    }

    #[test]
    fn test_trailing_dot_gives_empty_format() {
        let url = "https://files.example.com/obj?response-content-disposition=attachment%3B%20filename%3Dreport.";
        assert_eq!(infer_data_format(url), Some(String::new()));
    }

    #[test]
    fn test_no_dot_uses_whole_name() {
        let url = "https://files.example.com/obj?response-content-disposition=attachment%3B%20filename%3DREADME";
        assert_eq!(infer_data_format(url), Some("readme".to_string()));
    }
}
