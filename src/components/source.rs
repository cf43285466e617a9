// file: src/components/source.rs
// description: resolves configured dataset urls into direct download links
// reference: https://docs.rs/regex

use crate::error::Result;
use crate::utils::Validator;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

const DRIVE_DOWNLOAD_PREFIX: &str = "https://drive.google.com/uc?export=download&id=";
const DRIVE_CONFIRM_ENDPOINT: &str = "https://drive.usercontent.google.com/download";

lazy_static! {
    static ref DRIVE_HOST: Regex = Regex::new(
        r"^https?://(?:drive|docs)\.google\.com/"
    ).expect("DRIVE_HOST regex is valid");

    static ref DRIVE_FILE_PATH_ID: Regex = Regex::new(
        r"/file/d/([A-Za-z0-9_-]+)"
    ).expect("DRIVE_FILE_PATH_ID regex is valid");

    static ref DRIVE_QUERY_ID: Regex = Regex::new(
        r"[?&]id=([A-Za-z0-9_-]+)"
    ).expect("DRIVE_QUERY_ID regex is valid");

    static ref FORM_FIELD: Regex = Regex::new(
        r#"name="(confirm|uuid|id)"\s+value="([^"]+)""#
    ).expect("FORM_FIELD regex is valid");

    static ref FORM_ACTION: Regex = Regex::new(
        r#"<form[^>]*\baction="(https?://[^"]+)""#
    ).expect("FORM_ACTION regex is valid");

    static ref CONFIRM_TOKEN: Regex = Regex::new(
        r"confirm=([0-9A-Za-z_-]+)"
    ).expect("CONFIRM_TOKEN regex is valid");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadSource {
    pub original: String,
    pub resolved: String,
    pub drive_file_id: Option<String>,
}

impl DownloadSource {
    pub fn is_drive(&self) -> bool {
        self.drive_file_id.is_some()
    }
}

/// Turns a share link into a direct download link.
///
/// Google Drive links of the form `/file/d/<id>/view`, `open?id=<id>` or
/// `uc?id=<id>` become `uc?export=download&id=<id>`; every other http(s)
/// url is returned unchanged.
pub fn resolve_download_url(url: &str) -> Result<DownloadSource> {
    let url = url.trim();
    Validator::validate_url(url)?;

    let drive_file_id = drive_file_id(url);
    let resolved = match &drive_file_id {
        Some(id) => format!("{}{}", DRIVE_DOWNLOAD_PREFIX, id),
        None => url.to_string(),
    };

    Ok(DownloadSource {
        original: url.to_string(),
        resolved,
        drive_file_id,
    })
}

fn drive_file_id(url: &str) -> Option<String> {
    if !DRIVE_HOST.is_match(url) {
        return None;
    }

    DRIVE_FILE_PATH_ID
        .captures(url)
        .or_else(|| DRIVE_QUERY_ID.captures(url))
        .map(|caps| caps[1].to_string())
}

/// Builds the follow-up url from Drive's "can't scan this file for viruses"
/// interstitial page. The form's own `action` is used when present, otherwise
/// the usercontent endpoint. Returns `None` when the page carries no confirm
/// token.
pub fn confirm_url_from_html(file_id: &str, html: &str) -> Option<String> {
    let mut confirm = None;
    let mut uuid = None;

    for caps in FORM_FIELD.captures_iter(html) {
        match &caps[1] {
            "confirm" => confirm = Some(caps[2].to_string()),
            "uuid" => uuid = Some(caps[2].to_string()),
            _ => {}
        }
    }

    if confirm.is_none() {
        confirm = CONFIRM_TOKEN
            .captures(html)
            .map(|caps| caps[1].to_string());
    }

    let confirm = confirm?;
    let endpoint = FORM_ACTION
        .captures(html)
        .map(|caps| caps[1].replace("&amp;", "&"))
        .unwrap_or_else(|| DRIVE_CONFIRM_ENDPOINT.to_string());

    let mut url = format!(
        "{}?id={}&export=download&confirm={}",
        endpoint, file_id, confirm
    );
    if let Some(uuid) = uuid {
        url.push_str("&uuid=");
        url.push_str(&uuid);
    }
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_drive_share_link() {
        let source = resolve_download_url(
            "https://drive.google.com/file/d/1z0mreUtRmR-P5Z_ZeQSWs3iaSqZ5J8gA/view?usp=sharing",
        )
        .unwrap();

        assert_eq!(
            source.drive_file_id.as_deref(),
            Some("1z0mreUtRmR-P5Z_ZeQSWs3iaSqZ5J8gA")
        );
        assert_eq!(
            source.resolved,
            "https://drive.google.com/uc?export=download&id=1z0mreUtRmR-P5Z_ZeQSWs3iaSqZ5J8gA"
        );
        assert!(source.is_drive());
    }

    #[test]
    fn test_resolve_drive_query_links() {
        let open = resolve_download_url("https://drive.google.com/open?id=abc_DEF-1").unwrap();
        assert_eq!(open.drive_file_id.as_deref(), Some("abc_DEF-1"));

        let uc = resolve_download_url("https://drive.google.com/uc?export=download&id=xyz").unwrap();
        assert_eq!(uc.drive_file_id.as_deref(), Some("xyz"));
        assert_eq!(uc.resolved, "https://drive.google.com/uc?export=download&id=xyz");
    }

    #[test]
    fn test_resolve_plain_url_unchanged() {
        let source = resolve_download_url("  https://example.com/file/d/data.zip ").unwrap();
        assert_eq!(source.resolved, "https://example.com/file/d/data.zip");
        assert_eq!(source.drive_file_id, None);
        assert!(!source.is_drive());
    }

    #[test]
    fn test_resolve_rejects_non_http() {
        assert!(resolve_download_url("s3://bucket/data.zip").is_err());
        assert!(resolve_download_url("").is_err());
    }

    #[test]
    fn test_confirm_url_from_form() {
        let html = r#"<form id="download-form" action="https://drive.usercontent.google.com/download" method="get">
            <input type="hidden" name="id" value="abc">
            <input type="hidden" name="export" value="download">
            <input type="hidden" name="confirm" value="t">
            <input type="hidden" name="uuid" value="1234-5678">
        </form>"#;

        assert_eq!(
            confirm_url_from_html("abc", html).as_deref(),
            Some("https://drive.usercontent.google.com/download?id=abc&export=download&confirm=t&uuid=1234-5678")
        );
    }

    #[test]
    fn test_confirm_url_uses_form_action() {
        let html = r#"<form id="download-form" action="http://127.0.0.1:8080/download" method="get">
            <input type="hidden" name="confirm" value="t">
        </form>"#;

        assert_eq!(
            confirm_url_from_html("abc", html).as_deref(),
            Some("http://127.0.0.1:8080/download?id=abc&export=download&confirm=t")
        );
    }

    #[test]
    fn test_confirm_url_from_legacy_link() {
        let html = r#"<a id="uc-download-link" href="/uc?export=download&amp;confirm=Xy_9&amp;id=abc">"#;
        assert_eq!(
            confirm_url_from_html("abc", html).as_deref(),
            Some("https://drive.usercontent.google.com/download?id=abc&export=download&confirm=Xy_9")
        );
    }

    #[test]
    fn test_confirm_url_missing_token() {
        assert_eq!(confirm_url_from_html("abc", "<html>quota exceeded</html>"), None);
    }
}
