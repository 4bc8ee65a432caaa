use std::time::Duration;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

/// Host-side stand-in for the browser's page load: fetches a document so a
/// page agent can be injected into it.
#[derive(Debug, Clone)]
pub struct LoadSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("request timed out")]
    Timeout,
    #[error("redirect limit exceeded")]
    RedirectLimit,
    #[error("document too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: u64 },
    #[error("unsupported content type {0}")]
    UnsupportedContentType(String),
    #[error("could not decode document as {0}")]
    Decode(String),
    #[error("network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub html: String,
    pub final_url: String,
    pub encoding: String,
    pub byte_len: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    settings: LoadSettings,
}

impl DocumentLoader {
    pub fn new(settings: LoadSettings) -> Self {
        Self { settings }
    }

    pub async fn load(&self, url: &str) -> Result<LoadedDocument, LoadError> {
        let parsed =
            reqwest::Url::parse(url).map_err(|err| LoadError::InvalidUrl(err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(
                self.settings.redirect_limit,
            ))
            .build()
            .map_err(|err| LoadError::Network(err.to_string()))?;

        let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(LoadError::UnsupportedContentType(ct.to_string()));
            }
        }
        if let Some(len) = response.content_length() {
            if len > self.settings.max_bytes {
                return Err(LoadError::TooLarge {
                    max_bytes: self.settings.max_bytes,
                });
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > self.settings.max_bytes {
                return Err(LoadError::TooLarge {
                    max_bytes: self.settings.max_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        let (html, encoding) = decode_document(&bytes, content_type.as_deref())?;
        Ok(LoadedDocument {
            html,
            final_url,
            encoding,
            byte_len: bytes.len() as u64,
        })
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }
}

/// Decode order: BOM, then Content-Type charset, then a chardetng guess.
fn decode_document(
    bytes: &[u8],
    content_type: Option<&str>,
) -> Result<(String, String), LoadError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }
    if let Some(label) = content_type.and_then(charset_label) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, encoding);
        }
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let part = part.trim();
        match part.get(..8) {
            Some(prefix) if prefix.eq_ignore_ascii_case("charset=") => {
                Some(part[8..].trim_matches([' ', '"', '\''].as_ref()).to_string())
            }
            _ => None,
        }
    })
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Result<(String, String), LoadError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(LoadError::Decode(encoding.name().to_string()));
    }
    Ok((text.into_owned(), encoding.name().to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> LoadError {
    if err.is_timeout() {
        return LoadError::Timeout;
    }
    if err.is_redirect() {
        return LoadError::RedirectLimit;
    }
    LoadError::Network(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_label_is_parsed_from_content_type() {
        assert_eq!(
            charset_label("text/html; charset=ISO-8859-1"),
            Some("ISO-8859-1".to_string())
        );
        assert_eq!(
            charset_label(r#"text/html; Charset="utf-8""#),
            Some("utf-8".to_string())
        );
        assert_eq!(charset_label("text/html"), None);
    }

    #[test]
    fn bom_wins_over_header_charset() {
        let bytes = b"\xEF\xBB\xBFhola";
        let (html, encoding) =
            decode_document(bytes, Some("text/html; charset=ISO-8859-1")).unwrap();
        assert_eq!(html, "hola");
        assert_eq!(encoding, "UTF-8");
    }

    #[test]
    fn header_charset_decodes_latin1() {
        let bytes = b"caf\xe9";
        let (html, _) = decode_document(bytes, Some("text/html; charset=ISO-8859-1")).unwrap();
        assert_eq!(html, "café");
    }
}
