use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use url::Url;

const JOB_ID_NAMESPACE: &str = "job_";
const JOB_ID_HASH_LEN: usize = 16;

/// Query parameters that only describe how the visitor arrived, never which
/// posting they arrived at.
const TRACKING_PARAMS: &[&str] = &["gclid", "fbclid", "mc_cid", "mc_eid", "igshid", "gh_src", "ref_src"];
const TRACKING_PREFIXES: &[&str] = &["utm_", "lever-"];

/// Canonical form of an apply URL, used as the dedup key across repeated
/// detections and ingestion paths. `None` when no usable URL is available.
pub fn normalize_apply_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&kept);
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path[..path.len() - 1].to_string();
        url.set_path(&trimmed);
    }

    Some(url.into())
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    TRACKING_PARAMS.iter().any(|param| key == *param)
        || TRACKING_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
}

/// Short deterministic job id for an apply URL: SHA-256 of the normalized
/// URL, base64url without padding, fixed-length prefix, namespaced.
/// Determinism is the only contract; equal normalized URLs always yield
/// equal ids.
pub fn job_id_for_url(raw: &str) -> Option<String> {
    let normalized = normalize_apply_url(raw)?;
    let digest = Sha256::digest(normalized.as_bytes());
    let encoded = URL_SAFE_NO_PAD.encode(digest);
    let short = encoded.get(..JOB_ID_HASH_LEN)?;
    Some(format!("{JOB_ID_NAMESPACE}{short}"))
}
