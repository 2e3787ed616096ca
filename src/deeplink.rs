/// Build the `fusion360://` Open-on-Desktop link for a document.
pub fn open_on_desktop_url(lineage_urn: &str, hub_web_url: &str, document_name: &str) -> String {
    format!(
        "fusion360://lineageUrn={}&hubUrl={}&documentName={}",
        encode(lineage_urn),
        encode(&normalize_hub_url(hub_web_url)),
        encode(document_name)
    )
}

/// Drop spaces and the trailing locale suffix, then uppercase.
///
/// The suffix is taken as the last three characters (`/en`); any run of
/// those characters at the end is stripped.
pub fn normalize_hub_url(hub_web_url: &str) -> String {
    let compact: String = hub_web_url.chars().filter(|c| *c != ' ').collect();
    let suffix: Vec<char> = {
        let chars: Vec<char> = hub_web_url.chars().collect();
        chars[chars.len().saturating_sub(3)..].to_vec()
    };
    compact
        .trim_end_matches(|c: char| suffix.contains(&c))
        .to_uppercase()
}

/// Percent-encode, leaving `/` alone.
fn encode(value: &str) -> String {
    urlencoding::encode(value).replace("%2F", "/")
}
