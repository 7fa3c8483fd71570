use regex_lite::Regex;

/// Pulls the quoted reply body out of a raw completion.
///
/// Completions are expected to echo the transcript line format and end in
/// `: "message"`. The first such segment wins; the capture is greedy so inner
/// quotes survive. An empty return means extraction failed.
pub fn extract_reply(completion: &str) -> String {
    let re = Regex::new(r#":\s*"(.*)""#).ok();
    re.and_then(|re| {
        re.captures(completion)
            .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
    })
    .unwrap_or_default()
}
