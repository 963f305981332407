use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

// Compiled once; extraction runs on every scanned site.
static RE_EVAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"eval\s*\(").unwrap());
static RE_UNESCAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"unescape\s*\(").unwrap());
static RE_DOC_WRITE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"document\.write").unwrap());
static RE_LOCATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"window\.location").unwrap());
static RE_HIDDEN_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<input[^>]*type\s*=\s*["']?hidden"#).unwrap());
static RE_PASSWORD_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<input[^>]*type\s*=\s*["']?password"#).unwrap());
static RE_EXTERNAL_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<a\s[^>]*href\s*=\s*["']?https?://"#).unwrap());

const KW_MALWARE: [&str; 6] = ["verify", "account", "suspended", "confirm", "security", "urgent"];
const KW_ADWARE: [&str; 6] = ["winner", "spin", "bonus", "casino", "prize", "jackpot"];
const KW_CRYPTO: [&str; 4] = ["bitcoin", "crypto", "wallet", "mining"];
const KW_ACTION: [&str; 4] = ["download", "play", "install", "stream"];

/// Turn a fetched page into the classifier input vector.
///
/// The map of named features is flattened into a `Vec<f32>` following
/// `order` (the `feature_names.txt` contents); names the extractor does not
/// produce resolve to 0.0, so a model trained with extra features still gets
/// a vector of the right arity.
pub fn extract_features(html: &str, target_url: &str, order: &[String]) -> Vec<f32> {
    let html_lower = html.to_ascii_lowercase();
    let text = strip_tags(html);
    let text_lower = text.to_ascii_lowercase();
    let scripts = collect_script_bodies(&html_lower);

    let html_len = html.len() as f32;
    let text_len = text.len() as f32;

    let mut f: HashMap<&str, f32> = HashMap::new();

    // Structural
    f.insert("html_len", html_len);
    f.insert("text_len", text_len);
    f.insert(
        "text_ratio",
        if html_len > 0.0 { text_len / html_len } else { 0.0 },
    );
    let title = extract_title(&html_lower);
    f.insert("has_title", if title.is_some() { 1.0 } else { 0.0 });
    f.insert("title_len", title.map_or(0.0, |t| t.len() as f32));
    f.insert("num_meta_tags", count_tag(&html_lower, "meta") as f32);

    // Scripting
    f.insert("num_script_tags", count_tag(&html_lower, "script") as f32);
    f.insert("script_len", scripts.len() as f32);
    f.insert("count_eval", RE_EVAL.find_iter(&scripts).count() as f32);
    f.insert("count_unescape", RE_UNESCAPE.find_iter(&scripts).count() as f32);
    f.insert("count_doc_write", RE_DOC_WRITE.find_iter(&scripts).count() as f32);
    f.insert("count_redirect", RE_LOCATION.find_iter(&scripts).count() as f32);

    // Elements
    f.insert("num_iframes", count_tag(&html_lower, "iframe") as f32);
    f.insert("num_forms", count_tag(&html_lower, "form") as f32);
    f.insert("num_inputs", count_tag(&html_lower, "input") as f32);
    f.insert("num_hidden_tags", RE_HIDDEN_INPUT.find_iter(html).count() as f32);
    f.insert(
        "num_password_inputs",
        RE_PASSWORD_INPUT.find_iter(html).count() as f32,
    );
    f.insert(
        "num_external_links",
        RE_EXTERNAL_LINK.find_iter(html).count() as f32,
    );

    // Keywords
    f.insert("kw_malware", count_keywords(&text_lower, &KW_MALWARE));
    f.insert("kw_adware", count_keywords(&text_lower, &KW_ADWARE));
    f.insert("kw_crypto", count_keywords(&text_lower, &KW_CRYPTO));
    f.insert("kw_action", count_keywords(&text_lower, &KW_ACTION));

    // URL shape. A garbage URL degrades to all-zero URL features instead of
    // failing the scan.
    let (is_https, host, path) = match url::Url::parse(target_url) {
        Ok(u) => (
            u.scheme() == "https",
            u.host_str().unwrap_or("").to_string(),
            u.path().to_string(),
        ),
        Err(_) => (false, String::new(), String::new()),
    };
    f.insert("is_https", if is_https { 1.0 } else { 0.0 });
    f.insert("domain_len", host.len() as f32);
    f.insert("path_len", path.len() as f32);
    f.insert(
        "domain_digits",
        host.chars().filter(char::is_ascii_digit).count() as f32,
    );

    order
        .iter()
        .map(|name| f.get(name.as_str()).copied().unwrap_or(0.0))
        .collect()
}

/// Visible-ish text: everything outside angle brackets. Script bodies count
/// as text here, matching how the training extractor measured pages.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Count `<name` openings where the tag name ends exactly there, so `<form`
/// does not count `<formation` and `<input` stays distinct from `<inputarea`.
fn count_tag(html_lower: &str, name: &str) -> usize {
    let needle = format!("<{name}");
    html_lower
        .match_indices(&needle)
        .filter(|(idx, _)| {
            html_lower[idx + needle.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_ascii_alphanumeric())
        })
        .count()
}

fn extract_title(html_lower: &str) -> Option<&str> {
    let open = html_lower.find("<title")?;
    let content_start = open + html_lower[open..].find('>')? + 1;
    let content_len = html_lower[content_start..].find("</title")?;
    Some(html_lower[content_start..content_start + content_len].trim())
}

/// Concatenated contents of every `<script>` element.
fn collect_script_bodies(html_lower: &str) -> String {
    let mut out = String::new();
    let mut rest = html_lower;

    while let Some(open) = rest.find("<script") {
        let after_open = &rest[open..];
        let Some(gt) = after_open.find('>') else {
            break;
        };
        let body_start = open + gt + 1;
        let body = &rest[body_start..];
        match body.find("</script") {
            Some(end) => {
                out.push_str(&body[..end]);
                rest = &body[end..];
            }
            None => {
                out.push_str(body);
                break;
            }
        }
    }

    out
}

fn count_keywords(text_lower: &str, keywords: &[&str]) -> f32 {
    keywords
        .iter()
        .map(|kw| text_lower.matches(kw).count())
        .sum::<usize>() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    const PAGE: &str = r#"<html><head><title>Win a PRIZE</title><meta charset="utf-8"></head>
<body>
<p>Spin the wheel, winner! Verify your account now.</p>
<form><input type="text"><input type="hidden" name="t"><input type="password" name="p"></form>
<iframe src="https://ads.example.com"></iframe>
<a href="https://elsewhere.com">out</a>
<a href="/local">in</a>
<script>eval(payload); document.write(x); window.location = "https://bad.io";</script>
</body></html>"#;

    #[test]
    fn vector_follows_feature_order() {
        let v = extract_features(PAGE, "https://spin-to-win.example", &order(&[
            "num_iframes",
            "num_forms",
            "has_title",
        ]));
        assert_eq!(v, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn unknown_feature_names_become_zero() {
        let v = extract_features(PAGE, "https://a.example", &order(&["no_such_feature"]));
        assert_eq!(v, vec![0.0]);
    }

    #[test]
    fn counts_inputs_and_hidden_fields() {
        let v = extract_features(PAGE, "https://a.example", &order(&[
            "num_inputs",
            "num_hidden_tags",
            "num_password_inputs",
        ]));
        assert_eq!(v, vec![3.0, 1.0, 1.0]);
    }

    #[test]
    fn counts_script_markers() {
        let v = extract_features(PAGE, "https://a.example", &order(&[
            "num_script_tags",
            "count_eval",
            "count_doc_write",
            "count_redirect",
        ]));
        assert_eq!(v, vec![1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn counts_keywords_in_page_text() {
        let v = extract_features(PAGE, "https://a.example", &order(&["kw_adware", "kw_malware"]));
        // adware: spin, winner, prize (title); malware: verify, account
        assert_eq!(v, vec![3.0, 2.0]);
    }

    #[test]
    fn external_links_require_absolute_scheme() {
        let v = extract_features(PAGE, "https://a.example", &order(&["num_external_links"]));
        assert_eq!(v, vec![1.0]);
    }

    #[test]
    fn url_features() {
        let v = extract_features("", "https://host123.example/long/path", &order(&[
            "is_https",
            "domain_len",
            "path_len",
            "domain_digits",
        ]));
        assert_eq!(v, vec![1.0, 15.0, 10.0, 3.0]);
    }

    #[test]
    fn malformed_url_degrades_to_zero_url_features() {
        let v = extract_features("<html></html>", "not a url", &order(&[
            "is_https",
            "domain_len",
        ]));
        assert_eq!(v, vec![0.0, 0.0]);
    }

    #[test]
    fn empty_page_is_all_zero_except_ratio() {
        let v = extract_features("", "https://a.example", &order(&[
            "html_len",
            "text_len",
            "text_ratio",
            "num_script_tags",
        ]));
        assert_eq!(v, vec![0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn tag_prefix_does_not_overcount() {
        let html = "<formation></formation><form></form>";
        let v = extract_features(html, "https://a.example", &order(&["num_forms"]));
        assert_eq!(v, vec![1.0]);
    }
}
