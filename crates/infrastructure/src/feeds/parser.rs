use netguard_domain::validators::normalize_domain;
use netguard_domain::{FeedEntry, SourceConfig};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Stream one feed body through the format-specific parser into `tx`.
///
/// The channel is bounded; when the store consumer falls behind, `send`
/// blocks and backpressure propagates all the way to the network reader.
/// The consumer detects completion when the sender is dropped at return.
pub async fn parse_and_stream<R>(reader: R, tx: mpsc::Sender<FeedEntry>, source: &SourceConfig)
where
    R: AsyncBufRead + Unpin,
{
    match source.format.as_str() {
        "text" => parse_text(reader, tx, source).await,
        "csv" => parse_csv(reader, tx, source).await,
        // Reserved format; nothing to emit yet.
        "json" => {}
        // hosts is both the named format and the fallback for unknown ones.
        _ => parse_hosts(reader, tx, source).await,
    }
}

async fn emit(tx: &mpsc::Sender<FeedEntry>, raw: &str, source: &Arc<str>) -> bool {
    match normalize_domain(raw) {
        Ok(domain) => tx
            .send(FeedEntry::blocked(domain, Arc::clone(source)))
            .await
            .is_ok(),
        Err(_) => {
            debug!(entry = raw, "Skipping invalid feed entry");
            true
        }
    }
}

/// `0.0.0.0 domain.com` convention: strip comments, split on whitespace,
/// the second field is the domain.
async fn parse_hosts<R>(reader: R, tx: mpsc::Sender<FeedEntry>, source: &SourceConfig)
where
    R: AsyncBufRead + Unpin,
{
    let name: Arc<str> = Arc::from(source.name.as_str());
    let mut lines = reader.lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(_addr), Some(domain)) = (fields.next(), fields.next()) else {
            continue;
        };

        if !emit(&tx, domain, &name).await {
            return;
        }
    }
}

/// One domain per non-empty, non-comment line.
async fn parse_text<R>(reader: R, tx: mpsc::Sender<FeedEntry>, source: &SourceConfig)
where
    R: AsyncBufRead + Unpin,
{
    let name: Arc<str> = Arc::from(source.name.as_str());
    let mut lines = reader.lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !emit(&tx, line, &name).await {
            return;
        }
    }
}

/// Header-aware CSV: the domain column is located by `target_column`,
/// case-insensitively. Rows that are short or empty at that column are
/// skipped; they never abort the stream.
async fn parse_csv<R>(reader: R, tx: mpsc::Sender<FeedEntry>, source: &SourceConfig)
where
    R: AsyncBufRead + Unpin,
{
    let name: Arc<str> = Arc::from(source.name.as_str());
    let target = source
        .target_column
        .as_deref()
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut lines = reader.lines();

    let header = match lines.next_line().await {
        Ok(Some(line)) => line,
        _ => {
            warn!(source = %source.name, "CSV feed has no header row");
            return;
        }
    };

    let Some(target_index) = header
        .split(',')
        .position(|col| col.trim().eq_ignore_ascii_case(&target))
    else {
        warn!(source = %source.name, column = %target, "Column not found in CSV header");
        return;
    };

    while let Ok(Some(line)) = lines.next_line().await {
        let Some(field) = line.split(',').nth(target_index) else {
            continue;
        };
        let domain = field.trim();
        if domain.is_empty() {
            continue;
        }
        if !emit(&tx, domain, &name).await {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netguard_domain::RuleAction;

    fn source(name: &str, format: &str, target_column: Option<&str>) -> SourceConfig {
        SourceConfig {
            name: name.to_string(),
            url: "https://example.com/feed".to_string(),
            format: format.to_string(),
            target_column: target_column.map(str::to_string),
        }
    }

    async fn collect(input: &'static [u8], src: SourceConfig) -> Vec<FeedEntry> {
        let (tx, mut rx) = mpsc::channel(64);
        parse_and_stream(input, tx, &src).await;

        let mut out = Vec::new();
        while let Some(entry) = rx.recv().await {
            out.push(entry);
        }
        out
    }

    #[tokio::test]
    async fn hosts_format_takes_second_field() {
        let input = b"0.0.0.0\tads.example.com\n# c\n0.0.0.0 track.example.com\n" as &[u8];
        let entries = collect(input, source("steven_black", "hosts", None)).await;

        let domains: Vec<&str> = entries.iter().map(|e| e.domain.as_str()).collect();
        assert_eq!(domains, vec!["ads.example.com", "track.example.com"]);
        for entry in &entries {
            assert_eq!(entry.action, RuleAction::Block);
            assert_eq!(&*entry.source, "steven_black");
        }
    }

    #[tokio::test]
    async fn hosts_format_strips_inline_comments() {
        let input = b"127.0.0.1 ads.net # blocked\n" as &[u8];
        let entries = collect(input, source("s", "hosts", None)).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].domain, "ads.net");
    }

    #[tokio::test]
    async fn hosts_format_skips_single_field_lines() {
        let input = b"localhost\n0.0.0.0 real.example.com\n" as &[u8];
        let entries = collect(input, source("s", "hosts", None)).await;
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn text_format_one_domain_per_line() {
        let input = b"# header\nads.com\n\ntracker.io\n" as &[u8];
        let entries = collect(input, source("s", "text", None)).await;
        let domains: Vec<&str> = entries.iter().map(|e| e.domain.as_str()).collect();
        assert_eq!(domains, vec!["ads.com", "tracker.io"]);
    }

    #[tokio::test]
    async fn text_format_lowercases() {
        let input = b"Ads.Example.COM\n" as &[u8];
        let entries = collect(input, source("s", "text", None)).await;
        assert_eq!(entries[0].domain, "ads.example.com");
    }

    #[tokio::test]
    async fn csv_format_uses_target_column() {
        let input = b"id,url,threat\n1,phishing.com,high\n2,virus.org,critical\n" as &[u8];
        let entries = collect(input, source("feed", "csv", Some("url"))).await;
        let domains: Vec<&str> = entries.iter().map(|e| e.domain.as_str()).collect();
        assert_eq!(domains, vec!["phishing.com", "virus.org"]);
    }

    #[tokio::test]
    async fn csv_header_lookup_is_case_insensitive() {
        let input = b"ID,URL\n1,phishing.com\n" as &[u8];
        let entries = collect(input, source("feed", "csv", Some("url"))).await;
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn csv_missing_column_emits_nothing() {
        let input = b"id,host\n1,phishing.com\n" as &[u8];
        let entries = collect(input, source("feed", "csv", Some("url"))).await;
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn csv_short_and_empty_rows_are_skipped() {
        let input = b"id,url\n1\n2,\n3,good.com\n" as &[u8];
        let entries = collect(input, source("feed", "csv", Some("url"))).await;
        let domains: Vec<&str> = entries.iter().map(|e| e.domain.as_str()).collect();
        assert_eq!(domains, vec!["good.com"]);
    }

    #[tokio::test]
    async fn json_format_is_a_no_op() {
        let input = b"{\"domains\": [\"a.com\"]}" as &[u8];
        let entries = collect(input, source("feed", "json", None)).await;
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn unknown_format_falls_back_to_hosts() {
        let input = b"0.0.0.0 ads.example.com\n" as &[u8];
        let entries = collect(input, source("feed", "dnsmasq", None)).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].domain, "ads.example.com");
    }
}
