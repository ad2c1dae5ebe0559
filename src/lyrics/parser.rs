//! LRC format parser
//!
//! Parses synchronized lyrics in LRC format:
//! [mm:ss.xx]Lyrics line here
//!
//! Example:
//! [00:12.34]Hello world
//! [00:15.00]Another line

/// How long the final line stays active; it has no successor to end it.
pub const LAST_LINE_WINDOW_MS: u64 = 5000;

/// A single line of lyrics with its active interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    /// Start of the line in milliseconds from track start
    pub start_ms: u64,
    /// Start of the next line, or `start_ms + LAST_LINE_WINDOW_MS`
    pub end_ms: u64,
    pub text: String,
}

impl LyricLine {
    pub fn new(start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    pub fn contains(&self, progress_ms: u64) -> bool {
        self.start_ms <= progress_ms && progress_ms < self.end_ms
    }
}

/// Parse LRC formatted lyrics into ordered lines with back-filled end times.
///
/// Lines that are blank, lack a `[`/`]` pair, or carry anything other than a
/// `mm:ss.cc` timestamp (metadata tags such as `[ar:...]` included) are
/// dropped without affecting the rest of the input.
pub fn parse_lrc(content: &str) -> Vec<LyricLine> {
    let mut lines = Vec::new();

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || !line.starts_with('[') {
            continue;
        }

        let Some(close) = line.find(']') else {
            continue;
        };

        let Some(start_ms) = parse_timestamp(&line[1..close]) else {
            continue;
        };

        let text = line[close + 1..].trim();
        lines.push(LyricLine::new(start_ms, 0, text));
    }

    // Stable, so lines sharing a timestamp keep their source order.
    lines.sort_by_key(|l| l.start_ms);

    let starts: Vec<u64> = lines.iter().skip(1).map(|l| l.start_ms).collect();
    for (line, next_start) in lines.iter_mut().zip(starts) {
        line.end_ms = next_start;
    }
    if let Some(last) = lines.last_mut() {
        last.end_ms = last.start_ms + LAST_LINE_WINDOW_MS;
    }

    lines
}

/// Parse a timestamp like "01:23.45" to milliseconds.
///
/// The fraction is centiseconds and must be exactly two digits.
fn parse_timestamp(s: &str) -> Option<u64> {
    let (min, rest) = s.split_once(':')?;
    let (sec, centis) = rest.split_once('.')?;

    if centis.len() != 2 || !all_digits(min) || !all_digits(sec) || !all_digits(centis) {
        return None;
    }

    let min: u64 = min.parse().ok()?;
    let sec: u64 = sec.parse().ok()?;
    let centis: u64 = centis.parse().ok()?;

    Some(min * 60 * 1000 + sec * 1000 + centis * 10)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:12.34"), Some(12340));
        assert_eq!(parse_timestamp("01:30.00"), Some(90000));
        assert_eq!(parse_timestamp("10:00.99"), Some(600990));
        assert_eq!(parse_timestamp("00:12"), None);
        assert_eq!(parse_timestamp("00:12.340"), None);
        assert_eq!(parse_timestamp("ar:Someone"), None);
        assert_eq!(parse_timestamp("0a:12.34"), None);
    }

    #[test]
    fn test_parse_two_lines() {
        let lines = parse_lrc("[00:01.50]Hello\n[00:03.00]World");
        assert_eq!(
            lines,
            vec![
                LyricLine::new(1500, 3000, "Hello"),
                LyricLine::new(3000, 8000, "World"),
            ]
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let lrc = r#"
[ti:Test Song]
[ar:Test Artist]
no timestamp here
[00:01.00 missing bracket
[00:xx.00]bad digits
[00:02.00]First line

[00:04.50]Second line
"#;
        let lines = parse_lrc(lrc);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "First line");
        assert_eq!(lines[0].start_ms, 2000);
        assert_eq!(lines[0].end_ms, 4500);
        assert_eq!(lines[1].end_ms, 9500);
    }

    #[test]
    fn test_empty_text_and_crlf() {
        let lines = parse_lrc("[00:00.00]\r\n[00:05.10]  spaced out  \r\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "");
        assert_eq!(lines[1].text, "spaced out");
        assert_eq!(lines[1].start_ms, 5100);
    }

    #[test]
    fn test_no_timed_lines() {
        assert!(parse_lrc("just some plain lyrics\nwithout timing").is_empty());
        assert!(parse_lrc("").is_empty());
    }

    #[test]
    fn test_contains_is_half_open() {
        let line = LyricLine::new(1000, 3000, "x");
        assert!(line.contains(1000));
        assert!(line.contains(2999));
        assert!(!line.contains(3000));
        assert!(!line.contains(999));
    }
}
