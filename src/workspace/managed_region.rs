//! Machine-owned regions inside hand-maintained Terraform files
//!
//! Generated content lives between a BEGIN and an END marker comment. Each
//! region has its own label, so several regions can share one file:
//!
//! ```text
//! # BEGIN sqs-tf module calls (generated 2024-01-01T00:00:00Z)
//! module "sqs_orders" { ... }
//! # END sqs-tf module calls
//! ```
//!
//! A BEGIN line without a matching END (an interrupted run, or a file written
//! by the old sentinel-only generator) is cleaned up according to the
//! region's [`RegionKind`].

use chrono::{DateTime, SecondsFormat, Utc};
use lazy_static::lazy_static;
use regex::Regex;

const MARKER_TOOL: &str = "sqs-tf";

lazy_static! {
    static ref OUTPUT_HEADER: Regex = Regex::new(r#"^\s*output\s+"([^"]*)""#).unwrap();
}

/// How to clean up a BEGIN marker that has no END marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind<'a> {
    /// Drop everything from the marker to end of file
    Truncate,
    /// Drop the marker and every later `output` block whose name starts with `prefix`
    NamedBlocks { prefix: &'a str },
}

/// A labelled managed region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedRegion<'a> {
    pub label: &'a str,
    pub kind: RegionKind<'a>,
}

impl ManagedRegion<'_> {
    pub fn begin_marker(&self) -> String {
        format!("# BEGIN {} {}", MARKER_TOOL, self.label)
    }

    pub fn end_marker(&self) -> String {
        format!("# END {} {}", MARKER_TOOL, self.label)
    }

    /// The BEGIN marker line for a region generated at `generated_at`
    pub fn begin_line(&self, generated_at: &DateTime<Utc>) -> String {
        format!(
            "{} (generated {})",
            self.begin_marker(),
            generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// Marker lines of one region, built once per scan
struct Markers {
    begin: String,
    end: String,
}

impl Markers {
    fn of(region: &ManagedRegion) -> Self {
        Self {
            begin: region.begin_marker(),
            end: region.end_marker(),
        }
    }

    fn is_begin(&self, line: &str) -> bool {
        line.trim_start()
            .strip_prefix(self.begin.as_str())
            .is_some_and(|rest| rest.trim().is_empty() || rest.starts_with(' '))
    }

    fn is_end(&self, line: &str) -> bool {
        line.trim() == self.end
    }
}

/// Remove every occurrence of `region` from `content`.
///
/// Content without the region's BEGIN marker is returned unchanged. The result
/// never contains that marker, so stripping twice is the same as stripping once.
/// Regions with other labels are left alone.
pub fn strip_managed(content: &str, region: &ManagedRegion) -> String {
    let markers = Markers::of(region);
    if !content.lines().any(|line| markers.is_begin(line)) {
        return content.to_string();
    }

    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        if !markers.is_begin(lines[i]) {
            kept.push(lines[i]);
            i += 1;
            continue;
        }

        // The blank separator written in front of the region goes with it
        while kept.last().is_some_and(|line| line.trim().is_empty()) {
            kept.pop();
        }

        if let Some(end) = (i + 1..lines.len()).find(|&j| markers.is_end(lines[j])) {
            i = end + 1;
            continue;
        }

        // Unterminated region
        match region.kind {
            RegionKind::Truncate => break,
            RegionKind::NamedBlocks { prefix } => {
                kept.extend(strip_named_blocks(&lines[i + 1..], prefix, &markers));
                break;
            }
        }
    }

    let mut result = kept.concat();
    trim_trailing_blank_lines(&mut result);
    result
}

/// Replace `region` in `content` with `body`, appending it at the end
pub fn replace_managed(
    content: &str,
    region: &ManagedRegion,
    body: &str,
    generated_at: &DateTime<Utc>,
) -> String {
    let mut result = strip_managed(content, region);
    let kept_len = result.trim_end().len();
    result.truncate(kept_len);

    if !result.is_empty() {
        result.push_str("\n\n");
    }

    result.push_str(&region.begin_line(generated_at));
    result.push('\n');

    let body = body.trim_end_matches('\n');
    if !body.is_empty() {
        result.push_str(body);
        result.push('\n');
    }

    result.push_str(&region.end_marker());
    result.push('\n');
    result
}

/// Legacy cleanup: skip output blocks named `<prefix>...` and stray BEGIN lines
fn strip_named_blocks<'a>(lines: &[&'a str], prefix: &str, markers: &Markers) -> Vec<&'a str> {
    let mut kept = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if markers.is_begin(line) {
            i += 1;
            continue;
        }

        let owned = OUTPUT_HEADER
            .captures(line)
            .and_then(|c| c.get(1))
            .is_some_and(|name| name.as_str().starts_with(prefix));

        if owned {
            i += block_len(&lines[i..]);
        } else {
            kept.push(line);
            i += 1;
        }
    }

    kept
}

/// Number of lines spanned by the block starting at `lines[0]`.
///
/// Braces are balanced across lines, ignoring braces inside quoted strings,
/// line comments and `/* */` comments, so nested objects inside a block are
/// handled. An unbalanced block extends to the end of input.
fn block_len(lines: &[&str]) -> usize {
    let mut depth: i64 = 0;
    let mut opened = false;
    let mut in_block_comment = false;

    for (idx, line) in lines.iter().enumerate() {
        let mut in_string = false;
        let mut escaped = false;
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            if in_block_comment {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    in_block_comment = false;
                }
                continue;
            }

            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }

            match c {
                '"' => in_string = true,
                '#' => break,
                '/' if chars.peek() == Some(&'/') => break,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    in_block_comment = true;
                }
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }

        if opened && depth <= 0 {
            return idx + 1;
        }
    }

    lines.len()
}

fn trim_trailing_blank_lines(text: &mut String) {
    let kept_len = text.trim_end().len();
    text.truncate(kept_len);
    if !text.is_empty() {
        text.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const CALLS: ManagedRegion<'static> = ManagedRegion {
        label: "module calls",
        kind: RegionKind::Truncate,
    };
    const OUTPUTS: ManagedRegion<'static> = ManagedRegion {
        label: "outputs",
        kind: RegionKind::NamedBlocks { prefix: "sqs_" },
    };

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_markers() {
        assert_eq!(
            CALLS.begin_line(&at(12)),
            "# BEGIN sqs-tf module calls (generated 2024-05-01T12:00:00Z)"
        );
        assert_eq!(CALLS.end_marker(), "# END sqs-tf module calls");
        assert_eq!(OUTPUTS.begin_marker(), "# BEGIN sqs-tf outputs");
    }

    #[test]
    fn test_content_without_marker_is_untouched() {
        let content = "provider \"aws\" {}\n\n\n";
        assert_eq!(strip_managed(content, &CALLS), content);
        assert_eq!(strip_managed("", &OUTPUTS), "");
    }

    #[test]
    fn test_strip_region_keeps_surrounding_content() {
        let content = format!(
            "terraform {{}}\n\n{}\nmodule \"sqs_a\" {{}}\n{}\n\nlocals {{\n  x = 1\n}}\n",
            CALLS.begin_line(&at(1)),
            CALLS.end_marker()
        );

        assert_eq!(
            strip_managed(&content, &CALLS),
            "terraform {}\n\nlocals {\n  x = 1\n}\n"
        );
    }

    #[test]
    fn test_strip_is_idempotent() {
        for region in [CALLS, OUTPUTS] {
            let begin = region.begin_line(&at(1));
            let inputs = vec![
                format!("a\n{}\nb\n{}\n", begin, region.end_marker()),
                format!("a\n{}\nmodule \"x\" {{}}\n", begin),
                format!(
                    "output \"keep\" {{\n  value = 1\n}}\n{}\noutput \"sqs_q_url\" {{\n  value = 2\n}}\n",
                    begin
                ),
                "no markers here\n".to_string(),
            ];

            for input in inputs {
                let once = strip_managed(&input, &region);
                let twice = strip_managed(&once, &region);
                assert_eq!(once, twice, "not idempotent for {:?}", input);
                assert!(!twice.contains(&region.begin_marker()));
            }
        }
    }

    #[test]
    fn test_regions_with_other_labels_are_kept() {
        let content = format!(
            "{}\noutput \"sqs_a_url\" {{}}\n{}\n",
            OUTPUTS.begin_line(&at(1)),
            OUTPUTS.end_marker()
        );

        assert_eq!(strip_managed(&content, &CALLS), content);
        assert_eq!(strip_managed(&content, &OUTPUTS), "");
    }

    #[test]
    fn test_two_regions_share_one_file() {
        let calls = "module \"sqs_a\" {}\n";
        let outputs = "output \"sqs_a_url\" {\n  value = module.sqs_a.url\n}\n";

        let mut content = "provider \"aws\" {}\n".to_string();
        for _ in 0..3 {
            content = replace_managed(&content, &CALLS, calls, &at(2));
            content = replace_managed(&content, &OUTPUTS, outputs, &at(2));
        }

        assert_eq!(
            content,
            "provider \"aws\" {}\n\n\
             # BEGIN sqs-tf module calls (generated 2024-05-01T02:00:00Z)\n\
             module \"sqs_a\" {}\n\
             # END sqs-tf module calls\n\n\
             # BEGIN sqs-tf outputs (generated 2024-05-01T02:00:00Z)\n\
             output \"sqs_a_url\" {\n  value = module.sqs_a.url\n}\n\
             # END sqs-tf outputs\n"
        );
    }

    #[test]
    fn test_unterminated_region_truncates_module_calls() {
        let content = format!(
            "provider \"aws\" {{}}\n\n{}\nmodule \"sqs_a\" {{\n}}\nmodule \"sqs_b\" {{\n}}\n",
            CALLS.begin_line(&at(1))
        );

        assert_eq!(strip_managed(&content, &CALLS), "provider \"aws\" {}\n");
    }

    #[test]
    fn test_unterminated_region_skips_owned_outputs_only() {
        let content = format!(
            "output \"vpc_id\" {{\n  value = 1\n}}\n\n{}\noutput \"sqs_a_url\" {{\n  value = module.sqs_a.url\n}}\n\noutput \"user_defined\" {{\n  value = \"}}\"\n}}\n\noutput \"sqs_a_arn\" {{\n  value = module.sqs_a.arn\n}}\n",
            OUTPUTS.begin_line(&at(1))
        );

        assert_eq!(
            strip_managed(&content, &OUTPUTS),
            "output \"vpc_id\" {\n  value = 1\n}\n\noutput \"user_defined\" {\n  value = \"}\"\n}\n"
        );
    }

    #[test]
    fn test_nested_braces_in_owned_output() {
        let content = format!(
            "{}\noutput \"sqs_a_meta\" {{\n  value = {{\n    url = module.sqs_a.url\n    tags = {{ a = \"{{\" }}\n  }}\n}}\noutput \"other\" {{\n  value = 2\n}}\n",
            OUTPUTS.begin_line(&at(1))
        );

        assert_eq!(
            strip_managed(&content, &OUTPUTS),
            "output \"other\" {\n  value = 2\n}\n"
        );
    }

    #[test]
    fn test_block_comments_in_owned_output() {
        let content = format!(
            "{}\noutput \"sqs_a_url\" {{\n  /* closes }} early */\n  value = module.sqs_a.url\n  /*\n  }}\n  */\n}}\noutput \"other\" {{\n  value = 2 /* {{ */\n}}\n",
            OUTPUTS.begin_line(&at(1))
        );

        assert_eq!(
            strip_managed(&content, &OUTPUTS),
            "output \"other\" {\n  value = 2 /* { */\n}\n"
        );
    }

    #[test]
    fn test_single_line_owned_output() {
        let content = format!(
            "{}\noutput \"sqs_a_url\" {{ value = module.sqs_a.url }}\nlocals {{}}\n",
            OUTPUTS.begin_line(&at(1))
        );
        assert_eq!(strip_managed(&content, &OUTPUTS), "locals {}\n");
    }

    #[test]
    fn test_replace_appends_region() {
        let result = replace_managed(
            "provider \"aws\" {}\n",
            &CALLS,
            "module \"sqs_a\" {}\n",
            &at(3),
        );

        assert_eq!(
            result,
            "provider \"aws\" {}\n\n\
             # BEGIN sqs-tf module calls (generated 2024-05-01T03:00:00Z)\n\
             module \"sqs_a\" {}\n\
             # END sqs-tf module calls\n"
        );
    }

    #[test]
    fn test_replace_into_empty_file() {
        let result = replace_managed("", &OUTPUTS, "output \"sqs_a_url\" {}\n", &at(3));
        assert!(result.starts_with(&OUTPUTS.begin_marker()));
        assert!(result.ends_with(&format!("{}\n", OUTPUTS.end_marker())));
    }

    #[test]
    fn test_replace_twice_is_stable() {
        let original = "terraform {\n  required_version = \">= 1.5\"\n}\n";
        let body = "module \"sqs_a\" {}\n\nmodule \"sqs_b\" {}\n";

        let first = replace_managed(original, &CALLS, body, &at(4));
        let second = replace_managed(&first, &CALLS, body, &at(4));
        assert_eq!(first, second);
        assert_eq!(first.matches(&CALLS.begin_marker()).count(), 1);

        // A later run only changes the timestamp line
        let third = replace_managed(&first, &CALLS, body, &at(5));
        assert_eq!(first.replace("T04:00:00Z", "T05:00:00Z"), third);
    }

    #[test]
    fn test_replace_removes_stale_blocks() {
        let first = replace_managed("", &CALLS, "module \"sqs_old\" {}\n", &at(1));
        let second = replace_managed(&first, &CALLS, "module \"sqs_new\" {}\n", &at(2));

        assert!(!second.contains("sqs_old"));
        assert!(second.contains("sqs_new"));
    }
}
