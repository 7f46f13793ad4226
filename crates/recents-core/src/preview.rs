//! Preview text: type/size summaries for attachments and stripped leading
//! lines for markdown.

use crate::file::FileKind;
use crate::i18n::Messages;
use regex::Regex;
use std::sync::OnceLock;

/// Files above this size are never read for a preview or thumbnail.
pub const PREVIEW_SIZE_LIMIT: u64 = 100 * 1024;

const CSV_LINE_MAX: usize = 50;
const CSV_LINE_KEEP: usize = 47;

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// `"<Type> file • <size>"`.
pub fn file_summary(kind: FileKind, size: u64, msg: &Messages) -> String {
    format!(
        "{} • {}",
        msg.format("preview.file", &[("type", kind.label())]),
        format_size(size)
    )
}

/// First line of a CSV file, cut to 47 characters plus `...` when longer than 50.
pub fn csv_first_line(content: &str) -> String {
    let line = content.lines().next().unwrap_or("").trim();
    if line.chars().count() > CSV_LINE_MAX {
        let cut: String = line.chars().take(CSV_LINE_KEEP).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}

/// Body of a markdown document after a leading `---` front-matter block.
/// An unterminated block is not skipped.
pub fn skip_frontmatter(content: &str) -> &str {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return content;
    };
    if first.trim_end_matches(['\r', '\n']) != "---" {
        return content;
    }
    let mut offset = first.len();
    for line in lines {
        offset += line.len();
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return &content[offset..];
        }
    }
    content
}

struct Patterns {
    rule: Regex,
    heading: Regex,
    quote: Regex,
    task: Regex,
    bullet: Regex,
    ordered: Regex,
    image: Regex,
    link: Regex,
    embed: Regex,
    wiki_alias: Regex,
    wiki: Regex,
    bold: Regex,
    bold_under: Regex,
    strike: Regex,
    highlight: Regex,
    italic: Regex,
    italic_under: Regex,
    url_scheme: Regex,
    spaces: Regex,
}

fn patterns() -> &'static Patterns {
    static P: OnceLock<Patterns> = OnceLock::new();
    P.get_or_init(|| {
        let re = |s: &str| Regex::new(s).expect("static pattern");
        Patterns {
            rule: re(r"^([-*_]\s*){3,}$"),
            heading: re(r"^#{1,6}\s+"),
            quote: re(r"^(>\s*)+"),
            task: re(r"^[-*+]\s+\[[ xX/-]\]\s*"),
            bullet: re(r"^[-*+]\s+"),
            ordered: re(r"^\d+[.)]\s+"),
            image: re(r"!\[([^\]]*)\]\([^)]*\)"),
            link: re(r"\[([^\]]*)\]\([^)]*\)"),
            embed: re(r"!\[\[[^\]]*\]\]"),
            wiki_alias: re(r"\[\[[^\]|]*\|([^\]]*)\]\]"),
            wiki: re(r"\[\[([^\]]*)\]\]"),
            bold: re(r"\*\*(.+?)\*\*"),
            bold_under: re(r"__(.+?)__"),
            strike: re(r"~~(.+?)~~"),
            highlight: re(r"==(.+?)=="),
            italic: re(r"\*([^*]+)\*"),
            italic_under: re(r"(^|[^\w])_([^_]+)_([^\w]|$)"),
            url_scheme: re(r"https?://"),
            spaces: re(r"\s{2,}"),
        }
    })
}

/// Removes markdown syntax from one line, keeping the readable text.
pub fn strip_markdown(line: &str) -> String {
    let p = patterns();
    let line = line.trim();
    if p.rule.is_match(line) {
        return String::new();
    }
    let mut s = p.heading.replace(line, "").into_owned();
    s = p.quote.replace(&s, "").into_owned();
    s = p.task.replace(&s, "").into_owned();
    s = p.bullet.replace(&s, "").into_owned();
    s = p.ordered.replace(&s, "").into_owned();
    s = p.image.replace_all(&s, "$1").into_owned();
    s = p.link.replace_all(&s, "$1").into_owned();
    s = p.embed.replace_all(&s, "").into_owned();
    s = p.wiki_alias.replace_all(&s, "$1").into_owned();
    s = p.wiki.replace_all(&s, "$1").into_owned();
    s = p.bold.replace_all(&s, "$1").into_owned();
    s = p.bold_under.replace_all(&s, "$1").into_owned();
    s = p.strike.replace_all(&s, "$1").into_owned();
    s = p.highlight.replace_all(&s, "$1").into_owned();
    s = p.italic.replace_all(&s, "$1").into_owned();
    // a match consumes its trailing separator, so adjacent spans need another pass
    while p.italic_under.is_match(&s) {
        s = p.italic_under.replace_all(&s, "$1$2$3").into_owned();
    }
    s = s.replace('`', "");
    s = p.url_scheme.replace_all(&s, "").into_owned();
    p.spaces.replace_all(s.trim(), " ").into_owned()
}

/// Up to `max` non-empty stripped lines of a markdown document body.
pub fn markdown_preview_lines(content: &str, max: usize) -> Vec<String> {
    if max == 0 {
        return Vec::new();
    }
    skip_frontmatter(content)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(strip_markdown)
        .filter(|l| !l.is_empty())
        .take(max)
        .collect()
}
