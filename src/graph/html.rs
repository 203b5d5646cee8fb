//! Comment text to HTML, following the rules of Go's `go/doc.ToHTML`.
//!
//! Unindented runs of lines become paragraphs, indented runs become
//! `<pre>` blocks, and a lone capitalized line between blank lines
//! becomes an `<h3>` heading. URLs are linkified.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

const PROTOCOL: &str = "https?|ftp|file|gopher|mailto|news|nntp|telnet|wais|prospero";
const HOST_PART: &str = r"[a-zA-Z0-9_@\-]+";
const FILE_PART: &str = r"[a-zA-Z0-9_?%#~&/\-+=]+";

/// A URL, or an identifier. Identifiers are matched so a URL can't
/// start in the middle of a word.
static MATCH: LazyLock<Regex> = LazyLock::new(|| {
    let url = format!(
        "({PROTOCOL})://{HOST_PART}([.:]{HOST_PART})*/?{FILE_PART}([:.,]{FILE_PART})*"
    );
    Regex::new(&format!(r"({url})|([\pL_][\pL_0-9]*)")).unwrap()
});

enum Block<'a> {
    Para(Vec<&'a str>),
    Head(String),
    Pre(Vec<&'a str>),
}

/// Render comment text (as produced by `CommentGroup::text`) as HTML.
pub fn comment_to_html(text: &str) -> String {
    let mut out = String::new();
    for block in blocks(text) {
        match block {
            Block::Para(lines) => {
                out.push_str("<p>\n");
                for line in lines {
                    emphasize(&mut out, line, true);
                }
                out.push_str("</p>\n");
            }
            Block::Head(line) => {
                let _ = write!(out, "<h3 id=\"{}\">", anchor_id(&line));
                comment_escape(&mut out, &line, true);
                out.push_str("</h3>\n");
            }
            Block::Pre(lines) => {
                out.push_str("<pre>");
                for line in lines {
                    emphasize(&mut out, line, false);
                }
                out.push_str("</pre>\n");
            }
        }
    }
    out
}

fn blocks(text: &str) -> Vec<Block<'_>> {
    let mut out = Vec::new();
    let mut para: Vec<&str> = Vec::new();
    let mut last_was_blank = false;
    let mut last_was_heading = false;

    let mut lines = split_after(text);
    unindent(&mut lines);
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if is_blank(line) {
            close_para(&mut para, &mut out);
            i += 1;
            last_was_blank = true;
            continue;
        }
        if indent_len(line) > 0 {
            close_para(&mut para, &mut out);
            let mut j = i + 1;
            while j < lines.len() && (is_blank(lines[j]) || indent_len(lines[j]) > 0) {
                j += 1;
            }
            while j > i && is_blank(lines[j - 1]) {
                j -= 1;
            }
            let mut pre = lines[i..j].to_vec();
            unindent(&mut pre);
            out.push(Block::Pre(pre));
            i = j;
            last_was_heading = false;
            continue;
        }

        if last_was_blank
            && !last_was_heading
            && i + 2 < lines.len()
            && is_blank(lines[i + 1])
            && !is_blank(lines[i + 2])
            && indent_len(lines[i + 2]) == 0
        {
            if let Some(head) = heading(line) {
                close_para(&mut para, &mut out);
                out.push(Block::Head(head.to_owned()));
                i += 2;
                last_was_heading = true;
                continue;
            }
        }

        last_was_blank = false;
        last_was_heading = false;
        para.push(line);
        i += 1;
    }
    close_para(&mut para, &mut out);
    out
}

fn close_para<'a>(para: &mut Vec<&'a str>, out: &mut Vec<Block<'a>>) {
    if !para.is_empty() {
        out.push(Block::Para(std::mem::take(para)));
    }
}

/// Lines with their terminators; like Go's `strings.SplitAfter`, a
/// trailing newline yields a final empty line.
fn split_after(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split_inclusive('\n').collect();
    if text.is_empty() || text.ends_with('\n') {
        lines.push("");
    }
    lines
}

fn is_blank(line: &str) -> bool {
    line.is_empty() || line == "\n"
}

fn indent_len(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ' || b == b'\t').count()
}

/// Strip the whitespace prefix shared by all non-blank lines.
fn unindent(lines: &mut [&str]) {
    let Some(first) = lines.first() else {
        return;
    };
    let mut prefix = &first[..indent_len(first)];
    for line in lines.iter().filter(|line| !is_blank(line)) {
        let indent = &line[..indent_len(line)];
        let common = prefix
            .bytes()
            .zip(indent.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        prefix = &prefix[..common];
    }
    let n = prefix.len();
    for line in lines.iter_mut().filter(|line| !is_blank(line)) {
        *line = &line[n..];
    }
}

fn heading(line: &str) -> Option<&str> {
    let line = line.trim();
    let first = line.chars().next()?;
    if !first.is_alphabetic() || !first.is_uppercase() {
        return None;
    }
    let last = line.chars().next_back()?;
    if !last.is_alphabetic() && !last.is_numeric() {
        return None;
    }
    if line.contains(|c| ";:!?+*/=[]{}_^°&§~%#@<\">\\".contains(c)) {
        return None;
    }

    // "'" only as a possessive "'s"
    let bytes = line.as_bytes();
    for (i, _) in line.match_indices('\'') {
        if bytes.get(i + 1) != Some(&b's') || bytes.get(i + 2).is_some_and(|&b| b != b' ') {
            return None;
        }
    }
    // "." only when followed by a non-space
    for (i, _) in line.match_indices('.') {
        if bytes.get(i + 1).is_none_or(|&b| b == b' ') {
            return None;
        }
    }
    Some(line)
}

fn anchor_id(line: &str) -> String {
    let mut id = String::from("hdr-");
    id.extend(
        line.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }),
    );
    id
}

/// Escape `line`, wrapping URLs in links.
fn emphasize(out: &mut String, line: &str, nice: bool) {
    let mut last = 0;
    for caps in MATCH.captures_iter(line) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        comment_escape(out, &line[last..m.start()], nice);
        if caps.get(1).is_some() {
            out.push_str("<a href=\"");
            html_escape(out, m.as_str());
            out.push_str("\">");
            comment_escape(out, m.as_str(), nice);
            out.push_str("</a>");
        } else {
            comment_escape(out, m.as_str(), nice);
        }
        last = m.end();
    }
    comment_escape(out, &line[last..], nice);
}

/// HTML-escape `text`; with `nice`, ``` `` ``` and `''` become curly
/// quotes.
fn comment_escape(out: &mut String, text: &str, nice: bool) {
    if !nice {
        html_escape(out, text);
        return;
    }
    let bytes = text.as_bytes();
    let mut last = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        let ch = bytes[i];
        if ch == bytes[i + 1] && (ch == b'`' || ch == b'\'') {
            html_escape(out, &text[last..i]);
            out.push_str(if ch == b'`' { "&ldquo;" } else { "&rdquo;" });
            last = i + 2;
            i += 2;
        } else {
            i += 1;
        }
    }
    html_escape(out, &text[last..]);
}

fn html_escape(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\0' => out.push('\u{FFFD}'),
            c => out.push(c),
        }
    }
}
