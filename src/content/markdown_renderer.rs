use std::collections::HashMap;
use std::io;
use std::io::ErrorKind;
use std::str::Lines;

use lazy_static::lazy_static;
use markdown::{CompileOptions, Options, ParseOptions};
use regex::{Captures, Regex};

use crate::text_utils::{slugify, strip_html};

const CALLOUTS: [&str; 3] = ["callout-info", "callout-warning", "callout-success"];

#[derive(Clone)]
pub struct BreakTag(pub String);

#[derive(Clone)]
pub enum RenderOptions {
    /// Only what comes before the break tag, for listings and feeds
    PreviewOnly(BreakTag),
    FullContent,
}

pub fn parse_title_markdown<'a>(lines: Lines<'a>, mut maybe_line: Option<&'a str>) -> (String, Lines<'a>, Option<&'a str>) {
    let mut lines = lines;
    let title = loop {
        if let Some(line) = maybe_line {
            if let Some(title) = line.strip_prefix("# ") {
                break title.trim().to_string();
            }
        } else {
            break "".to_string();
        }
        maybe_line = lines.next();
    };
    (title, lines, maybe_line)
}

pub fn extract_content(body: &str, render_options: &RenderOptions) -> String {
    match render_options {
        RenderOptions::PreviewOnly(BreakTag(tag)) => {
            let mut content = String::new();
            for line in body.lines() {
                if line.contains(tag.as_str()) {
                    break;
                }
                content.push_str(line);
                content.push('\n');
            }
            content
        }
        RenderOptions::FullContent => body.to_string(),
    }
}

pub fn render_markdown(body: &str, render_options: &RenderOptions) -> io::Result<String> {
    let content = extract_content(body, render_options);
    let buf = remove_comments(&content)?;
    let buf = expand_callouts(&buf);

    let options = Options {
        parse: ParseOptions::gfm(),
        compile: CompileOptions {
            allow_dangerous_html: true,
            ..CompileOptions::gfm()
        },
    };
    let html = match markdown::to_html_with_options(&buf, &options) {
        Ok(x) => x,
        Err(e) => return Err(io::Error::new(ErrorKind::InvalidInput, e.reason)),
    };

    Ok(add_heading_anchors(&html))
}

/// Drops html comments from the prose. Code spans and fenced code keep them.
pub fn remove_comments(md_post: &str) -> io::Result<String> {
    let mut res = String::with_capacity(md_post.len());
    for block in split_fenced_blocks(md_post) {
        match block {
            Block::Fenced(code) => res.push_str(code),
            Block::Text(text) => res.push_str(&strip_comments(text)?),
        }
    }
    Ok(res)
}

fn strip_comments(text: &str) -> io::Result<String> {
    let start_comment = "<!--";
    let end_comment = "-->";

    let mut res = String::with_capacity(text.len());
    let mut slice = text;
    while let Some(idx) = slice.find(['`', '<']) {
        let (before, from) = slice.split_at(idx);
        res.push_str(before);
        if from.starts_with('`') {
            let ticks = backtick_run(from);
            let after = &from[ticks..];
            // a code span ends with the same number of backticks, within the paragraph
            let paragraph = &after[..after.find("\n\n").unwrap_or(after.len())];
            match find_closing_ticks(paragraph, ticks) {
                Some(close) => {
                    let span_end = ticks + close + ticks;
                    res.push_str(&from[..span_end]);
                    slice = &from[span_end..];
                }
                None => {
                    res.push_str(&from[..ticks]);
                    slice = after;
                }
            }
        } else if let Some(comment) = from.strip_prefix(start_comment) {
            match comment.find(end_comment) {
                Some(end) => slice = &comment[(end + end_comment.len())..],
                None => return Err(io::Error::new(ErrorKind::InvalidData, "Error finding end of comment")),
            }
        } else {
            res.push('<');
            slice = &from[1..];
        }
    }
    res.push_str(slice);

    Ok(res)
}

fn backtick_run(text: &str) -> usize {
    text.len() - text.trim_start_matches('`').len()
}

fn find_closing_ticks(text: &str, count: usize) -> Option<usize> {
    let mut offset = 0;
    let mut rest = text;
    while let Some(idx) = rest.find('`') {
        let run = backtick_run(&rest[idx..]);
        if run == count {
            return Some(offset + idx);
        }
        offset += idx + run;
        rest = &rest[(idx + run)..];
    }
    None
}

enum Block<'a> {
    Text(&'a str),
    /// From the opening fence line to the closing one, both included
    Fenced(&'a str),
}

fn fence_marker(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    let c = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|x| *x == c).count();
    if len >= 3 { Some((c, len)) } else { None }
}

/// An unclosed fence runs to the end of the document.
fn split_fenced_blocks(md: &str) -> Vec<Block<'_>> {
    let mut blocks = vec![];
    let mut open: Option<(char, usize)> = None;
    let mut start = 0;
    let mut pos = 0;

    for line in md.split_inclusive('\n') {
        let end = pos + line.len();
        match (open, fence_marker(line)) {
            (None, Some(marker)) => {
                if start < pos {
                    blocks.push(Block::Text(&md[start..pos]));
                }
                start = pos;
                open = Some(marker);
            }
            (Some((c, len)), Some((close_c, close_len)))
                if close_c == c && close_len >= len && line.trim().chars().all(|x| x == c) => {
                blocks.push(Block::Fenced(&md[start..end]));
                start = end;
                open = None;
            }
            _ => {}
        }
        pos = end;
    }

    if start < md.len() {
        let rest = &md[start..];
        blocks.push(if open.is_some() { Block::Fenced(rest) } else { Block::Text(rest) });
    }
    blocks
}

/// `::: callout-info` ... `:::` becomes a `<div class="callout-info">` around Markdown.
/// Fenced code is left alone.
fn expand_callouts(md: &str) -> String {
    let mut res = String::with_capacity(md.len());
    let mut open = 0;
    for block in split_fenced_blocks(md) {
        let text = match block {
            Block::Fenced(code) => {
                res.push_str(code);
                if !code.ends_with('\n') {
                    res.push('\n');
                }
                continue;
            }
            Block::Text(text) => text,
        };
        for line in text.lines() {
            let trimmed = line.trim();
            match trimmed.strip_prefix(":::").map(str::trim) {
                Some(name) if CALLOUTS.contains(&name) => {
                    open += 1;
                    res.push_str(&format!("<div class=\"{}\">\n\n", name));
                }
                Some("") if open > 0 => {
                    open -= 1;
                    res.push_str("\n</div>\n\n");
                }
                _ => {
                    res.push_str(line);
                    res.push('\n');
                }
            }
        }
    }
    for _ in 0..open {
        res.push_str("\n</div>\n\n");
    }
    res
}

/// Headings h1 to h4 get an id and a trailing `#` permalink.
fn add_heading_anchors(html: &str) -> String {
    lazy_static! {
        static ref HEADING_REGEX: Regex = Regex::new(r"<h([1-4])>(.*?)</h[1-4]>").unwrap();
    }

    let mut used: HashMap<String, usize> = HashMap::new();
    let res = HEADING_REGEX.replace_all(html, |caps: &Captures| {
        let level = &caps[1];
        let inner = &caps[2];
        let base = slugify(&strip_html(inner));
        let count = used.entry(base.clone()).or_insert(0);
        let id = if *count == 0 { base } else { format!("{}-{}", base, count) };
        *count += 1;
        format!(
            "<h{level} id=\"{id}\">{inner} <a class=\"direct-link\" href=\"#{id}\" aria-hidden=\"true\">#</a></h{level}>"
        )
    });
    res.to_string()
}

#[cfg(test)]
mod tests {
    use crate::test_data::POST_DATA_MD;
    use crate::content::front_matter::split_front_matter;

    use super::*;

    fn more() -> RenderOptions {
        RenderOptions::PreviewOnly(BreakTag("<!-- more -->".to_string()))
    }

    #[test]
    fn test_preview_only() {
        let (_, body) = split_front_matter("post.md".as_ref(), POST_DATA_MD).unwrap();
        let rendered = render_markdown(body, &more()).unwrap();
        assert_eq!(rendered, r##"<p>How to be a great software engineer?</p>
<p>Someone asked me this question today and I didn’t have an answer.</p>
"##);
    }

    #[test]
    fn test_full_content() {
        let (_, body) = split_front_matter("post.md".as_ref(), POST_DATA_MD).unwrap();
        let rendered = render_markdown(body, &RenderOptions::FullContent).unwrap();
        assert!(rendered.contains("<h2 id=\"non-technical\">Non technical <a class=\"direct-link\" href=\"#non-technical\" aria-hidden=\"true\">#</a></h2>"));
        assert!(rendered.contains("<strong>The earlier you find that, the better.</strong>"));
        assert!(!rendered.contains("<!-- more -->"));
    }

    #[test]
    fn test_parse_removes_comment() {
        assert_eq!(remove_comments("Some text.<!-- more -->Wo<!-- xyz -->rd").unwrap(), "Some text.Word");
        assert_eq!(remove_comments("Some text.Word").unwrap(), "Some text.Word");
        assert_eq!(remove_comments("").unwrap(), "");
        assert_eq!(remove_comments("<!-- more --><!-- xyz -->").unwrap(), "");
        assert!(remove_comments("text <!-- never closed").is_err());
    }

    #[test]
    fn test_comments_kept_in_code() {
        assert_eq!(remove_comments("a `<!-- x -->` b<!-- y -->").unwrap(), "a `<!-- x -->` b");
        assert_eq!(remove_comments("a ``<!-- ` -->`` b").unwrap(), "a ``<!-- ` -->`` b");
        assert_eq!(remove_comments("lone ` tick<!-- y -->").unwrap(), "lone ` tick");

        let fenced = "intro<!-- x -->\n```html\n<!-- keep me -->\n```\nafter<!-- y -->\n";
        assert_eq!(remove_comments(fenced).unwrap(), "intro\n```html\n<!-- keep me -->\n```\nafter\n");
    }

    #[test]
    fn test_render_comment_opener_in_code_span() {
        let rendered = render_markdown("Start a comment with `<!--` in your template.", &RenderOptions::FullContent).unwrap();
        assert!(rendered.starts_with("<p>Start a comment with <code>&lt;!--</code> in your template.</p>"));
    }

    #[test]
    fn test_render_comment_in_fenced_code() {
        let md = "```html\n<!-- keep me -->\n<p>x</p>\n```\n";
        let rendered = render_markdown(md, &RenderOptions::FullContent).unwrap();
        assert!(rendered.contains("&lt;!-- keep me --&gt;\n&lt;p&gt;x&lt;/p&gt;"));
    }

    #[test]
    fn test_unclosed_fence_keeps_comments() {
        assert_eq!(remove_comments("~~~\n<!-- a -->\n```\n").unwrap(), "~~~\n<!-- a -->\n```\n");
    }

    #[test]
    fn test_title_markdown() {
        let text = "intro\n# The title\nrest";
        let mut lines = text.lines();
        let first = lines.next();
        let (title, mut lines, line) = parse_title_markdown(lines, first);
        assert_eq!(title, "The title");
        assert_eq!(line, Some("# The title"));
        assert_eq!(lines.next(), Some("rest"));
    }

    #[test]
    fn test_callouts() {
        let md = "before\n::: callout-warning\nCareful **here**\n:::\nafter\n::: unknown\n";
        let rendered = render_markdown(md, &RenderOptions::FullContent).unwrap();
        assert!(rendered.starts_with("<p>before</p>\n<div class=\"callout-warning\">"));
        assert!(rendered.contains("<p>Careful <strong>here</strong></p>"));
        assert!(rendered.contains("</div>"));
        assert!(rendered.contains("<p>after\n::: unknown</p>"));
    }

    #[test]
    fn test_callouts_left_alone_in_fenced_code() {
        let md = "```md\n::: callout-info\nhello\n:::\n```\n\n::: callout-info\nreal\n:::\n";
        let rendered = render_markdown(md, &RenderOptions::FullContent).unwrap();
        assert!(rendered.contains("<code class=\"language-md\">::: callout-info\nhello\n:::\n</code>"));
        assert_eq!(rendered.matches("<div class=\"callout-info\">").count(), 1);
        assert!(rendered.contains("<p>real</p>"));
    }

    #[test]
    fn test_duplicated_heading_ids() {
        let html = add_heading_anchors("<h2>Setup</h2><h3>Setup</h3><h5>Setup</h5>");
        assert!(html.contains("<h2 id=\"setup\">"));
        assert!(html.contains("<h3 id=\"setup-1\">"));
        assert!(html.contains("<h5>Setup</h5>"));
    }
}
