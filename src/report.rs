use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::aggregator::RankedFile;
use crate::types::{ReportFormat, SkippedDocument};

/// Marker shown when no document matched every keyword.
pub const NONE_MARKER: &str = "None";

/// Files containing a single keyword.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeywordSection {
    pub keyword: String,
    pub files: Vec<String>,
}

/// Everything a front end needs to present the outcome of a scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportView {
    pub keyword_count: usize,
    pub keywords: Vec<String>,
    pub all_keywords: Vec<String>,
    pub by_keyword: Vec<KeywordSection>,
    pub ranking: Vec<RankedFile>,
    pub documents_scanned: usize,
    pub skipped: Vec<SkippedDocument>,
}

impl ReportView {
    pub fn all_keywords_heading(&self) -> String {
        "Files containing all keywords:".to_string()
    }

    pub fn ranking_heading(&self) -> String {
        format!(
            "File ranking according to matches ({} keywords entered):",
            self.keyword_count
        )
    }
}

pub fn keyword_heading(keyword: &str) -> String {
    format!("Files containing '{}':", keyword)
}

pub fn ranking_line(ranked: &RankedFile) -> String {
    format!("{}: {} matches", ranked.file, ranked.matches)
}

/// Render a report in the requested format.
pub fn render(view: &ReportView, format: ReportFormat, styled: bool) -> Result<String> {
    match format {
        ReportFormat::Json => render_json(view),
        ReportFormat::Csv => Ok(render_csv(view)),
        ReportFormat::Html => Ok(render_html(view)),
        ReportFormat::Text => Ok(render_text(view, styled)),
    }
}

/// Plain text report; `styled` adds terminal colors to headings.
pub fn render_text(view: &ReportView, styled: bool) -> String {
    let heading = |text: String| {
        if styled {
            text.blue().bold().to_string()
        } else {
            text
        }
    };

    let mut out = String::new();

    out.push_str(&format!("{}\n", heading(view.all_keywords_heading())));
    if view.all_keywords.is_empty() {
        out.push_str(&format!("  {}\n", NONE_MARKER));
    } else {
        for file in &view.all_keywords {
            out.push_str(&format!("  {}\n", file));
        }
    }

    for section in &view.by_keyword {
        out.push('\n');
        out.push_str(&format!("{}\n", heading(keyword_heading(&section.keyword))));
        for file in &section.files {
            out.push_str(&format!("  {}\n", file));
        }
    }

    out.push('\n');
    out.push_str(&format!("{}\n", heading(view.ranking_heading())));
    for ranked in &view.ranking {
        let line = ranking_line(ranked);
        if styled {
            out.push_str(&format!("  {}\n", line.green()));
        } else {
            out.push_str(&format!("  {}\n", line));
        }
    }

    out
}

pub fn render_json(view: &ReportView) -> Result<String> {
    Ok(serde_json::to_string_pretty(view)?)
}

/// One row per (section, file): `all`, `keyword` and `ranking` sections.
pub fn render_csv(view: &ReportView) -> String {
    let mut out = String::from("section,keyword,file,matches\n");

    for file in &view.all_keywords {
        out.push_str(&format!("all,,{},\n", csv_field(file)));
    }
    for section in &view.by_keyword {
        for file in &section.files {
            out.push_str(&format!(
                "keyword,{},{},\n",
                csv_field(&section.keyword),
                csv_field(file)
            ));
        }
    }
    for ranked in &view.ranking {
        out.push_str(&format!("ranking,,{},{}\n", csv_field(&ranked.file), ranked.matches));
    }

    out
}

fn csv_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

const TOGGLE_MARKER: &str = "\u{25BC}";

// Clicking a per-keyword heading collapses or expands its file list.
const TOGGLE_SCRIPT: &str = r#"<script>
document.querySelectorAll('.toggle-header').forEach(header => {
    header.addEventListener('click', () => {
        const content = header.nextElementSibling;
        content.style.display = content.style.display === 'none' ? 'block' : 'none';
    });
});
</script>
"#;

/// Standalone HTML page; per-keyword sections collapse when their heading is
/// clicked.
pub fn render_html(view: &ReportView) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n");
    out.push_str("<html><head><title>Resume Keyword Report</title></head><body>\n");

    out.push_str(&format!("<h3>{}</h3>\n", escape_html(&view.all_keywords_heading())));
    out.push_str("<div class=\"content\">\n");
    if view.all_keywords.is_empty() {
        out.push_str(&format!("<p>{}</p>\n", NONE_MARKER));
    } else {
        for file in &view.all_keywords {
            out.push_str(&format!("<p>{}</p>\n", escape_html(file)));
        }
    }
    out.push_str("</div>\n");

    for section in &view.by_keyword {
        out.push_str(&format!(
            "<h3 class=\"toggle-header\">{}{}</h3>\n",
            escape_html(&keyword_heading(&section.keyword)),
            TOGGLE_MARKER
        ));
        out.push_str("<div class=\"toggle-content content\">\n");
        for file in &section.files {
            out.push_str(&format!("<p>{}</p>\n", escape_html(file)));
        }
        out.push_str("</div>\n");
    }

    out.push_str(&format!("<h3>{}</h3>\n", escape_html(&view.ranking_heading())));
    out.push_str("<div class=\"content\">\n");
    for ranked in &view.ranking {
        out.push_str(&format!("<p>{}</p>\n", escape_html(&ranking_line(ranked))));
    }
    out.push_str("</div>\n");

    out.push_str(TOGGLE_SCRIPT);
    out.push_str("</body></html>\n");
    out
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
