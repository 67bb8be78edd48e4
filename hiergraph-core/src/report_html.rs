//! Standalone HTML report.
//!
//! One file, no local assets: a header with statistics, the Mermaid
//! diagram (rendered by mermaid.js when the page is online) and the text
//! tree, which stays readable offline.

use std::fmt::Write;

use crate::diagram::render_mermaid;
use crate::error::HierResult;
use crate::model::AnalysisResult;
use crate::report::ReportContext;
use crate::tree::HierarchyTree;

const MERMAID_CDN: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js";

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the full page.
pub fn render_html_page(result: &AnalysisResult, ctx: &ReportContext) -> HierResult<String> {
    let tree = HierarchyTree::new(result, ctx.diagram.framework_bases.as_slice());
    let stats = tree.stats();
    let mermaid = render_mermaid(result, &ctx.diagram)?;

    let mut tree_text = String::new();
    let chain = tree.ancestor_lines();
    if chain.len() > 1 {
        for line in &chain {
            writeln!(tree_text, "{}", line)?;
        }
        writeln!(tree_text)?;
    }
    for line in tree.descendant_lines() {
        writeln!(tree_text, "{}", line)?;
    }

    let title = escape_html(&result.query);
    let mut html = String::with_capacity(4096 + mermaid.len() + tree_text.len());

    write!(
        html,
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>hiergraph - {title}</title>
    <script src="{cdn}"></script>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: #1a1a2e;
            color: #eee;
        }}
        #header {{
            background: #16213e;
            border-bottom: 1px solid #0f3460;
            padding: 16px 24px;
        }}
        #header h1 {{ font-size: 20px; font-weight: 600; color: #e94560; }}
        #header .generated {{ font-size: 12px; color: #888; margin-top: 4px; }}
        .stats {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
            gap: 12px;
            margin-top: 16px;
        }}
        .stat-card {{
            background: #0f3460;
            border-radius: 8px;
            padding: 12px;
            text-align: center;
        }}
        .stat-value {{ font-size: 24px; font-weight: bold; color: #90EE90; }}
        .stat-label {{ font-size: 12px; color: #aaa; margin-top: 4px; }}
        section {{ margin: 20px 24px; }}
        section h2 {{ font-size: 16px; color: #e94560; margin-bottom: 10px; }}
        .panel {{
            background: #16213e;
            border: 1px solid #0f3460;
            border-radius: 8px;
            padding: 16px;
            overflow-x: auto;
        }}
        .mermaid {{ background: #fff; border-radius: 6px; padding: 12px; }}
        pre.tree {{ font-family: 'JetBrains Mono', monospace; font-size: 13px; line-height: 1.5; }}
    </style>
</head>
<body>
    <div id="header">
        <h1>{title} inheritance analysis</h1>
        <div class="generated">{target} &middot; generated {generated}</div>
        <div class="stats">
"##,
        title = title,
        cdn = MERMAID_CDN,
        target = escape_html(&result.target_type),
        generated = escape_html(&ctx.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
    )?;

    for (label, value) in [
        ("Related types", stats.total_types),
        ("Relationships", stats.total_relationships),
        ("Direct parents", stats.direct_parents),
        ("Descendants", stats.descendants),
    ] {
        writeln!(
            html,
            r#"            <div class="stat-card"><div class="stat-value">{}</div><div class="stat-label">{}</div></div>"#,
            value, label
        )?;
    }

    write!(
        html,
        r##"        </div>
    </div>
    <section>
        <h2>Diagram</h2>
        <div class="panel"><pre class="mermaid">
{mermaid}</pre></div>
    </section>
    <section>
        <h2>Hierarchy</h2>
        <div class="panel"><pre class="tree">{tree}</pre></div>
    </section>
    <script>
        if (window.mermaid) {{
            mermaid.initialize({{ startOnLoad: true, securityLevel: 'loose', flowchart: {{ useMaxWidth: true }} }});
        }}
    </script>
</body>
</html>
"##,
        mermaid = escape_html(&mermaid),
        tree = escape_html(&tree_text),
    )?;

    Ok(html)
}
