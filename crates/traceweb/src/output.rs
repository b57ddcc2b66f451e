use owo_colors::OwoColorize;
use traceweb_core::view::{LatestView, SearchView, SpanSummary, TraceView};

const BAR_CELLS: usize = 40;

pub fn print_latest_human(v: &LatestView, color: bool) {
    print!("{}", render_latest(v, color));
}

pub fn print_search_human(v: &SearchView, color: bool) {
    print!("{}", render_search(v, color));
}

pub fn print_trace_human(v: &TraceView, color: bool) {
    print!("{}", render_trace(v, color));
}

fn render_latest(v: &LatestView, color: bool) -> String {
    let mut out = String::new();
    for row in &v.spans {
        out.push_str(&summary_line(row, color));
    }
    out.push_str(&format!("-- {} spans --\n", v.spans.len()));
    out
}

fn render_search(v: &SearchView, color: bool) -> String {
    let mut out = String::new();
    if let Some(q) = &v.query {
        out.push_str(&format!("search \"{q}\"\n"));
    }
    for row in &v.results {
        out.push_str(&summary_line(row, color));
    }
    out.push_str(&format!("-- {} results --\n", v.results.len()));
    out
}

fn render_trace(v: &TraceView, color: bool) -> String {
    let mut out = format!(
        "TRACE {} duration={} spans={}\n",
        v.id,
        v.duration,
        v.spans.len()
    );
    for span in &v.spans {
        let bar = waterfall_bar(span.offset_percent, span.width_percent, BAR_CELLS);
        out.push_str(&format!(
            "|{}| {} {} {} (+{} {})\n",
            paint(&bar, &span.summary.colour, color),
            paint(&span.summary.service, &span.summary.colour, color),
            span.summary.name,
            span.summary.duration,
            span.offset,
            span.width,
        ));
        for ann in &span.annotations {
            out.push_str(&format!(
                "    {:>10} {} {} {}\n",
                ann.delta,
                paint(&ann.service, &ann.colour, color),
                ann.kind,
                ann.label
            ));
        }
    }
    out
}

fn summary_line(row: &SpanSummary, color: bool) -> String {
    format!(
        "{} trace={} {} \"{}\" {} ({})\n",
        row.started,
        row.trace_id,
        paint(&row.service, &row.colour, color),
        row.name,
        row.duration,
        row.age
    )
}

/// Text rendering of one waterfall row `cells` characters wide.
fn waterfall_bar(offset_percent: i64, width_percent: i64, cells: usize) -> String {
    let scale = |p: i64| (p.clamp(0, 100) as usize * cells) / 100;
    let lead = scale(offset_percent).min(cells.saturating_sub(1));
    let fill = scale(width_percent).clamp(1, cells - lead);
    format!(
        "{}{}{}",
        " ".repeat(lead),
        "█".repeat(fill),
        " ".repeat(cells - lead - fill)
    )
}

fn paint(text: &str, colour: &str, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    match colour {
        "blue" => text.blue().to_string(),
        "green" => text.green().to_string(),
        "yellow" => text.yellow().to_string(),
        "purple" | "magenta" => text.magenta().to_string(),
        "orange" => text.truecolor(255, 165, 0).to_string(),
        "red" => text.red().to_string(),
        "cyan" | "teal" => text.cyan().to_string(),
        _ => text.to_string(),
    }
}
