// src/report.rs
use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use comfy_table::{presets::NOTHING, Table};

use crate::flag::Flag;

const HEADER: [&str; 8] = [
    "KEY",
    "MAINTAINER",
    "CREATION DATE",
    "LAST MODIFIED",
    "LAST REQUESTED",
    "STATUS",
    "TEMPORARY",
    "LINK",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ReportFormat {
    /// Aligned plain-text table.
    #[default]
    Text,
    /// Pipe-delimited markdown table.
    Markdown,
    /// Comma-delimited rows with a header line.
    Csv,
}

/// Everything the report stage needs besides the flags themselves.
/// `now` is captured once per run so every row and predicate sees the
/// same instant.
pub struct ReportOptions {
    pub host: String,
    pub project: String,
    pub env: String,
    pub threshold: Duration,
    pub now: DateTime<Utc>,
    pub with_permanent: bool,
    pub format: ReportFormat,
}

/// Keep only flags whose creation and last-modified timestamps are both
/// more than the threshold ago, and which are temporary unless
/// `with_permanent` is set. Pure predicate over immutable flags, so
/// re-filtering a filtered list is a no-op.
pub fn filter_flags(flags: Vec<Flag>, opts: &ReportOptions) -> Vec<Flag> {
    flags
        .into_iter()
        .filter(|f| {
            f.creation_date_more_than(opts.now, opts.threshold)
                && f.last_modified_more_than(opts.now, opts.threshold)
                && (f.temporary || opts.with_permanent)
        })
        .collect()
}

/// Order by maintainer email ascending, then inactive before in-use,
/// then creation date ascending. Unset creation dates sort first.
pub fn sort_flags(flags: &mut [Flag], opts: &ReportOptions) {
    flags.sort_by(|a, b| {
        a.maintainer_email
            .cmp(&b.maintainer_email)
            .then_with(|| {
                let a_inactive = a.last_requested_more_than(opts.now, opts.threshold);
                let b_inactive = b.last_requested_more_than(opts.now, opts.threshold);
                b_inactive.cmp(&a_inactive)
            })
            .then_with(|| a.creation_date.cmp(&b.creation_date))
    });
}

/// Render the filtered, sorted flags in the selected format.
pub fn render(flags: &[Flag], opts: &ReportOptions) -> String {
    match opts.format {
        ReportFormat::Text => render_text(flags, opts),
        ReportFormat::Markdown => render_markdown(flags, opts),
        ReportFormat::Csv => render_csv(flags, opts),
    }
}

fn row(flag: &Flag, opts: &ReportOptions) -> [String; 8] {
    [
        flag.key.clone(),
        flag.maintainer_email.clone(),
        flag.creation_date_ago(opts.now),
        flag.last_modified_ago(opts.now),
        flag.last_requested_ago(opts.now),
        flag.status(opts.now, opts.threshold).to_string(),
        flag.lifecycle().to_string(),
        format!(
            "{}/{}/{}/features/{}",
            opts.host, opts.project, opts.env, flag.key
        ),
    ]
}

fn render_text(flags: &[Flag], opts: &ReportOptions) -> String {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(HEADER);
    for flag in flags {
        table.add_row(row(flag, opts));
    }
    format!("{}\n", table)
}

fn render_markdown(flags: &[Flag], opts: &ReportOptions) -> String {
    let mut out = String::new();
    out.push_str("KEY | MAINTAINER | CREATION DATE | LAST MODIFIED | LAST REQUESTED | STATUS | TEMPORARY | LINK \n");
    out.push_str("----+------------+---------------+---------------+----------------+--------+-----------+------\n");
    for flag in flags {
        out.push_str(&row(flag, opts).join(" | "));
        out.push('\n');
    }
    out
}

fn render_csv(flags: &[Flag], opts: &ReportOptions) -> String {
    let mut out = String::new();
    out.push_str(&HEADER.join(","));
    out.push('\n');
    for flag in flags {
        out.push_str(&row(flag, opts).join(","));
        out.push('\n');
    }
    out
}
