use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;

use doorscope_diff::{
    attribute_diff, diff_text, render_script, DiffConfig, EditItem, EditStats, HistorySummary,
    RunStyle, StyledRun, TreeDiffer,
};
use doorscope_history::{ChangeKind, ChangeRecord, HistoryReader, InMemoryHistory};
use doorscope_store::{load_document_file, PlainTextCodec, RichTextCodec, Snapshot, SnapshotReader};
use doorscope_types::{NodeId, NodeKind, Schema, StableId, Value};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::History(args) => cmd_history(args, format),
        Command::TextDiff(args) => cmd_text_diff(args, format),
        Command::AttrDiff(args) => cmd_attr_diff(args, format),
    }
}

/// Both versions of a document with the history computed between them.
struct Session {
    schema: Schema,
    current: Snapshot,
    history: InMemoryHistory,
    summary: HistorySummary,
}

fn load_config(arg: &ConfigArg) -> anyhow::Result<DiffConfig> {
    match &arg.path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            Ok(DiffConfig::from_toml_str(&text)?)
        }
        None => Ok(DiffConfig::default()),
    }
}

fn compute(previous_path: &Path, current_path: &Path, arg: &ConfigArg) -> anyhow::Result<Session> {
    let config = load_config(arg)?;
    let mut schema = Schema::doors();
    let previous = load_document_file(previous_path, &mut schema)
        .with_context(|| format!("cannot load {}", previous_path.display()))?;
    let current = load_document_file(current_path, &mut schema)
        .with_context(|| format!("cannot load {}", current_path.display()))?;
    let tracked = config.resolve_tracked(&mut schema);

    let history = InMemoryHistory::new();
    let summary = TreeDiffer::new(&schema, &PlainTextCodec, &config)
        .compute_history(&history, &previous, &current, &tracked)
        .context("no change history available")?;

    Ok(Session {
        schema,
        current,
        history,
        summary,
    })
}

#[derive(Serialize)]
struct RecordView<'a> {
    seq: u64,
    kind: ChangeKind,
    subject: &'a StableId,
    node: Option<NodeId>,
    attribute: Option<String>,
    old_value: &'a Value,
    new_value: &'a Value,
    author: Option<&'a str>,
    timestamp: Option<String>,
    info: Option<&'a str>,
}

impl<'a> RecordView<'a> {
    fn new(record: &'a ChangeRecord, schema: &Schema) -> Self {
        Self {
            seq: record.seq,
            kind: record.kind,
            subject: &record.subject,
            node: record.node,
            attribute: record.attribute.map(|a| schema.display_name(a)),
            old_value: &record.old_value,
            new_value: &record.new_value,
            author: record.author.as_deref(),
            timestamp: record.timestamp.map(|t| t.to_rfc3339()),
            info: record.info.as_deref(),
        }
    }
}

fn cmd_history(args: HistoryArgs, format: OutputFormat) -> anyhow::Result<()> {
    let session = compute(&args.previous, &args.current, &args.config)?;
    let records = session.history.document_records(session.current.id())?;

    if format == OutputFormat::Json {
        let views: Vec<_> = records
            .iter()
            .map(|r| RecordView::new(r, &session.schema))
            .collect();
        let out = serde_json::json!({ "summary": session.summary, "records": views });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let s = &session.summary;
    println!(
        "{} {} changes: {} created, {} modified, {} moved, {} deleted",
        "✓".green().bold(),
        s.total().to_string().bold(),
        s.created,
        s.modified,
        s.moved,
        s.deleted
    );
    for record in &records {
        print_record(record, &session.schema);
    }
    Ok(())
}

fn print_record(record: &ChangeRecord, schema: &Schema) {
    let kind = format!("{:<8}", record.kind.to_string());
    let kind = match record.kind {
        ChangeKind::Created => kind.green(),
        ChangeKind::Modified => kind.yellow(),
        ChangeKind::Moved => kind.cyan(),
        ChangeKind::Deleted => kind.red(),
    };
    let seq = format!("{:>4}", record.seq);
    println!("{} {} {}", seq.dimmed(), kind, record.subject.to_string().bold());

    if let Some(attr) = record.attribute {
        println!(
            "       {}: {} -> {}",
            schema.display_name(attr),
            shown(&record.old_value),
            shown(&record.new_value)
        );
    }
    if let Some(info) = &record.info {
        println!("       {info}");
    }
    if let Some(author) = &record.author {
        let when = record
            .timestamp
            .map(|t| format!(", {}", t.format("%Y-%m-%d %H:%M")))
            .unwrap_or_default();
        println!("       {}", format!("by {author}{when}").dimmed());
    }
}

fn shown(value: &Value) -> String {
    if value.is_null() {
        return "null".dimmed().to_string();
    }
    match PlainTextCodec.decode_to_plain_text(value) {
        Ok(text) => format!("{text:?}"),
        Err(_) => format!("<{}>", value.type_name()),
    }
}

fn cmd_text_diff(args: TextDiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (old, new) = if args.files {
        (
            std::fs::read_to_string(&args.old).with_context(|| format!("cannot read {}", args.old))?,
            std::fs::read_to_string(&args.new).with_context(|| format!("cannot read {}", args.new))?,
        )
    } else {
        (args.old, args.new)
    };

    let script = diff_text(&old, &new)?;
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();
    let runs = render_script(&new_chars, &old_chars, &script);

    if format == OutputFormat::Json {
        #[derive(Serialize)]
        struct TextDiffView<'a> {
            script: &'a [EditItem],
            runs: &'a [StyledRun],
        }
        let view = TextDiffView {
            script: &script,
            runs: &runs,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    print_runs(&runs);
    let stats = EditStats::of(&script, old_chars.len());
    println!(
        "{}",
        format!(
            "{} unchanged, {} deleted, {} inserted",
            stats.unchanged, stats.deleted, stats.inserted
        )
        .dimmed()
    );
    Ok(())
}

fn print_runs(runs: &[StyledRun]) {
    let line: String = runs
        .iter()
        .map(|run| match run.style {
            RunStyle::Unchanged => run.text.normal().to_string(),
            RunStyle::Deleted => run.text.red().strikethrough().to_string(),
            RunStyle::Inserted => run.text.green().underline().to_string(),
        })
        .collect();
    println!("{line}");
}

fn cmd_attr_diff(args: AttrDiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let session = compute(&args.previous, &args.current, &args.config)?;
    let Some(attr) = session.schema.lookup(&args.attr) else {
        bail!("unknown attribute {:?}", args.attr);
    };
    let id: StableId = args.node.parse()?;
    let nodes = session.current.nodes_with_stable_id(&session.schema, &id)?;
    if nodes.is_empty() {
        bail!("no object {id} in {}", args.current.display());
    }

    #[derive(Serialize)]
    struct AttrDiffView {
        node: NodeId,
        kind: NodeKind,
        runs: Option<Vec<StyledRun>>,
    }
    let mut views = Vec::new();
    for node in nodes {
        let runs = attribute_diff(
            &session.history,
            &PlainTextCodec,
            session.current.id(),
            node,
            attr,
        )?;
        views.push(AttrDiffView {
            node,
            kind: session.current.kind(node)?,
            runs,
        });
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    for view in &views {
        println!("{} {} ({})", id.to_string().bold(), args.attr, view.kind);
        match &view.runs {
            Some(runs) => print_runs(runs),
            None => println!("  {}", "no changes".dimmed()),
        }
    }
    Ok(())
}
