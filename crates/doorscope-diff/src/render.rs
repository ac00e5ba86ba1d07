//! Styled rendering of text differences.

use serde::Serialize;

use doorscope_history::HistoryReader;
use doorscope_store::RichTextCodec;
use doorscope_types::{AttrId, NodeId, SnapshotId};

use crate::error::DiffResult;
use crate::text_diff::{diff_text, EditItem};

/// How a run of characters is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStyle {
    Unchanged,
    /// Shown struck through.
    Deleted,
    /// Shown underlined.
    Inserted,
}

/// A maximal run of characters sharing one style.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StyledRun {
    pub style: RunStyle,
    pub text: String,
}

/// Render the difference between `old_text` and `new_text` as styled runs.
///
/// Per edit item the deleted old characters come before the inserted new
/// ones. Unchanged runs are taken from the new text. Empty runs are never
/// produced and adjacent runs never share a style.
pub fn render_diff(new_text: &str, old_text: &str) -> DiffResult<Vec<StyledRun>> {
    let script = diff_text(old_text, new_text)?;
    let a: Vec<char> = old_text.chars().collect();
    let b: Vec<char> = new_text.chars().collect();
    Ok(render_script(&b, &a, &script))
}

/// Render a precomputed edit script.
pub fn render_script(new: &[char], old: &[char], script: &[EditItem]) -> Vec<StyledRun> {
    let mut runs = Runs::default();
    let mut pos_b = 0;

    for item in script {
        runs.push(RunStyle::Unchanged, &new[pos_b..item.start_b]);
        runs.push(
            RunStyle::Deleted,
            &old[item.start_a..item.start_a + item.deleted_a],
        );
        runs.push(
            RunStyle::Inserted,
            &new[item.start_b..item.start_b + item.inserted_b],
        );
        pos_b = item.start_b + item.inserted_b;
    }
    runs.push(RunStyle::Unchanged, &new[pos_b..]);
    runs.0
}

/// Text of `runs` as it was before the change.
pub fn old_text(runs: &[StyledRun]) -> String {
    runs.iter()
        .filter(|r| r.style != RunStyle::Inserted)
        .map(|r| r.text.as_str())
        .collect()
}

/// Text of `runs` as it is after the change.
pub fn new_text(runs: &[StyledRun]) -> String {
    runs.iter()
        .filter(|r| r.style != RunStyle::Deleted)
        .map(|r| r.text.as_str())
        .collect()
}

/// Cumulative difference of one attribute of one node.
///
/// Compares the old value of the node's first `Modified` record for
/// `attribute` with the new value of its latest one. Returns `None` when the
/// attribute has no change records.
pub fn attribute_diff<H, C>(
    history: &H,
    codec: &C,
    document: SnapshotId,
    node: NodeId,
    attribute: AttrId,
) -> DiffResult<Option<Vec<StyledRun>>>
where
    H: HistoryReader + ?Sized,
    C: RichTextCodec + ?Sized,
{
    let records = history.records_for_attribute(document, node, attribute)?;
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Ok(None);
    };
    let old = codec.decode_to_plain_text(&first.old_value)?;
    let new = codec.decode_to_plain_text(&last.new_value)?;
    render_diff(&new, &old).map(Some)
}

#[derive(Default)]
struct Runs(Vec<StyledRun>);

impl Runs {
    fn push(&mut self, style: RunStyle, chars: &[char]) {
        if chars.is_empty() {
            return;
        }
        match self.0.last_mut() {
            Some(last) if last.style == style => last.text.extend(chars),
            _ => self.0.push(StyledRun {
                style,
                text: chars.iter().collect(),
            }),
        }
    }
}
