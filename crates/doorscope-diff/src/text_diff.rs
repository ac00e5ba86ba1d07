//! Character-level text diff.
//!
//! Myers' O(ND) algorithm in its linear-space form: the shortest middle
//! snake of a sub-range splits it in two halves that are solved recursively.
//! Both inputs are compared as sequences of Unicode scalar values; all
//! positions and lengths in the edit script are character counts.

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};

/// One contiguous edit: `deleted_a` characters of the old text starting at
/// `start_a` are replaced by `inserted_b` characters of the new text
/// starting at `start_b`.
///
/// Within a script both start positions increase strictly and at least one
/// of the two lengths is non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditItem {
    pub start_a: usize,
    pub start_b: usize,
    pub deleted_a: usize,
    pub inserted_b: usize,
}

/// Character totals of an edit script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EditStats {
    pub unchanged: usize,
    pub deleted: usize,
    pub inserted: usize,
}

impl EditStats {
    /// Totals of `script` for an old text of `old_len` characters.
    pub fn of(script: &[EditItem], old_len: usize) -> Self {
        let deleted: usize = script.iter().map(|e| e.deleted_a).sum();
        let inserted = script.iter().map(|e| e.inserted_b).sum();
        Self {
            unchanged: old_len.saturating_sub(deleted),
            deleted,
            inserted,
        }
    }
}

/// Minimal edit script transforming `old` into `new`.
///
/// Identical inputs give an empty script.
pub fn diff_text(old: &str, new: &str) -> DiffResult<Vec<EditItem>> {
    if old == new {
        return Ok(Vec::new());
    }
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();
    diff_chars(&a, &b)
}

/// Minimal edit script between two element sequences.
pub fn diff_chars<T: PartialEq>(a: &[T], b: &[T]) -> DiffResult<Vec<EditItem>> {
    let mut differ = Differ::new(a, b);
    differ.lcs(0, a.len(), 0, b.len())?;
    Ok(differ.edit_items())
}

/// Replay `script` against `old`, taking inserted characters from `new`.
///
/// For a script produced by [`diff_text`] the result equals `new`.
pub fn apply_edits(old: &str, new: &str, script: &[EditItem]) -> DiffResult<String> {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();
    let mut out = String::with_capacity(new.len());
    let mut pos = 0;

    for item in script {
        let end_a = item.start_a + item.deleted_a;
        let end_b = item.start_b + item.inserted_b;
        if item.start_a < pos || end_a > a.len() || end_b > b.len() {
            return Err(DiffError::InvalidArgument(format!(
                "edit {item:?} does not fit texts of {} and {} characters",
                a.len(),
                b.len()
            )));
        }
        out.extend(&a[pos..item.start_a]);
        out.extend(&b[item.start_b..end_b]);
        pos = end_a;
    }
    out.extend(&a[pos..]);
    Ok(out)
}

struct Differ<'a, T> {
    a: &'a [T],
    b: &'a [T],
    modified_a: Vec<bool>,
    modified_b: Vec<bool>,
    // Furthest reaching x per diagonal, indexed through an offset.
    down: Vec<isize>,
    up: Vec<isize>,
    max: isize,
}

impl<'a, T: PartialEq> Differ<'a, T> {
    fn new(a: &'a [T], b: &'a [T]) -> Self {
        let max = (a.len() + b.len() + 1) as isize;
        let width = 2 * max as usize + 2;
        Self {
            a,
            b,
            modified_a: vec![false; a.len()],
            modified_b: vec![false; b.len()],
            down: vec![0; width],
            up: vec![0; width],
            max,
        }
    }

    /// Mark the differences of `a[lower_a..upper_a]` and `b[lower_b..upper_b]`.
    fn lcs(
        &mut self,
        mut lower_a: usize,
        mut upper_a: usize,
        mut lower_b: usize,
        mut upper_b: usize,
    ) -> DiffResult<()> {
        while lower_a < upper_a && lower_b < upper_b && self.a[lower_a] == self.b[lower_b] {
            lower_a += 1;
            lower_b += 1;
        }
        while lower_a < upper_a && lower_b < upper_b && self.a[upper_a - 1] == self.b[upper_b - 1]
        {
            upper_a -= 1;
            upper_b -= 1;
        }

        if lower_a == upper_a {
            self.modified_b[lower_b..upper_b].fill(true);
        } else if lower_b == upper_b {
            self.modified_a[lower_a..upper_a].fill(true);
        } else {
            let (x, y) = self.middle_snake(lower_a, upper_a, lower_b, upper_b)?;
            self.lcs(lower_a, x, lower_b, y)?;
            self.lcs(x, upper_a, y, upper_b)?;
        }
        Ok(())
    }

    /// Start of the middle snake of a range whose bounds differ at both ends.
    fn middle_snake(
        &mut self,
        lower_a: usize,
        upper_a: usize,
        lower_b: usize,
        upper_b: usize,
    ) -> DiffResult<(usize, usize)> {
        let (la, ua) = (lower_a as isize, upper_a as isize);
        let (lb, ub) = (lower_b as isize, upper_b as isize);

        let down_k = la - lb;
        let up_k = ua - ub;
        let delta = (ua - la) - (ub - lb);
        let odd_delta = delta & 1 != 0;
        let down_offset = self.max - down_k;
        let up_offset = self.max - up_k;
        let max_d = (ua - la + ub - lb) / 2 + 1;

        self.down[at(down_offset + down_k + 1)] = la;
        self.up[at(up_offset + up_k - 1)] = ua;

        for d in 0..=max_d {
            // Forward paths.
            let mut k = down_k - d;
            while k <= down_k + d {
                let mut x = if k == down_k - d {
                    self.down[at(down_offset + k + 1)]
                } else {
                    let right = self.down[at(down_offset + k - 1)] + 1;
                    if k < down_k + d && self.down[at(down_offset + k + 1)] >= right {
                        self.down[at(down_offset + k + 1)]
                    } else {
                        right
                    }
                };
                let mut y = x - k;
                while x < ua && y < ub && self.a[x as usize] == self.b[y as usize] {
                    x += 1;
                    y += 1;
                }
                self.down[at(down_offset + k)] = x;

                if odd_delta
                    && up_k - d < k
                    && k < up_k + d
                    && self.up[at(up_offset + k)] <= self.down[at(down_offset + k)]
                {
                    let x = self.down[at(down_offset + k)];
                    return Ok((x as usize, (x - k) as usize));
                }
                k += 2;
            }

            // Reverse paths.
            let mut k = up_k - d;
            while k <= up_k + d {
                let mut x = if k == up_k + d {
                    self.up[at(up_offset + k - 1)]
                } else {
                    let left = self.up[at(up_offset + k + 1)] - 1;
                    if k > up_k - d && self.up[at(up_offset + k - 1)] < left {
                        self.up[at(up_offset + k - 1)]
                    } else {
                        left
                    }
                };
                let mut y = x - k;
                while x > la && y > lb && self.a[(x - 1) as usize] == self.b[(y - 1) as usize] {
                    x -= 1;
                    y -= 1;
                }
                self.up[at(up_offset + k)] = x;

                if !odd_delta
                    && down_k - d <= k
                    && k <= down_k + d
                    && self.up[at(up_offset + k)] <= self.down[at(down_offset + k)]
                {
                    let x = self.down[at(down_offset + k)];
                    return Ok((x as usize, (x - k) as usize));
                }
                k += 2;
            }
        }

        Err(DiffError::AlgorithmInvariant(format!(
            "no middle snake for a[{lower_a}..{upper_a}] b[{lower_b}..{upper_b}]"
        )))
    }

    /// Fold the modification marks into edit items.
    fn edit_items(&self) -> Vec<EditItem> {
        let (n, m) = (self.a.len(), self.b.len());
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);

        while i < n || j < m {
            if i < n && j < m && !self.modified_a[i] && !self.modified_b[j] {
                i += 1;
                j += 1;
                continue;
            }
            let (start_a, start_b) = (i, j);
            while i < n && (j >= m || self.modified_a[i]) {
                i += 1;
            }
            while j < m && (i >= n || self.modified_b[j]) {
                j += 1;
            }
            if start_a < i || start_b < j {
                out.push(EditItem {
                    start_a,
                    start_b,
                    deleted_a: i - start_a,
                    inserted_b: j - start_b,
                });
            }
        }
        out
    }
}

fn at(index: isize) -> usize {
    index as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(start_a: usize, start_b: usize, deleted_a: usize, inserted_b: usize) -> EditItem {
        EditItem {
            start_a,
            start_b,
            deleted_a,
            inserted_b,
        }
    }

    #[test]
    fn empty_to_text_is_one_insert() {
        assert_eq!(diff_text("", "abc").unwrap(), vec![item(0, 0, 0, 3)]);
    }

    #[test]
    fn text_to_empty_is_one_delete() {
        assert_eq!(diff_text("abc", "").unwrap(), vec![item(0, 0, 3, 0)]);
    }

    #[test]
    fn identical_texts_have_no_edits() {
        assert!(diff_text("", "").unwrap().is_empty());
        assert!(diff_text("same", "same").unwrap().is_empty());
    }

    #[test]
    fn kitten_sitting() {
        let script = diff_text("kitten", "sitting").unwrap();
        let stats = EditStats::of(&script, 6);
        assert_eq!(stats.deleted, 2);
        assert_eq!(stats.inserted, 3);
        assert_eq!(stats.unchanged, 4);
        assert_eq!(apply_edits("kitten", "sitting", &script).unwrap(), "sitting");
    }

    #[test]
    fn single_replacement_in_the_middle() {
        let script = diff_text("abXcd", "abYcd").unwrap();
        assert_eq!(script, vec![item(2, 2, 1, 1)]);
    }

    #[test]
    fn positions_count_characters_not_bytes() {
        let script = diff_text("grüße", "grüsse").unwrap();
        assert_eq!(script, vec![item(3, 3, 1, 2)]);
    }

    #[test]
    fn generic_sequences() {
        let a = [1, 2, 3, 4];
        let b = [1, 3, 4, 5];
        let script = diff_chars(&a, &b).unwrap();
        assert_eq!(script, vec![item(1, 1, 1, 0), item(4, 3, 0, 1)]);
    }

    #[test]
    fn apply_rejects_foreign_script() {
        let err = apply_edits("ab", "cd", &[item(1, 0, 5, 0)]).unwrap_err();
        assert!(matches!(err, DiffError::InvalidArgument(_)));
    }

    fn lcs_len(a: &[char], b: &[char]) -> usize {
        let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
        for i in (0..a.len()).rev() {
            for j in (0..b.len()).rev() {
                table[i][j] = if a[i] == b[j] {
                    table[i + 1][j + 1] + 1
                } else {
                    table[i + 1][j].max(table[i][j + 1])
                };
            }
        }
        table[0][0]
    }

    proptest! {
        #[test]
        fn replay_yields_new_text(old in "[a-d]{0,24}", new in "[a-d]{0,24}") {
            let script = diff_text(&old, &new).unwrap();
            prop_assert_eq!(apply_edits(&old, &new, &script).unwrap(), new);
        }

        #[test]
        fn replay_handles_any_unicode(old in "\\PC{0,16}", new in "\\PC{0,16}") {
            let script = diff_text(&old, &new).unwrap();
            prop_assert_eq!(apply_edits(&old, &new, &script).unwrap(), new);
        }

        #[test]
        fn self_diff_is_empty(text in "\\PC{0,32}") {
            prop_assert!(diff_text(&text, &text).unwrap().is_empty());
        }

        #[test]
        fn script_is_minimal(old in "[a-c]{0,12}", new in "[a-c]{0,12}") {
            let a: Vec<char> = old.chars().collect();
            let b: Vec<char> = new.chars().collect();
            let stats = EditStats::of(&diff_text(&old, &new).unwrap(), a.len());
            prop_assert_eq!(stats.unchanged, lcs_len(&a, &b));
        }

        #[test]
        fn items_are_ordered_and_non_empty(old in "[a-c]{0,16}", new in "[a-c]{0,16}") {
            let script = diff_text(&old, &new).unwrap();
            for item in &script {
                prop_assert!(item.deleted_a + item.inserted_b > 0);
            }
            for pair in script.windows(2) {
                prop_assert!(pair[0].start_a + pair[0].deleted_a < pair[1].start_a);
                prop_assert!(pair[0].start_b + pair[0].inserted_b < pair[1].start_b);
            }
        }
    }
}
