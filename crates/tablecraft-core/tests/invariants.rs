//! Hand-rolled case generators: deterministic sequences of structural edits,
//! merges and splits run through a `TableModel`, checking the document's
//! geometric invariants after every step. Not a `proptest` harness — the
//! grids here are small enough that a fixed bank of seeded walks covers the
//! interesting interactions (insert/delete through a merge interior, merge
//! over a just-inserted band, split right after a delete) without pulling in
//! a fuzz-scale dependency the rest of this workspace has no other use for.

use tablecraft_core::merge::{merge_range, split_cell};
use tablecraft_core::model::{Document, ModelEditor, TableModel};
use tablecraft_core::{CoreConfig, EventBus, Validator};

/// A tiny xorshift32 generator. Deterministic for a given seed so a failing
/// case reproduces exactly; not cryptographic, just a way to pick among a
/// handful of operation kinds without hand-listing every sequence.
struct Xorshift32(u32);

impl Xorshift32 {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            0
        } else {
            self.next_u32() % bound
        }
    }
}

/// Every §3 invariant that can be checked from the outside: shape/bounds via
/// the registry-backed validator (which delegates shape/geometry checks to
/// `Document::validate_shape`), plus invariant 7 (a covered coordinate is
/// never a leading cell, and is always inside exactly the rectangle its
/// owning leading cell reports) via the public `TableModel` accessors.
fn assert_invariants_hold(model: &TableModel) {
    let validator = Validator::core();
    let doc = model.to_json();
    validator
        .validate_document(&doc)
        .unwrap_or_else(|e| panic!("invariants violated: {e}"));

    for r in 0..model.rows() {
        for c in 0..model.cols() {
            let coord = tablecraft_common::Coord::new(r, c);
            let is_leading = model.get_cell(coord).is_some();
            let is_covered = model.is_covered(coord);
            assert!(
                !(is_leading && is_covered),
                "{coord} is both a leading cell and covered"
            );
            if is_covered {
                let rect = model
                    .cell_rect_containing(coord)
                    .unwrap_or_else(|| panic!("{coord} reports covered but has no owning rect"));
                assert!(rect.contains(coord), "{coord} covered by a rect that doesn't contain it");
                assert_ne!(rect.top_left(), coord, "a covered coordinate can't be its own rect's top-left");
            }
        }
    }

    if let Some(sizes) = &doc.grid.column_sizes {
        assert_eq!(sizes.len() as u32, doc.grid.cols, "columnSizes length must track grid.cols");
    }
}

#[derive(Clone, Copy)]
enum Step {
    InsertRows,
    InsertColumns,
    DeleteRows,
    DeleteColumns,
    Merge,
    Split,
    SetValue,
}

const STEP_KINDS: &[Step] =
    &[Step::InsertRows, Step::InsertColumns, Step::DeleteRows, Step::DeleteColumns, Step::Merge, Step::Split, Step::SetValue];

/// Run `steps` pseudo-random operations against a fresh `rows x cols` model,
/// re-checking every invariant after each one that actually applies
/// (rejected operations leave the model untouched and are simply skipped).
fn run_walk(seed: u32, rows: u32, cols: u32, steps: u32) {
    let mut rng = Xorshift32(seed | 1);
    let mut model = TableModel::new(Document::empty(rows, cols)).unwrap();
    let mut bus = EventBus::new();
    let config = CoreConfig::default();
    assert_invariants_hold(&model);

    for _ in 0..steps {
        let kind = STEP_KINDS[rng.below(STEP_KINDS.len() as u32) as usize];
        let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
        let r_bound = editor.model().rows();
        let c_bound = editor.model().cols();

        match kind {
            Step::InsertRows => {
                let index = rng.below(r_bound + 1);
                let count = 1 + rng.below(3);
                let _ = editor.insert_rows(index, count);
            }
            Step::InsertColumns => {
                let index = rng.below(c_bound + 1);
                let count = 1 + rng.below(3);
                let _ = editor.insert_columns(index, count);
            }
            Step::DeleteRows => {
                if r_bound > 1 {
                    let start = rng.below(r_bound);
                    let max_count = r_bound - start;
                    let count = 1 + rng.below(max_count.min(2));
                    let _ = editor.delete_rows(start, count.min(r_bound - 1).max(1));
                }
            }
            Step::DeleteColumns => {
                if c_bound > 1 {
                    let start = rng.below(c_bound);
                    let max_count = c_bound - start;
                    let count = 1 + rng.below(max_count.min(2));
                    let _ = editor.delete_columns(start, count.min(c_bound - 1).max(1));
                }
            }
            Step::Merge => {
                let r1 = rng.below(r_bound);
                let c1 = rng.below(c_bound);
                let r2 = rng.below(r_bound);
                let c2 = rng.below(c_bound);
                let _ = merge_range(&mut editor, r1, c1, r2, c2);
            }
            Step::Split => {
                let r = rng.below(r_bound);
                let c = rng.below(c_bound);
                let _ = split_cell(&mut editor, tablecraft_common::Coord::new(r, c));
            }
            Step::SetValue => {
                let r = rng.below(r_bound);
                let c = rng.below(c_bound);
                let _ = editor.set_cell_value(tablecraft_common::Coord::new(r, c), format!("v{}", rng.next_u32()));
            }
        }
        assert_invariants_hold(&model);
    }
}

#[test]
fn invariants_survive_seeded_walks_on_small_grids() {
    for (seed, rows, cols, steps) in [
        (1u32, 4u32, 4u32, 60u32),
        (7, 3, 6, 80),
        (42, 6, 3, 80),
        (1337, 2, 2, 40),
        (99_991, 8, 8, 120),
        (2_024, 5, 5, 100),
    ] {
        run_walk(seed, rows, cols, steps);
    }
}

#[test]
fn split_then_merge_is_idempotent_on_leading_cells_across_many_seeds() {
    for seed in [3u32, 11, 19, 23, 31] {
        let mut rng = Xorshift32(seed | 1);
        let mut model = TableModel::new(Document::empty(5, 5)).unwrap();
        let mut bus = EventBus::new();
        let config = CoreConfig::default();

        {
            let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
            let r1 = rng.below(3);
            let c1 = rng.below(3);
            merge_range(&mut editor, r1, c1, r1 + 1, c1 + 1).unwrap();
            let before = editor.model().get_cell(tablecraft_common::Coord::new(r1, c1)).cloned();

            split_cell(&mut editor, tablecraft_common::Coord::new(r1, c1)).unwrap();
            merge_range(&mut editor, r1, c1, r1 + 1, c1 + 1).unwrap();

            let after = editor.model().get_cell(tablecraft_common::Coord::new(r1, c1)).cloned();
            assert_eq!(before.map(|c| (c.row_span, c.col_span)), after.map(|c| (c.row_span, c.col_span)));
        }
        assert_invariants_hold(&model);
    }
}
