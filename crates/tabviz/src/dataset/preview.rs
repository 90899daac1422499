//! Row previews for the data table view.

use polars::prelude::*;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use super::Dataset;
use crate::error::Result;

/// How the shell wants rows picked for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PreviewMode {
    /// First `n` rows
    #[default]
    Head,
    /// Last `n` rows
    Tail,
    /// `n` rows picked at random (seeded), kept in original order
    Sample,
    /// Every row, capped at the configured maximum
    All,
}

/// Pick rows for display.
///
/// `rows` is ignored for [`PreviewMode::All`]; every mode is capped at
/// `max_rows`.
pub fn preview(dataset: &Dataset, mode: PreviewMode, rows: usize, max_rows: usize) -> Result<Dataset> {
    let height = dataset.height();
    let n = match mode {
        PreviewMode::All => max_rows,
        _ => rows.min(max_rows),
    }
    .min(height);

    let frame = dataset.frame();
    let picked = match mode {
        PreviewMode::Head | PreviewMode::All => frame.head(Some(n)),
        PreviewMode::Tail => frame.tail(Some(n)),
        PreviewMode::Sample => {
            let mut rng = StdRng::seed_from_u64(super::SAMPLE_SEED);
            let mut indices: Vec<IdxSize> = (0..height as IdxSize)
                .choose_multiple(&mut rng, n)
                .into_iter()
                .collect();
            indices.sort_unstable();
            let idx = IdxCa::from_vec("idx".into(), indices);
            frame.take(&idx)?
        }
    };

    Ok(dataset.derive(picked))
}
