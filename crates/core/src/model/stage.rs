use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One of the five fixed practice stages.
///
/// Stages and genres form a fixed bijection: each genre sheet in the
/// source workbook corresponds to exactly one stage key in persisted
/// documents, and every record filed under a stage must carry that
/// stage's genre.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Stage1,
    Stage2,
    Stage3,
    Stage4,
    Stage5,
}

impl Stage {
    /// All stages in key order.
    pub const ALL: [Stage; 5] = [
        Stage::Stage1,
        Stage::Stage2,
        Stage::Stage3,
        Stage::Stage4,
        Stage::Stage5,
    ];

    /// The stage key used in persisted documents.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Stage::Stage1 => "stage1",
            Stage::Stage2 => "stage2",
            Stage::Stage3 => "stage3",
            Stage::Stage4 => "stage4",
            Stage::Stage5 => "stage5",
        }
    }

    /// The single digit prefixed to every quiz id of this stage.
    #[must_use]
    pub fn code(&self) -> char {
        match self {
            Stage::Stage1 => '1',
            Stage::Stage2 => '2',
            Stage::Stage3 => '3',
            Stage::Stage4 => '4',
            Stage::Stage5 => '5',
        }
    }

    /// The genre name carried by records of this stage and used as the
    /// sheet name in the source workbook.
    #[must_use]
    pub fn genre(&self) -> &'static str {
        match self {
            Stage::Stage1 => "文学＆歴史",
            Stage::Stage2 => "自然科学",
            Stage::Stage3 => "現代社会＆地理",
            Stage::Stage4 => "グルメ＆趣味",
            Stage::Stage5 => "アニメ＆ゲーム",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.key() == key)
    }

    #[must_use]
    pub fn from_code(code: char) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.code() == code)
    }

    #[must_use]
    pub fn from_genre(genre: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.genre() == genre)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ─── Stage Filter ──────────────────────────────────────────────────────────────

/// The set of stages selected for a practice run.
///
/// An empty filter blocks session start; continuation modes always run
/// with every stage selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageFilter {
    selected: BTreeSet<Stage>,
}

impl StageFilter {
    /// Every stage selected.
    #[must_use]
    pub fn all() -> Self {
        Self {
            selected: Stage::ALL.into_iter().collect(),
        }
    }

    /// No stage selected.
    #[must_use]
    pub fn none() -> Self {
        Self {
            selected: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, stage: Stage) -> Self {
        self.selected.insert(stage);
        self
    }

    pub fn insert(&mut self, stage: Stage) {
        self.selected.insert(stage);
    }

    #[must_use]
    pub fn contains(&self, stage: Stage) -> bool {
        self.selected.contains(&stage)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Selected stages in key order.
    pub fn iter(&self) -> impl Iterator<Item = Stage> + '_ {
        self.selected.iter().copied()
    }
}

impl FromIterator<Stage> for StageFilter {
    fn from_iter<I: IntoIterator<Item = Stage>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().collect(),
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_genre_bijection_round_trips() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_genre(stage.genre()), Some(stage));
            assert_eq!(Stage::from_key(stage.key()), Some(stage));
            assert_eq!(Stage::from_code(stage.code()), Some(stage));
        }
    }

    #[test]
    fn unknown_genre_has_no_stage() {
        assert_eq!(Stage::from_genre("スポーツ"), None);
        assert_eq!(Stage::from_key("stage6"), None);
        assert_eq!(Stage::from_code('0'), None);
    }

    #[test]
    fn stage_serializes_as_key() {
        let json = serde_json::to_string(&Stage::Stage3).unwrap();
        assert_eq!(json, "\"stage3\"");
        let back: Stage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Stage::Stage3);
    }

    #[test]
    fn filter_selects_stages() {
        let filter = StageFilter::none().with(Stage::Stage2).with(Stage::Stage4);
        assert!(filter.contains(Stage::Stage2));
        assert!(!filter.contains(Stage::Stage1));
        assert_eq!(filter.len(), 2);

        let all = StageFilter::all();
        assert_eq!(all.len(), Stage::ALL.len());
        assert!(!all.is_empty());
    }
}
