use rand::seq::SliceRandom;

use drill_core::model::{Mode, QuizBank, QuizRecord, SaveData, StageFilter};

/// Everything a session needs to start: the ordered working set plus
/// the per-mode partition seeds.
///
/// The mode decides where the working set comes from and how the saved
/// partitions are seeded; the per-question mechanics never differ.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub mode: Mode,
    pub working_set: Vec<QuizRecord>,
    /// Wrong partition the run starts from. `Restart` carries the prior
    /// run's wrong answers verbatim; every other mode rebuilds it.
    pub wrong_seed: QuizBank,
    /// Restart partition written back unchanged on the save path.
    /// `Wrong` carries the prior run's unanswered records through.
    pub carried_restart: Option<QuizBank>,
}

impl SessionPlan {
    /// Fresh run over the master bank, filtered by selected stages.
    #[must_use]
    pub fn normal(bank: &QuizBank, filter: &StageFilter) -> Self {
        Self {
            mode: Mode::Normal,
            working_set: bank.collect_stages(filter),
            wrong_seed: QuizBank::empty(),
            carried_restart: None,
        }
    }

    /// Run over the persistent review list, filtered by selected stages.
    #[must_use]
    pub fn review(review: &QuizBank, filter: &StageFilter) -> Self {
        Self {
            mode: Mode::Review,
            working_set: review.collect_stages(filter),
            wrong_seed: QuizBank::empty(),
            carried_restart: None,
        }
    }

    /// Run over a prior save's wrong partition. The wrong list is
    /// rebuilt from scratch this run; the prior restart partition rides
    /// along untouched.
    #[must_use]
    pub fn wrong(save: &SaveData) -> Self {
        Self {
            mode: Mode::Wrong,
            working_set: save.wrong_quizzes.collect_all(),
            wrong_seed: QuizBank::empty(),
            carried_restart: Some(save.restart_quizzes.clone()),
        }
    }

    /// Resume a prior save's unanswered partition; its wrong partition
    /// seeds this run's wrong answers.
    #[must_use]
    pub fn restart(save: &SaveData) -> Self {
        Self {
            mode: Mode::Restart,
            working_set: save.restart_quizzes.collect_all(),
            wrong_seed: save.wrong_quizzes.clone(),
            carried_restart: None,
        }
    }

    /// Shuffle the presentation order of the working set.
    #[must_use]
    pub fn shuffled(mut self) -> Self {
        self.working_set.shuffle(&mut rand::rng());
        self
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::model::{QuizId, Stage};

    fn build_record(stage: Stage, seq: u32) -> QuizRecord {
        QuizRecord {
            qid: QuizId::assign(stage, seq),
            genre: stage.genre().to_string(),
            question: format!("問{seq}"),
            answer: "正".to_string(),
            choices: [
                "正".to_string(),
                "誤1".to_string(),
                "誤2".to_string(),
                "誤3".to_string(),
            ],
        }
    }

    fn build_save() -> SaveData {
        let mut save = SaveData::empty();
        save.wrong_quizzes
            .push(Stage::Stage2, build_record(Stage::Stage2, 1));
        save.restart_quizzes
            .push(Stage::Stage3, build_record(Stage::Stage3, 2));
        save.restart_quizzes
            .push(Stage::Stage3, build_record(Stage::Stage3, 3));
        save
    }

    #[test]
    fn normal_plan_honors_the_stage_filter() {
        let mut bank = QuizBank::empty();
        bank.push(Stage::Stage1, build_record(Stage::Stage1, 1));
        bank.push(Stage::Stage2, build_record(Stage::Stage2, 1));

        let plan = SessionPlan::normal(&bank, &StageFilter::none().with(Stage::Stage2));
        assert_eq!(plan.mode, Mode::Normal);
        assert_eq!(plan.working_set.len(), 1);
        assert_eq!(plan.working_set[0].qid.as_str(), "200001");
        assert!(plan.wrong_seed.is_empty());
        assert!(plan.carried_restart.is_none());
    }

    #[test]
    fn wrong_plan_rebuilds_wrong_and_carries_restart() {
        let save = build_save();
        let plan = SessionPlan::wrong(&save);

        assert_eq!(plan.mode, Mode::Wrong);
        assert_eq!(plan.working_set.len(), 1);
        assert_eq!(plan.working_set[0].qid.as_str(), "200001");
        assert!(plan.wrong_seed.is_empty());
        assert_eq!(plan.carried_restart, Some(save.restart_quizzes));
    }

    #[test]
    fn restart_plan_resumes_and_seeds_wrong_verbatim() {
        let save = build_save();
        let plan = SessionPlan::restart(&save);

        assert_eq!(plan.mode, Mode::Restart);
        assert_eq!(plan.working_set.len(), 2);
        assert_eq!(plan.working_set[0].qid.as_str(), "300002");
        assert_eq!(plan.wrong_seed, save.wrong_quizzes);
        assert!(plan.carried_restart.is_none());
    }

    #[test]
    fn shuffling_keeps_the_same_records() {
        let mut bank = QuizBank::empty();
        for seq in 1..=8 {
            bank.push(Stage::Stage1, build_record(Stage::Stage1, seq));
        }

        let plan = SessionPlan::normal(&bank, &StageFilter::all());
        let mut expected: Vec<_> = plan
            .working_set
            .iter()
            .map(|record| record.qid.clone())
            .collect();
        let shuffled = plan.shuffled();
        let mut actual: Vec<_> = shuffled
            .working_set
            .iter()
            .map(|record| record.qid.clone())
            .collect();

        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);
    }
}
