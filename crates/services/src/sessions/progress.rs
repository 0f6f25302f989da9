/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    /// 1-based index of the current question.
    pub position: usize,
    pub total: usize,
    /// The termination affordance switches from "next" to "finish"
    /// on the last question.
    pub is_last: bool,
    pub answered: bool,
}
