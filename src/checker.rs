use crate::dom::Dom;
use crate::quiz::Ordinal;

/// The host page's `checkAnswer(id)`: grades one question and writes the verdict into its
/// feedback container. Untrusted, it may fail for any ordinal.
pub trait AnswerChecker {
    fn check_answer(&mut self, dom: &mut Dom, ordinal: Ordinal) -> anyhow::Result<()>;
}

impl<F> AnswerChecker for F
where
    F: FnMut(&mut Dom, Ordinal) -> anyhow::Result<()>,
{
    fn check_answer(&mut self, dom: &mut Dom, ordinal: Ordinal) -> anyhow::Result<()> {
        self(dom, ordinal)
    }
}

/// Stand-in for pages that define no checker: every call fails, as calling an undefined
/// function would.
#[derive(Debug, Default, Clone, Copy)]
pub struct MissingChecker;

impl AnswerChecker for MissingChecker {
    fn check_answer(&mut self, _dom: &mut Dom, ordinal: Ordinal) -> anyhow::Result<()> {
        anyhow::bail!("checkAnswer is not defined (ordinal {ordinal})")
    }
}
