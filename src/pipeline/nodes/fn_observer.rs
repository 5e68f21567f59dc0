//! FnObserver: closure-backed [`Observer`].

use crate::error::StageResult;
use crate::pipeline::batch::ObservedLanes;
use crate::pipeline::info::ModuleInfo;
use crate::pipeline::stage::Observer;

pub struct FnObserver<F> {
    f: F,
}

impl<F> FnObserver<F>
where
    F: FnMut(&ModuleInfo, &ObservedLanes<'_>) -> StageResult<()> + Send,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Observer for FnObserver<F>
where
    F: FnMut(&ModuleInfo, &ObservedLanes<'_>) -> StageResult<()> + Send,
{
    fn observe(&mut self, stage: &ModuleInfo, lanes: &ObservedLanes<'_>) -> StageResult<()> {
        (self.f)(stage, lanes)
    }
}
