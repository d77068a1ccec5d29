use crate::stimuli::ConditionGroups;
use lexis_core::{Condition, Trial};
use rand::Rng;
use rand::seq::SliceRandom;

/// Trials sharing one condition, in presentation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub condition: Condition,
    pub trials: Vec<Trial>,
}

/// Block and trial order for one run, shuffled once up front.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockPlan {
    pub blocks: Vec<Block>,
}

impl BlockPlan {
    pub fn build<R: Rng + ?Sized>(groups: &ConditionGroups, rng: &mut R) -> Self {
        let mut order = Condition::ALL.to_vec();
        order.shuffle(rng);
        let blocks = order
            .into_iter()
            .map(|condition| {
                let mut trials = groups.trials(condition).to_vec();
                trials.shuffle(rng);
                Block { condition, trials }
            })
            .collect();
        Self { blocks }
    }

    pub fn order(&self) -> Vec<Condition> {
        self.blocks.iter().map(|b| b.condition).collect()
    }

    pub fn total_trials(&self) -> usize {
        self.blocks.iter().map(|b| b.trials.len()).sum()
    }

    /// All trials in presentation order
    pub fn trials(&self) -> impl Iterator<Item = &Trial> {
        self.blocks.iter().flat_map(|b| b.trials.iter())
    }
}
