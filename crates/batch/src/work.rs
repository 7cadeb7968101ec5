use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// One unit of work: run `task_index`'s task for the `trial`'th time.
/// Resume semantics treat `(trial, task_index)` as the output file's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkItem {
    pub trial: u64,
    pub task_index: usize,
}

/// Builds the full cross product of `0..num_trials` by `0..num_tasks`,
/// in trial-major order, optionally shuffled with a seed derived from
/// the runner's own seed so a resumed run reshuffles identically.
pub fn build_work_list(num_trials: u64, num_tasks: usize, shuffle_seed: Option<u64>) -> Vec<WorkItem> {
    let mut items = Vec::with_capacity(num_trials as usize * num_tasks);
    for trial in 0..num_trials {
        for task_index in 0..num_tasks {
            items.push(WorkItem { trial, task_index });
        }
    }
    if let Some(seed) = shuffle_seed {
        let mut rng = StdRng::seed_from_u64(seed);
        items.shuffle(&mut rng);
    }
    items
}

/// Removes any item already present in `completed`, preserving the
/// remaining items' relative order.
pub fn filter_resumed(items: Vec<WorkItem>, completed: &HashSet<WorkItem>) -> Vec<WorkItem> {
    items.into_iter().filter(|item| !completed.contains(item)).collect()
}
